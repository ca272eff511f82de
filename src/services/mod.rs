pub mod credentials;
pub mod mailer;
pub mod tokens;
pub mod user_admin;
