pub mod connector;
pub mod models;
pub mod schema;

pub use connector::{DB, connect, connect_with_settings, ping};
