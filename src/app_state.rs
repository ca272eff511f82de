use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::services::mailer::{self, Mailer};
use crate::services::tokens::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: TokenService,
}

impl AppState {
    /// Builds the state with the mailer selected from configuration.
    pub fn new(db: DatabaseConnection, config: Config) -> Result<Self, AppError> {
        let mailer = mailer::from_config(&config)?;
        Ok(Self::with_mailer(db, config, mailer))
    }

    pub fn with_mailer(db: DatabaseConnection, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.effective_jwt_ttl_days());
        Self {
            db,
            config,
            mailer,
            tokens,
        }
    }
}
