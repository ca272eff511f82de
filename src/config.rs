use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_days: Option<i64>,
    pub page_limit: Option<u64>,
    pub max_post_length: Option<usize>,
    pub reset_code_ttl_minutes: Option<i64>,
    pub bcrypt_cost: Option<u32>,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: Option<String>,
    pub cors_allowed_origin: Option<String>,
    pub workers: Option<usize>,
    pub max_body_bytes: Option<usize>,
    pub auto_migrate: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: String::new(),
            jwt_ttl_days: None,
            page_limit: None,
            max_post_length: None,
            reset_code_ttl_minutes: None,
            bcrypt_cost: None,
            mail_api_url: None,
            mail_api_key: None,
            mail_from: None,
            cors_allowed_origin: None,
            workers: None,
            max_body_bytes: None,
            auto_migrate: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = cfg.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Rejects settings that would make the service unsafe or unusable.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || ".:-_".contains(c))
        {
            return Err(config::ConfigError::Message(
                "Invalid host format".to_string(),
            ));
        }

        if self.port < 1024 {
            return Err(config::ConfigError::Message(
                "Port must be 1024 or higher for security reasons".to_string(),
            ));
        }

        if self.jwt_secret.len() < 16 {
            return Err(config::ConfigError::Message(
                "JWT_SECRET must be at least 16 characters long".to_string(),
            ));
        }

        if let Some(limit) = self.page_limit {
            if !(1..=100).contains(&limit) {
                return Err(config::ConfigError::Message(
                    "page_limit must be between 1 and 100".to_string(),
                ));
            }
        }

        if let Some(cost) = self.bcrypt_cost {
            if !(4..=31).contains(&cost) {
                return Err(config::ConfigError::Message(
                    "bcrypt_cost must be between 4 and 31".to_string(),
                ));
            }
        }

        if let Some(days) = self.jwt_ttl_days {
            if days < 1 {
                return Err(config::ConfigError::Message(
                    "jwt_ttl_days must be positive".to_string(),
                ));
            }
        }

        if let Some(minutes) = self.reset_code_ttl_minutes {
            if minutes < 1 {
                return Err(config::ConfigError::Message(
                    "reset_code_ttl_minutes must be positive".to_string(),
                ));
            }
        }

        // 1KB..10MB
        if let Some(limit) = self.max_body_bytes {
            let min = 1024;
            let max = 10 * 1024 * 1024;
            if limit < min || limit > max {
                return Err(config::ConfigError::Message(format!(
                    "max_body_bytes must be between {} and {} bytes",
                    min, max
                )));
            }
        }

        if self.mail_api_url.is_some() && self.mail_api_key.is_none() {
            return Err(config::ConfigError::Message(
                "MAIL_API_KEY is required when MAIL_API_URL is set".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    pub fn effective_page_limit(&self) -> u64 {
        self.page_limit.unwrap_or(10)
    }

    pub fn effective_max_post_length(&self) -> usize {
        self.max_post_length.unwrap_or(500)
    }

    pub fn effective_jwt_ttl_days(&self) -> i64 {
        self.jwt_ttl_days.unwrap_or(30)
    }

    pub fn effective_reset_code_ttl_minutes(&self) -> i64 {
        self.reset_code_ttl_minutes.unwrap_or(15)
    }

    pub fn effective_bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST)
    }

    pub fn effective_max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(256 * 1024)
    }

    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    pub fn effective_mail_from(&self) -> String {
        self.mail_from
            .clone()
            .unwrap_or_else(|| "no-reply@userhub.local".to_string())
    }

    pub fn should_auto_migrate(&self) -> bool {
        self.auto_migrate.unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub sql_log: Option<bool>,
}

impl DatabaseSettings {
    pub fn default_from_url(url: String) -> Self {
        Self {
            url,
            max_connections: parse_env_var("DATABASE_MAX_CONNECTIONS"),
            min_connections: parse_env_var("DATABASE_MIN_CONNECTIONS"),
            connect_timeout_secs: parse_env_var("DATABASE_CONNECT_TIMEOUT_SECS"),
            acquire_timeout_secs: parse_env_var("DATABASE_ACQUIRE_TIMEOUT_SECS"),
            idle_timeout_secs: parse_env_var("DATABASE_IDLE_TIMEOUT_SECS"),
            sql_log: parse_env_var("DATABASE_SQL_LOG"),
        }
    }

    /// Single pinned connection, required for `sqlite::memory:` where every
    /// new connection would open an empty database.
    pub fn single_connection(url: &str) -> Self {
        Self {
            url: url.to_string(),
            max_connections: Some(1),
            min_connections: Some(1),
            connect_timeout_secs: None,
            acquire_timeout_secs: None,
            idle_timeout_secs: None,
            sql_log: Some(false),
        }
    }
}

fn parse_env_var<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}
