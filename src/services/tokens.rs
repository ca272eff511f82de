use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and checks the HS256 bearer tokens handed out at signin/verify.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            log::error!("Failed to sign token: {}", e);
            AppError::Internal
        })
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            log::debug!("Rejected token: {}", e);
            AppError::Unauthorized("Invalid token".to_string())
        })?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_same_user() {
        let svc = TokenService::new("a-very-long-test-secret", 1);
        let id = Uuid::new_v4();
        let token = svc.issue(id).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), id);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = TokenService::new("first-secret-first-secret", 1);
        let checker = TokenService::new("second-secret-second-secret", 1);
        let token = issuer.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(checker.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s leeway.
        let svc = TokenService {
            ttl: Duration::seconds(-120),
            ..TokenService::new("a-very-long-test-secret", 1)
        };
        let token = svc.issue(Uuid::new_v4()).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let svc = TokenService::new("a-very-long-test-secret", 1);
        assert!(svc.verify("not.a.token").is_err());
    }
}
