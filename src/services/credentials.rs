//! Password hashing and one-time numeric codes.

use crate::errors::AppError;

/// Hashes `password` with bcrypt on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            log::error!("Password hashing task failed: {}", e);
            AppError::Internal
        })?
        .map_err(AppError::from)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            log::error!("Password verification task failed: {}", e);
            AppError::Internal
        })?
        .map_err(AppError::from)
}

/// Random string of `len` decimal digits, leading zeros allowed.
pub fn numeric_code(len: usize) -> String {
    (0..len).map(|_| fastrand::digit(10)).collect()
}

pub const CODE_LENGTH: usize = 4;
