use actix_web::{HttpRequest, error, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Bare success body.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub is_success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { is_success: true }
    }
}

/// Fails with "No results found" when `page` lies past the last page.
pub fn ensure_page_exists(page: u64, total_pages: u64) -> Result<(), AppError> {
    if total_pages < page {
        return Err(AppError::NotFound("No results found".to_string()));
    }
    Ok(())
}

/// Escape char for LIKE patterns. Needs no quoting in any SQL dialect.
pub const LIKE_ESCAPE: char = '!';

/// Escapes `%`, `_` and [`LIKE_ESCAPE`] itself.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let message = match &err {
        error::JsonPayloadError::Deserialize(e) => e.to_string(),
        error::JsonPayloadError::ContentType => "Expected a JSON body".to_string(),
        other => other.to_string(),
    };
    AppError::Validation(message).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    AppError::Validation(err.to_string()).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> error::Error {
    AppError::Validation(err.to_string()).into()
}

pub fn json_config(max_body_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body_bytes)
        .error_handler(json_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}
