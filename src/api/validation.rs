//! Input validation for request DTOs.
//! Each check returns the cleaned value or an `AppError::Validation` whose
//! message is sent back to the client as-is.

use regex::Regex;
use std::collections::HashSet;
use url::Url;
use uuid::Uuid;

use crate::errors::AppError;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    static ref FULL_NAME_RE: Regex = Regex::new(r"^\p{L}[\p{L} .'-]*$").unwrap();
    static ref CODE_RE: Regex = Regex::new(r"^[0-9]{4}$").unwrap();
}

pub const MAX_HOBBIES: usize = 10;
pub const MAX_HOBBY_LEN: usize = 30;
pub const MAX_IMAGE_URL_LEN: usize = 2048;
pub const MAX_SEARCH_NAME_LEN: usize = 50;

pub const CATEGORIES: [&str; 8] = [
    "art",
    "music",
    "sports",
    "travel",
    "food",
    "technology",
    "nature",
    "other",
];

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

pub fn validate_email_opt(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn ensure_max_len(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// Trimmed and lowercased.
pub fn email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(invalid("Email is required!"));
    }
    if !ensure_max_len(&email, 254) || !validate_email_opt(&email) {
        return Err(invalid("Invalid email address"));
    }
    Ok(email)
}

pub fn full_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < 2 {
        return Err(invalid("Full name must be at least 2 characters long"));
    }
    if len > 50 {
        return Err(invalid("Full name cannot exceed 50 characters"));
    }
    if !FULL_NAME_RE.is_match(name) {
        return Err(invalid("Full name can only contain letters, spaces, dots, apostrophes and hyphens"));
    }
    Ok(name.to_string())
}

pub fn password(raw: &str) -> Result<(), AppError> {
    let len = raw.chars().count();
    if len < 8 {
        return Err(invalid("Password must be at least 8 characters long"));
    }
    if len > 64 {
        return Err(invalid("Password cannot exceed 64 characters"));
    }
    if !raw.chars().any(|c| c.is_alphabetic()) || !raw.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("Password must contain at least one letter and one digit"));
    }
    Ok(())
}

pub fn hobbies(raw: &[String]) -> Result<Vec<String>, AppError> {
    if raw.len() > MAX_HOBBIES {
        return Err(invalid(format!("You can add at most {} hobbies", MAX_HOBBIES)));
    }
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(raw.len());
    for hobby in raw {
        let hobby = hobby.trim();
        if hobby.is_empty() {
            return Err(invalid("Hobby cannot be empty"));
        }
        if !ensure_max_len(hobby, MAX_HOBBY_LEN) {
            return Err(invalid(format!(
                "Hobby cannot exceed {} characters",
                MAX_HOBBY_LEN
            )));
        }
        if !seen.insert(hobby.to_lowercase()) {
            return Err(invalid("Hobbies must be unique"));
        }
        cleaned.push(hobby.to_string());
    }
    Ok(cleaned)
}

pub fn image_url(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if !ensure_max_len(raw, MAX_IMAGE_URL_LEN) {
        return Err(invalid("Image URL is too long"));
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {
            Ok(url.to_string())
        }
        _ => Err(invalid("Image must be a valid http(s) URL")),
    }
}

pub fn code(raw: &str, field: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if CODE_RE.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(invalid(format!("{} must be a 4 digit code", field)))
    }
}

pub fn user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| invalid("Invalid user id"))
}

pub fn token(raw: &str) -> Result<&str, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        Err(invalid("Token is required!"))
    } else {
        Ok(raw)
    }
}

pub fn search_name(raw: Option<&str>) -> Result<String, AppError> {
    let name = raw.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(invalid("Name is required!"));
    }
    if !ensure_max_len(name, MAX_SEARCH_NAME_LEN) {
        return Err(invalid(format!(
            "Name cannot exceed {} characters",
            MAX_SEARCH_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

pub fn page(raw: Option<u64>) -> Result<u64, AppError> {
    match raw {
        None => Ok(1),
        Some(0) => Err(invalid("Page must be a positive number")),
        Some(page) => Ok(page),
    }
}

pub fn caption(raw: Option<&str>, max: usize) -> Result<Option<String>, AppError> {
    let Some(caption) = raw.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if !ensure_max_len(caption, max) {
        return Err(invalid(format!(
            "Max post length cannot exceed {} characters!",
            max
        )));
    }
    Ok(Some(caption.to_string()))
}

pub fn category(raw: &str) -> Result<String, AppError> {
    let category = raw.trim().to_lowercase();
    if CATEGORIES.contains(&category.as_str()) {
        Ok(category)
    } else {
        Err(invalid(format!(
            "Invalid category, expected one of: {}",
            CATEGORIES.join(", ")
        )))
    }
}
