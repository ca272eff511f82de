use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::database::models::users;

// --- Requests ---

#[derive(Debug, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub hobbies: Option<Vec<String>>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub token: String,
    pub verification_code: String,
}

/// Password recovery, dispatched on `operation`.
#[derive(Debug, Deserialize, ToSchema, Clone)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum ForgetRequest {
    /// Mails a fresh reset code to `email`.
    Generate { email: String },
    /// Replaces the password when `code` matches the mailed one.
    Change {
        email: String,
        code: String,
        password: String,
    },
}

/// Body of `PATCH /update`: the token plus the fields to change.
#[derive(Debug, Deserialize, Clone)]
pub struct UpdateRequest {
    pub token: String,
    #[serde(flatten)]
    pub changes: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub hobbies: Option<Vec<String>>,
    pub image: Option<String>,
}

impl UserChanges {
    pub const FIELDS: [&'static str; 4] = ["fullName", "password", "hobbies", "image"];

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.password.is_none()
            && self.hobbies.is_none()
            && self.image.is_none()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Prefix of the full name, case-insensitive.
    pub name: Option<String>,
    /// 1-based page number, defaults to 1.
    pub page: Option<u64>,
}

// --- Responses ---

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub is_success: bool,
    pub token: String,
    pub is_active_user: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub is_success: bool,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub image: Option<String>,
    pub followers_count: i64,
}

impl From<users::Model> for UserSummary {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            image: user.image,
            followers_count: user.followers_count,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub is_success: bool,
    pub users: Vec<UserSummary>,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub full_name: String,
    pub image: Option<String>,
    pub hobbies: Vec<String>,
    pub followers_count: i64,
    pub following_count: i64,
    /// Absent when the caller looks at their own profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub is_success: bool,
    pub user: ProfileView,
}
