use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    /// `full_name` lowercased in Rust, matched by search. SQL `LOWER` only
    /// folds ASCII on some backends.
    #[serde(skip_serializing)]
    pub full_name_search: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// JSON array of strings.
    pub hobbies: Json,
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    /// Set at signup, cleared once the email is verified.
    pub inactive_since: Option<DateTimeUtc>,
    #[serde(skip_serializing)]
    pub reset_code: Option<String>,
    pub reset_code_expires_at: Option<DateTimeUtc>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posts::Entity")]
    Posts,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Value stored in `full_name_search` for `full_name`.
pub fn search_key(full_name: &str) -> String {
    full_name.to_lowercase()
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.inactive_since.is_none()
    }

    pub fn hobby_list(&self) -> Vec<String> {
        serde_json::from_value(self.hobbies.clone()).unwrap_or_default()
    }
}
