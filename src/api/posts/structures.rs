use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::database::models::posts;

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct CreatePostRequest {
    pub caption: Option<String>,
    /// Image URL.
    pub image: String,
    pub category: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number, defaults to 1.
    pub page: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub caption: Option<String>,
    pub image: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl From<posts::Model> for PostView {
    fn from(post: posts::Model) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            caption: post.caption,
            image: post.image,
            category: post.category,
            created_at: post.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub is_success: bool,
    pub post: PostView,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub is_success: bool,
    pub posts: Vec<PostView>,
    pub total_pages: u64,
}
