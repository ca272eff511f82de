use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    api::{helpers::ensure_page_exists, validation},
    app_state::AppState,
    database::models::{posts, users},
    errors::AppError,
};

use super::structures::{CreatePostRequest, PostView};

pub async fn create_post(
    app_state: &AppState,
    author: &users::Model,
    req: CreatePostRequest,
) -> Result<PostView, AppError> {
    let caption = validation::caption(
        req.caption.as_deref(),
        app_state.config.effective_max_post_length(),
    )?;
    let image = validation::image_url(&req.image)?;
    let category = validation::category(&req.category)?;

    let post = posts::ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(author.id),
        caption: Set(caption),
        image: Set(image),
        category: Set(category),
        created_at: Set(Utc::now()),
    }
    .insert(&app_state.db)
    .await?;

    log::info!("User {} created post {}", author.id, post.id);
    Ok(post.into())
}

/// Newest first, `PAGE_LIMIT` per page.
pub async fn list_author_posts(
    app_state: &AppState,
    author_id: Uuid,
    page: u64,
) -> Result<(Vec<PostView>, u64), AppError> {
    if users::Entity::find_by_id(author_id)
        .one(&app_state.db)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let paginator = posts::Entity::find()
        .filter(posts::Column::AuthorId.eq(author_id))
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
        .paginate(&app_state.db, app_state.config.effective_page_limit());

    let pages = paginator.num_items_and_pages().await?.number_of_pages;
    ensure_page_exists(page, pages)?;
    let found = paginator.fetch_page(page - 1).await?;

    Ok((found.into_iter().map(PostView::from).collect(), pages))
}
