//! Maintenance operations used by `admin-cli`.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

use crate::database::models::{follows, posts, users};
use crate::errors::AppError;

pub async fn list_users(db: &DatabaseConnection, limit: u64) -> Result<Vec<users::Model>, AppError> {
    let users = users::Entity::find()
        .order_by_asc(users::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?;
    Ok(users)
}

async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<users::Model, AppError> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user with email {}", email)))
}

/// Marks the account verified without the emailed code.
pub async fn activate_user(db: &DatabaseConnection, email: &str) -> Result<users::Model, AppError> {
    let user = find_by_email(db, email).await?;
    if user.is_active() {
        return Ok(user);
    }
    let mut active = user.into_active_model();
    active.verification_code = Set(None);
    active.inactive_since = Set(None);
    active.updated_at = Set(chrono::Utc::now());
    Ok(active.update(db).await?)
}

/// Removes the user with their posts and follow edges, keeping the counters
/// of the users on the other side of each edge consistent.
pub async fn delete_user(db: &DatabaseConnection, email: &str) -> Result<(), AppError> {
    let user = find_by_email(db, email).await?;
    let txn = db.begin().await?;

    let following = follows::Entity::find()
        .filter(follows::Column::FollowerId.eq(user.id))
        .all(&txn)
        .await?;
    let followee_ids: Vec<_> = following.iter().map(|f| f.followee_id).collect();
    if !followee_ids.is_empty() {
        users::Entity::update_many()
            .col_expr(
                users::Column::FollowersCount,
                Expr::col(users::Column::FollowersCount).sub(1),
            )
            .filter(users::Column::Id.is_in(followee_ids))
            .exec(&txn)
            .await?;
    }

    let followers = follows::Entity::find()
        .filter(follows::Column::FolloweeId.eq(user.id))
        .all(&txn)
        .await?;
    let follower_ids: Vec<_> = followers.iter().map(|f| f.follower_id).collect();
    if !follower_ids.is_empty() {
        users::Entity::update_many()
            .col_expr(
                users::Column::FollowingCount,
                Expr::col(users::Column::FollowingCount).sub(1),
            )
            .filter(users::Column::Id.is_in(follower_ids))
            .exec(&txn)
            .await?;
    }

    follows::Entity::delete_many()
        .filter(
            follows::Column::FollowerId
                .eq(user.id)
                .or(follows::Column::FolloweeId.eq(user.id)),
        )
        .exec(&txn)
        .await?;
    posts::Entity::delete_many()
        .filter(posts::Column::AuthorId.eq(user.id))
        .exec(&txn)
        .await?;
    users::Entity::delete_by_id(user.id).exec(&txn).await?;

    txn.commit().await?;
    log::info!("Deleted user {} ({})", user.id, user.email);
    Ok(())
}
