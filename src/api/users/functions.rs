use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::{Expr, LikeExpr},
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    api::{
        helpers::{LIKE_ESCAPE, ensure_page_exists, escape_like},
        validation,
    },
    app_state::AppState,
    database::models::{follows, users},
    errors::AppError,
    services::{
        credentials::{CODE_LENGTH, hash_password, numeric_code, verify_password},
        mailer::OutgoingMail,
    },
};

use super::structures::{ProfileView, SignupRequest, UserChanges, UserSummary};

const BAD_CREDENTIALS: &str = "Email or password incorrect";
const BAD_RESET_CODE: &str = "Invalid or expired reset code";

async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<users::Model>, AppError> {
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?)
}

/// Creates an inactive account and mails its verification code. The row is
/// only committed once the mail went out.
pub async fn register_user(
    app_state: &AppState,
    req: SignupRequest,
) -> Result<users::Model, AppError> {
    let full_name = validation::full_name(&req.full_name)?;
    let email = validation::email(&req.email)?;
    validation::password(&req.password)?;
    let hobbies = validation::hobbies(req.hobbies.as_deref().unwrap_or_default())?;
    let image = req.image.as_deref().map(validation::image_url).transpose()?;

    if find_by_email(&app_state.db, &email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User with email {} already exists",
            email
        )));
    }

    let password_hash =
        hash_password(&req.password, app_state.config.effective_bcrypt_cost()).await?;
    let code = numeric_code(CODE_LENGTH);
    let now = Utc::now();

    let new_user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name_search: Set(users::search_key(&full_name)),
        full_name: Set(full_name),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        hobbies: Set(Value::from(hobbies)),
        image: Set(image),
        verification_code: Set(Some(code.clone())),
        inactive_since: Set(Some(now)),
        reset_code: Set(None),
        reset_code_expires_at: Set(None),
        followers_count: Set(0),
        following_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let txn = app_state.db.begin().await?;
    let user = new_user.insert(&txn).await.map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict(format!("User with email {} already exists", email))
        }
        other => other,
    })?;

    let mail = OutgoingMail::verification(&app_state.config.effective_mail_from(), &user.email, &code);
    if let Err(e) = app_state.mailer.send(&mail).await {
        log::error!("Signup of {} aborted, verification mail failed: {}", user.email, e);
        txn.rollback().await?;
        return Err(e);
    }
    txn.commit().await?;

    log::info!("User {} signed up", user.id);
    Ok(user)
}

/// Checks credentials and issues a token. Inactive users get a token too so
/// they can reach the verification endpoint.
pub async fn authenticate(
    app_state: &AppState,
    email: &str,
    password: &str,
) -> Result<(users::Model, String), AppError> {
    let email = validation::email(email)?;
    if password.is_empty() {
        return Err(AppError::Validation("Password is required!".to_string()));
    }

    let user = find_by_email(&app_state.db, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

    if !verify_password(password, &user.password_hash).await? {
        log::debug!("Wrong password for user {}", user.id);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let token = app_state.tokens.issue(user.id)?;
    Ok((user, token))
}

/// Activates the account when `code` matches the pending verification code.
pub async fn verify_account(
    app_state: &AppState,
    user: users::Model,
    code: &str,
) -> Result<String, AppError> {
    let code = validation::code(code, "Verification code")?;

    if user.verification_code.as_deref() != Some(code.as_str()) {
        return Err(AppError::Unauthorized(
            "Invalid verification code".to_string(),
        ));
    }

    let mut active = user.into_active_model();
    active.verification_code = Set(None);
    active.inactive_since = Set(None);
    active.updated_at = Set(Utc::now());
    let user = active.update(&app_state.db).await?;

    log::info!("User {} verified", user.id);
    app_state.tokens.issue(user.id)
}

pub async fn generate_reset_code(app_state: &AppState, email: &str) -> Result<(), AppError> {
    let email = validation::email(email)?;
    let user = find_by_email(&app_state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("No user registered with this email".to_string()))?;

    let ttl_minutes = app_state.config.effective_reset_code_ttl_minutes();
    let code = numeric_code(CODE_LENGTH);
    let now = Utc::now();

    let txn = app_state.db.begin().await?;
    let mut active = user.into_active_model();
    active.reset_code = Set(Some(code.clone()));
    active.reset_code_expires_at = Set(Some(now + Duration::minutes(ttl_minutes)));
    active.updated_at = Set(now);
    let user = active.update(&txn).await?;

    let mail = OutgoingMail::password_reset(
        &app_state.config.effective_mail_from(),
        &user.email,
        &code,
        ttl_minutes,
    );
    if let Err(e) = app_state.mailer.send(&mail).await {
        txn.rollback().await?;
        return Err(e);
    }
    txn.commit().await?;

    log::info!("Reset code issued for user {}", user.id);
    Ok(())
}

pub async fn change_password(
    app_state: &AppState,
    email: &str,
    code: &str,
    password: &str,
) -> Result<(), AppError> {
    let email = validation::email(email)?;
    let code = validation::code(code, "Reset code")?;
    validation::password(password)?;

    let user = find_by_email(&app_state.db, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(BAD_RESET_CODE.to_string()))?;

    let now = Utc::now();
    let code_matches = user.reset_code.as_deref() == Some(code.as_str());
    let unexpired = user.reset_code_expires_at.is_some_and(|at| at > now);
    if !code_matches || !unexpired {
        return Err(AppError::Unauthorized(BAD_RESET_CODE.to_string()));
    }

    let password_hash =
        hash_password(password, app_state.config.effective_bcrypt_cost()).await?;
    let mut active = user.into_active_model();
    active.password_hash = Set(password_hash);
    active.reset_code = Set(None);
    active.reset_code_expires_at = Set(None);
    active.updated_at = Set(now);
    let user = active.update(&app_state.db).await?;

    log::info!("Password changed for user {}", user.id);
    Ok(())
}

/// Only the whitelisted profile fields may appear besides the token.
pub fn parse_changes(fields: Map<String, Value>) -> Result<UserChanges, AppError> {
    if fields
        .keys()
        .any(|key| !UserChanges::FIELDS.contains(&key.as_str()))
    {
        return Err(AppError::Validation(
            "Only password, hobbies, full name or profile image can be updated".to_string(),
        ));
    }

    let changes: UserChanges = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if changes.is_empty() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    Ok(changes)
}

pub async fn apply_changes(
    app_state: &AppState,
    user: users::Model,
    changes: UserChanges,
) -> Result<users::Model, AppError> {
    let full_name = changes
        .full_name
        .as_deref()
        .map(validation::full_name)
        .transpose()?;
    let hobbies = changes
        .hobbies
        .as_deref()
        .map(validation::hobbies)
        .transpose()?;
    let image = changes
        .image
        .as_deref()
        .map(validation::image_url)
        .transpose()?;
    if let Some(password) = changes.password.as_deref() {
        validation::password(password)?;
    }

    let mut active = user.into_active_model();
    if let Some(full_name) = full_name {
        active.full_name_search = Set(users::search_key(&full_name));
        active.full_name = Set(full_name);
    }
    if let Some(hobbies) = hobbies {
        active.hobbies = Set(Value::from(hobbies));
    }
    if let Some(image) = image {
        active.image = Set(Some(image));
    }
    if let Some(password) = changes.password.as_deref() {
        let hash = hash_password(password, app_state.config.effective_bcrypt_cost()).await?;
        active.password_hash = Set(hash);
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(&app_state.db).await?)
}

/// Case-insensitive prefix search over full names, most followed first.
pub async fn search_users(
    app_state: &AppState,
    name: &str,
    page: u64,
) -> Result<(Vec<UserSummary>, u64), AppError> {
    let pattern = format!("{}%", escape_like(&users::search_key(name)));
    let paginator = users::Entity::find()
        .filter(
            Expr::col(users::Column::FullNameSearch)
                .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
        )
        .order_by_desc(users::Column::FollowersCount)
        .order_by_asc(users::Column::FullName)
        .order_by_asc(users::Column::Id)
        .paginate(&app_state.db, app_state.config.effective_page_limit());

    let pages = paginator.num_items_and_pages().await?.number_of_pages;
    ensure_page_exists(page, pages)?;
    let found = paginator.fetch_page(page - 1).await?;

    Ok((found.into_iter().map(UserSummary::from).collect(), pages))
}

pub async fn load_profile(
    db: &DatabaseConnection,
    viewer_id: Uuid,
    target_id: Uuid,
) -> Result<ProfileView, AppError> {
    let user = users::Entity::find_by_id(target_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let is_following = if viewer_id == target_id {
        None
    } else {
        Some(
            follows::Entity::find_by_id((viewer_id, target_id))
                .one(db)
                .await?
                .is_some(),
        )
    };

    Ok(ProfileView {
        id: user.id,
        hobbies: user.hobby_list(),
        full_name: user.full_name,
        image: user.image,
        followers_count: user.followers_count,
        following_count: user.following_count,
        is_following,
    })
}

/// Adds `delta` to the follower's `following_count` and the followee's
/// `followers_count`.
async fn shift_counters<C: ConnectionTrait>(
    conn: &C,
    follower_id: Uuid,
    followee_id: Uuid,
    delta: i64,
) -> Result<(), AppError> {
    users::Entity::update_many()
        .col_expr(
            users::Column::FollowingCount,
            Expr::col(users::Column::FollowingCount).add(delta),
        )
        .filter(users::Column::Id.eq(follower_id))
        .exec(conn)
        .await?;
    users::Entity::update_many()
        .col_expr(
            users::Column::FollowersCount,
            Expr::col(users::Column::FollowersCount).add(delta),
        )
        .filter(users::Column::Id.eq(followee_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn followers_count_of<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<i64, AppError> {
    users::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .map(|u| u.followers_count)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Returns the followee's new follower count.
pub async fn follow_user(
    db: &DatabaseConnection,
    follower: &users::Model,
    followee_id: Uuid,
) -> Result<i64, AppError> {
    if follower.id == followee_id {
        return Err(AppError::Validation("You cannot follow yourself".to_string()));
    }
    if users::Entity::find_by_id(followee_id).one(db).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if follows::Entity::find_by_id((follower.id, followee_id))
        .one(db)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("You already follow this user".to_string()));
    }

    let txn = db.begin().await?;
    follows::ActiveModel {
        follower_id: Set(follower.id),
        followee_id: Set(followee_id),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict("You already follow this user".to_string()),
        other => other,
    })?;
    shift_counters(&txn, follower.id, followee_id, 1).await?;
    let followers_count = followers_count_of(&txn, followee_id).await?;
    txn.commit().await?;

    log::debug!("{} now follows {}", follower.id, followee_id);
    Ok(followers_count)
}

/// Returns the followee's new follower count.
pub async fn unfollow_user(
    db: &DatabaseConnection,
    follower: &users::Model,
    followee_id: Uuid,
) -> Result<i64, AppError> {
    if follower.id == followee_id {
        return Err(AppError::Validation("You cannot unfollow yourself".to_string()));
    }
    if users::Entity::find_by_id(followee_id).one(db).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let txn = db.begin().await?;
    let deleted = follows::Entity::delete_by_id((follower.id, followee_id))
        .exec(&txn)
        .await?;
    if deleted.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::NotFound("You are not following this user".to_string()));
    }
    shift_counters(&txn, follower.id, followee_id, -1).await?;
    let followers_count = followers_count_of(&txn, followee_id).await?;
    txn.commit().await?;

    log::debug!("{} unfollowed {}", follower.id, followee_id);
    Ok(followers_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn changes_accept_whitelisted_fields() {
        let changes = parse_changes(object(json!({
            "fullName": "Jane Doe",
            "hobbies": ["chess"]
        })))
        .unwrap();
        assert_eq!(changes.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(changes.hobbies, Some(vec!["chess".to_string()]));
        assert!(changes.password.is_none());
    }

    #[test]
    fn changes_reject_other_fields() {
        let err = parse_changes(object(json!({ "email": "x@y.io" }))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only password, hobbies, full name or profile image can be updated"
        );
    }

    #[test]
    fn changes_reject_empty_and_mistyped() {
        assert_eq!(
            parse_changes(Map::new()).unwrap_err().to_string(),
            "Nothing to update"
        );
        assert!(matches!(
            parse_changes(object(json!({ "hobbies": "chess" }))),
            Err(AppError::Validation(_))
        ));
    }
}
