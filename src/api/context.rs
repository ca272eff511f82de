use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures_util::future::LocalBoxFuture;
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    api::validation,
    app_state::AppState,
    database::models::users,
    errors::AppError,
};

/// Whether an unverified account may pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveCheck {
    Require,
    Skip,
}

/// The caller resolved from `Authorization: Bearer <token>`. Only active
/// accounts get through.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: users::Model,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let app_state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| {
                    log::error!("AppState is not registered on the app");
                    AppError::Internal
                })?;
            let token = bearer_token(&req)?;
            let user = resolve_token_user(&token, app_state.get_ref(), ActiveCheck::Require).await?;
            Ok(AuthUser { user })
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing `Authorization` header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Expected a bearer token".to_string()))?;

    Ok(token.to_string())
}

/// Loads the user a token was issued for.
pub async fn resolve_token_user(
    token: &str,
    app_state: &AppState,
    check: ActiveCheck,
) -> Result<users::Model, AppError> {
    let token = validation::token(token)?;
    let user_id = app_state.tokens.verify(token)?;

    let user = users::Entity::find_by_id(user_id)
        .one(&app_state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if check == ActiveCheck::Require && !user.is_active() {
        return Err(AppError::Forbidden("User is not active".to_string()));
    }

    Ok(user)
}
