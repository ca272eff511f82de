use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    api::{
        context::{ActiveCheck, AuthUser, resolve_token_user},
        helpers::SuccessResponse,
        validation,
    },
    app_state::AppState,
    errors::AppError,
};

use super::functions;
use super::structures::{
    ForgetRequest, ProfileResponse, SearchQuery, SearchResponse, SigninRequest, SigninResponse,
    SignupRequest, TokenResponse, UpdateRequest, UserChanges, VerifyRequest,
};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub is_success: bool,
    pub followers_count: i64,
}

#[utoipa::path(
    post,
    path = "/api/users/signup",
    tag = "Users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification code mailed", body = SuccessResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
#[post("/signup")]
pub async fn signup(
    app_state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    functions::register_user(&app_state, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(SuccessResponse::ok()))
}

#[utoipa::path(
    post,
    path = "/api/users/signin",
    tag = "Users",
    request_body = SigninRequest,
    responses(
        (status = 201, description = "Signed in", body = SigninResponse),
        (status = 401, description = "Email or password incorrect")
    )
)]
#[post("/signin")]
pub async fn signin(
    app_state: web::Data<AppState>,
    body: web::Json<SigninRequest>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = functions::authenticate(&app_state, &body.email, &body.password).await?;
    Ok(HttpResponse::Created().json(SigninResponse {
        is_success: true,
        token,
        is_active_user: user.is_active(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/verify",
    tag = "Users",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Account activated", body = TokenResponse),
        (status = 401, description = "Invalid token or verification code")
    )
)]
#[post("/verify")]
pub async fn verify(
    app_state: web::Data<AppState>,
    body: web::Json<VerifyRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let user = resolve_token_user(&body.token, &app_state, ActiveCheck::Skip).await?;
    let token = functions::verify_account(&app_state, user, &body.verification_code).await?;
    Ok(HttpResponse::Ok().json(TokenResponse {
        is_success: true,
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/forget",
    tag = "Users",
    request_body = ForgetRequest,
    responses(
        (status = 200, description = "Operation done", body = SuccessResponse),
        (status = 400, description = "Unknown operation or invalid input"),
        (status = 401, description = "Invalid or expired reset code"),
        (status = 404, description = "No user with this email")
    )
)]
#[post("/forget")]
pub async fn forget(
    app_state: web::Data<AppState>,
    body: web::Json<ForgetRequest>,
) -> Result<HttpResponse, AppError> {
    match body.into_inner() {
        ForgetRequest::Generate { email } => {
            functions::generate_reset_code(&app_state, &email).await?
        }
        ForgetRequest::Change {
            email,
            code,
            password,
        } => functions::change_password(&app_state, &email, &code, &password).await?,
    }
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

#[utoipa::path(
    patch,
    path = "/api/users/update",
    tag = "Users",
    request_body(content = UserChanges, description = "`token` plus any of the listed fields"),
    responses(
        (status = 200, description = "Profile updated", body = SuccessResponse),
        (status = 400, description = "Invalid or forbidden field"),
        (status = 403, description = "User is not active")
    )
)]
#[patch("/update")]
pub async fn update(
    app_state: web::Data<AppState>,
    body: web::Json<UpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let UpdateRequest { token, changes } = body.into_inner();
    let user = resolve_token_user(&token, &app_state, ActiveCheck::Require).await?;
    let changes = functions::parse_changes(changes)?;
    functions::apply_changes(&app_state, user, changes).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "Users",
    params(SearchQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One page of matching users", body = SearchResponse),
        (status = 404, description = "No results found")
    )
)]
#[get("/search")]
pub async fn search(
    app_state: web::Data<AppState>,
    _auth: AuthUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let name = validation::search_name(query.name.as_deref())?;
    let page = validation::page(query.page)?;
    let (users, total_pages) = functions::search_users(&app_state, &name, page).await?;
    Ok(HttpResponse::Ok().json(SearchResponse {
        is_success: true,
        users,
        total_pages,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = ProfileResponse)
    )
)]
#[get("/profile")]
pub async fn get_own_profile(
    app_state: web::Data<AppState>,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    let user = functions::load_profile(&app_state.db, auth.id(), auth.id()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse {
        is_success: true,
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/profile/{userId}",
    tag = "Users",
    params(("userId" = String, Path, description = "User ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User profile", body = ProfileResponse),
        (status = 400, description = "Invalid user id"),
        (status = 404, description = "User not found")
    )
)]
#[get("/profile/{userId}")]
pub async fn get_profile_by_id(
    app_state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let target = validation::user_id(&path.into_inner())?;
    let user = functions::load_profile(&app_state.db, auth.id(), target).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse {
        is_success: true,
        user,
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/{userId}/follow",
    tag = "Users",
    params(("userId" = String, Path, description = "User to follow")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Now following", body = FollowResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Already following")
    )
)]
#[post("/{userId}/follow")]
pub async fn follow(
    app_state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let target = validation::user_id(&path.into_inner())?;
    let followers_count = functions::follow_user(&app_state.db, &auth.user, target).await?;
    Ok(HttpResponse::Ok().json(FollowResponse {
        is_success: true,
        followers_count,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{userId}/follow",
    tag = "Users",
    params(("userId" = String, Path, description = "User to unfollow")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "No longer following", body = FollowResponse),
        (status = 404, description = "User not found or not followed")
    )
)]
#[delete("/{userId}/follow")]
pub async fn unfollow(
    app_state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let target = validation::user_id(&path.into_inner())?;
    let followers_count = functions::unfollow_user(&app_state.db, &auth.user, target).await?;
    Ok(HttpResponse::Ok().json(FollowResponse {
        is_success: true,
        followers_count,
    }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(signup)
            .service(signin)
            .service(verify)
            .service(forget)
            .service(update)
            .service(search)
            .service(get_own_profile)
            .service(get_profile_by_id)
            .service(follow)
            .service(unfollow),
    );
}
