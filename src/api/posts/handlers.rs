use actix_web::{HttpResponse, get, post, web};

use crate::{
    api::{context::AuthUser, validation},
    app_state::AppState,
    errors::AppError,
};

use super::functions;
use super::structures::{CreatePostRequest, PageQuery, PostListResponse, PostResponse};

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "Posts",
    request_body = CreatePostRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid caption, image or category")
    )
)]
#[post("")]
pub async fn create_post(
    app_state: web::Data<AppState>,
    auth: AuthUser,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let post = functions::create_post(&app_state, &auth.user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(PostResponse {
        is_success: true,
        post,
    }))
}

#[utoipa::path(
    get,
    path = "/api/posts/user/{userId}",
    tag = "Posts",
    params(
        ("userId" = String, Path, description = "Author ID"),
        PageQuery
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One page of the author's posts", body = PostListResponse),
        (status = 404, description = "User not found or no results")
    )
)]
#[get("/user/{userId}")]
pub async fn list_user_posts(
    app_state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let author_id = validation::user_id(&path.into_inner())?;
    let page = validation::page(query.page)?;
    let (posts, total_pages) = functions::list_author_posts(&app_state, author_id, page).await?;
    Ok(HttpResponse::Ok().json(PostListResponse {
        is_success: true,
        posts,
        total_pages,
    }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .service(create_post)
            .service(list_user_posts),
    );
}
