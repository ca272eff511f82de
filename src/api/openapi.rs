use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::{health, helpers::SuccessResponse, posts, users};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        users::signup,
        users::signin,
        users::verify,
        users::forget,
        users::update,
        users::search,
        users::get_own_profile,
        users::get_profile_by_id,
        users::follow,
        users::unfollow,
        // Posts
        posts::create_post,
        posts::list_user_posts,
        // Health
        health::health,
    ),
    components(
        schemas(
            SuccessResponse,
            users::SignupRequest,
            users::SigninRequest,
            users::VerifyRequest,
            users::ForgetRequest,
            users::UserChanges,
            users::SigninResponse,
            users::TokenResponse,
            users::UserSummary,
            users::SearchResponse,
            users::ProfileView,
            users::ProfileResponse,
            users::FollowResponse,
            posts::CreatePostRequest,
            posts::PostView,
            posts::PostResponse,
            posts::PostListResponse,
            health::HealthResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Users", description = "Signup, verification, password recovery, profiles and search"),
        (name = "Posts", description = "User posts"),
        (name = "Health", description = "Liveness of the service and its database")
    )
)]
pub struct ApiDoc;
