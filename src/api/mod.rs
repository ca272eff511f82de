pub mod context;
pub mod health;
pub mod helpers;
pub mod middleware;
pub mod openapi;
pub mod posts;
pub mod users;
pub mod validation;

use actix_web::{
    App,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web,
};

use crate::app_state::AppState;

/// Registers every resource under the `/api` scope.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(users::init_routes)
            .configure(posts::init_routes)
            .configure(health::init_routes),
    );
}

/// The application with state, extractor configs and request-id tagging.
/// Server-only layers (logging, CORS, Swagger UI) are added by `main`.
pub fn build_app(
    app_state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let max_body_bytes = app_state.config.effective_max_body_bytes();
    App::new()
        .wrap(middleware::RequestId)
        .app_data(web::Data::new(app_state))
        .app_data(helpers::json_config(max_body_bytes))
        .app_data(helpers::query_config())
        .app_data(helpers::path_config())
        .configure(init_routes)
}
