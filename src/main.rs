use actix_cors::Cors;
use actix_web::{HttpServer, middleware};
use dotenvy::dotenv;
use std::io;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use userhub::api::{self, openapi::ApiDoc};
use userhub::app_state::AppState;
use userhub::config::{Config, DatabaseSettings};
use userhub::database;

fn cors(config: &Config) -> Cors {
    match &config.cors_allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        None => Cors::permissive(),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid configuration: {}", e)))?;

    let settings = DatabaseSettings::default_from_url(config.database_url.clone());
    let db = database::connect_with_settings(&settings).await?;

    if config.should_auto_migrate() {
        database::schema::create_tables(&db)
            .await
            .map_err(|e| io::Error::other(format!("Schema bootstrap failed: {}", e)))?;
    }

    let app_state = AppState::new(db, config.clone())
        .map_err(|e| io::Error::other(format!("Failed to build application state: {}", e)))?;

    let host = config.host.clone();
    let port = config.port;
    let workers = config.effective_workers();

    log::info!("Starting server at http://{}:{} with {} workers", host, port, workers);
    log::info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        api::build_app(app_state.clone())
            .wrap(cors(&config))
            .wrap(middleware::Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
