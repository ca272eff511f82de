#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{StatusCode, header},
    test,
};
use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::EntityTrait;
use serde_json::{Value, json};
use uuid::Uuid;

use userhub::api::users::{SignupRequest, functions};
use userhub::app_state::AppState;
use userhub::config::{Config, DatabaseSettings};
use userhub::database::{self, models::users, schema};
use userhub::services::mailer::MemoryMailer;

pub const PASSWORD: &str = "secret123";

lazy_static! {
    static ref CODE_IN_MAIL: Regex = Regex::new(r"\b(\d{4})\b").unwrap();
}

pub struct TestContext {
    pub state: AppState,
    pub mailer: Arc<MemoryMailer>,
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: "integration-test-secret".to_string(),
        bcrypt_cost: Some(4),
        page_limit: Some(2),
        max_post_length: Some(20),
        ..Config::default()
    }
}

impl TestContext {
    pub async fn new() -> Self {
        let settings = DatabaseSettings::single_connection("sqlite::memory:");
        let db = database::connect_with_settings(&settings).await.unwrap();
        schema::create_tables(&db).await.unwrap();

        let mailer = Arc::new(MemoryMailer::default());
        let state = AppState::with_mailer(db, test_config(), mailer.clone());
        Self { state, mailer }
    }

    /// The last 4-digit code mailed to `email`.
    pub fn last_code(&self, email: &str) -> String {
        let mail = self
            .mailer
            .last_to(email)
            .unwrap_or_else(|| panic!("no mail sent to {}", email));
        CODE_IN_MAIL
            .captures(&mail.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| panic!("no code in mail: {}", mail.text))
    }

    pub async fn user(&self, id: Uuid) -> users::Model {
        users::Entity::find_by_id(id)
            .one(&self.state.db)
            .await
            .unwrap()
            .unwrap()
    }

    /// A verified account created through the service layer: its token and id.
    pub async fn verified_user(&self, full_name: &str, email: &str) -> (String, Uuid) {
        let user = functions::register_user(
            &self.state,
            SignupRequest {
                full_name: full_name.to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                hobbies: None,
                image: None,
            },
        )
        .await
        .unwrap();
        let id = user.id;
        let code = self.last_code(&user.email);
        let token = functions::verify_account(&self.state, user, &code)
            .await
            .unwrap();
        (token, id)
    }
}

/// A code guaranteed to differ from `code`.
pub fn other_code(code: &str) -> &'static str {
    if code == "0000" { "1111" } else { "0000" }
}

/// Calls the app and returns the status with the JSON body (`Null` when empty).
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn signup_request(full_name: &str, email: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/users/signup")
        .set_json(json!({
            "fullName": full_name,
            "email": email,
            "password": PASSWORD,
        }))
}

pub fn signin_request(email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/users/signin")
        .set_json(json!({ "email": email, "password": password }))
}

pub fn authed_get(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).insert_header(bearer(token))
}
