mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;
use userhub::api::build_app;

use common::{PASSWORD, TestContext, authed_get, other_code, send, signin_request, signup_request};

#[actix_web::test]
async fn signup_verify_signin() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let (status, body) = send(&app, signup_request("Jane Doe", "Jane@Example.com").to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isSuccess"], true);
    assert_eq!(ctx.mailer.sent().len(), 1);

    // unverified accounts can sign in but not use protected routes
    let (status, body) = send(&app, signin_request("jane@example.com", PASSWORD).to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isActiveUser"], false);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, authed_get("/api/users/search?name=ja", &token).to_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User is not active");

    let code = ctx.last_code("jane@example.com");
    let req = test::TestRequest::post()
        .uri("/api/users/verify")
        .set_json(json!({ "token": token, "verificationCode": other_code(&code) }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid verification code");

    let req = test::TestRequest::post()
        .uri("/api/users/verify")
        .set_json(json!({ "token": token, "verificationCode": code }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    let (status, body) = send(&app, signin_request("jane@example.com", PASSWORD).to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isActiveUser"], true);

    // the code is single use
    let req = test::TestRequest::post()
        .uri("/api/users/verify")
        .set_json(json!({ "token": token, "verificationCode": code }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn duplicate_email_is_a_conflict() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let (status, _) = send(&app, signup_request("Jane Doe", "jane@example.com").to_request()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, signup_request("Other Jane", "JANE@example.com").to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["isSuccess"], false);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["error"], "User with email jane@example.com already exists");
}

#[actix_web::test]
async fn signup_rejects_bad_input() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let (status, body) = send(&app, signup_request("Jane Doe", "not-an-email").to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "Invalid email address");

    let req = test::TestRequest::post()
        .uri("/api/users/signup")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"fullName\": ")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    assert!(ctx.mailer.sent().is_empty());
}

#[actix_web::test]
async fn signup_is_rolled_back_when_mail_fails() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    ctx.mailer.set_failing(true);
    let (status, body) = send(&app, signup_request("Jane Doe", "jane@example.com").to_request()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "MAIL_ERROR");

    let (status, _) = send(&app, signin_request("jane@example.com", PASSWORD).to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.mailer.set_failing(false);
    let (status, _) = send(&app, signup_request("Jane Doe", "jane@example.com").to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn signin_rejects_bad_credentials() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;
    ctx.verified_user("Jane Doe", "jane@example.com").await;

    let (status, body) = send(&app, signin_request("jane@example.com", "wrongpass1").to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Email or password incorrect");

    let (status, body) = send(&app, signin_request("nobody@example.com", PASSWORD).to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Email or password incorrect");
}

#[actix_web::test]
async fn protected_routes_need_a_valid_bearer_token() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/users/profile").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = send(&app, authed_get("/api/users/profile", "garbage").to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[actix_web::test]
async fn update_changes_whitelisted_fields_only() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;
    let (token, _) = ctx.verified_user("Jane Doe", "jane@example.com").await;

    let patch = |body: serde_json::Value| {
        test::TestRequest::patch()
            .uri("/api/users/update")
            .set_json(body)
            .to_request()
    };

    let (status, body) = send(&app, patch(json!({ "token": token, "email": "x@y.io" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Only password, hobbies, full name or profile image can be updated"
    );

    let (status, body) = send(&app, patch(json!({ "token": token }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nothing to update");

    let (status, _) = send(
        &app,
        patch(json!({
            "token": token,
            "fullName": "Jane Smith",
            "hobbies": ["chess", "hiking"],
            "password": "newsecret9"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, authed_get("/api/users/profile", &token).to_request()).await;
    assert_eq!(body["user"]["fullName"], "Jane Smith");
    assert_eq!(body["user"]["hobbies"], json!(["chess", "hiking"]));
    assert!(body["user"].get("isFollowing").is_none());

    let (status, _) = send(&app, signin_request("jane@example.com", PASSWORD).to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, signin_request("jane@example.com", "newsecret9").to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn update_requires_an_active_account() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let (status, _) = send(&app, signup_request("Jane Doe", "jane@example.com").to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = send(&app, signin_request("jane@example.com", PASSWORD).to_request()).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri("/api/users/update")
        .set_json(json!({ "token": token, "fullName": "Jane Smith" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(body["error"], "User is not active");
}
