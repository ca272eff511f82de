mod common;

use actix_web::{http::StatusCode, test};
use userhub::api::{build_app, users::functions};
use uuid::Uuid;

use common::{TestContext, authed_get, bearer, send};

fn follow(target: &str, token: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/users/{}/follow", target))
        .insert_header(bearer(token))
}

fn unfollow(target: &str, token: &str) -> test::TestRequest {
    test::TestRequest::delete()
        .uri(&format!("/api/users/{}/follow", target))
        .insert_header(bearer(token))
}

#[actix_web::test]
async fn follow_and_unfollow_update_profiles() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;
    let (alice, alice_id) = ctx.verified_user("Alice Adams", "alice@example.com").await;
    let (bob, bob_id) = ctx.verified_user("Bob Brown", "bob@example.com").await;
    let bob_uri = format!("/api/users/profile/{}", bob_id);

    let (status, body) = send(&app, authed_get(&bob_uri, &alice).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["fullName"], "Bob Brown");
    assert_eq!(body["user"]["isFollowing"], false);
    assert_eq!(body["user"]["followersCount"], 0);

    let (status, body) = send(&app, follow(&bob_id.to_string(), &alice).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followersCount"], 1);

    let (status, body) = send(&app, follow(&bob_id.to_string(), &alice).to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You already follow this user");

    let (_, body) = send(&app, authed_get(&bob_uri, &alice).to_request()).await;
    assert_eq!(body["user"]["isFollowing"], true);
    assert_eq!(body["user"]["followersCount"], 1);

    let (_, body) = send(&app, authed_get("/api/users/profile", &alice).to_request()).await;
    assert_eq!(body["user"]["id"], alice_id.to_string());
    assert_eq!(body["user"]["followingCount"], 1);
    assert!(body["user"].get("isFollowing").is_none());

    // bob does not follow alice back
    let alice_uri = format!("/api/users/profile/{}", alice_id);
    let (_, body) = send(&app, authed_get(&alice_uri, &bob).to_request()).await;
    assert_eq!(body["user"]["isFollowing"], false);
    assert_eq!(body["user"]["followersCount"], 0);

    let (status, body) = send(&app, unfollow(&bob_id.to_string(), &alice).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followersCount"], 0);

    let (status, body) = send(&app, unfollow(&bob_id.to_string(), &alice).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "You are not following this user");

    let (_, body) = send(&app, authed_get("/api/users/profile", &alice).to_request()).await;
    assert_eq!(body["user"]["followingCount"], 0);
}

#[actix_web::test]
async fn follow_rejects_bad_targets() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;
    let (alice, alice_id) = ctx.verified_user("Alice Adams", "alice@example.com").await;

    let (status, body) = send(&app, follow(&alice_id.to_string(), &alice).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot follow yourself");

    let (status, body) = send(&app, follow(&Uuid::new_v4().to_string(), &alice).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send(&app, follow("not-a-uuid", &alice).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid user id");
}

#[actix_web::test]
async fn profile_lookup_errors() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;
    let (alice, _) = ctx.verified_user("Alice Adams", "alice@example.com").await;

    let (status, body) = send(&app, authed_get("/api/users/profile/12345", &alice).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid user id");

    let uri = format!("/api/users/profile/{}", Uuid::new_v4());
    let (status, body) = send(&app, authed_get(&uri, &alice).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn follow_reports_the_stored_follower_count() {
    let ctx = TestContext::new().await;
    let app = test::init_service(build_app(ctx.state.clone())).await;
    let (alice, _) = ctx.verified_user("Alice Adams", "alice@example.com").await;
    let (_, bob_id) = ctx.verified_user("Bob Brown", "bob@example.com").await;
    let (_, carol_id) = ctx.verified_user("Carol Clark", "carol@example.com").await;

    let carol = ctx.user(carol_id).await;
    functions::follow_user(&ctx.state.db, &carol, bob_id).await.unwrap();

    let (status, body) = send(&app, follow(&bob_id.to_string(), &alice).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followersCount"], 2);
    assert_eq!(ctx.user(bob_id).await.followers_count, 2);

    let count = functions::unfollow_user(&ctx.state.db, &carol, bob_id).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(ctx.user(bob_id).await.followers_count, 1);
}
