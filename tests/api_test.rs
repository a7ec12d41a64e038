//! End-to-end tests for the REST API.

use serde_json::{json, Value};
use user_service::config::ServiceConfig;
use user_service::http::X_REQUEST_ID;

mod common;

use common::{read, TestServer, PASSWORD};

#[tokio::test]
async fn test_health() {
    let server = TestServer::start(ServiceConfig::default()).await;

    let res = server.get("/health", None).await;
    assert!(res.headers().contains_key(X_REQUEST_ID));
    let (status, body) = read(res).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert!(body["time"].as_str().is_some());
}

#[tokio::test]
async fn test_register_returns_token_and_profile() {
    let server = TestServer::start(ServiceConfig::default()).await;

    let (status, body) =
        read(server.register("  testuser ", " Test@Example.com", PASSWORD).await).await;
    assert_eq!(status, 201);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "testuser");
    assert_eq!(body["user"]["email"], "test@example.com");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_validation() {
    let mut config = ServiceConfig::default();
    config.rate_limit.register.limit = 100;
    let server = TestServer::start(config).await;

    let (status, body) = read(server.register("ab", "a@example.com", PASSWORD).await).await;
    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        "Username must be 3-50 characters and contain only letters, numbers, and underscores"
    );

    let (status, body) = read(server.register("valid_name", "nope", PASSWORD).await).await;
    assert_eq!((status, body["error"].as_str()), (400, Some("Invalid email format")));

    let (status, body) = read(server.register("valid_name", "a@example.com", "weakpass").await).await;
    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        "password must be at least 8 characters and contain uppercase, lowercase, and number"
    );

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = read(res).await;
    assert_eq!((status, body["error"].as_str()), (400, Some("Invalid request payload")));

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "username": "valid_name" }))
        .send()
        .await
        .unwrap();
    assert_eq!(read(res).await.0, 400);

    assert_eq!(server.users.count(), 0);
}

#[tokio::test]
async fn test_register_duplicate() {
    let server = TestServer::start(ServiceConfig::default()).await;
    server.signup("alice").await;

    let (status, body) = read(server.register("alice", "other@example.com", PASSWORD).await).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "User with this email or username already exists");

    let (status, _) = read(server.register("bob", "ALICE@example.com", PASSWORD).await).await;
    assert_eq!(status, 409);
}

#[tokio::test]
async fn test_login() {
    let server = TestServer::start(ServiceConfig::default()).await;
    let (id, _) = server.signup("alice").await;

    let (status, body) = read(server.login(" Alice@Example.com ", PASSWORD).await).await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["id"].as_u64(), Some(id));
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(server.get("/api/users/me", Some(&token)).await.status(), 200);

    let (status, body) = read(server.login("alice@example.com", "WrongPass123").await).await;
    assert_eq!((status, body["error"].as_str()), (401, Some("Invalid email or password")));

    let (status, body) = read(server.login("nobody@example.com", PASSWORD).await).await;
    assert_eq!((status, body["error"].as_str()), (401, Some("Invalid email or password")));
}

#[tokio::test]
async fn test_auth_guard() {
    let server = TestServer::start(ServiceConfig::default()).await;

    let (status, body) = read(server.get("/api/users", None).await).await;
    assert_eq!((status, body["error"].as_str()), (401, Some("Authorization header is required")));

    let res = server
        .client
        .get(server.url("/api/users"))
        .header("authorization", "Token abc")
        .send()
        .await
        .unwrap();
    let (status, body) = read(res).await;
    assert_eq!((status, body["error"].as_str()), (401, Some("Invalid authorization header format")));

    let (status, body) = read(server.get("/api/users", Some("not.a.token")).await).await;
    assert_eq!((status, body["error"].as_str()), (401, Some("Invalid token")));
}

#[tokio::test]
async fn test_list_and_get_users() {
    let server = TestServer::start(ServiceConfig::default()).await;
    let (alice, token) = server.signup("alice").await;
    let (bob, _) = server.signup("bob").await;

    let (status, body) = read(server.get("/api/users", Some(&token)).await).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);
    assert_eq!(body["users"][0]["id"].as_u64(), Some(bob));

    let (status, body) = read(server.get("/api/users/me", Some(&token)).await).await;
    assert_eq!((status, body["id"].as_u64()), (200, Some(alice)));

    let (status, body) = read(server.get(&format!("/api/users/{bob}"), Some(&token)).await).await;
    assert_eq!((status, body["username"].as_str()), (200, Some("bob")));

    for missing in ["/api/users/999", "/api/users/abc"] {
        let (status, body) = read(server.get(missing, Some(&token)).await).await;
        assert_eq!((status, body["error"].as_str()), (404, Some("User not found")));
    }
}

#[tokio::test]
async fn test_update_user() {
    let server = TestServer::start(ServiceConfig::default()).await;
    let (alice, token) = server.signup("alice").await;
    let (bob, _) = server.signup("bob").await;

    let (status, body) =
        read(server.put(&format!("/api/users/{bob}"), &token, json!({ "username": "evil" })).await).await;
    assert_eq!((status, body["error"].as_str()), (403, Some("You can only update your own profile")));

    let path = format!("/api/users/{alice}");

    let (status, body) = read(server.put(&path, &token, json!({ "username": "" })).await).await;
    assert_eq!((status, body["error"].as_str()), (400, Some("No fields to update")));

    let (status, _) = read(server.put(&path, &token, json!({ "username": "a!" })).await).await;
    assert_eq!(status, 400);

    let (status, _) = read(server.put(&path, &token, json!({ "email": "bob@example.com" })).await).await;
    assert_eq!(status, 409);

    let (status, body) = read(
        server
            .put(&path, &token, json!({ "username": "alice2", "email": "New@Example.com" }))
            .await,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["username"], "alice2");
    assert_eq!(body["email"], "new@example.com");

    assert_eq!(server.login("new@example.com", PASSWORD).await.status(), 200);
}

#[tokio::test]
async fn test_delete_user() {
    let server = TestServer::start(ServiceConfig::default()).await;
    let (alice, token) = server.signup("alice").await;
    let (bob, bob_token) = server.signup("bob").await;

    let (status, body) = read(server.delete(&format!("/api/users/{bob}"), &token).await).await;
    assert_eq!((status, body["error"].as_str()), (403, Some("You can only delete your own profile")));

    let (status, body) = read(server.delete(&format!("/api/users/{alice}"), &token).await).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "message": "User deleted successfully" }));

    // The token is still signed, but the account is gone.
    assert_eq!(server.get("/api/users/me", Some(&token)).await.status(), 404);
    assert_eq!(server.login("alice@example.com", PASSWORD).await.status(), 401);

    let (_, body) = read(server.get("/api/users", Some(&bob_token)).await).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["users"], Value::Array(vec![]));
}
