//! Rate limiting through the HTTP layer.

use std::time::Duration;
use serde_json::json;
use user_service::config::{RatePolicy, ServiceConfig};
use user_service::security::RATE_LIMIT_MESSAGE;

mod common;

use common::{read, TestServer, PASSWORD};

#[tokio::test]
async fn test_fourth_registration_in_a_minute_is_throttled() {
    let server = TestServer::start(ServiceConfig::default()).await;

    for name in ["user_a", "user_b", "user_c"] {
        let res = server
            .register(name, &format!("{name}@example.com"), PASSWORD)
            .await;
        assert_eq!(res.status(), 201);
    }

    let (status, body) = read(server.register("user_d", "user_d@example.com", PASSWORD).await).await;
    assert_eq!(status, 429);
    assert_eq!(body, json!({ "error": RATE_LIMIT_MESSAGE }));
    assert_eq!(server.users.count(), 3, "throttled request must not create a user");
}

#[tokio::test]
async fn test_invalid_registrations_still_count_against_quota() {
    let server = TestServer::start(ServiceConfig::default()).await;

    // Quota is spent before validation runs.
    for _ in 0..3 {
        let res = server.register("x", "not-an-email", PASSWORD).await;
        assert_eq!(res.status(), 400);
    }
    let res = server.register("valid_name", "valid@example.com", PASSWORD).await;
    assert_eq!(res.status(), 429);
    assert_eq!(server.users.count(), 0);
}

#[tokio::test]
async fn test_policies_are_independent() {
    let server = TestServer::start(ServiceConfig::default()).await;
    let (_, token) = server.signup("alice").await;

    for i in 0..2 {
        let res = server
            .register(&format!("extra_{i}"), &format!("extra_{i}@example.com"), PASSWORD)
            .await;
        assert_eq!(res.status(), 201);
    }
    assert_eq!(server.register("one_more", "one_more@example.com", PASSWORD).await.status(), 429);

    // Registration quota is exhausted; login and general traffic are not.
    assert_eq!(server.login("alice@example.com", PASSWORD).await.status(), 200);
    assert_eq!(server.get("/api/users/me", Some(&token)).await.status(), 200);
}

#[tokio::test]
async fn test_login_limit() {
    let server = TestServer::start(ServiceConfig::default()).await;
    server.signup("alice").await;

    for _ in 0..4 {
        assert_eq!(server.login("alice@example.com", "WrongPass123").await.status(), 401);
    }
    assert_eq!(server.login("alice@example.com", PASSWORD).await.status(), 200);

    let (status, body) = read(server.login("alice@example.com", PASSWORD).await).await;
    assert_eq!(status, 429);
    assert_eq!(body["error"], RATE_LIMIT_MESSAGE);
}

#[tokio::test]
async fn test_window_rolls_over() {
    let mut config = ServiceConfig::default();
    config.rate_limit.register = RatePolicy { limit: 1, window_secs: 1 };
    let server = TestServer::start(config).await;

    assert_eq!(server.register("first", "first@example.com", PASSWORD).await.status(), 201);
    assert_eq!(server.register("second", "second@example.com", PASSWORD).await.status(), 429);
    assert_eq!(server.register("second", "second@example.com", PASSWORD).await.status(), 429);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(server.register("second", "second@example.com", PASSWORD).await.status(), 201);
}

#[tokio::test]
async fn test_anonymous_requests_do_not_spend_general_quota() {
    let mut config = ServiceConfig::default();
    config.rate_limit.general = RatePolicy { limit: 2, window_secs: 60 };
    let server = TestServer::start(config).await;
    let (_, token) = server.signup("alice").await;

    for _ in 0..5 {
        assert_eq!(server.get("/api/users", None).await.status(), 401);
    }

    assert_eq!(server.get("/api/users", Some(&token)).await.status(), 200);
    assert_eq!(server.get("/api/users/me", Some(&token)).await.status(), 200);
    assert_eq!(server.get("/api/users", Some(&token)).await.status(), 429);
}

#[tokio::test]
async fn test_concurrent_burst_admits_exactly_limit() {
    let mut config = ServiceConfig::default();
    config.rate_limit.general = RatePolicy { limit: 10, window_secs: 60 };
    let server = TestServer::start(config).await;
    let (_, token) = server.signup("alice").await;

    let mut tasks = Vec::new();
    for _ in 0..30 {
        let client = server.client.clone();
        let url = server.url("/api/users/me");
        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            client.get(url).bearer_auth(token).send().await.unwrap().status().as_u16()
        }));
    }

    let mut ok = 0;
    let mut throttled = 0;
    for task in tasks {
        match task.await.unwrap() {
            200 => ok += 1,
            429 => throttled += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!((ok, throttled), (10, 20));
}
