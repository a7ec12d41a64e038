//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use user_service::config::ServiceConfig;
use user_service::users::UserStore;
use user_service::{HttpServer, Shutdown};

pub const PASSWORD: &str = "TestPass123";

/// A running service on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub users: Arc<UserStore>,
    pub client: Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(mut config: ServiceConfig) -> Self {
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = HttpServer::new(config);
        let users = server.state().users.clone();
        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();

        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap();

        Self {
            addr,
            users,
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await
            .expect("service unreachable")
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("service unreachable")
    }

    /// Register a user and return `(id, token)`.
    pub async fn signup(&self, username: &str) -> (u64, String) {
        let res = self
            .register(username, &format!("{username}@example.com"), PASSWORD)
            .await;
        assert_eq!(res.status(), 201, "registration of {username} failed");
        let body: Value = res.json().await.unwrap();
        (
            body["user"]["id"].as_u64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.expect("service unreachable")
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("service unreachable")
    }

    pub async fn delete(&self, path: &str, token: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("service unreachable")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Status code and JSON body of a response.
pub async fn read(res: Response) -> (u16, Value) {
    let status = res.status().as_u16();
    let body = res.json().await.unwrap_or(Value::Null);
    (status, body)
}
