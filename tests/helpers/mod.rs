//! Serve the API router on an ephemeral port for HTTP tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use job_match::app_state::AppState;
use job_match::db::InMemoryMatchStore;
use job_match::routes;
use job_match::services::auth::{AuthService, AuthenticatedUser};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PAGE_SIZE: i64 = 10;

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<InMemoryMatchStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn spawn_server() -> TestServer {
    let store = Arc::new(InMemoryMatchStore::new());
    let auth = AuthService::new(TEST_SECRET).expect("test secret is valid");
    let state = AppState::new(store.clone(), auth, TEST_PAGE_SIZE);
    let app = routes::api_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has an address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        store,
        client: reqwest::Client::new(),
    }
}

/// Bearer token the test server accepts for `user`.
pub fn token_for(user: &AuthenticatedUser) -> String {
    AuthService::new(TEST_SECRET)
        .expect("test secret is valid")
        .issue(user.id(), Duration::hours(1))
        .expect("Failed to issue test token")
}
