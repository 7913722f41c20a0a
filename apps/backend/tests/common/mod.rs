//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wiring the router to an in-memory store and a fixed clock
//! - Helpers for registering accounts and seeding a library over HTTP
//! - Authentication helpers

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use verse_core::{get_scheduler, FixedClock};
use verse_drip_backend::config::Config;
use verse_drip_backend::store::MemoryStore;
use verse_drip_backend::{router, AppState};

/// Monday 2024-03-04, noon UTC.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
}

/// Test context holding the in-memory store, the clock and a test server.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub server: TestServer,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(start_time()));
        let scheduler = get_scheduler("sm2").expect("sm2 scheduler");

        let state = AppState {
            store: store.clone(),
            scheduler: Arc::from(scheduler),
            clock: clock.clone(),
            config: Arc::new(Config::default()),
        };

        let server = TestServer::new(router(state)).expect("Failed to start test server");
        Self {
            store,
            clock,
            server,
        }
    }

    /// Register an account and return its ID and token.
    pub async fn register(&self) -> (Uuid, String) {
        let response = self
            .server
            .post("/api/account/register")
            .json(&fixtures::register_request(Some("test-account")))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let account_id = body["account_id"].as_str().unwrap().parse().unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (account_id, token)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    pub fn get(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .get(path)
            .add_header(AUTHORIZATION, Self::auth_header_value(token))
    }

    pub fn post(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .post(path)
            .add_header(AUTHORIZATION, Self::auth_header_value(token))
    }

    pub fn put(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .put(path)
            .add_header(AUTHORIZATION, Self::auth_header_value(token))
    }

    pub fn delete(&self, path: &str, token: &str) -> TestRequest {
        self.server
            .delete(path)
            .add_header(AUTHORIZATION, Self::auth_header_value(token))
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance_days(days);
    }

    /// Create a collection and return its ID.
    pub async fn create_collection(&self, token: &str, name: &str) -> Uuid {
        let response = self
            .post("/api/collections", token)
            .json(&fixtures::collection_request(name))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    /// Turn on drip for a collection, unlocking on every weekday.
    pub async fn enable_daily_drip(&self, token: &str, collection_id: Uuid, rate: u32) {
        self.put(&format!("/api/collections/{}/drip", collection_id), token)
            .json(&fixtures::drip_request(rate, &[0, 1, 2, 3, 4, 5, 6]))
            .await
            .assert_status_ok();
    }

    /// Add `count` passages and return the created verses in order.
    pub async fn add_verses(&self, token: &str, count: usize, collection_ids: &[Uuid]) -> Vec<Value> {
        let response = self
            .post("/api/verses", token)
            .json(&fixtures::verses_request(count, collection_ids))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["verses"].as_array().unwrap().clone()
    }

    pub async fn library(&self, token: &str) -> Value {
        let response = self.get("/api/library", token).await;
        response.assert_status_ok();
        response.json()
    }
}

/// IDs of the given verse objects.
pub fn ids(verses: &[Value]) -> Vec<Uuid> {
    verses
        .iter()
        .map(|verse| verse["id"].as_str().unwrap().parse().unwrap())
        .collect()
}

/// Look up a verse in a library response.
pub fn find_verse<'a>(library: &'a Value, id: Uuid) -> &'a Value {
    library["verses"]
        .as_array()
        .unwrap()
        .iter()
        .find(|verse| verse["id"] == id.to_string())
        .unwrap()
}

/// Look up a collection in a library response.
pub fn find_collection<'a>(library: &'a Value, id: Uuid) -> &'a Value {
    library["collections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|collection| collection["id"] == id.to_string())
        .unwrap()
}
