use std::sync::Arc;

use axum::{body::Body, http::{header, Request, Response}, Router};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use zeroize::Zeroizing;

use gatehouse::{
    clock::ManualClock,
    config::Config,
    crypto::password::{HashCost, PasswordHasher},
    repositories::memory::{MemorySessionStore, MemoryUserStore},
    routes,
    services::{auth::AuthService, session::SessionManager},
    state::AppState,
};

pub struct TestApp {
    pub router: Router,
    pub users: MemoryUserStore,
    pub sessions: MemorySessionStore,
    pub clock: ManualClock,
}

pub fn config() -> Config {
    Config {
        database_url: String::new(),
        redis_url: String::new(),
        port: 0,
        cookie_secret: Zeroizing::new(vec![7; 64]),
        session_key: Zeroizing::new(vec![9; 32]),
        hash_cost: HashCost { memory_kib: 64, iterations: 1, parallelism: 1 },
        public_dir: "tests/fixtures/public".into(),
        secure_cookies: false,
    }
}

impl TestApp {
    pub fn new() -> Self {
        let config = config();
        let users = MemoryUserStore::new();
        let sessions = MemorySessionStore::new();
        let clock = ManualClock::new(Utc::now());

        let manager = SessionManager::new(
            Arc::new(sessions.clone()),
            &config,
            Arc::new(clock.clone()),
        )
        .unwrap();
        let auth = AuthService::new(
            Arc::new(users.clone()),
            manager,
            PasswordHasher::new(config.hash_cost),
        );
        let state = AppState::from_parts(&config, auth).unwrap();

        Self { router: routes::router(state), users, sessions, clock }
    }
}

pub fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// The `session_id=...` pair from the response's Set-Cookie headers.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with("session_id="))
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .next()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
