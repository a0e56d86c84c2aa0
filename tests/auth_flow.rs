mod common;

use axum::http::{header, StatusCode};
use chrono::Duration;
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, get_request, json_request, session_cookie, TestApp};

async fn signup_alice(app: &TestApp) -> String {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({"email": "a@b.com", "password": "pw123", "name": "Alice"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie(&response).expect("signup sets a session cookie")
}

#[tokio::test]
async fn signup_grants_members_access() {
    let app = TestApp::new();
    let cookie = signup_alice(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/members", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some(), "access renews the cookie");

    let body = body_json(response).await;
    assert_eq!(body["name"], "Alice");
    let image = body["image"].as_str().unwrap();
    assert!(["/image1.jpg", "/image2.jpg", "/image3.jpg"].contains(&image));
}

#[tokio::test]
async fn anonymous_members_request_is_redirected() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/members", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn tampered_cookie_is_redirected() {
    let app = TestApp::new();
    signup_alice(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/members", Some("session_id=forged-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = TestApp::new();
    signup_alice(&app).await;

    let wrong_password = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "wrong"}),
            None,
        ))
        .await
        .unwrap();
    let unknown_email = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "ghost@b.com", "password": "pw123"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&wrong_password).is_none());
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[tokio::test]
async fn login_issues_a_fresh_session() {
    let app = TestApp::new();
    let signup_cookie = signup_alice(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@b.com", "password": "pw123"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap();
    assert_ne!(cookie, signup_cookie);
    assert_eq!(body_json(response).await["name"], "Alice");
    assert_eq!(app.sessions.session_count().await, 2);
}

#[tokio::test]
async fn malformed_login_email_is_a_validation_error() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "not-an-email", "password": "pw123"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.sessions.session_count().await, 0);
}

#[tokio::test]
async fn invalid_signup_reports_every_field() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({"email": "nope", "password": "123456789012345678901"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    assert_eq!(app.users.writes(), 0);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = TestApp::new();
    signup_alice(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({"email": "a@b.com", "password": "other", "name": "Bob"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.users.user_count().await, 1);
}

#[tokio::test]
async fn logout_revokes_access() {
    let app = TestApp::new();
    let cookie = signup_alice(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.sessions.session_count().await, 0);

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/members", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_without_session_succeeds() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", json!({}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_expires_after_an_idle_hour() {
    let app = TestApp::new();
    let cookie = signup_alice(&app).await;

    app.clock.advance(Duration::minutes(59));
    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/members", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The visit above renewed the session.
    app.clock.advance(Duration::minutes(59));
    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/members", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.clock.advance(Duration::minutes(60));
    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/members", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn current_session_reports_name() {
    let app = TestApp::new();

    let anonymous = app
        .router
        .clone()
        .oneshot(get_request("/api/auth/session", None))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::OK);
    assert_eq!(body_json(anonymous).await, json!({"authenticated": false}));

    let cookie = signup_alice(&app).await;
    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/auth/session", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        json!({"authenticated": true, "name": "Alice"})
    );
}

#[tokio::test]
async fn unmatched_paths_serve_static_files() {
    let app = TestApp::new();

    let found = app
        .router
        .clone()
        .oneshot(get_request("/robots.txt", None))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);

    let missing = app
        .router
        .clone()
        .oneshot(get_request("/nowhere", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
