use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::time::Duration;

use crate::{
    error::Result,
    models::session::Session,
    services::access::Access,
    state::AppState,
    validation::auth::{LoginForm, SignupForm},
};

/// The name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The response payload describing the caller's session.
#[derive(Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Builds the session cookie carrying `token`, valid for `max_age_secs`.
pub(crate) fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    if secure {
        cookie.set_secure(true);
    }
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_secs));
    cookie.set_path("/");
    cookie
}

/// Reads the session token from the signed cookie, if it verifies.
pub(crate) fn session_token(state: &AppState, cookies: &Cookies) -> Option<String> {
    cookies
        .signed(&state.cookie_key)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Hands `session` to the client, replacing any previous session cookie.
pub(crate) fn set_session_cookie(state: &AppState, cookies: &Cookies, session: &Session) {
    let max_age = state.auth.sessions().lifetime().num_seconds();
    cookies.signed(&state.cookie_key).add(session_cookie(
        session.token.clone(),
        max_age,
        state.config.secure_cookies,
    ));
}

/// Handles account creation.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupForm>,
) -> Result<Response> {
    tracing::info!("📝 Signup attempt for: {}", payload.email);

    let session = state
        .auth
        .signup(&payload.email, &payload.password, &payload.name)
        .await?;
    set_session_cookie(&state, &cookies, &session);

    let response = AuthResponse {
        success: true,
        message: "Registration successful. Welcome!".to_string(),
        name: Some(session.name),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginForm>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt for: {}", payload.email);

    let session = state.auth.login(&payload.email, &payload.password).await?;
    set_session_cookie(&state, &cookies, &session);

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        name: Some(session.name),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles user logout. Succeeds whether or not a session was present.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    if let Some(token) = session_token(&state, &cookies) {
        state.auth.logout(&token).await?;
    }

    let mut session_cookie = Cookie::new(SESSION_COOKIE, "");
    session_cookie.set_max_age(Duration::seconds(0));
    session_cookie.set_path("/");
    cookies.remove(session_cookie);

    let response = AuthResponse {
        success: true,
        message: "You are logged out.".to_string(),
        name: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Reports whether the caller holds a live session, renewing it if so.
#[axum::debug_handler]
pub async fn current_session(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    let access = match session_token(&state, &cookies) {
        Some(token) => state.auth.check_access(&token).await?,
        None => Access::Deny,
    };

    let response = match access {
        Access::Allow(session) => {
            set_session_cookie(&state, &cookies, &session);
            SessionResponse { authenticated: true, name: Some(session.name) }
        }
        Access::Deny => SessionResponse { authenticated: false, name: None },
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
