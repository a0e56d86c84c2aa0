use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::{
    handlers::auth::{session_token, set_session_cookie},
    services::access::Access,
    state::AppState,
};

/// Where callers without a session are sent.
pub const ENTRY_POINT: &str = "/";

/// A middleware that requires an authenticated session.
///
/// Allowed requests get their session renewed and attached as an extension;
/// everyone else is redirected to the entry point without reaching the handler.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking authentication...");

    let Some(token) = session_token(&state, &cookies) else {
        tracing::debug!("❌ No valid session cookie");
        return Redirect::to(ENTRY_POINT).into_response();
    };

    match state.auth.check_access(&token).await {
        Ok(Access::Allow(session)) => {
            tracing::debug!("✅ Access granted for: {}", session.email);
            set_session_cookie(&state, &cookies, &session);
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Ok(Access::Deny) => {
            tracing::debug!("❌ Session absent or expired");
            Redirect::to(ENTRY_POINT).into_response()
        }
        Err(e) => e.into_response(),
    }
}
