use axum::{
    Router,
    routing::{get, post},
    middleware::from_fn_with_state,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Builds the application router.
///
/// Unmatched paths fall through to the static files in `public_dir`.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/members", get(handlers::members::members))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ));

    Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::current_session))
        .merge(protected_routes)
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
