//! services/portal/src/web/router.rs
//!
//! Assembles the route table: public pages, the auth-gated pages behind the
//! `require_auth` middleware, and the service-to-service inbound receiver.

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::web::middleware::require_auth;
use crate::web::state::AppState;
use crate::web::{auth, pages, reports};

/// Builds the complete portal router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/receive_report", post(reports::receive_report));

    let protected_routes = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", get(pages::profile))
        .route(
            "/send-report",
            get(reports::send_report_page).post(reports::send_report),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
