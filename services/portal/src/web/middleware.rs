//! services/portal/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::web::session::load_session;
use crate::web::state::AppState;

/// The authenticated patient for the current request, inserted into request
/// extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthenticatedPatient {
    pub id: i64,
    pub session_id: String,
}

/// Middleware that validates the session cookie and resolves the patient id.
///
/// A missing, expired, or unbound session redirects to the login page rather
/// than returning 401: these are browser-facing routes.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = match load_session(state.db.as_ref(), req.headers()).await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to load session: {}", e);
            return Redirect::to("/login").into_response();
        }
    };

    match session.and_then(|s| s.patient_id.map(|id| (s.id, id))) {
        Some((session_id, patient_id)) => {
            req.extensions_mut().insert(AuthenticatedPatient {
                id: patient_id,
                session_id,
            });
            next.run(req).await
        }
        None => Redirect::to("/login").into_response(),
    }
}
