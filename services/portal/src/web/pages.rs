//! services/portal/src/web/pages.rs
//!
//! Handlers for the plain page routes: home, dashboard, profile.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Extension,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::auth::logged_in_flag;
use crate::web::middleware::AuthenticatedPatient;
use crate::web::state::AppState;
use crate::web::{views, PageError};

/// GET / - Landing page, visible to everyone.
pub async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let logged_in = logged_in_flag(&state, &headers).await;
    Html(views::home_page(logged_in))
}

/// GET /dashboard - Doctors to send reports to, plus the patient's
/// notifications.
///
/// The doctor directory degrades to an empty list when the remote service is
/// down; the dashboard must still render.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(patient): Extension<AuthenticatedPatient>,
) -> Result<impl IntoResponse, PageError> {
    let doctors = match state.doctors.list_doctors().await {
        Ok(doctors) => doctors,
        Err(e) => {
            warn!("Doctor directory unavailable, rendering empty list: {}", e);
            Vec::new()
        }
    };

    let notifications = state
        .db
        .list_notifications_for_patient(patient.id)
        .await
        .map_err(|e| PageError::from_port(e, true))?;

    Ok(Html(views::dashboard_page(&doctors, &notifications)))
}

/// GET /profile - The patient's own account details.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(patient): Extension<AuthenticatedPatient>,
) -> Result<impl IntoResponse, PageError> {
    // A bound session referencing a missing patient fails closed.
    let record = state
        .db
        .find_patient_by_id(patient.id)
        .await
        .map_err(|e| PageError::from_port(e, true))?
        .ok_or_else(|| {
            PageError::new(StatusCode::NOT_FOUND, "Patient record not found", true)
        })?;

    Ok(Html(views::profile_page(&record)))
}
