//! services/portal/src/web/auth.rs
//!
//! Signup, login, and logout handlers, plus the one-shot flash message flow
//! around failed logins.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::password::{hash_password, verify_password};
use crate::web::session::{
    clear_session_cookie, load_session, new_session_id, session_cookie, session_expiry,
    session_id_from_headers,
};
use crate::web::state::AppState;
use crate::web::{views, PageError};
use portal_core::ports::PortError;

//=========================================================================================
// Form Types
//=========================================================================================

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /signup - Render the signup form.
pub async fn signup_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, PageError> {
    let logged_in = logged_in_flag(&state, &headers).await;
    Ok(Html(views::signup_page(logged_in, None)))
}

/// POST /signup - Create a patient account.
///
/// A duplicate username re-renders the form with a visible error; success
/// redirects to the login page (303, so a refresh does not re-submit).
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Html(views::signup_page(false, Some("Username and password are required"))),
        )
            .into_response());
    }

    let password_hash =
        hash_password(&form.password).map_err(|e| PageError::from_port(e, false))?;

    match state
        .db
        .create_patient(form.username.trim(), &password_hash, &form.email)
        .await
    {
        Ok(patient) => {
            info!("Created patient account '{}'", patient.username);
            Ok(Redirect::to("/login").into_response())
        }
        Err(PortError::Conflict(message)) => Ok((
            StatusCode::CONFLICT,
            Html(views::signup_page(false, Some(&message))),
        )
            .into_response()),
        Err(e) => Err(PageError::from_port(e, false)),
    }
}

/// GET /login - Render the login form, consuming any pending flash message.
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, PageError> {
    let session = load_session(state.db.as_ref(), &headers)
        .await
        .map_err(|e| PageError::from_port(e, false))?;

    let (logged_in, flash) = match session {
        Some(session) => {
            let flash = state
                .db
                .take_flash(&session.id)
                .await
                .map_err(|e| PageError::from_port(e, false))?;
            (session.is_logged_in(), flash)
        }
        None => (false, None),
    };

    Ok(Html(views::login_page(logged_in, flash.as_deref())))
}

/// POST /login - Verify credentials and establish a session.
///
/// A bad username or password sets a flash message and redirects back to the
/// login form; success mints a fresh session bound to the patient.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let patient = state
        .db
        .find_patient_by_username(&form.username)
        .await
        .map_err(|e| PageError::from_port(e, false))?;

    let patient = match patient {
        Some(p) if verify_password(&form.password, &p.password_hash) => p,
        _ => {
            warn!("Failed login attempt for '{}'", form.username);
            return failed_login(&state, &headers).await;
        }
    };

    // Mint a fresh token on every login; never re-bind a token that was
    // handed out while anonymous.
    if let Some(old_id) = session_id_from_headers(&headers) {
        state
            .db
            .delete_session(&old_id)
            .await
            .map_err(|e| PageError::from_port(e, false))?;
    }

    let session_id = new_session_id();
    let ttl_days = state.config.session_ttl_days;
    state
        .db
        .create_session(&session_id, Some(patient.id), session_expiry(ttl_days))
        .await
        .map_err(|e| PageError::from_port(e, false))?;

    info!("Patient '{}' logged in", patient.username);
    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/dashboard".to_string()),
            (header::SET_COOKIE, session_cookie(&session_id, ttl_days)),
        ],
    )
        .into_response())
}

/// GET /logout - Destroy the session and clear the cookie. Idempotent.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    if let Some(session_id) = session_id_from_headers(&headers) {
        state
            .db
            .delete_session(&session_id)
            .await
            .map_err(|e| PageError::from_port(e, false))?;
    }

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/login".to_string()),
            (header::SET_COOKIE, clear_session_cookie()),
        ],
    )
        .into_response())
}

//=========================================================================================
// Helpers
//=========================================================================================

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Stores the bad-credentials flash and redirects back to the login form.
///
/// The visitor may not have a session yet; in that case an anonymous session
/// is created just to carry the flash.
async fn failed_login(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Response, PageError> {
    let existing = load_session(state.db.as_ref(), headers)
        .await
        .map_err(|e| PageError::from_port(e, false))?;

    if let Some(session) = existing {
        state
            .db
            .set_flash(&session.id, BAD_CREDENTIALS)
            .await
            .map_err(|e| PageError::from_port(e, false))?;
        return Ok(Redirect::to("/login").into_response());
    }

    let session_id = new_session_id();
    let ttl_days = state.config.session_ttl_days;
    state
        .db
        .create_session(&session_id, None, session_expiry(ttl_days))
        .await
        .map_err(|e| PageError::from_port(e, false))?;
    state
        .db
        .set_flash(&session_id, BAD_CREDENTIALS)
        .await
        .map_err(|e| PageError::from_port(e, false))?;

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/login".to_string()),
            (header::SET_COOKIE, session_cookie(&session_id, ttl_days)),
        ],
    )
        .into_response())
}

/// Resolves the logged-in flag for public pages. Session problems on a page
/// that works either way read as "not logged in".
pub(crate) async fn logged_in_flag(state: &Arc<AppState>, headers: &HeaderMap) -> bool {
    match load_session(state.db.as_ref(), headers).await {
        Ok(session) => session.map(|s| s.is_logged_in()).unwrap_or(false),
        Err(e) => {
            warn!("Failed to load session for public page: {}", e);
            false
        }
    }
}
