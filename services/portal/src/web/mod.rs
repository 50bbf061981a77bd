pub mod auth;
pub mod middleware;
pub mod pages;
pub mod reports;
pub mod router;
pub mod session;
pub mod state;
pub mod views;

pub use middleware::require_auth;
pub use router::build_router;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use portal_core::ports::PortError;
use tracing::error;

/// An error surfaced at the route boundary as a rendered error page.
///
/// Auth and validation problems become user feedback upstream of this type;
/// whatever reaches it becomes an explicit error page instead of a crash.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: String,
    logged_in: bool,
}

impl PageError {
    pub fn new(status: StatusCode, message: impl Into<String>, logged_in: bool) -> Self {
        Self {
            status,
            message: message.into(),
            logged_in,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, true)
    }

    /// Maps a port error to the page shown to the user. Internal detail is
    /// logged, not rendered.
    pub fn from_port(e: PortError, logged_in: bool) -> Self {
        match e {
            PortError::NotFound(what) => Self::new(StatusCode::NOT_FOUND, what, logged_in),
            PortError::Conflict(what) => Self::new(StatusCode::CONFLICT, what, logged_in),
            PortError::RemoteUnavailable(detail) => {
                error!("Remote service unavailable: {}", detail);
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "The doctor service is currently unavailable. Please try again later.",
                    logged_in,
                )
            }
            PortError::Unexpected(detail) => {
                error!("Unexpected error at route boundary: {}", detail);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.",
                    logged_in,
                )
            }
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (
            self.status,
            Html(views::error_page(self.logged_in, &self.message)),
        )
            .into_response()
    }
}
