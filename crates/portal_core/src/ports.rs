//! crates/portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the portal's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! database or the doctor service's HTTP API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Doctor, Notification, OutboundReport, Patient, Session};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait PortalDatabase: Send + Sync {
    // --- Patients ---

    /// Creates a patient account. A duplicate username is a `Conflict`.
    async fn create_patient(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> PortResult<Patient>;

    async fn find_patient_by_username(&self, username: &str) -> PortResult<Option<Patient>>;

    async fn find_patient_by_id(&self, id: i64) -> PortResult<Option<Patient>>;

    // --- Notifications ---

    /// Records a notification for a patient. An unknown patient id is a
    /// `NotFound`.
    async fn create_notification(
        &self,
        patient_id: i64,
        doctor_id: Option<i64>,
        date: DateTime<Utc>,
        report: &str,
    ) -> PortResult<Notification>;

    async fn list_notifications_for_patient(&self, patient_id: i64)
        -> PortResult<Vec<Notification>>;

    // --- Browser Sessions ---

    /// Creates a session row. `patient_id` is None for an anonymous session
    /// (used to carry a flash message before login succeeds).
    async fn create_session(
        &self,
        session_id: &str,
        patient_id: Option<i64>,
        expires_at: DateTime<Utc>,
    ) -> PortResult<Session>;

    /// Loads a session by its opaque token. Expired sessions are treated as
    /// absent.
    async fn get_session(&self, session_id: &str) -> PortResult<Option<Session>>;

    /// Destroys a session. Idempotent: deleting a missing session is Ok.
    async fn delete_session(&self, session_id: &str) -> PortResult<()>;

    /// Stores a one-shot flash message, overwriting any pending one.
    async fn set_flash(&self, session_id: &str, message: &str) -> PortResult<()>;

    /// Reads and clears the pending flash message in one step.
    async fn take_flash(&self, session_id: &str) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait DoctorGateway: Send + Sync {
    /// Fetches the doctor directory from the remote service.
    ///
    /// Any transport failure, timeout, or non-2xx response surfaces as
    /// `RemoteUnavailable`; callers decide whether to degrade or fail.
    async fn list_doctors(&self) -> PortResult<Vec<Doctor>>;

    /// Forwards an uploaded report to the remote service.
    async fn send_report(&self, report: &OutboundReport) -> PortResult<()>;
}
