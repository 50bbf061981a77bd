//! crates/portal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the portal.
//! These structs are independent of any database or web framework.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A registered patient account.
#[derive(Debug, Clone)]
pub struct Patient {
    pub id: i64,
    pub username: String,
    /// Opaque PHC-format digest. Only ever fed back into the verifier.
    pub password_hash: String,
    pub email: String,
}

/// A doctor as published by the remote directory service.
///
/// The shape is owned by that service; unknown fields are ignored so schema
/// drift on their side does not break the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// A message addressed to a patient, created when the doctor service pushes
/// a report back to the portal.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub date: DateTime<Utc>,
    pub report: String,
}

/// Represents a browser session row (opaque cookie token on the wire).
///
/// `patient_id` is None while the visitor is anonymous; a failed login can
/// park a flash message in an unbound session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub patient_id: Option<i64>,
    pub flash_message: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// True iff the session is bound to an authenticated patient.
    pub fn is_logged_in(&self) -> bool {
        self.patient_id.is_some()
    }
}

/// An uploaded report on its way to the doctor service. Never persisted
/// locally; forwarded and discarded.
#[derive(Debug, Clone)]
pub struct OutboundReport {
    pub doctor_id: i64,
    pub patient_name: String,
    pub date: DateTime<Utc>,
    pub file_name: String,
    pub content: Bytes,
}
