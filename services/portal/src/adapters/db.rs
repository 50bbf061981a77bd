//! services/portal/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `PortalDatabase` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::domain::{Notification, Patient, Session};
use portal_core::ports::{PortError, PortResult, PortalDatabase};
use sqlx::error::ErrorKind;
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `PortalDatabase` port.
#[derive(Clone)]
pub struct PgPortalDatabase {
    pool: PgPool,
}

impl PgPortalDatabase {
    /// Creates a new `PgPortalDatabase`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a sqlx error to the port taxonomy, keying off the driver's
/// constraint-violation kinds.
fn map_db_error(e: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.kind() {
            ErrorKind::UniqueViolation => {
                return PortError::Conflict("already exists".to_string())
            }
            ErrorKind::ForeignKeyViolation => {
                return PortError::NotFound("referenced row does not exist".to_string())
            }
            _ => {}
        }
    }
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct PatientRecord {
    id: i64,
    username: String,
    password_hash: String,
    email: String,
}
impl PatientRecord {
    fn to_domain(self) -> Patient {
        Patient {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: i64,
    patient_id: i64,
    doctor_id: Option<i64>,
    date: DateTime<Utc>,
    report: String,
}
impl NotificationRecord {
    fn to_domain(self) -> Notification {
        Notification {
            id: self.id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            date: self.date,
            report: self.report,
        }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    patient_id: Option<i64>,
    flash_message: Option<String>,
    expires_at: DateTime<Utc>,
}
impl SessionRecord {
    fn to_domain(self) -> Session {
        Session {
            id: self.id,
            patient_id: self.patient_id,
            flash_message: self.flash_message,
            expires_at: self.expires_at,
        }
    }
}

//=========================================================================================
// `PortalDatabase` Trait Implementation
//=========================================================================================

#[async_trait]
impl PortalDatabase for PgPortalDatabase {
    async fn create_patient(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> PortResult<Patient> {
        let record = sqlx::query_as::<_, PatientRecord>(
            "INSERT INTO patients (username, password_hash, email) \
             VALUES ($1, $2, $3) \
             RETURNING id, username, password_hash, email",
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_db_error(e) {
            PortError::Conflict(_) => {
                PortError::Conflict(format!("Username '{}' is already taken", username))
            }
            other => other,
        })?;
        Ok(record.to_domain())
    }

    async fn find_patient_by_username(&self, username: &str) -> PortResult<Option<Patient>> {
        let record = sqlx::query_as::<_, PatientRecord>(
            "SELECT id, username, password_hash, email FROM patients WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(PatientRecord::to_domain))
    }

    async fn find_patient_by_id(&self, id: i64) -> PortResult<Option<Patient>> {
        let record = sqlx::query_as::<_, PatientRecord>(
            "SELECT id, username, password_hash, email FROM patients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(PatientRecord::to_domain))
    }

    async fn create_notification(
        &self,
        patient_id: i64,
        doctor_id: Option<i64>,
        date: DateTime<Utc>,
        report: &str,
    ) -> PortResult<Notification> {
        let record = sqlx::query_as::<_, NotificationRecord>(
            "INSERT INTO notifications (patient_id, doctor_id, date, report) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, patient_id, doctor_id, date, report",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(date)
        .bind(report)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_db_error(e) {
            PortError::NotFound(_) => {
                PortError::NotFound(format!("Patient {} not found", patient_id))
            }
            other => other,
        })?;
        Ok(record.to_domain())
    }

    async fn list_notifications_for_patient(
        &self,
        patient_id: i64,
    ) -> PortResult<Vec<Notification>> {
        let records = sqlx::query_as::<_, NotificationRecord>(
            "SELECT id, patient_id, doctor_id, date, report \
             FROM notifications WHERE patient_id = $1 ORDER BY id ASC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(NotificationRecord::to_domain).collect())
    }

    async fn create_session(
        &self,
        session_id: &str,
        patient_id: Option<i64>,
        expires_at: DateTime<Utc>,
    ) -> PortResult<Session> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "INSERT INTO sessions (id, patient_id, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING id, patient_id, flash_message, expires_at",
        )
        .bind(session_id)
        .bind(patient_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.to_domain())
    }

    async fn get_session(&self, session_id: &str) -> PortResult<Option<Session>> {
        // An expired row is dropped on first touch instead of lingering.
        sqlx::query("DELETE FROM sessions WHERE id = $1 AND expires_at <= NOW()")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, patient_id, flash_message, expires_at \
             FROM sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(SessionRecord::to_domain))
    }

    async fn delete_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn set_flash(&self, session_id: &str, message: &str) -> PortResult<()> {
        sqlx::query("UPDATE sessions SET flash_message = $1 WHERE id = $2")
            .bind(message)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn take_flash(&self, session_id: &str) -> PortResult<Option<String>> {
        // Read-and-clear in one statement so the flash shows at most once.
        // The self-join makes RETURNING yield the pre-update value.
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "UPDATE sessions AS cur SET flash_message = NULL \
             FROM sessions AS prev \
             WHERE cur.id = $1 AND prev.id = cur.id \
             RETURNING prev.flash_message",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.and_then(|(flash,)| flash))
    }
}
