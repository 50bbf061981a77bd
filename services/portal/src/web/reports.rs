//! services/portal/src/web/reports.rs
//!
//! The report submission pipeline (patient → doctor service) and the inbound
//! receiver (doctor service → patient notification).

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::web::middleware::AuthenticatedPatient;
use crate::web::state::AppState;
use crate::web::{views, PageError};
use portal_core::domain::OutboundReport;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize)]
pub struct SendReportParams {
    pub doctor_id: Option<i64>,
}

/// Inbound payload pushed by the doctor service. `id` is the patient id;
/// `doctor_id` is optional to stay compatible with the established two-field
/// contract.
#[derive(Deserialize)]
pub struct ReceiveReportRequest {
    pub id: i64,
    pub report: String,
    #[serde(default)]
    pub doctor_id: Option<i64>,
}

#[derive(Serialize)]
pub struct ReceiveReportResponse {
    pub message: String,
}

/// JSON error body for the service-to-service receiver.
#[derive(Serialize)]
pub struct ReceiveReportError {
    pub error: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /send-report - Render the upload form, prefilled from `?doctor_id=`.
pub async fn send_report_page(Query(params): Query<SendReportParams>) -> impl IntoResponse {
    Html(views::send_report_page(params.doctor_id))
}

/// POST /send-report - Forward an uploaded report to the doctor service.
///
/// The file is never persisted locally: it goes out as a multipart POST with
/// the doctor id, the patient's display name, and a server-clock timestamp.
/// Success redirects to the dashboard; a remote failure is an explicit error
/// page, not a silent retry.
pub async fn send_report(
    State(state): State<Arc<AppState>>,
    Extension(patient): Extension<AuthenticatedPatient>,
    mut multipart: Multipart,
) -> Result<Response, PageError> {
    let mut doctor_id: Option<i64> = None;
    let mut file: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PageError::bad_request(format!("Failed to read upload: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("doctor_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| PageError::bad_request(format!("Failed to read upload: {}", e)))?;
                let parsed = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| PageError::bad_request("doctor_id must be a number"))?;
                doctor_id = Some(parsed);
            }
            Some("report") => {
                let file_name = field.file_name().unwrap_or("report").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| PageError::bad_request(format!("Failed to read upload: {}", e)))?;
                file = Some((file_name, content));
            }
            _ => {}
        }
    }

    let doctor_id = doctor_id.ok_or_else(|| PageError::bad_request("doctor_id is required"))?;
    let (file_name, content) =
        file.ok_or_else(|| PageError::bad_request("A report file is required"))?;

    // The session is bound, but the patient row must still exist; a dangling
    // session fails closed instead of sending a report under no name.
    let record = state
        .db
        .find_patient_by_id(patient.id)
        .await
        .map_err(|e| PageError::from_port(e, true))?
        .ok_or_else(|| PageError::new(StatusCode::NOT_FOUND, "Patient record not found", true))?;

    let report = OutboundReport {
        doctor_id,
        patient_name: record.username,
        date: Utc::now(),
        file_name,
        content,
    };

    state
        .doctors
        .send_report(&report)
        .await
        .map_err(|e| PageError::from_port(e, true))?;

    info!(
        "Forwarded report from '{}' to doctor {}",
        report.patient_name, report.doctor_id
    );
    Ok(Redirect::to("/dashboard").into_response())
}

/// POST /receive_report - Accept a report pushed back by the doctor service
/// and record it as a notification for the patient.
pub async fn receive_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReceiveReportRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ReceiveReportError>)> {
    fn reject(status: StatusCode, error: String) -> (StatusCode, Json<ReceiveReportError>) {
        (status, Json(ReceiveReportError { error }))
    }

    let patient = state.db.find_patient_by_id(req.id).await.map_err(|e| {
        error!("Failed to look up patient {}: {}", req.id, e);
        reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to receive report".to_string(),
        )
    })?;

    let Some(patient) = patient else {
        return Err(reject(
            StatusCode::NOT_FOUND,
            format!("Patient {} not found", req.id),
        ));
    };

    state
        .db
        .create_notification(patient.id, req.doctor_id, Utc::now(), &req.report)
        .await
        .map_err(|e| {
            error!("Failed to store notification for patient {}: {}", patient.id, e);
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to receive report".to_string(),
            )
        })?;

    info!("Stored inbound report for patient {}", patient.id);
    Ok(Json(ReceiveReportResponse {
        message: "Report received successfully".to_string(),
    }))
}
