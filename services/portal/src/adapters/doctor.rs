//! services/portal/src/adapters/doctor.rs
//!
//! This module contains the doctor-service adapter, the concrete
//! implementation of the `DoctorGateway` port. It talks to the sibling
//! doctor service over HTTP using `reqwest`.

use async_trait::async_trait;
use portal_core::domain::{Doctor, OutboundReport};
use portal_core::ports::{DoctorGateway, PortError, PortResult};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A gateway to the remote doctor service.
///
/// Every request carries the configured timeout; the original had none, so a
/// hung doctor service would hang the portal with it.
pub struct HttpDoctorGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDoctorGateway {
    /// Creates a new gateway. `base_url` has no trailing slash.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Collapses reqwest's error zoo into the single failure mode callers care
/// about: the remote is unavailable.
fn map_remote_error(e: reqwest::Error) -> PortError {
    PortError::RemoteUnavailable(e.to_string())
}

//=========================================================================================
// `DoctorGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl DoctorGateway for HttpDoctorGateway {
    async fn list_doctors(&self) -> PortResult<Vec<Doctor>> {
        let url = format!("{}/doctors", self.base_url);
        let doctors = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(map_remote_error)?
            .json::<Vec<Doctor>>()
            .await
            .map_err(|e| {
                warn!("Doctor directory returned unparseable JSON: {}", e);
                PortError::RemoteUnavailable(e.to_string())
            })?;
        Ok(doctors)
    }

    async fn send_report(&self, report: &OutboundReport) -> PortResult<()> {
        let url = format!("{}/receive-report", self.base_url);

        let file_part = Part::bytes(report.content.to_vec())
            .file_name(report.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| PortError::Unexpected(format!("Invalid mime type: {}", e)))?;

        let form = Form::new()
            .text("doctor_id", report.doctor_id.to_string())
            .text("patient_name", report.patient_name.clone())
            .text("date", report.date.to_rfc3339())
            .part("report", file_part);

        self.client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(map_remote_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use bytes::Bytes;
    use chrono::Utc;
    use serde_json::json;

    /// Serves `app` on an ephemeral localhost port and returns its base URL.
    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn sample_report() -> OutboundReport {
        OutboundReport {
            doctor_id: 7,
            patient_name: "alice".to_string(),
            date: Utc::now(),
            file_name: "report.pdf".to_string(),
            content: Bytes::from_static(b"%PDF-1.4 scan"),
        }
    }

    #[tokio::test]
    async fn list_doctors_parses_directory_json() {
        let app = Router::new().route(
            "/doctors",
            get(|| async {
                Json(json!([
                    {"id": 1, "name": "Dr. Grey", "specialty": "Cardiology"},
                    {"id": 2, "name": "Dr. House", "office": "221B"},
                ]))
            }),
        );
        let base = spawn_server(app).await;

        let gateway = HttpDoctorGateway::new(&base, Duration::from_secs(2)).unwrap();
        let doctors = gateway.list_doctors().await.unwrap();

        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].name, "Dr. Grey");
        assert_eq!(doctors[0].specialty.as_deref(), Some("Cardiology"));
        // Unknown fields are ignored, missing specialty is None.
        assert_eq!(doctors[1].id, 2);
        assert!(doctors[1].specialty.is_none());
    }

    #[tokio::test]
    async fn list_doctors_maps_500_to_remote_unavailable() {
        let app = Router::new().route(
            "/doctors",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_server(app).await;

        let gateway = HttpDoctorGateway::new(&base, Duration::from_secs(2)).unwrap();
        let err = gateway.list_doctors().await.unwrap_err();
        assert!(matches!(err, PortError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn list_doctors_maps_connection_refused_to_remote_unavailable() {
        // Bind-then-drop guarantees nothing is listening on the port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let gateway = HttpDoctorGateway::new(&base, Duration::from_secs(2)).unwrap();
        let err = gateway.list_doctors().await.unwrap_err();
        assert!(matches!(err, PortError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn send_report_posts_expected_multipart_fields() {
        let app = Router::new().route(
            "/receive-report",
            post(|mut multipart: Multipart| async move {
                let mut fields = Vec::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    let value = field.bytes().await.unwrap();
                    fields.push((name, value));
                }
                let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                assert!(names.contains(&"doctor_id"));
                assert!(names.contains(&"patient_name"));
                assert!(names.contains(&"date"));
                assert!(names.contains(&"report"));
                StatusCode::OK
            }),
        );
        let base = spawn_server(app).await;

        let gateway = HttpDoctorGateway::new(&base, Duration::from_secs(2)).unwrap();
        gateway.send_report(&sample_report()).await.unwrap();
    }

    #[tokio::test]
    async fn send_report_maps_500_to_remote_unavailable() {
        let app = Router::new().route(
            "/receive-report",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_server(app).await;

        let gateway = HttpDoctorGateway::new(&base, Duration::from_secs(2)).unwrap();
        let err = gateway.send_report(&sample_report()).await.unwrap_err();
        assert!(matches!(err, PortError::RemoteUnavailable(_)));
    }
}
