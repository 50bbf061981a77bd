//! services/portal/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use portal_core::ports::{DoctorGateway, PortalDatabase};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Dependencies are injected behind their port traits so the router
/// can be exercised against in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn PortalDatabase>,
    pub doctors: Arc<dyn DoctorGateway>,
    pub config: Arc<Config>,
}
