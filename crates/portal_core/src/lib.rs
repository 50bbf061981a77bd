pub mod domain;
pub mod ports;

pub use domain::{Doctor, Notification, OutboundReport, Patient, Session};
pub use ports::{DoctorGateway, PortError, PortResult, PortalDatabase};
