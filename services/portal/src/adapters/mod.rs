pub mod db;
pub mod doctor;

pub use db::PgPortalDatabase;
pub use doctor::HttpDoctorGateway;
