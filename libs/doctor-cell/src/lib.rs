pub mod models;
pub mod services;

pub use models::{DoctorError, DoctorSummary};
pub use services::directory::DoctorDirectoryService;
pub use services::matching::DoctorMatchingService;
