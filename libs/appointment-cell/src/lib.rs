pub mod models;
pub mod services;

pub use models::{AppointmentError, BookingResult, TimeSlot};
pub use services::availability::AvailabilityService;
pub use services::booking::BookingService;
pub use services::cancellation::CancellationService;
pub use services::lifecycle::AppointmentLifecycleService;
pub use services::query::AppointmentQueryService;
