// libs/appointment-cell/src/models.rs
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use doctor_cell::models::DoctorError;
use shared_database::StoreError;
use shared_models::AppointmentStatus;

/// A bookable 30-minute (by default) start time within a doctor's working
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// What a successful booking hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResult {
    pub appointment_id: i64,
    pub appointment_number: String,
    pub bill_number: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("appointment not found")]
    NotFound,

    #[error("doctor not found or not available")]
    DoctorNotFound,

    #[error("patient not found")]
    PatientNotFound,

    #[error("validation error: {0}")]
    Validation(String),

    /// The requested weekday is not in the doctor's schedule.
    #[error("doctor is not available on {0}")]
    DayUnavailable(String),

    /// Another active appointment claimed the slot first. The caller should
    /// offer a different slot rather than retry the same input.
    #[error("this time slot is already booked")]
    SlotTaken,

    #[error("appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppointmentError::NotFound,
            StoreError::UniqueViolation("appointments.slot") => AppointmentError::SlotTaken,
            other => AppointmentError::Transaction(other.to_string()),
        }
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::Storage(msg) => AppointmentError::Transaction(msg),
        }
    }
}
