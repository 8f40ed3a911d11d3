// libs/doctor-cell/src/models.rs
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::AgeGroup;

/// What the matcher hands to the presentation layer for each candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub doctor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub bio: Option<String>,
    pub department_name: String,
    pub department_age_group: AgeGroup,
    pub consultation_fee: f64,
    pub rating: f32,
    pub experience_years: i32,
    pub available_days: Vec<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Completed appointments handled by this doctor.
    pub completed_visits: u64,
    /// The department's age specialization exactly matches the patient's band.
    pub band_match: bool,
    pub match_notes: Vec<String>,
}

impl DoctorSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("doctor not found or not available")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for DoctorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => DoctorError::NotFound,
            other => DoctorError::Storage(other.to_string()),
        }
    }
}
