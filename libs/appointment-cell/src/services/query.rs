// libs/appointment-cell/src/services/query.rs
use std::sync::Arc;
use tracing::debug;

use shared_database::{AppointmentFilter, Storage};
use shared_models::Appointment;

use crate::models::AppointmentError;

/// Read-only appointment lists for the presentation layer, ordered by
/// (date, time).
pub struct AppointmentQueryService {
    storage: Arc<dyn Storage>,
}

impl AppointmentQueryService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn search_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("searching appointments with {:?}", filter);
        Ok(self.storage.search_appointments(filter).await?)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Appointment, AppointmentError> {
        self.storage
            .appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }
}
