// libs/appointment-cell/src/services/availability.rs
use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use doctor_cell::services::directory::DoctorDirectoryService;
use shared_database::Storage;
use shared_models::weekday_name;

use crate::models::{AppointmentError, TimeSlot};

/// Computes the open slots for a doctor on a date: fixed-width candidates
/// over the working window, minus slots held by non-cancelled appointments.
pub struct AvailabilityService {
    storage: Arc<dyn Storage>,
    directory: DoctorDirectoryService,
}

impl AvailabilityService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let directory = DoctorDirectoryService::new(Arc::clone(&storage));
        Self { storage, directory }
    }

    pub async fn list_available_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, AppointmentError> {
        debug!("listing available slots for doctor {} on {}", doctor_id, date);

        let (doctor, _department) = self.directory.get_bookable_doctor(doctor_id).await?;

        if date < Utc::now().date_naive() {
            return Err(AppointmentError::Validation(
                "cannot list slots for a past date".to_string(),
            ));
        }
        if !doctor.works_on(date) {
            return Err(AppointmentError::DayUnavailable(weekday_name(date)));
        }

        let booked: HashSet<_> = self
            .storage
            .appointments_for_doctor_on(doctor_id, date)
            .await?
            .into_iter()
            .filter(|a| a.is_active())
            .map(|a| a.time)
            .collect();

        let step = Duration::minutes(doctor.slot_minutes);
        let mut slots = Vec::new();
        let mut start = doctor.start_time;
        while start < doctor.end_time {
            let (end, wrapped) = start.overflowing_add_signed(step);
            if !booked.contains(&start) {
                slots.push(TimeSlot { start, end });
            }
            if wrapped != 0 {
                break;
            }
            start = end;
        }

        debug!(
            "doctor {} has {} open slots on {} ({} booked)",
            doctor_id,
            slots.len(),
            date,
            booked.len()
        );
        Ok(slots)
    }
}
