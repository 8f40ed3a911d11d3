// libs/doctor-cell/src/services/directory.rs
use std::sync::Arc;
use tracing::debug;

use shared_database::Storage;
use shared_models::{Department, Doctor};

use crate::models::DoctorError;

/// Read-only view over doctor records. The matcher and the appointment cell
/// consult this instead of reaching into storage themselves.
#[derive(Clone)]
pub struct DoctorDirectoryService {
    storage: Arc<dyn Storage>,
}

impl DoctorDirectoryService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        self.storage
            .doctor(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)
    }

    /// A doctor patients may actually be booked with: the doctor is available
    /// and active, and their department is active.
    pub async fn get_bookable_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<(Doctor, Department), DoctorError> {
        debug!("looking up bookable doctor {}", doctor_id);

        let doctor = self.get_doctor(doctor_id).await?;
        if !doctor.is_available || !doctor.is_active {
            return Err(DoctorError::NotFound);
        }

        let department = self
            .storage
            .department(doctor.department_id)
            .await?
            .ok_or(DoctorError::NotFound)?;
        if !department.is_active {
            return Err(DoctorError::NotFound);
        }

        Ok((doctor, department))
    }

    /// All bookable doctors paired with their departments.
    pub async fn list_bookable(&self) -> Result<Vec<(Doctor, Department)>, DoctorError> {
        let mut bookable = Vec::new();
        for doctor in self.storage.doctors().await? {
            if !doctor.is_available || !doctor.is_active {
                continue;
            }
            let Some(department) = self.storage.department(doctor.department_id).await? else {
                continue;
            };
            if !department.is_active {
                continue;
            }
            bookable.push((doctor, department));
        }
        Ok(bookable)
    }
}
