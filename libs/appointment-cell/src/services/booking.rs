// libs/appointment-cell/src/services/booking.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

use doctor_cell::services::directory::DoctorDirectoryService;
use shared_config::AppConfig;
use shared_database::{NewAppointment, NewBill, Storage, StorageTx, StoreError};
use shared_models::{weekday_name, AppointmentStatus, PaymentStatus};

use crate::models::{AppointmentError, BookingResult};

/// Creates an appointment together with its bill in one transaction,
/// re-validating the slot under the transaction to close the booking race.
pub struct BookingService {
    storage: Arc<dyn Storage>,
    directory: DoctorDirectoryService,
    config: AppConfig,
}

impl BookingService {
    pub fn new(storage: Arc<dyn Storage>, config: AppConfig) -> Self {
        let directory = DoctorDirectoryService::new(Arc::clone(&storage));
        Self {
            storage,
            directory,
            config,
        }
    }

    pub async fn book_appointment(
        &self,
        patient_id: i64,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        reason: &str,
    ) -> Result<BookingResult, AppointmentError> {
        info!(
            "booking appointment for patient {} with doctor {} at {} {}",
            patient_id, doctor_id, date, time
        );

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppointmentError::Validation(
                "a reason for the visit is required".to_string(),
            ));
        }

        let now = Utc::now();
        let today = now.date_naive();
        if date < today || (date == today && time <= now.time()) {
            return Err(AppointmentError::Validation(
                "cannot book appointments in the past".to_string(),
            ));
        }

        let (doctor, _department) = self.directory.get_bookable_doctor(doctor_id).await?;
        if !doctor.works_on(date) {
            return Err(AppointmentError::DayUnavailable(weekday_name(date)));
        }

        self.storage
            .patient(patient_id)
            .await?
            .ok_or(AppointmentError::PatientNotFound)?;

        // Everything after this point is all-or-nothing: a failure drops the
        // transaction and no appointment-without-bill state becomes visible.
        let mut tx = self.storage.begin().await?;

        if tx
            .active_appointment_at(doctor_id, date, time)
            .await?
            .is_some()
        {
            warn!(
                "slot {} {} for doctor {} was claimed since the caller last looked",
                date, time, doctor_id
            );
            return Err(AppointmentError::SlotTaken);
        }

        let appointment_number = self.allocate_appointment_number(tx.as_mut()).await?;

        let appointment = tx
            .insert_appointment(NewAppointment {
                appointment_number,
                patient_id,
                doctor_id,
                date,
                time,
                status: AppointmentStatus::Scheduled,
                reason: reason.to_string(),
            })
            .await?;

        let bill_number = format!("BILL-{}-{:06}", now.year(), appointment.id);
        let bill = tx
            .insert_bill(NewBill {
                bill_number,
                appointment_id: appointment.id,
                patient_id,
                consultation_fee: doctor.consultation_fee,
                additional_charges: 0.0,
                discount_amount: 0.0,
                total_amount: doctor.consultation_fee,
                payment_status: PaymentStatus::Pending,
                due_date: date + Duration::days(self.config.bill_due_days),
            })
            .await
            .map_err(|e| AppointmentError::Transaction(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppointmentError::Transaction(e.to_string()))?;

        info!(
            "appointment {} booked ({}), bill {}",
            appointment.id, appointment.appointment_number, bill.bill_number
        );
        Ok(BookingResult {
            appointment_id: appointment.id,
            appointment_number: appointment.appointment_number,
            bill_number: bill.bill_number,
        })
    }

    /// Draw `APT-<year>-<4 digits>` numbers until one is free. The store
    /// still enforces uniqueness at insert; this just keeps collisions from
    /// failing the whole booking.
    async fn allocate_appointment_number(
        &self,
        tx: &mut dyn StorageTx,
    ) -> Result<String, AppointmentError> {
        let year = Utc::now().year();
        for _ in 0..self.config.appointment_number_attempts {
            let candidate = format!("APT-{}-{:04}", year, rand::thread_rng().gen_range(1000..=9999));
            if !tx.appointment_number_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppointmentError::Transaction(
            StoreError::UniqueViolation("appointments.appointment_number").to_string(),
        ))
    }
}
