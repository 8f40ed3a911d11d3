use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::{
    Appointment, AppointmentStatus, Bill, Department, Doctor, MedicalRecord, Patient, PaymentStatus,
};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A storage-level constraint rejected the write. The slot constraint on
    /// (doctor_id, date, time) over non-cancelled appointments is reported as
    /// `UniqueViolation("appointments.slot")`.
    #[error("unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    #[error("transaction failed: {0}")]
    Tx(String),
}

/// Insert payload for an appointment; id and timestamps are store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub appointment_number: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBill {
    pub bill_number: String,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub consultation_fee: f64,
    pub additional_charges: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicalRecord {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub diagnosis: String,
    pub prescription: Option<String>,
}

/// Read-only filter for appointment lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub status: Option<AppointmentStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Storage seam injected into the cells. Reads run outside transactions;
/// multi-entity writes go through [`Storage::begin`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open an exclusive write transaction. Writes become visible only on
    /// [`StorageTx::commit`]; dropping the transaction rolls everything back.
    async fn begin(&self) -> Result<Box<dyn StorageTx>, StoreError>;

    async fn doctor(&self, id: i64) -> Result<Option<Doctor>, StoreError>;
    async fn doctors(&self) -> Result<Vec<Doctor>, StoreError>;
    async fn department(&self, id: i64) -> Result<Option<Department>, StoreError>;
    async fn patient(&self, id: i64) -> Result<Option<Patient>, StoreError>;

    async fn appointment(&self, id: i64) -> Result<Option<Appointment>, StoreError>;
    async fn appointments_for_doctor_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn search_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn completed_appointment_count(&self, doctor_id: i64) -> Result<u64, StoreError>;

    async fn bills_for_appointment(&self, appointment_id: i64) -> Result<Vec<Bill>, StoreError>;
    async fn medical_records_for_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<MedicalRecord>, StoreError>;
}

/// A single all-or-nothing write scope.
#[async_trait]
pub trait StorageTx: Send {
    async fn appointment(&mut self, id: i64) -> Result<Option<Appointment>, StoreError>;

    /// The non-cancelled appointment currently holding (doctor, date, time),
    /// if any. Used for the pre-insert re-check that closes the booking race.
    async fn active_appointment_at(
        &mut self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<Appointment>, StoreError>;

    async fn appointment_number_exists(&mut self, number: &str) -> Result<bool, StoreError>;

    /// Enforces the slot and appointment-number uniqueness constraints; a
    /// violated constraint fails the insert with [`StoreError::UniqueViolation`].
    async fn insert_appointment(&mut self, new: NewAppointment)
        -> Result<Appointment, StoreError>;

    /// At most one bill may reference an appointment.
    async fn insert_bill(&mut self, new: NewBill) -> Result<Bill, StoreError>;

    async fn update_appointment(&mut self, appointment: &Appointment) -> Result<(), StoreError>;

    async fn delete_bills_for_appointment(&mut self, appointment_id: i64)
        -> Result<u64, StoreError>;
    async fn delete_medical_records_for_appointment(
        &mut self,
        appointment_id: i64,
    ) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
