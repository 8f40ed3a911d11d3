use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use shared_models::{
    Appointment, AppointmentStatus, Bill, Department, Doctor, MedicalRecord, Patient,
};

use crate::store::{
    AppointmentFilter, NewAppointment, NewBill, NewMedicalRecord, Storage, StorageTx, StoreError,
};

/// In-memory reference store. Transactions clone the state behind an owned
/// write guard and swap it back on commit, so concurrent writers serialize
/// and an uncommitted transaction leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    doctors: HashMap<i64, Doctor>,
    departments: HashMap<i64, Department>,
    patients: HashMap<i64, Patient>,
    appointments: BTreeMap<i64, Appointment>,
    bills: BTreeMap<i64, Bill>,
    medical_records: BTreeMap<i64, MedicalRecord>,
    next_appointment_id: i64,
    next_bill_id: i64,
    next_record_id: i64,
}

impl StoreState {
    fn active_appointment_at(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Option<&Appointment> {
        self.appointments.values().find(|a| {
            a.doctor_id == doctor_id && a.date == date && a.time == time && a.is_active()
        })
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    // Directory records are owned by the out-of-scope CRUD screens; these
    // upserts stand in for them in tests and fixtures.
    pub async fn upsert_doctor(&self, doctor: Doctor) {
        self.state.write().await.doctors.insert(doctor.id, doctor);
    }

    pub async fn upsert_department(&self, department: Department) {
        self.state
            .write()
            .await
            .departments
            .insert(department.id, department);
    }

    pub async fn upsert_patient(&self, patient: Patient) {
        self.state.write().await.patients.insert(patient.id, patient);
    }

    pub async fn insert_medical_record(&self, new: NewMedicalRecord) -> MedicalRecord {
        let mut state = self.state.write().await;
        state.next_record_id += 1;
        let record = MedicalRecord {
            id: state.next_record_id,
            appointment_id: new.appointment_id,
            patient_id: new.patient_id,
            diagnosis: new.diagnosis,
            prescription: new.prescription,
            created_at: Utc::now(),
        };
        state.medical_records.insert(record.id, record.clone());
        record
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn StorageTx>, StoreError> {
        let guard = self.state.clone().write_owned().await;
        let work = guard.clone();
        debug!("transaction opened");
        Ok(Box::new(MemoryTx { guard, work }))
    }

    async fn doctor(&self, id: i64) -> Result<Option<Doctor>, StoreError> {
        Ok(self.state.read().await.doctors.get(&id).cloned())
    }

    async fn doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let mut doctors: Vec<Doctor> = self.state.read().await.doctors.values().cloned().collect();
        doctors.sort_by_key(|d| d.id);
        Ok(doctors)
    }

    async fn department(&self, id: i64) -> Result<Option<Department>, StoreError> {
        Ok(self.state.read().await.departments.get(&id).cloned())
    }

    async fn patient(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        Ok(self.state.read().await.patients.get(&id).cloned())
    }

    async fn appointment(&self, id: i64) -> Result<Option<Appointment>, StoreError> {
        Ok(self.state.read().await.appointments.get(&id).cloned())
    }

    async fn appointments_for_doctor_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.date == date)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.time);
        Ok(found)
    }

    async fn search_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| filter.patient_id.map_or(true, |id| a.patient_id == id))
            .filter(|a| filter.doctor_id.map_or(true, |id| a.doctor_id == id))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .filter(|a| filter.from_date.map_or(true, |d| a.date >= d))
            .filter(|a| filter.to_date.map_or(true, |d| a.date <= d))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.date, a.time));
        Ok(found)
    }

    async fn completed_appointment_count(&self, doctor_id: i64) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.status == AppointmentStatus::Completed)
            .count() as u64)
    }

    async fn bills_for_appointment(&self, appointment_id: i64) -> Result<Vec<Bill>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .bills
            .values()
            .filter(|b| b.appointment_id == appointment_id)
            .cloned()
            .collect())
    }

    async fn medical_records_for_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<MedicalRecord>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .medical_records
            .values()
            .filter(|r| r.appointment_id == appointment_id)
            .cloned()
            .collect())
    }
}

struct MemoryTx {
    guard: OwnedRwLockWriteGuard<StoreState>,
    work: StoreState,
}

#[async_trait]
impl StorageTx for MemoryTx {
    async fn appointment(&mut self, id: i64) -> Result<Option<Appointment>, StoreError> {
        Ok(self.work.appointments.get(&id).cloned())
    }

    async fn active_appointment_at(
        &mut self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<Appointment>, StoreError> {
        Ok(self.work.active_appointment_at(doctor_id, date, time).cloned())
    }

    async fn appointment_number_exists(&mut self, number: &str) -> Result<bool, StoreError> {
        Ok(self
            .work
            .appointments
            .values()
            .any(|a| a.appointment_number == number))
    }

    async fn insert_appointment(
        &mut self,
        new: NewAppointment,
    ) -> Result<Appointment, StoreError> {
        if new.status != AppointmentStatus::Cancelled
            && self
                .work
                .active_appointment_at(new.doctor_id, new.date, new.time)
                .is_some()
        {
            return Err(StoreError::UniqueViolation("appointments.slot"));
        }
        if self
            .work
            .appointments
            .values()
            .any(|a| a.appointment_number == new.appointment_number)
        {
            return Err(StoreError::UniqueViolation("appointments.appointment_number"));
        }

        self.work.next_appointment_id += 1;
        let now = Utc::now();
        let appointment = Appointment {
            id: self.work.next_appointment_id,
            appointment_number: new.appointment_number,
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            date: new.date,
            time: new.time,
            status: new.status,
            reason: new.reason,
            notes: None,
            cancellation_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.work
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn insert_bill(&mut self, new: NewBill) -> Result<Bill, StoreError> {
        if self
            .work
            .bills
            .values()
            .any(|b| b.appointment_id == new.appointment_id)
        {
            return Err(StoreError::UniqueViolation("bills.appointment_id"));
        }
        if self.work.bills.values().any(|b| b.bill_number == new.bill_number) {
            return Err(StoreError::UniqueViolation("bills.bill_number"));
        }

        self.work.next_bill_id += 1;
        let bill = Bill {
            id: self.work.next_bill_id,
            bill_number: new.bill_number,
            appointment_id: new.appointment_id,
            patient_id: new.patient_id,
            consultation_fee: new.consultation_fee,
            additional_charges: new.additional_charges,
            discount_amount: new.discount_amount,
            total_amount: new.total_amount,
            payment_status: new.payment_status,
            due_date: new.due_date,
            created_at: Utc::now(),
        };
        self.work.bills.insert(bill.id, bill.clone());
        Ok(bill)
    }

    async fn update_appointment(&mut self, appointment: &Appointment) -> Result<(), StoreError> {
        if !self.work.appointments.contains_key(&appointment.id) {
            return Err(StoreError::NotFound("appointment"));
        }
        // The active-slot constraint also guards updates, so reactivating an
        // appointment whose slot was rebooked in the meantime is rejected.
        if appointment.is_active() {
            if let Some(existing) =
                self.work
                    .active_appointment_at(appointment.doctor_id, appointment.date, appointment.time)
            {
                if existing.id != appointment.id {
                    return Err(StoreError::UniqueViolation("appointments.slot"));
                }
            }
        }
        self.work
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn delete_bills_for_appointment(
        &mut self,
        appointment_id: i64,
    ) -> Result<u64, StoreError> {
        let before = self.work.bills.len();
        self.work.bills.retain(|_, b| b.appointment_id != appointment_id);
        Ok((before - self.work.bills.len()) as u64)
    }

    async fn delete_medical_records_for_appointment(
        &mut self,
        appointment_id: i64,
    ) -> Result<u64, StoreError> {
        let before = self.work.medical_records.len();
        self.work
            .medical_records
            .retain(|_, r| r.appointment_id != appointment_id);
        Ok((before - self.work.medical_records.len()) as u64)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        *self.guard = self.work;
        debug!("transaction committed");
        Ok(())
    }
}
