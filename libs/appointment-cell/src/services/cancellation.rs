// libs/appointment-cell/src/services/cancellation.rs
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use shared_database::Storage;
use shared_models::{ActorContext, Appointment, AppointmentStatus, Role};

use crate::models::AppointmentError;
use crate::services::lifecycle::AppointmentLifecycleService;

/// Status updates, cancellation and reactivation under explicit actor
/// policies. Admin cancellation cascades; patient cancellation does not.
pub struct CancellationService {
    storage: Arc<dyn Storage>,
    lifecycle: AppointmentLifecycleService,
}

impl CancellationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// Plain status update (status, notes, updated_at), restricted to the
    /// owning doctor or an admin. An admin update to `Cancelled` runs the
    /// same destructive cascade as [`Self::cancel_appointment`]; a doctor
    /// update to `Cancelled` stays a plain field update.
    ///
    /// Cancelled appointments are frozen here: the only way out of
    /// `Cancelled` is [`Self::reactivate_appointment`], which also clears the
    /// cancellation fields.
    pub async fn update_appointment_status(
        &self,
        appointment_id: i64,
        new_status: AppointmentStatus,
        notes: Option<String>,
        actor: ActorContext,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "updating appointment {} to {} as {:?}",
            appointment_id, new_status, actor.role
        );

        let appointment = self.get_appointment(appointment_id).await?;

        match actor.role {
            Role::Admin => {}
            Role::Doctor if actor.user_id == appointment.doctor_id => {}
            Role::Doctor => {
                return Err(AppointmentError::PermissionDenied(
                    "appointment belongs to another doctor".to_string(),
                ))
            }
            Role::Patient => {
                return Err(AppointmentError::PermissionDenied(
                    "patients cancel through their own appointment list".to_string(),
                ))
            }
        }

        if new_status == AppointmentStatus::Cancelled && actor.is_admin() {
            return self
                .cancel_with_cascade(appointment, "Status changed by admin")
                .await;
        }

        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AppointmentError::InvalidStatusTransition {
                from: AppointmentStatus::Cancelled,
                to: new_status,
            });
        }

        self.lifecycle
            .validate_status_transition(appointment.status, new_status)?;

        let mut updated = appointment;
        updated.status = new_status;
        if notes.is_some() {
            updated.notes = notes;
        }
        updated.updated_at = Utc::now();

        let mut tx = self.storage.begin().await?;
        tx.update_appointment(&updated).await?;
        tx.commit()
            .await
            .map_err(|e| AppointmentError::Transaction(e.to_string()))?;

        info!("appointment {} is now {}", updated.id, updated.status);
        Ok(updated)
    }

    /// Cancel an appointment under the caller's policy.
    ///
    /// Admin: destructive. Deletes every bill and medical record referencing
    /// the appointment, then flips it to `Cancelled` with the reason and
    /// timestamp, all in one transaction. Idempotent: cancelling an already
    /// cancelled appointment succeeds without touching anything.
    ///
    /// Patient: only for the patient's own appointment, and only a status
    /// flip. The bill and records stay, so billing history survives.
    pub async fn cancel_appointment(
        &self,
        appointment_id: i64,
        actor: ActorContext,
        reason: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("cancelling appointment {} as {:?}", appointment_id, actor.role);

        let appointment = self.get_appointment(appointment_id).await?;

        match actor.role {
            Role::Admin => self.cancel_with_cascade(appointment, reason).await,
            Role::Patient => {
                if appointment.patient_id != actor.user_id {
                    return Err(AppointmentError::PermissionDenied(
                        "appointment belongs to another patient".to_string(),
                    ));
                }
                self.cancel_status_only(appointment).await
            }
            Role::Doctor => Err(AppointmentError::PermissionDenied(
                "doctors change status through the status update flow".to_string(),
            )),
        }
    }

    /// Restore a cancelled appointment to `Scheduled`, clearing the
    /// cancellation fields. Admin only.
    ///
    /// Bills and medical records removed by a prior admin cancellation are
    /// NOT recreated; a cancel/reactivate cycle under the admin path loses
    /// billing history permanently.
    pub async fn reactivate_appointment(
        &self,
        appointment_id: i64,
        actor: ActorContext,
    ) -> Result<Appointment, AppointmentError> {
        if !actor.is_admin() {
            return Err(AppointmentError::PermissionDenied(
                "only admins reactivate appointments".to_string(),
            ));
        }

        let appointment = self.get_appointment(appointment_id).await?;
        self.lifecycle
            .validate_status_transition(appointment.status, AppointmentStatus::Scheduled)?;

        let mut updated = appointment;
        updated.status = AppointmentStatus::Scheduled;
        updated.cancellation_reason = None;
        updated.cancelled_at = None;
        updated.updated_at = Utc::now();

        let mut tx = self.storage.begin().await?;
        tx.update_appointment(&updated).await?;
        tx.commit()
            .await
            .map_err(|e| AppointmentError::Transaction(e.to_string()))?;

        info!("appointment {} reactivated", updated.id);
        Ok(updated)
    }

    async fn get_appointment(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        self.storage
            .appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// The admin cascade: bills first, then medical records, then the status
    /// flip, in one transaction. A failure at any step leaves everything in
    /// place.
    async fn cancel_with_cascade(
        &self,
        appointment: Appointment,
        reason: &str,
    ) -> Result<Appointment, AppointmentError> {
        if appointment.status == AppointmentStatus::Cancelled {
            debug!("appointment {} already cancelled, no-op", appointment.id);
            return Ok(appointment);
        }

        let mut tx = self.storage.begin().await?;

        let bills = tx.delete_bills_for_appointment(appointment.id).await?;
        let records = tx
            .delete_medical_records_for_appointment(appointment.id)
            .await?;

        let now = Utc::now();
        let mut updated = appointment;
        updated.status = AppointmentStatus::Cancelled;
        updated.cancellation_reason = Some(reason.to_string());
        updated.cancelled_at = Some(now);
        updated.updated_at = now;
        tx.update_appointment(&updated).await?;

        tx.commit()
            .await
            .map_err(|e| AppointmentError::Transaction(e.to_string()))?;

        info!(
            "appointment {} cancelled by admin; removed {} bill(s) and {} record(s)",
            updated.id, bills, records
        );
        Ok(updated)
    }

    async fn cancel_status_only(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, AppointmentError> {
        if appointment.status == AppointmentStatus::Cancelled {
            return Ok(appointment);
        }

        let mut updated = appointment;
        updated.status = AppointmentStatus::Cancelled;
        updated.updated_at = Utc::now();

        let mut tx = self.storage.begin().await?;
        tx.update_appointment(&updated).await?;
        tx.commit()
            .await
            .map_err(|e| AppointmentError::Transaction(e.to_string()))?;

        info!("appointment {} cancelled by patient (bill retained)", updated.id);
        Ok(updated)
    }
}
