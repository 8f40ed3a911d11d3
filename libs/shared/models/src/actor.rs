use serde::{Deserialize, Serialize};

/// Identity of the caller for a single request, supplied by the external
/// identity/session context. Passed explicitly into every mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// For `Role::Doctor` this is the doctor id the actor owns; for
    /// `Role::Patient` the patient id.
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl ActorContext {
    pub fn admin(user_id: i64) -> Self {
        Self { user_id, role: Role::Admin }
    }

    pub fn doctor(doctor_id: i64) -> Self {
        Self { user_id: doctor_id, role: Role::Doctor }
    }

    pub fn patient(patient_id: i64) -> Self {
        Self { user_id: patient_id, role: Role::Patient }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
