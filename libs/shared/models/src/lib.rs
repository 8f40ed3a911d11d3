pub mod actor;
pub mod records;

pub use actor::{ActorContext, Role};
pub use records::{
    weekday_name, AgeBand, AgeGroup, Appointment, AppointmentStatus, Bill, Department, Doctor,
    MedicalRecord, Patient, PaymentStatus,
};
