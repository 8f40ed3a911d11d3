pub mod memory;
pub mod store;

pub use memory::MemoryStorage;
pub use store::{
    AppointmentFilter, NewAppointment, NewBill, NewMedicalRecord, Storage, StorageTx, StoreError,
};
