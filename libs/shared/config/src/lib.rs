use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Days after the appointment date on which its bill falls due.
    pub bill_due_days: i64,
    /// How many appointment numbers to draw before giving up on a booking.
    pub appointment_number_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bill_due_days: env::var("BILL_DUE_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("BILL_DUE_DAYS not set, using default of 7");
                    7
                }),
            appointment_number_attempts: env::var("APPOINTMENT_NUMBER_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("APPOINTMENT_NUMBER_ATTEMPTS not set, using default of 5");
                    5
                }),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bill_due_days: 7,
            appointment_number_attempts: 5,
        }
    }
}
