// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::AppointmentStatus;

use crate::models::AppointmentError;

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed.
    pub fn validate_status_transition(
        &self,
        current: AppointmentStatus,
        new: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("validating status transition {} -> {}", current, new);

        if !self.get_valid_transitions(current).contains(&new) {
            warn!("invalid status transition attempted: {} -> {}", current, new);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current,
                to: new,
            });
        }
        Ok(())
    }

    /// All valid next statuses for a given current status.
    ///
    /// `Completed` and `NoShow` are terminal for ordinary updates; they can
    /// still be entered from any non-terminal status for manual correction.
    /// `Cancelled` leaves only through reactivation.
    pub fn get_valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        use AppointmentStatus::*;

        match current {
            Scheduled | Confirmed | InProgress => {
                [Scheduled, Confirmed, InProgress, Completed, Cancelled, NoShow]
                    .into_iter()
                    .filter(|s| *s != current)
                    .collect()
            }
            // Reactivation only.
            Cancelled => vec![Scheduled],
            Completed | NoShow => vec![],
        }
    }

    pub fn is_terminal(&self, status: AppointmentStatus) -> bool {
        matches!(
            status,
            AppointmentStatus::Completed | AppointmentStatus::NoShow
        )
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::AppointmentStatus::*;

    #[test]
    fn non_terminal_statuses_reach_all_others() {
        let lifecycle = AppointmentLifecycleService::new();
        for from in [Scheduled, Confirmed, InProgress] {
            for to in [Scheduled, Confirmed, InProgress, Completed, Cancelled, NoShow] {
                if from == to {
                    continue;
                }
                assert!(
                    lifecycle.validate_status_transition(from, to).is_ok(),
                    "{} -> {} should be allowed",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn completed_and_no_show_are_terminal() {
        let lifecycle = AppointmentLifecycleService::new();
        assert!(lifecycle.get_valid_transitions(Completed).is_empty());
        assert!(lifecycle.get_valid_transitions(NoShow).is_empty());
        assert!(lifecycle
            .validate_status_transition(Completed, Scheduled)
            .is_err());
    }

    #[test]
    fn cancelled_only_reactivates_to_scheduled() {
        let lifecycle = AppointmentLifecycleService::new();
        assert_eq!(lifecycle.get_valid_transitions(Cancelled), vec![Scheduled]);
        assert!(lifecycle
            .validate_status_transition(Cancelled, Confirmed)
            .is_err());
    }
}
