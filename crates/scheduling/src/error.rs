//! Scheduling error types

use thiserror::Error;

/// Failures of the scheduling storage collaborator.
///
/// Booking conflicts are not errors: they are ordinary outcomes reported
/// through [`crate::scheduler::BookingOutcome`].
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("scheduling storage error: {0}")]
    Storage(String),
}
