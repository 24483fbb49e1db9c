//! Appointment scheduling for the Tontouma conversational engine
//!
//! - Pure slot arithmetic (half-open intervals, fixed-duration enumeration)
//! - The [`AppointmentScheduler`] service: doctor search, availability,
//!   conflict-safe booking with commit-time re-validation
//! - The [`SchedulingStore`] contract and an in-memory implementation
//! - Spoken date resolution for phrases like "demain" or "lundi prochain"

pub mod dates;
pub mod error;
pub mod scheduler;
pub mod slots;
pub mod store;
pub mod types;

pub use dates::{resolve_spoken_date, DateResolution};
pub use error::SchedulingError;
pub use scheduler::{AppointmentScheduler, BookingOutcome};
pub use store::{BookAttempt, MemorySchedulingStore, SchedulingStore};
pub use types::{
    Appointment, AppointmentStatus, AvailableSlot, BookingRequest, Doctor, DoctorSummary,
    SlotRule, TimeSlot,
};
