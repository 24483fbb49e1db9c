//! Scheduling storage contract and in-memory implementation

use crate::error::SchedulingError;
use crate::slots::overlaps;
use crate::types::{Appointment, Doctor, TimeSlot};
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

/// Result of an atomic check-and-insert
#[derive(Debug, Clone)]
pub enum BookAttempt {
    /// The interval was free and the appointment was stored
    Created(Appointment),
    /// Another non-cancelled appointment already occupies the interval
    Conflict,
}

/// Storage collaborator for doctors, availability windows and appointments.
///
/// `create_if_free` is the only mutation the orchestration core performs on
/// appointments, and it must execute the conflict re-check and the insert as
/// one atomic unit scoped to (doctor, date). Persistent implementations must
/// use a transaction or equivalent mutual exclusion so that two concurrent
/// bookings for overlapping intervals cannot both succeed.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn doctors_for_entity(&self, entity_id: Uuid) -> Result<Vec<Doctor>, SchedulingError>;

    async fn doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, SchedulingError>;

    async fn time_slots_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<TimeSlot>, SchedulingError>;

    /// Non-cancelled appointments of a doctor on a date.
    async fn appointments_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError>;

    /// Re-check `[start, end)` against current non-cancelled appointments of
    /// the same doctor on the same date and insert only when free.
    async fn create_if_free(
        &self,
        appointment: Appointment,
    ) -> Result<BookAttempt, SchedulingError>;
}

/// In-memory scheduling store.
///
/// Doctors and windows are read-mostly maps; appointments live behind a
/// single mutex so the conflict check and the insert in `create_if_free`
/// happen under one critical section.
#[derive(Default)]
pub struct MemorySchedulingStore {
    doctors: DashMap<Uuid, Doctor>,
    time_slots: DashMap<Uuid, Vec<TimeSlot>>,
    appointments: Mutex<Vec<Appointment>>,
}

impl MemorySchedulingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_doctor(&self, doctor: Doctor) {
        self.doctors.insert(doctor.id, doctor);
    }

    pub fn add_time_slot(&self, slot: TimeSlot) {
        self.time_slots
            .entry(slot.doctor_id)
            .or_default()
            .push(slot);
    }

    /// Number of stored appointments, cancelled included. Test support.
    pub fn appointment_count(&self) -> usize {
        self.appointments.lock().len()
    }
}

#[async_trait]
impl SchedulingStore for MemorySchedulingStore {
    async fn doctors_for_entity(&self, entity_id: Uuid) -> Result<Vec<Doctor>, SchedulingError> {
        Ok(self
            .doctors
            .iter()
            .filter(|entry| entry.value().entity_id == entity_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, SchedulingError> {
        Ok(self.doctors.get(&doctor_id).map(|entry| entry.value().clone()))
    }

    async fn time_slots_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        Ok(self
            .time_slots
            .get(&doctor_id)
            .map(|slots| slots.value().clone())
            .unwrap_or_default())
    }

    async fn appointments_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self
            .appointments
            .lock()
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.date == date && a.blocks_slot())
            .cloned()
            .collect())
    }

    async fn create_if_free(
        &self,
        appointment: Appointment,
    ) -> Result<BookAttempt, SchedulingError> {
        let mut appointments = self.appointments.lock();

        let conflict = appointments.iter().any(|existing| {
            existing.doctor_id == appointment.doctor_id
                && existing.date == appointment.date
                && existing.blocks_slot()
                && overlaps(
                    appointment.start_time,
                    appointment.end_time,
                    existing.start_time,
                    existing.end_time,
                )
        });

        if conflict {
            return Ok(BookAttempt::Conflict);
        }

        appointments.push(appointment.clone());
        Ok(BookAttempt::Created(appointment))
    }
}
