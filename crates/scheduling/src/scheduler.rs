//! Appointment scheduler
//!
//! Wraps the slot arithmetic with the storage collaborator: doctor search,
//! availability enumeration, and conflict-safe booking.

use crate::error::SchedulingError;
use crate::slots::{free_intervals, window_applies};
use crate::store::{BookAttempt, SchedulingStore};
use crate::types::{
    Appointment, AppointmentStatus, AvailableSlot, BookingRequest, Doctor, DoctorSummary,
};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a booking attempt.
///
/// Rejections are ordinary results carrying a user-facing message; the
/// caller (typically a tool) relays the message conversationally.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    Confirmed {
        appointment: Appointment,
        doctor_name: String,
        message: String,
    },
    Rejected {
        message: String,
    },
}

impl BookingOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Appointment scheduling service
pub struct AppointmentScheduler {
    store: Arc<dyn SchedulingStore>,
}

impl AppointmentScheduler {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    /// Search active doctors of an entity, optionally filtered by a
    /// case-insensitive substring match on the specialty name.
    pub async fn search_doctors(
        &self,
        entity_id: Uuid,
        specialty: Option<&str>,
    ) -> Result<Vec<DoctorSummary>, SchedulingError> {
        let doctors = self.store.doctors_for_entity(entity_id).await?;

        let needle = specialty.map(|s| s.trim().to_lowercase());
        let summaries = doctors
            .into_iter()
            .filter(|d| d.is_active)
            .filter(|d| match &needle {
                Some(needle) if !needle.is_empty() => d
                    .specialty
                    .as_deref()
                    .map(|s| s.to_lowercase().contains(needle))
                    .unwrap_or(false),
                _ => true,
            })
            .map(|d| DoctorSummary {
                doctor_id: d.id,
                name: d.display_name(),
                specialty: d.specialty.clone(),
            })
            .collect();

        Ok(summaries)
    }

    /// Enumerate free slots for a date.
    ///
    /// When both `doctor` and `specialty` are given, the doctor filter wins.
    /// Slots are chronological within each doctor, but doctors appear in
    /// query order; callers needing one global time ordering must sort the
    /// result themselves.
    pub async fn available_slots(
        &self,
        entity_id: Uuid,
        date: NaiveDate,
        specialty: Option<&str>,
        doctor: Option<Uuid>,
    ) -> Result<Vec<AvailableSlot>, SchedulingError> {
        let doctors: Vec<Doctor> = match doctor {
            Some(doctor_id) => self
                .store
                .doctor(doctor_id)
                .await?
                .into_iter()
                .filter(|d| d.entity_id == entity_id)
                .collect(),
            None => {
                let needle = specialty.map(|s| s.trim().to_lowercase());
                self.store
                    .doctors_for_entity(entity_id)
                    .await?
                    .into_iter()
                    .filter(|d| match &needle {
                        Some(needle) if !needle.is_empty() => d
                            .specialty
                            .as_deref()
                            .map(|s| s.to_lowercase().contains(needle))
                            .unwrap_or(false),
                        _ => true,
                    })
                    .collect()
            }
        };

        let mut available = Vec::new();

        for doctor in doctors.iter().filter(|d| d.is_active) {
            let windows = self.store.time_slots_for_doctor(doctor.id).await?;
            let taken: Vec<_> = self
                .store
                .appointments_on(doctor.id, date)
                .await?
                .iter()
                .map(|a| (a.start_time, a.end_time))
                .collect();

            for window in windows.iter().filter(|w| window_applies(w, date)) {
                for (start, end) in free_intervals(
                    date,
                    window.start_time,
                    window.end_time,
                    doctor.consultation_minutes,
                    &taken,
                ) {
                    available.push(AvailableSlot {
                        doctor_id: doctor.id,
                        doctor_name: doctor.display_name(),
                        specialty: doctor.specialty.clone(),
                        date,
                        start_time: start,
                        end_time: end,
                    });
                }
            }
        }

        tracing::debug!(
            entity_id = %entity_id,
            date = %date,
            slots = available.len(),
            "Computed available slots"
        );

        Ok(available)
    }

    /// Book an appointment.
    ///
    /// The end time is recomputed from the doctor's consultation duration and
    /// the interval is re-validated against current bookings at commit time,
    /// inside the store's atomic check-and-insert. A lost race yields a
    /// rejection with no side effect.
    pub async fn book(&self, request: BookingRequest) -> Result<BookingOutcome, SchedulingError> {
        let doctor = self
            .store
            .doctor(request.doctor_id)
            .await?
            .filter(|d| d.entity_id == request.entity_id);
        let Some(doctor) = doctor else {
            return Ok(BookingOutcome::Rejected {
                message: "Médecin non trouvé".to_string(),
            });
        };

        let start = request.date.and_time(request.start_time);
        let end = start + Duration::minutes(i64::from(doctor.consultation_minutes));
        if end.date() != request.date {
            return Ok(BookingOutcome::Rejected {
                message: "Ce créneau n'est plus disponible".to_string(),
            });
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            session_id: request.session_id,
            patient_name: request.patient_name,
            patient_phone: request.patient_phone,
            patient_email: request.patient_email,
            reason: request.reason,
            date: request.date,
            start_time: request.start_time,
            end_time: end.time(),
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        };

        match self.store.create_if_free(appointment).await? {
            BookAttempt::Created(appointment) => {
                tracing::info!(
                    appointment_id = %appointment.id,
                    doctor = %doctor.display_name(),
                    date = %appointment.date,
                    start = %appointment.start_time,
                    "Appointment booked"
                );
                Ok(BookingOutcome::Confirmed {
                    doctor_name: doctor.display_name(),
                    message: format!(
                        "Votre rendez-vous avec {} est confirmé.",
                        doctor.display_name()
                    ),
                    appointment,
                })
            }
            BookAttempt::Conflict => {
                tracing::info!(
                    doctor = %doctor.display_name(),
                    date = %request.date,
                    start = %request.start_time,
                    "Booking rejected: slot taken at commit time"
                );
                Ok(BookingOutcome::Rejected {
                    message: "Ce créneau n'est plus disponible".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySchedulingStore;
    use crate::types::TimeSlot;
    use chrono::{NaiveTime, Weekday};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()
    }

    fn doctor(entity_id: Uuid, specialty: &str, minutes: u32) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            entity_id,
            first_name: "Awa".to_string(),
            last_name: "Ndiaye".to_string(),
            specialty: Some(specialty.to_string()),
            is_active: true,
            consultation_minutes: minutes,
        }
    }

    fn booking(entity_id: Uuid, doctor_id: Uuid, date: NaiveDate, start: NaiveTime) -> BookingRequest {
        BookingRequest {
            entity_id,
            doctor_id,
            session_id: None,
            patient_name: "Moussa Diop".to_string(),
            patient_phone: "+221770000002".to_string(),
            patient_email: None,
            reason: Some("Consultation".to_string()),
            date,
            start_time: start,
        }
    }

    fn setup() -> (Arc<MemorySchedulingStore>, AppointmentScheduler, Doctor, Uuid) {
        let entity_id = Uuid::new_v4();
        let store = Arc::new(MemorySchedulingStore::new());
        let doc = doctor(entity_id, "Cardiologie", 30);
        store.add_doctor(doc.clone());
        store.add_time_slot(TimeSlot::weekly(doc.id, Weekday::Mon, t(9, 0), t(11, 0)));
        let scheduler = AppointmentScheduler::new(store.clone());
        (store, scheduler, doc, entity_id)
    }

    #[tokio::test]
    async fn test_monday_window_yields_four_slots() {
        let (_store, scheduler, doc, entity_id) = setup();

        let slots = scheduler
            .available_slots(entity_id, monday(), None, None)
            .await
            .unwrap();

        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start_time, t(9, 0));
        assert_eq!(slots[0].end_time, t(9, 30));
        assert_eq!(slots[3].start_time, t(10, 30));
        assert_eq!(slots[3].end_time, t(11, 0));
        assert!(slots.iter().all(|s| s.doctor_id == doc.id));
    }

    #[tokio::test]
    async fn test_no_slots_on_other_weekday() {
        let (_store, scheduler, _doc, entity_id) = setup();
        // 2026-08-11 is a Tuesday.
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 11).unwrap();
        let slots = scheduler
            .available_slots(entity_id, tuesday, None, None)
            .await
            .unwrap();
        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn test_booked_slot_disappears() {
        let (_store, scheduler, doc, entity_id) = setup();

        let outcome = scheduler.book(booking(entity_id, doc.id, monday(), t(9, 30))).await.unwrap();
        assert!(outcome.is_confirmed());

        let slots = scheduler
            .available_slots(entity_id, monday(), None, None)
            .await
            .unwrap();
        assert_eq!(slots.len(), 3);
        assert!(!slots.iter().any(|s| s.start_time == t(9, 30)));
    }

    #[tokio::test]
    async fn test_book_recomputes_end_time() {
        let (store, scheduler, doc, entity_id) = setup();

        let outcome = scheduler.book(booking(entity_id, doc.id, monday(), t(10, 0))).await.unwrap();
        let BookingOutcome::Confirmed { appointment, .. } = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(appointment.end_time, t(10, 30));
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(store.appointment_count(), 1);
    }

    #[tokio::test]
    async fn test_book_unknown_doctor_rejected() {
        let (_store, scheduler, _doc, entity_id) = setup();

        let outcome = scheduler
            .book(booking(entity_id, Uuid::new_v4(), monday(), t(9, 0)))
            .await
            .unwrap();
        let BookingOutcome::Rejected { message } = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(message, "Médecin non trouvé");
    }

    #[tokio::test]
    async fn test_double_booking_rejected_without_side_effect() {
        let (store, scheduler, doc, entity_id) = setup();

        let first = scheduler.book(booking(entity_id, doc.id, monday(), t(9, 0))).await.unwrap();
        assert!(first.is_confirmed());

        let second = scheduler.book(booking(entity_id, doc.id, monday(), t(9, 0))).await.unwrap();
        let BookingOutcome::Rejected { message } = second else {
            panic!("expected rejection");
        };
        assert_eq!(message, "Ce créneau n'est plus disponible");
        assert_eq!(store.appointment_count(), 1);
    }

    #[tokio::test]
    async fn test_book_doctor_of_other_entity_rejected() {
        let (_store, scheduler, doc, _entity_id) = setup();

        let mut request = booking(Uuid::new_v4(), doc.id, monday(), t(9, 0));
        request.session_id = None;
        let outcome = scheduler.book(request).await.unwrap();
        let BookingOutcome::Rejected { message } = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(message, "Médecin non trouvé");
    }

    #[tokio::test]
    async fn test_concurrent_bookings_exactly_one_winner() {
        let (store, scheduler, doc, entity_id) = setup();
        let scheduler = Arc::new(scheduler);

        let mut handles = Vec::new();
        for _ in 0..6 {
            let scheduler = scheduler.clone();
            let doctor_id = doc.id;
            handles.push(tokio::spawn(async move {
                scheduler
                    .book(booking(entity_id, doctor_id, monday(), t(9, 0)))
                    .await
                    .unwrap()
            }));
        }

        let mut confirmed = 0;
        for handle in handles {
            if handle.await.unwrap().is_confirmed() {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);
        assert_eq!(store.appointment_count(), 1);
    }

    #[tokio::test]
    async fn test_search_doctors_specialty_substring() {
        let (store, scheduler, _doc, entity_id) = setup();
        let mut other = doctor(entity_id, "Pédiatrie", 20);
        other.first_name = "Cheikh".to_string();
        store.add_doctor(other);

        let all = scheduler.search_doctors(entity_id, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let cardio = scheduler
            .search_doctors(entity_id, Some("cardio"))
            .await
            .unwrap();
        assert_eq!(cardio.len(), 1);
        assert_eq!(cardio[0].specialty.as_deref(), Some("Cardiologie"));

        let none = scheduler
            .search_doctors(entity_id, Some("dermato"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_inactive_doctor_excluded() {
        let (store, scheduler, _doc, entity_id) = setup();
        let mut inactive = doctor(entity_id, "Cardiologie", 30);
        inactive.is_active = false;
        store.add_doctor(inactive);

        let found = scheduler.search_doctors(entity_id, None).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_doctor_filter_wins_over_specialty() {
        let (store, scheduler, doc, entity_id) = setup();
        let other = doctor(entity_id, "Pédiatrie", 30);
        store.add_doctor(other.clone());
        store.add_time_slot(TimeSlot::weekly(other.id, Weekday::Mon, t(14, 0), t(15, 0)));

        // Specialty would match the pediatrician, but the explicit doctor id
        // restricts the search to the cardiologist.
        let slots = scheduler
            .available_slots(entity_id, monday(), Some("Pédiatrie"), Some(doc.id))
            .await
            .unwrap();
        assert!(slots.iter().all(|s| s.doctor_id == doc.id));
        assert_eq!(slots.len(), 4);
    }
}
