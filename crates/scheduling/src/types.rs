//! Scheduling domain types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A practitioner that can be booked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<String>,
    pub is_active: bool,
    /// Fixed consultation duration in minutes; every bookable slot has
    /// exactly this length
    pub consultation_minutes: u32,
}

impl Doctor {
    /// Display name as shown to patients
    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

/// When an availability window recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRule {
    /// Applies every week on the given weekday
    Weekly(Weekday),
    /// Applies on one specific date only
    Dated(NaiveDate),
}

/// An availability window of a doctor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub rule: SlotRule,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl TimeSlot {
    pub fn weekly(doctor_id: Uuid, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            rule: SlotRule::Weekly(weekday),
            start_time: start,
            end_time: end,
            is_active: true,
        }
    }

    pub fn dated(doctor_id: Uuid, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            rule: SlotRule::Dated(date),
            start_time: start,
            end_time: end,
            is_active: true,
        }
    }
}

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A booked appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub session_id: Option<Uuid>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub reason: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment still occupies its interval
    pub fn blocks_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

/// A bookable interval, computed on demand and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub specialty: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A booking request from the tool surface
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub entity_id: Uuid,
    pub doctor_id: Uuid,
    pub session_id: Option<Uuid>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub reason: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

/// Doctor search result row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub doctor_id: Uuid,
    pub name: String,
    pub specialty: Option<String>,
}
