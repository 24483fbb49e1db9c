//! Appointment tool family
//!
//! Mirrors the scheduler operations one-to-one. Every tool validates
//! required fields first and answers with a structured failure payload the
//! model can relay conversationally; nothing here throws for bad model
//! input.

use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::tool::{check_required_fields, Tool, ToolError, ToolOutput};
use crate::registry::ToolRegistry;
use tontouma_core::llm_types::ToolDefinition;
use tontouma_llm::ToolBuilder;
use tontouma_scheduling::{
    resolve_spoken_date, AppointmentScheduler, BookingOutcome, BookingRequest, DateResolution,
};

/// Context field injected by the dialogue engine
const ENTITY_FIELD: &str = "entity_id";
/// Context field injected by the dialogue engine
const SESSION_FIELD: &str = "session_id";

fn entity_from_context(input: &Value) -> Result<Uuid, ToolError> {
    input
        .get(ENTITY_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ToolError::execution("request context is missing entity_id"))
}

fn session_from_context(input: &Value) -> Option<Uuid> {
    input
        .get(SESSION_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Search active doctors, optionally by specialty
pub struct SearchDoctorsTool {
    scheduler: Arc<AppointmentScheduler>,
}

impl SearchDoctorsTool {
    pub fn new(scheduler: Arc<AppointmentScheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl Tool for SearchDoctorsTool {
    fn name(&self) -> &str {
        "search_doctors"
    }

    fn definition(&self) -> ToolDefinition {
        ToolBuilder::new(
            "search_doctors",
            "Rechercher les médecins disponibles, éventuellement filtrés par spécialité",
        )
        .param(
            "specialty",
            "string",
            "Nom (ou partie du nom) de la spécialité recherchée",
            false,
        )
        .build()
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let entity_id = entity_from_context(&input)?;
        let specialty = input.get("specialty").and_then(Value::as_str);

        let doctors = self
            .scheduler
            .search_doctors(entity_id, specialty)
            .await
            .map_err(|e| ToolError::execution(e.to_string()))?;

        let rows: Vec<Value> = doctors
            .iter()
            .map(|d| {
                json!({
                    "doctor_id": d.doctor_id.to_string(),
                    "name": d.name,
                    "specialty": d.specialty,
                })
            })
            .collect();

        Ok(ToolOutput::json(json!({
            "success": true,
            "count": rows.len(),
            "doctors": rows,
        })))
    }
}

/// List free slots for a date
pub struct AvailableSlotsTool {
    scheduler: Arc<AppointmentScheduler>,
}

impl AvailableSlotsTool {
    pub fn new(scheduler: Arc<AppointmentScheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl Tool for AvailableSlotsTool {
    fn name(&self) -> &str {
        "get_available_slots"
    }

    fn definition(&self) -> ToolDefinition {
        ToolBuilder::new(
            "get_available_slots",
            "Lister les créneaux de rendez-vous disponibles pour une date donnée",
        )
        .param(
            "date",
            "string",
            "Date souhaitée (AAAA-MM-JJ ou une expression comme 'demain', 'lundi prochain')",
            true,
        )
        .param(
            "specialty",
            "string",
            "Spécialité recherchée (facultatif)",
            false,
        )
        .param(
            "doctor_id",
            "string",
            "Identifiant du médecin si déjà choisi (facultatif)",
            false,
        )
        .build()
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        if let Some(failure) = check_required_fields(&input, &["date"]) {
            return Ok(failure);
        }
        let entity_id = entity_from_context(&input)?;

        let date_text = input.get("date").and_then(Value::as_str).unwrap_or("");
        let date = match resolve_spoken_date(date_text, Utc::now().date_naive()) {
            DateResolution::Resolved(date) => date,
            DateResolution::Unrecognized(original) => {
                return Ok(ToolOutput::failure(format!(
                    "Je n'ai pas compris la date « {} ». Pouvez-vous la préciser, par exemple au format AAAA-MM-JJ ?",
                    original
                )));
            }
        };

        let specialty = input.get("specialty").and_then(Value::as_str);
        let doctor = input
            .get("doctor_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok());

        let slots = self
            .scheduler
            .available_slots(entity_id, date, specialty, doctor)
            .await
            .map_err(|e| ToolError::execution(e.to_string()))?;

        let rows: Vec<Value> = slots
            .iter()
            .map(|s| {
                json!({
                    "doctor_id": s.doctor_id.to_string(),
                    "doctor_name": s.doctor_name,
                    "specialty": s.specialty,
                    "date": s.date.to_string(),
                    "start_time": s.start_time.format("%H:%M").to_string(),
                    "end_time": s.end_time.format("%H:%M").to_string(),
                })
            })
            .collect();

        Ok(ToolOutput::json(json!({
            "success": true,
            "date": date.to_string(),
            "count": rows.len(),
            "slots": rows,
        })))
    }
}

/// Book an appointment
pub struct BookAppointmentTool {
    scheduler: Arc<AppointmentScheduler>,
}

impl BookAppointmentTool {
    pub fn new(scheduler: Arc<AppointmentScheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl Tool for BookAppointmentTool {
    fn name(&self) -> &str {
        "book_appointment"
    }

    fn definition(&self) -> ToolDefinition {
        ToolBuilder::new(
            "book_appointment",
            "Réserver un rendez-vous médical sur un créneau disponible",
        )
        .param("doctor_id", "string", "Identifiant du médecin", true)
        .param(
            "date",
            "string",
            "Date du rendez-vous (AAAA-MM-JJ ou expression comme 'demain')",
            true,
        )
        .param("start_time", "string", "Heure de début (HH:MM)", true)
        .param("patient_name", "string", "Nom complet du patient", true)
        .param(
            "patient_phone",
            "string",
            "Numéro de téléphone du patient",
            true,
        )
        .param("patient_email", "string", "Adresse e-mail (facultatif)", false)
        .param("reason", "string", "Motif de la consultation (facultatif)", false)
        .build()
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        if let Some(failure) = check_required_fields(
            &input,
            &[
                "doctor_id",
                "date",
                "start_time",
                "patient_name",
                "patient_phone",
            ],
        ) {
            return Ok(failure);
        }
        let entity_id = entity_from_context(&input)?;

        let doctor_text = input.get("doctor_id").and_then(Value::as_str).unwrap_or("");
        let Ok(doctor_id) = Uuid::parse_str(doctor_text) else {
            return Ok(ToolOutput::failure(
                "Identifiant de médecin invalide. Utilisez search_doctors pour obtenir un identifiant valide.",
            ));
        };

        let today = Utc::now().date_naive();
        let date_text = input.get("date").and_then(Value::as_str).unwrap_or("");
        let date = match resolve_spoken_date(date_text, today) {
            DateResolution::Resolved(date) => date,
            DateResolution::Unrecognized(original) => {
                return Ok(ToolOutput::failure(format!(
                    "Je n'ai pas compris la date « {} ». Pouvez-vous la préciser, par exemple au format AAAA-MM-JJ ?",
                    original
                )));
            }
        };
        if date < today {
            return Ok(ToolOutput::failure(
                "La date demandée est déjà passée. Veuillez choisir une date à venir.",
            ));
        }

        let time_text = input.get("start_time").and_then(Value::as_str).unwrap_or("");
        let Some(start_time) = parse_time(time_text) else {
            return Ok(ToolOutput::failure(format!(
                "Je n'ai pas compris l'heure « {} ». Utilisez le format HH:MM.",
                time_text
            )));
        };

        let request = BookingRequest {
            entity_id,
            doctor_id,
            session_id: session_from_context(&input),
            patient_name: input
                .get("patient_name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            patient_phone: input
                .get("patient_phone")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            patient_email: input
                .get("patient_email")
                .and_then(Value::as_str)
                .map(str::to_string),
            reason: input
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string),
            date,
            start_time,
        };

        let outcome = self
            .scheduler
            .book(request)
            .await
            .map_err(|e| ToolError::execution(e.to_string()))?;

        let output = match outcome {
            BookingOutcome::Confirmed {
                appointment,
                doctor_name,
                message,
            } => ToolOutput::json(json!({
                "success": true,
                "appointment_id": appointment.id.to_string(),
                "doctor_name": doctor_name,
                "date": appointment.date.to_string(),
                "start_time": appointment.start_time.format("%H:%M").to_string(),
                "end_time": appointment.end_time.format("%H:%M").to_string(),
                "status": appointment.status.as_str(),
                "message": message,
            })),
            BookingOutcome::Rejected { message } => ToolOutput::failure(message),
        };

        Ok(output)
    }

    fn timeout_secs(&self) -> u64 {
        60
    }
}

/// Build the registry of appointment tools around one scheduler.
pub fn scheduling_registry(scheduler: Arc<AppointmentScheduler>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(SearchDoctorsTool::new(scheduler.clone()));
    registry.register(AvailableSlotsTool::new(scheduler.clone()));
    registry.register(BookAppointmentTool::new(scheduler));

    tracing::info!(tools = registry.len(), "Created scheduling tool registry");
    registry
}
