//! Notification fan-out — turns an appointment lifecycle event into
//! the derived records the counter-party sees: a message in the inbox,
//! and on confirmation a consultation.
//!
//! Called in-process by the appointment service; there is no queue and
//! no retry. All user-visible wording is French.

use chrono::Utc;

use crate::ids;
use crate::models::{
    Appointment, AppointmentStatus, Consultation, Message, MessageKind, SenderRole,
};
use crate::store::{Collection, RecordStore, StoreError, TypedAppendOutcome, CONSULTATIONS, MESSAGES};

/// Doctor decision on a pending appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Cancelled,
}

impl Decision {
    pub fn as_status(&self) -> AppointmentStatus {
        match self {
            Decision::Confirmed => AppointmentStatus::Confirmed,
            Decision::Cancelled => AppointmentStatus::Cancelled,
        }
    }
}

/// Message to the doctor when a patient requests an appointment.
pub fn appointment_requested(
    store: &dyn RecordStore,
    appointment: &Appointment,
) -> Result<Message, StoreError> {
    let reason = appointment.reason.as_deref().unwrap_or("Non spécifiée");
    let message = Message {
        id: ids::message_id(),
        sender: appointment.patient_name.clone(),
        sender_type: SenderRole::Patient,
        sender_email: Some(appointment.patient_email.clone()),
        sender_id: Some(appointment.patient_id.clone()),
        subject: format!("Demande de rendez-vous - {}", appointment.patient_name),
        content: format!(
            "Le patient {} a demandé un rendez-vous.\n\nDate: {}\nHeure: {}\nRaison: {}\n\nContact: {}",
            appointment.patient_name,
            appointment.appointment_date,
            appointment.appointment_time,
            reason,
            appointment.patient_email,
        ),
        timestamp: Utc::now(),
        is_read: false,
        is_starred: false,
        message_type: MessageKind::AppointmentRequest,
        recipient_id: appointment.doctor_id.clone(),
    };
    Collection::new(store, MESSAGES).append(&message)
}

/// Message to the patient when the doctor confirms or declines.
pub fn appointment_decision(
    store: &dyn RecordStore,
    appointment: &Appointment,
    decision: Decision,
) -> Result<Message, StoreError> {
    let (subject, content) = match decision {
        Decision::Confirmed => (
            "Rendez-vous confirmé ✓".to_string(),
            format!(
                "Votre rendez-vous du {} à {} avec le Dr. {} a été confirmé. \
                 Vous recevrez bientôt plus de détails sur le lieu et les modalités.",
                appointment.appointment_date,
                appointment.appointment_time,
                appointment.doctor_name,
            ),
        ),
        Decision::Cancelled => (
            "Rendez-vous refusé".to_string(),
            format!(
                "Votre demande de rendez-vous du {} à {} a été refusée par le docteur. \
                 Vous pouvez demander un autre rendez-vous avec un autre docteur.",
                appointment.appointment_date, appointment.appointment_time,
            ),
        ),
    };

    let message = Message {
        id: ids::message_id(),
        sender: appointment.doctor_name.clone(),
        sender_type: SenderRole::Doctor,
        sender_email: Some(appointment.doctor_email.clone()),
        sender_id: Some(appointment.doctor_id.clone()),
        subject,
        content,
        timestamp: Utc::now(),
        is_read: false,
        is_starred: false,
        message_type: MessageKind::AppointmentConfirmation,
        recipient_id: appointment.patient_id.clone(),
    };
    Collection::new(store, MESSAGES).append(&message)
}

/// Persist the consultation for a confirmed appointment. At most one
/// per appointment: a second call returns the existing record.
pub fn record_consultation(
    store: &dyn RecordStore,
    appointment: &Appointment,
) -> Result<Consultation, StoreError> {
    let consultation = Consultation {
        id: ids::consultation_id(),
        appointment_id: appointment.id.clone(),
        patient_id: appointment.patient_id.clone(),
        patient_name: appointment.patient_name.clone(),
        patient_email: appointment.patient_email.clone(),
        doctor_id: appointment.doctor_id.clone(),
        doctor_name: appointment.doctor_name.clone(),
        appointment_date: appointment.appointment_date,
        appointment_time: appointment.appointment_time.clone(),
        reason: appointment.reason.clone(),
        status: AppointmentStatus::Confirmed,
        confirmed_at: Utc::now(),
    };

    let appointment_id = appointment.id.clone();
    let outcome = Collection::new(store, CONSULTATIONS)
        .append_unless(|c: &Consultation| c.appointment_id == appointment_id, &consultation)?;
    Ok(match outcome {
        TypedAppendOutcome::Appended(c) | TypedAppendOutcome::Conflict(c) => c,
    })
}
