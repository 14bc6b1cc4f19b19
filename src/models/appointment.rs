use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A requested or scheduled meeting between a patient and a doctor at
/// a specific date and time.
///
/// Created in `pending` by a patient booking; a doctor moves it to
/// `confirmed` or `cancelled` exactly once. `completed` is a derived
/// display label (date in the past), never a stored transition.
/// Appointments are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub doctor_email: String,
    pub specialty: String,
    pub appointment_date: NaiveDate,
    /// Time-of-day as `HH:MM`, no timezone modeling.
    pub appointment_time: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment blocks the given doctor slot.
    /// Cancelled appointments free their slot.
    pub fn occupies(&self, doctor_id: &str, date: NaiveDate, time: &str) -> bool {
        self.doctor_id == doctor_id
            && self.appointment_date == date
            && self.appointment_time == time
            && self.status != AppointmentStatus::Cancelled
    }
}
