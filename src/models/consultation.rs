use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// Confirmed-appointment record used for doctor-side patient tracking.
/// Created exactly once when an appointment transitions to `confirmed`;
/// read-only afterward. `status` is always `confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: String,
    /// Originating appointment; at most one consultation per appointment.
    pub appointment_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub confirmed_at: DateTime<Utc>,
}
