use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Sex;

/// Extended patient profile, 1:1 with an identity-provider user.
/// Lazily created on first read; the `barcode` identifier code is
/// assigned at creation and can never be altered by any update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub patient_id: String,
    pub bio: String,
    pub sex: Sex,
    /// `YYYY-MM-DD`, empty until the patient fills it in.
    pub birthdate: String,
    pub address: String,
    pub notes: String,
    pub barcode: String,
    pub nationality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
