//! Patient profile endpoints.
//!
//! - `GET /api/patient-profile` — fetch (and lazily create) a profile
//! - `PATCH /api/patient-profile` — update fields; the barcode is
//!   immutable and any attempt to send one is rejected outright

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::identity::Role;
use crate::models::PatientProfile;
use crate::profiles::{self, ProfileUpdate};

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: PatientProfile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    #[serde(default)]
    pub patient_id: Option<String>,
}

/// `GET /api/patient-profile` — a patient reads their own profile; a
/// doctor passes `?patientId=` to read a patient's.
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let subject = match caller.user.role {
        Role::Patient => caller.user,
        Role::Doctor => {
            let patient_id = query
                .patient_id
                .ok_or_else(|| ApiError::BadRequest("Paramètre patientId requis".into()))?;
            ctx.identity
                .get_user(&patient_id)?
                .filter(|u| u.role == Role::Patient)
                .ok_or_else(|| ApiError::NotFound(format!("Patient introuvable: {patient_id}")))?
        }
    };

    let profile = profiles::get_or_create(ctx.store.as_ref(), &subject)?;
    Ok(Json(ProfileResponse { profile }))
}

/// `PATCH /api/patient-profile` — a patient updates their own profile.
/// A payload naming `barcode` is rejected before any write.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if caller.user.role != Role::Patient {
        return Err(ApiError::Forbidden(
            "Seul le patient peut modifier son profil".into(),
        ));
    }
    if body.get("barcode").is_some() {
        return Err(ApiError::BadRequest(
            "Le code-barres ne peut pas être modifié".into(),
        ));
    }

    let update: ProfileUpdate = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Corps de requête invalide: {e}")))?;

    // First PATCH may arrive before any GET; make sure the profile exists.
    profiles::get_or_create(ctx.store.as_ref(), &caller.user)?;
    let profile = profiles::update(ctx.store.as_ref(), &caller.user.id, update)?;
    Ok(Json(ProfileResponse { profile }))
}
