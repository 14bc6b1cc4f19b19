//! Patient directory endpoint, for the doctor dashboard.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::identity::Role;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<PatientSummary>,
}

/// `GET /api/patients` — every registered patient. Doctors only.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<PatientsResponse>, ApiError> {
    if caller.user.role != Role::Doctor {
        return Err(ApiError::Forbidden("Accès réservé aux docteurs".into()));
    }

    let patients = ctx
        .identity
        .find_by_role(Role::Patient)?
        .into_iter()
        .map(|u| PatientSummary {
            name: u.display_name(),
            id: u.id,
            email: u.email,
            image_url: u.image_url,
        })
        .collect();
    Ok(Json(PatientsResponse { patients }))
}
