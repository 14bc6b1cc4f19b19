//! Doctor directory endpoint.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::identity::Role;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<DoctorSummary>,
}

/// `GET /api/doctors` — every registered doctor, with a specialty
/// label even when none was declared.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_caller): Extension<CallerContext>,
) -> Result<Json<DoctorsResponse>, ApiError> {
    let doctors = ctx
        .identity
        .find_by_role(Role::Doctor)?
        .into_iter()
        .map(|u| {
            let name = u.display_name();
            let specialty = u.primary_specialty();
            DoctorSummary {
                id: u.id,
                email: u.email,
                bio: format!("Dr. {name}, spécialiste en {specialty}"),
                name,
                specialty,
                image_url: u.image_url,
            }
        })
        .collect();
    Ok(Json(DoctorsResponse { doctors }))
}
