//! Consultation record endpoint.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::identity::Role;
use crate::models::Consultation;
use crate::store::{Collection, CONSULTATIONS};

#[derive(Serialize)]
pub struct ConsultationsResponse {
    pub consultations: Vec<Consultation>,
}

/// `GET /api/consultations` — confirmed consultations on the caller's
/// side, oldest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<ConsultationsResponse>, ApiError> {
    let caller_id = caller.user.id.clone();
    let consultations = Collection::new(ctx.store.as_ref(), CONSULTATIONS).find(
        |c: &Consultation| match caller.user.role {
            Role::Doctor => c.doctor_id == caller_id,
            Role::Patient => c.patient_id == caller_id,
        },
    )?;
    Ok(Json(ConsultationsResponse { consultations }))
}
