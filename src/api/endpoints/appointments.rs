//! Appointment endpoints.
//!
//! - `POST /api/appointments` — book a slot (patient)
//! - `GET /api/appointments` — list, scoped to the caller's side
//! - `PATCH /api/appointments/:id` — confirm or decline (doctor)

use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::identity::Role;
use crate::models::Appointment;
use crate::scheduling::{self, BookingRequest};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookBody {
    pub doctor_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub appointment: Appointment,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `POST /api/appointments` — book a pending appointment.
pub async fn book(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<BookBody>,
) -> Result<(axum::http::StatusCode, Json<AppointmentResponse>), ApiError> {
    let request = BookingRequest {
        doctor_id: body.doctor_id,
        appointment_date: body.appointment_date,
        appointment_time: body.appointment_time,
        reason: body.reason,
    };
    let appointment =
        scheduling::book_appointment(ctx.store.as_ref(), ctx.identity.as_ref(), &caller.user, &request)?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(AppointmentResponse { appointment }),
    ))
}

/// `GET /api/appointments` — the caller's appointments, oldest first.
/// Doctors see appointments addressed to them, patients the ones they
/// booked.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let appointments = match caller.user.role {
        Role::Doctor => scheduling::doctor_appointments(ctx.store.as_ref(), &caller.user.id)?,
        Role::Patient => scheduling::patient_appointments(ctx.store.as_ref(), &caller.user.id)?,
    };
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// `PATCH /api/appointments/:id` — apply the doctor's decision. Only
/// the appointment's own doctor may call this.
pub async fn set_status(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(appointment_id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let appointment = scheduling::set_appointment_status(
        ctx.store.as_ref(),
        &caller.user,
        &appointment_id,
        &body.status,
    )?;
    Ok(Json(AppointmentResponse { appointment }))
}
