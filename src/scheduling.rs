//! Appointment lifecycle — booking, slot-conflict detection and the
//! doctor decision step.
//!
//! Booking snapshots both parties' names and emails into the
//! appointment at write time; later directory edits do not rewrite
//! history. A slot is `(doctorId, date, time)` and is held by any
//! appointment that is not cancelled.

use chrono::{NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::identity::{IdentityError, IdentityGateway, Role, UserAccount};
use crate::ids;
use crate::models::{Appointment, AppointmentStatus};
use crate::notify::{self, Decision};
use crate::store::{Collection, RecordStore, StoreError, TypedAppendOutcome, APPOINTMENTS};

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Ce créneau est déjà réservé pour le Dr. {doctor_name} le {date} à {time}")]
    SlotTaken {
        doctor_name: String,
        date: NaiveDate,
        time: String,
    },

    #[error("Docteur introuvable: {0}")]
    DoctorNotFound(String),

    #[error("Rendez-vous introuvable: {0}")]
    AppointmentNotFound(String),

    #[error("Statut invalide: {0}")]
    InvalidStatus(String),

    #[error("Action réservée au docteur du rendez-vous")]
    DecisionNotAllowed,

    #[error("Le rendez-vous {0} a déjà été traité")]
    AlreadyDecided(String),

    #[error("Heure invalide: {0}")]
    InvalidTime(String),

    /// The appointment write succeeded but a fan-out write did not.
    /// The appointment is kept; the caller decides how to surface it.
    #[error("Rendez-vous {appointment_id} enregistré mais la notification a échoué")]
    NotificationFailed {
        appointment_id: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// What a patient submits to book a slot.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub appointment_date: NaiveDate,
    /// `"HH:MM"`, validated before any write.
    pub appointment_time: String,
    pub reason: Option<String>,
}

/// Book a pending appointment for `patient` and notify the doctor.
///
/// The conflict check and the insert are one atomic store operation,
/// so two patients racing for the same slot cannot both win.
pub fn book_appointment(
    store: &dyn RecordStore,
    identity: &dyn IdentityGateway,
    patient: &UserAccount,
    request: &BookingRequest,
) -> Result<Appointment, SchedulingError> {
    if NaiveTime::parse_from_str(&request.appointment_time, "%H:%M").is_err() {
        return Err(SchedulingError::InvalidTime(request.appointment_time.clone()));
    }

    let doctor = identity
        .get_user(&request.doctor_id)?
        .filter(|u| u.role == Role::Doctor)
        .ok_or_else(|| SchedulingError::DoctorNotFound(request.doctor_id.clone()))?;

    let appointment = Appointment {
        id: ids::appointment_id(),
        patient_id: patient.id.clone(),
        patient_name: patient.display_name(),
        patient_email: patient.email.clone(),
        doctor_id: doctor.id.clone(),
        doctor_name: doctor.display_name(),
        doctor_email: doctor.email.clone(),
        specialty: doctor.primary_specialty(),
        appointment_date: request.appointment_date,
        appointment_time: request.appointment_time.clone(),
        status: AppointmentStatus::Pending,
        reason: request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from),
        created_at: Utc::now(),
    };

    let doctor_id = doctor.id.clone();
    let date = request.appointment_date;
    let time = request.appointment_time.clone();
    let outcome = Collection::new(store, APPOINTMENTS).append_unless(
        |existing: &Appointment| existing.occupies(&doctor_id, date, &time),
        &appointment,
    )?;
    let appointment = match outcome {
        TypedAppendOutcome::Appended(apt) => apt,
        TypedAppendOutcome::Conflict(_) => {
            return Err(SchedulingError::SlotTaken {
                doctor_name: doctor.display_name(),
                date,
                time,
            })
        }
    };

    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        date = %appointment.appointment_date,
        time = %appointment.appointment_time,
        "appointment booked"
    );

    if let Err(source) = notify::appointment_requested(store, &appointment) {
        tracing::error!(appointment_id = %appointment.id, error = %source, "request notification failed");
        return Err(SchedulingError::NotificationFailed {
            appointment_id: appointment.id,
            source,
        });
    }

    Ok(appointment)
}

/// Apply the doctor's decision to an appointment and fan out the
/// follow-up records. Only `confirmed` and `cancelled` are accepted,
/// only the appointment's own doctor may decide, and only a `pending`
/// appointment accepts a decision (the transition happens exactly
/// once).
pub fn set_appointment_status(
    store: &dyn RecordStore,
    doctor: &UserAccount,
    appointment_id: &str,
    status: &str,
) -> Result<Appointment, SchedulingError> {
    let decision = match status {
        "confirmed" => Decision::Confirmed,
        "cancelled" => Decision::Cancelled,
        other => return Err(SchedulingError::InvalidStatus(other.to_string())),
    };

    let appointments = Collection::<Appointment>::new(store, APPOINTMENTS);
    let appointment = appointments
        .find(|apt| apt.id == appointment_id)?
        .into_iter()
        .next()
        .ok_or_else(|| SchedulingError::AppointmentNotFound(appointment_id.to_string()))?;

    if doctor.role != Role::Doctor || appointment.doctor_id != doctor.id {
        return Err(SchedulingError::DecisionNotAllowed);
    }
    if appointment.status != AppointmentStatus::Pending {
        return Err(SchedulingError::AlreadyDecided(appointment_id.to_string()));
    }

    // Predicate re-checks `pending` so a racing decision cannot apply twice.
    let updated = appointments
        .update_where(
            |apt| apt.id == appointment_id && apt.status == AppointmentStatus::Pending,
            serde_json::json!({ "status": decision.as_status().as_str() }),
        )?
        .ok_or_else(|| SchedulingError::AlreadyDecided(appointment_id.to_string()))?;

    tracing::info!(
        appointment_id = %updated.id,
        status = decision.as_status().as_str(),
        "appointment status updated"
    );

    let fan_out = notify::appointment_decision(store, &updated, decision).and_then(|_| {
        if decision == Decision::Confirmed {
            notify::record_consultation(store, &updated).map(|_| ())
        } else {
            Ok(())
        }
    });
    if let Err(source) = fan_out {
        tracing::error!(appointment_id = %updated.id, error = %source, "decision fan-out failed");
        return Err(SchedulingError::NotificationFailed {
            appointment_id: updated.id,
            source,
        });
    }

    Ok(updated)
}

/// Appointments addressed to a doctor, oldest first.
pub fn doctor_appointments(
    store: &dyn RecordStore,
    doctor_id: &str,
) -> Result<Vec<Appointment>, SchedulingError> {
    Ok(Collection::new(store, APPOINTMENTS).find(|apt: &Appointment| apt.doctor_id == doctor_id)?)
}

/// Appointments booked by a patient, oldest first.
pub fn patient_appointments(
    store: &dyn RecordStore,
    patient_id: &str,
) -> Result<Vec<Appointment>, SchedulingError> {
    Ok(Collection::new(store, APPOINTMENTS).find(|apt: &Appointment| apt.patient_id == patient_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::fixtures::{doctor, patient};
    use crate::identity::DirectoryGateway;
    use crate::models::{Consultation, Message, MessageKind};
    use crate::store::{MemoryStore, CONSULTATIONS, MESSAGES};

    fn setup() -> (MemoryStore, DirectoryGateway, UserAccount) {
        let store = MemoryStore::new();
        let pat = patient("pat_1", "Jean", "Essomba");
        let gateway = DirectoryGateway::with_users(vec![doctor("doc_1", "Awa", "Mbarga"), pat.clone()]);
        (store, gateway, pat)
    }

    fn request(time: &str) -> BookingRequest {
        BookingRequest {
            doctor_id: "doc_1".into(),
            appointment_date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
            appointment_time: time.into(),
            reason: Some("fièvre".into()),
        }
    }

    #[test]
    fn booking_snapshots_both_parties() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        assert!(apt.id.starts_with("APT_"));
        assert_eq!(apt.status, AppointmentStatus::Pending);
        assert_eq!(apt.patient_name, "Jean Essomba");
        assert_eq!(apt.doctor_name, "Awa Mbarga");
        assert_eq!(apt.specialty, "Cardiologie");
        assert_eq!(apt.reason.as_deref(), Some("fièvre"));
    }

    #[test]
    fn booking_notifies_the_doctor() {
        let (store, gateway, pat) = setup();
        book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        let messages = Collection::<Message>::new(&store, MESSAGES).load_all().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient_id, "doc_1");
        assert_eq!(messages[0].message_type, MessageKind::AppointmentRequest);
        assert_eq!(messages[0].subject, "Demande de rendez-vous - Jean Essomba");
    }

    #[test]
    fn double_booking_same_slot_is_rejected() {
        let (store, gateway, pat) = setup();
        book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        let other = patient("pat_2", "Marie", "Ngo");
        let gateway2 = DirectoryGateway::with_users(vec![doctor("doc_1", "Awa", "Mbarga"), other.clone()]);
        let err = book_appointment(&store, &gateway2, &other, &request("10:00")).unwrap_err();

        assert!(matches!(err, SchedulingError::SlotTaken { .. }));
        assert!(err.to_string().contains("déjà réservé"));
        assert_eq!(
            Collection::<Appointment>::new(&store, APPOINTMENTS).load_all().unwrap().len(),
            1
        );
    }

    #[test]
    fn cancelled_slot_can_be_rebooked() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();
        set_appointment_status(&store, &doctor("doc_1", "Awa", "Mbarga"), &apt.id, "cancelled")
            .unwrap();

        let again = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();
        assert_ne!(again.id, apt.id);
    }

    #[test]
    fn different_time_same_day_is_free() {
        let (store, gateway, pat) = setup();
        book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();
        book_appointment(&store, &gateway, &pat, &request("11:00")).unwrap();
    }

    #[test]
    fn unknown_doctor_is_rejected() {
        let (store, gateway, pat) = setup();
        let mut req = request("10:00");
        req.doctor_id = "doc_missing".into();
        let err = book_appointment(&store, &gateway, &pat, &req).unwrap_err();
        assert!(matches!(err, SchedulingError::DoctorNotFound(_)));
    }

    #[test]
    fn patient_id_is_not_a_doctor() {
        let (store, gateway, pat) = setup();
        let mut req = request("10:00");
        req.doctor_id = "pat_1".into();
        let err = book_appointment(&store, &gateway, &pat, &req).unwrap_err();
        assert!(matches!(err, SchedulingError::DoctorNotFound(_)));
    }

    #[test]
    fn malformed_time_is_rejected_before_any_write() {
        let (store, gateway, pat) = setup();
        let err = book_appointment(&store, &gateway, &pat, &request("25:99")).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidTime(_)));
        assert!(store.load_all(APPOINTMENTS).unwrap().is_empty());
    }

    #[test]
    fn blank_reason_is_stored_as_absent() {
        let (store, gateway, pat) = setup();
        let mut req = request("10:00");
        req.reason = Some("   ".into());
        let apt = book_appointment(&store, &gateway, &pat, &req).unwrap();
        assert!(apt.reason.is_none());
    }

    #[test]
    fn confirmation_writes_message_and_consultation() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        let doc = doctor("doc_1", "Awa", "Mbarga");
        let updated = set_appointment_status(&store, &doc, &apt.id, "confirmed").unwrap();
        assert_eq!(updated.status, AppointmentStatus::Confirmed);

        let to_patient = Collection::<Message>::new(&store, MESSAGES)
            .find(|m| m.recipient_id == "pat_1")
            .unwrap();
        assert_eq!(to_patient.len(), 1);
        assert_eq!(to_patient[0].subject, "Rendez-vous confirmé ✓");

        let consultations = Collection::<Consultation>::new(&store, CONSULTATIONS)
            .load_all()
            .unwrap();
        assert_eq!(consultations.len(), 1);
        assert_eq!(consultations[0].appointment_id, apt.id);
    }

    #[test]
    fn repeated_confirmation_is_rejected_and_keeps_one_consultation() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();
        let doc = doctor("doc_1", "Awa", "Mbarga");

        set_appointment_status(&store, &doc, &apt.id, "confirmed").unwrap();
        let err = set_appointment_status(&store, &doc, &apt.id, "confirmed").unwrap_err();

        assert!(matches!(err, SchedulingError::AlreadyDecided(_)));
        assert_eq!(store.load_all(CONSULTATIONS).unwrap().len(), 1);
    }

    #[test]
    fn decision_cannot_be_reversed() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();
        let doc = doctor("doc_1", "Awa", "Mbarga");

        set_appointment_status(&store, &doc, &apt.id, "confirmed").unwrap();
        let err = set_appointment_status(&store, &doc, &apt.id, "cancelled").unwrap_err();
        assert!(matches!(err, SchedulingError::AlreadyDecided(_)));

        let stored = doctor_appointments(&store, "doc_1").unwrap();
        assert_eq!(stored[0].status, AppointmentStatus::Confirmed);
        assert_eq!(store.load_all(CONSULTATIONS).unwrap().len(), 1);
    }

    #[test]
    fn patient_cannot_decide_an_appointment() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        let err = set_appointment_status(&store, &pat, &apt.id, "confirmed").unwrap_err();
        assert!(matches!(err, SchedulingError::DecisionNotAllowed));
        assert_eq!(
            doctor_appointments(&store, "doc_1").unwrap()[0].status,
            AppointmentStatus::Pending
        );
        assert!(store.load_all(CONSULTATIONS).unwrap().is_empty());
    }

    #[test]
    fn unrelated_doctor_cannot_decide() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        let other = doctor("doc_2", "Nadia", "Fouda");
        let err = set_appointment_status(&store, &other, &apt.id, "cancelled").unwrap_err();
        assert!(matches!(err, SchedulingError::DecisionNotAllowed));
        assert_eq!(
            doctor_appointments(&store, "doc_1").unwrap()[0].status,
            AppointmentStatus::Pending
        );
    }

    #[test]
    fn cancellation_writes_no_consultation() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        let updated =
            set_appointment_status(&store, &doctor("doc_1", "Awa", "Mbarga"), &apt.id, "cancelled")
                .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Cancelled);
        assert!(store.load_all(CONSULTATIONS).unwrap().is_empty());

        let to_patient = Collection::<Message>::new(&store, MESSAGES)
            .find(|m| m.recipient_id == "pat_1")
            .unwrap();
        assert_eq!(to_patient[0].subject, "Rendez-vous refusé");
    }

    #[test]
    fn only_confirmed_or_cancelled_accepted() {
        let (store, gateway, pat) = setup();
        let apt = book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();

        let doc = doctor("doc_1", "Awa", "Mbarga");
        for bad in ["pending", "completed", "done", ""] {
            let err = set_appointment_status(&store, &doc, &apt.id, bad).unwrap_err();
            assert!(matches!(err, SchedulingError::InvalidStatus(_)), "{bad}");
        }
    }

    #[test]
    fn status_update_on_missing_appointment() {
        let (store, _, _) = setup();
        let err = set_appointment_status(
            &store,
            &doctor("doc_1", "Awa", "Mbarga"),
            "APT_missing",
            "confirmed",
        )
        .unwrap_err();
        assert!(matches!(err, SchedulingError::AppointmentNotFound(_)));
    }

    #[test]
    fn listings_split_by_party() {
        let (store, gateway, pat) = setup();
        book_appointment(&store, &gateway, &pat, &request("10:00")).unwrap();
        book_appointment(&store, &gateway, &pat, &request("11:00")).unwrap();

        assert_eq!(doctor_appointments(&store, "doc_1").unwrap().len(), 2);
        assert_eq!(patient_appointments(&store, "pat_1").unwrap().len(), 2);
        assert!(doctor_appointments(&store, "doc_2").unwrap().is_empty());
        assert!(patient_appointments(&store, "pat_2").unwrap().is_empty());
    }
}
