//! Patient profile service — lazy creation and field updates.
//!
//! A profile is created the first time it is read, seeded from the
//! identity directory. The barcode identifier is minted once at
//! creation; update requests cannot touch it, whatever they send.

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::identity::UserAccount;
use crate::ids;
use crate::models::{PatientProfile, Sex};
use crate::store::{Collection, RecordStore, StoreError, TypedAppendOutcome, PATIENT_PROFILES};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profil patient introuvable: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields a patient may change. Everything is optional; absent fields
/// are left as stored.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub sex: Option<Sex>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub nationality: Option<String>,
    pub profile_image: Option<String>,
}

/// Fetch the profile for `patient`, creating it on first access.
/// Concurrent first reads settle on a single stored record.
pub fn get_or_create(
    store: &dyn RecordStore,
    patient: &UserAccount,
) -> Result<PatientProfile, ProfileError> {
    let now = Utc::now();
    let fresh = PatientProfile {
        patient_id: patient.id.clone(),
        bio: String::new(),
        sex: Sex::Other,
        birthdate: String::new(),
        address: String::new(),
        notes: String::new(),
        barcode: ids::generate_barcode(),
        nationality: String::new(),
        profile_image: patient.image_url.clone(),
        created_at: now,
        updated_at: now,
    };

    let patient_id = patient.id.clone();
    let outcome = Collection::new(store, PATIENT_PROFILES)
        .append_unless(|p: &PatientProfile| p.patient_id == patient_id, &fresh)?;
    Ok(match outcome {
        TypedAppendOutcome::Appended(p) => {
            tracing::info!(patient_id = %p.patient_id, "patient profile created");
            p
        }
        TypedAppendOutcome::Conflict(p) => p,
    })
}

/// Apply `update` to an existing profile. The stored barcode survives
/// any update; `updated_at` is stamped on every successful call.
pub fn update(
    store: &dyn RecordStore,
    patient_id: &str,
    update: ProfileUpdate,
) -> Result<PatientProfile, ProfileError> {
    let mut patch = Map::new();
    if let Some(bio) = update.bio {
        patch.insert("bio".into(), Value::String(bio));
    }
    if let Some(sex) = update.sex {
        patch.insert("sex".into(), serde_json::to_value(sex).map_err(StoreError::from)?);
    }
    if let Some(birthdate) = update.birthdate {
        patch.insert("birthdate".into(), Value::String(birthdate));
    }
    if let Some(address) = update.address {
        patch.insert("address".into(), Value::String(address));
    }
    if let Some(notes) = update.notes {
        patch.insert("notes".into(), Value::String(notes));
    }
    if let Some(nationality) = update.nationality {
        patch.insert("nationality".into(), Value::String(nationality));
    }
    if let Some(image) = update.profile_image {
        patch.insert("profileImage".into(), Value::String(image));
    }
    patch.insert(
        "updatedAt".into(),
        serde_json::to_value(Utc::now()).map_err(StoreError::from)?,
    );

    let id = patient_id.to_string();
    Collection::new(store, PATIENT_PROFILES)
        .update_where(|p: &PatientProfile| p.patient_id == id, Value::Object(patch))?
        .ok_or_else(|| ProfileError::NotFound(patient_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::fixtures::patient;
    use crate::store::MemoryStore;

    #[test]
    fn first_access_creates_profile_with_barcode() {
        let store = MemoryStore::new();
        let pat = patient("pat_1", "Jean", "Essomba");

        let profile = get_or_create(&store, &pat).unwrap();
        assert_eq!(profile.patient_id, "pat_1");
        assert!(profile.barcode.starts_with('#'));
        assert_eq!(profile.barcode.len(), 21);
        assert_eq!(profile.profile_image, pat.image_url);
        assert_eq!(store.load_all(PATIENT_PROFILES).unwrap().len(), 1);
    }

    #[test]
    fn repeated_access_returns_same_profile() {
        let store = MemoryStore::new();
        let pat = patient("pat_1", "Jean", "Essomba");

        let first = get_or_create(&store, &pat).unwrap();
        let second = get_or_create(&store, &pat).unwrap();

        assert_eq!(first.barcode, second.barcode);
        assert_eq!(store.load_all(PATIENT_PROFILES).unwrap().len(), 1);
    }

    #[test]
    fn update_changes_fields_and_stamps_updated_at() {
        let store = MemoryStore::new();
        let pat = patient("pat_1", "Jean", "Essomba");
        let created = get_or_create(&store, &pat).unwrap();

        let updated = update(
            &store,
            "pat_1",
            ProfileUpdate {
                bio: Some("Enseignant à Douala".into()),
                address: Some("Akwa, Douala".into()),
                sex: Some(Sex::Male),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.bio, "Enseignant à Douala");
        assert_eq!(updated.address, "Akwa, Douala");
        assert_eq!(updated.sex, Sex::Male);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn absent_fields_are_left_alone() {
        let store = MemoryStore::new();
        let pat = patient("pat_1", "Jean", "Essomba");
        get_or_create(&store, &pat).unwrap();

        update(
            &store,
            "pat_1",
            ProfileUpdate {
                bio: Some("première".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let after = update(
            &store,
            "pat_1",
            ProfileUpdate {
                address: Some("Bonapriso".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(after.bio, "première");
        assert_eq!(after.address, "Bonapriso");
    }

    #[test]
    fn barcode_survives_every_update() {
        let store = MemoryStore::new();
        let pat = patient("pat_1", "Jean", "Essomba");
        let created = get_or_create(&store, &pat).unwrap();

        let updated = update(
            &store,
            "pat_1",
            ProfileUpdate {
                bio: Some("nouvelle bio".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.barcode, created.barcode);
    }

    #[test]
    fn update_unknown_patient_is_not_found() {
        let store = MemoryStore::new();
        let err = update(&store, "pat_missing", ProfileUpdate::default()).unwrap_err();
        assert!(matches!(err, ProfileError::NotFound(_)));
    }
}
