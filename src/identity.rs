//! Identity gateway — the seam to the external identity provider.
//!
//! The provider owns sign-up, login and role metadata; this crate only
//! resolves opaque session tokens and looks up user attributes through
//! [`IdentityGateway`]. [`DirectoryGateway`] is the bundled
//! implementation, backed by a JSON directory file, and doubles as the
//! test fixture (constructed from a `Vec<UserAccount>`).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Cannot read identity directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed identity directory: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

/// A user as known to the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    /// Specialties declared at registration (doctors only).
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Specialty labels assigned to doctors who declared none, picked
/// deterministically from the user id.
const FALLBACK_SPECIALTIES: &[&str] = &[
    "Médecine Générale",
    "Cardiologie",
    "Pédiatrie",
    "Dermatologie",
    "Neurologie",
];

impl UserAccount {
    /// `"First Last"` trimmed; falls back to a role label when the
    /// provider has no name on file.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if !name.is_empty() {
            return name;
        }
        match self.role {
            Role::Doctor => "Docteur".to_string(),
            Role::Patient => "Patient".to_string(),
        }
    }

    /// First declared specialty, or a stable fallback derived from the
    /// user id so the same doctor always shows the same label.
    pub fn primary_specialty(&self) -> String {
        if let Some(s) = self.specialties.iter().find(|s| !s.trim().is_empty()) {
            return s.clone();
        }
        let index = self.id.bytes().map(usize::from).sum::<usize>() % FALLBACK_SPECIALTIES.len();
        FALLBACK_SPECIALTIES[index].to_string()
    }
}

/// Resolves sessions and user attributes. Implemented by whatever
/// identity provider the deployment uses.
pub trait IdentityGateway: Send + Sync {
    /// Resolve an opaque session token to its user, `None` if the
    /// session is unknown or expired.
    fn resolve_session(&self, token: &str) -> Result<Option<UserAccount>, IdentityError>;

    fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>, IdentityError>;

    fn find_by_role(&self, role: Role) -> Result<Vec<UserAccount>, IdentityError>;
}

/// On-disk shape of the directory file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    users: Vec<UserAccount>,
    /// session token -> user id
    #[serde(default)]
    sessions: HashMap<String, String>,
}

/// JSON-directory-backed gateway. Loaded once at startup; the
/// directory is the identity provider's export, not state this
/// service owns.
pub struct DirectoryGateway {
    users: HashMap<String, UserAccount>,
    order: Vec<String>,
    sessions: HashMap<String, String>,
}

impl DirectoryGateway {
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        let file: DirectoryFile = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        } else {
            DirectoryFile::default()
        };
        Ok(Self::from_parts(file.users, file.sessions))
    }

    /// Build from in-memory users; sessions token `"tok-<id>"` per user.
    /// Intended for tests and local demos.
    pub fn with_users(users: Vec<UserAccount>) -> Self {
        let sessions = users
            .iter()
            .map(|u| (format!("tok-{}", u.id), u.id.clone()))
            .collect();
        Self::from_parts(users, sessions)
    }

    fn from_parts(users: Vec<UserAccount>, sessions: HashMap<String, String>) -> Self {
        let order = users.iter().map(|u| u.id.clone()).collect();
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users,
            order,
            sessions,
        }
    }
}

impl IdentityGateway for DirectoryGateway {
    fn resolve_session(&self, token: &str) -> Result<Option<UserAccount>, IdentityError> {
        Ok(self
            .sessions
            .get(token)
            .and_then(|id| self.users.get(id))
            .cloned())
    }

    fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>, IdentityError> {
        Ok(self.users.get(user_id).cloned())
    }

    fn find_by_role(&self, role: Role) -> Result<Vec<UserAccount>, IdentityError> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.users.get(id))
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{doctor, patient};
    use super::*;

    fn gateway() -> DirectoryGateway {
        DirectoryGateway::with_users(vec![
            doctor("doc_1", "Awa", "Mbarga"),
            patient("pat_1", "Jean", "Essomba"),
        ])
    }

    #[test]
    fn resolve_session_finds_user() {
        let gw = gateway();
        let user = gw.resolve_session("tok-doc_1").unwrap().unwrap();
        assert_eq!(user.id, "doc_1");
        assert_eq!(user.role, Role::Doctor);
    }

    #[test]
    fn resolve_session_unknown_token() {
        let gw = gateway();
        assert!(gw.resolve_session("tok-nobody").unwrap().is_none());
    }

    #[test]
    fn get_user_by_id() {
        let gw = gateway();
        let user = gw.get_user("pat_1").unwrap().unwrap();
        assert_eq!(user.display_name(), "Jean Essomba");
    }

    #[test]
    fn find_by_role_filters() {
        let gw = gateway();
        let doctors = gw.find_by_role(Role::Doctor).unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].id, "doc_1");
    }

    #[test]
    fn display_name_falls_back_for_nameless_doctor() {
        let mut doc = doctor("doc_2", "", "");
        doc.first_name.clear();
        doc.last_name.clear();
        assert_eq!(doc.display_name(), "Docteur");
    }

    #[test]
    fn primary_specialty_prefers_declared() {
        let doc = doctor("doc_1", "Awa", "Mbarga");
        assert_eq!(doc.primary_specialty(), "Cardiologie");
    }

    #[test]
    fn primary_specialty_fallback_is_stable() {
        let mut doc = doctor("doc_2", "Paul", "Biyik");
        doc.specialties.clear();
        let first = doc.primary_specialty();
        assert!(FALLBACK_SPECIALTIES.contains(&first.as_str()));
        assert_eq!(doc.primary_specialty(), first);
    }

    #[test]
    fn load_missing_file_yields_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let gw = DirectoryGateway::load(&tmp.path().join("directory.json")).unwrap();
        assert!(gw.find_by_role(Role::Doctor).unwrap().is_empty());
    }

    #[test]
    fn load_reads_users_and_sessions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("directory.json");
        std::fs::write(
            &path,
            r#"{
  "users": [
    {"id": "doc_9", "firstName": "Nadia", "lastName": "Fouda", "email": "nf@hopital.example", "role": "doctor", "specialties": ["Pédiatrie"]}
  ],
  "sessions": {"s3cret": "doc_9"}
}"#,
        )
        .unwrap();

        let gw = DirectoryGateway::load(&path).unwrap();
        let user = gw.resolve_session("s3cret").unwrap().unwrap();
        assert_eq!(user.id, "doc_9");
        assert_eq!(user.specialties, vec!["Pédiatrie"]);
    }
}
