use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{MessageKind, SenderRole};

/// A unidirectional notification addressed to one user, produced by
/// the notification fan-out or a manual send. Immutable once created
/// except for the recipient-local `isRead`/`isStarred` flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// Sender display name ("Système" for system-generated sends).
    pub sender: String,
    pub sender_type: SenderRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub subject: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub is_starred: bool,
    pub message_type: MessageKind,
    pub recipient_id: String,
}
