//! Message inbox endpoints.
//!
//! - `GET /api/messages` — the caller's inbox, oldest first
//! - `POST /api/messages` — manual send to another user
//! - `PATCH /api/messages/:id` — flip read/starred flags

use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::identity::Role;
use crate::ids;
use crate::models::{Message, MessageKind, SenderRole};
use crate::store::{Collection, MESSAGES};

#[derive(Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: Message,
}

/// `GET /api/messages` — messages addressed to the caller.
pub async fn inbox(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = Collection::new(ctx.store.as_ref(), MESSAGES)
        .find(|m: &Message| m.recipient_id == caller.user.id)?;
    Ok(Json(MessagesResponse { messages }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
    pub recipient_id: String,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub message_type: Option<MessageKind>,
}

/// `POST /api/messages` — send a message to another user. Sender
/// identity comes from the authenticated caller, never the payload.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<SendBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    ctx.identity
        .get_user(&body.recipient_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Destinataire introuvable: {}", body.recipient_id)))?;

    let message = Message {
        id: ids::message_id(),
        sender: caller.user.display_name(),
        sender_type: match caller.user.role {
            Role::Doctor => SenderRole::Doctor,
            Role::Patient => SenderRole::Patient,
        },
        sender_email: Some(caller.user.email.clone()),
        sender_id: Some(caller.user.id.clone()),
        subject: body.subject,
        content: body.content,
        timestamp: Utc::now(),
        is_read: false,
        is_starred: false,
        message_type: body.message_type.unwrap_or(MessageKind::General),
        recipient_id: body.recipient_id,
    };
    let message = Collection::new(ctx.store.as_ref(), MESSAGES).append(&message)?;

    Ok(Json(MessageResponse { message }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagsBody {
    #[serde(default)]
    pub is_read: Option<bool>,
    #[serde(default)]
    pub is_starred: Option<bool>,
}

/// `PATCH /api/messages/:id` — update the caller's copy of a message.
/// Only the recipient can flag a message; anyone else gets 404.
pub async fn set_flags(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(message_id): Path<String>,
    Json(body): Json<FlagsBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut patch = Map::new();
    if let Some(is_read) = body.is_read {
        patch.insert("isRead".into(), is_read.into());
    }
    if let Some(is_starred) = body.is_starred {
        patch.insert("isStarred".into(), is_starred.into());
    }
    if patch.is_empty() {
        return Err(ApiError::BadRequest("Aucun champ à modifier".into()));
    }

    let caller_id = caller.user.id.clone();
    let message = Collection::new(ctx.store.as_ref(), MESSAGES)
        .update_where(
            |m: &Message| m.id == message_id && m.recipient_id == caller_id,
            serde_json::Value::Object(patch),
        )?
        .ok_or_else(|| ApiError::NotFound(format!("Message introuvable: {message_id}")))?;

    Ok(Json(MessageResponse { message }))
}
