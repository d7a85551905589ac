//! Chat message data model
//!
//! This module defines the immutable message record stored in history and
//! broadcast to subscribers, together with the scope and kind enums that
//! select which of its fields are meaningful.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RelayError;

/// History partition and addressing kind for a message
///
/// A group id and a user id may coincide as strings; the scope keeps the
/// two namespaces from ever being conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Direct message to a participant
    User,
    /// Message addressed to a group label
    Group,
}

impl Scope {
    /// Wire name of the scope ("user" or "group")
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Group => "group",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = RelayError;

    /// Parse the wire form, case-insensitively
    ///
    /// Anything other than "user" or "group" is rejected rather than
    /// silently coerced to a user scope.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("user") {
            Ok(Scope::User)
        } else if s.eq_ignore_ascii_case("group") {
            Ok(Scope::Group)
        } else {
            Err(RelayError::InvalidScope(s.to_string()))
        }
    }
}

/// Kind of message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    /// Plain text body
    Text,
    /// Finalized audio transfer; body lives out-of-band
    Audio,
}

/// An immutable record of one delivered communication
///
/// Exactly one of `text` / `media_ref` is meaningful, selected by `kind`;
/// the constructors enforce this, so the unused fields are always empty
/// strings (or zero for `duration_seconds`). Transport bindings encode
/// this record however they like; the engine defines no wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message id, assigned at creation
    pub id: String,
    /// Sender participant id
    pub from: String,
    /// Destination: a participant id or a group id, per `scope`
    pub to: String,
    /// History partition that owns this message
    pub scope: Scope,
    /// Payload kind
    pub kind: MessageKind,
    /// Text body (empty unless `kind` is Text)
    pub text: String,
    /// Out-of-band media reference, e.g. an upload URL (empty unless Audio)
    pub media_ref: String,
    /// MIME type of the media (empty unless Audio)
    pub mime_type: String,
    /// Media duration in seconds (0 unless Audio)
    pub duration_seconds: f64,
    /// Creation time, epoch milliseconds
    ///
    /// Not guaranteed monotonic across concurrent senders; history order
    /// is append order, not timestamp order.
    pub timestamp: i64,
}

impl Message {
    /// Create a text message
    pub fn text(scope: Scope, to: impl Into<String>, from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            scope,
            kind: MessageKind::Text,
            text: text.into(),
            media_ref: String::new(),
            mime_type: String::new(),
            duration_seconds: 0.0,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Create a finalized audio message
    ///
    /// `media_ref` may be empty when the media body was not persisted
    /// anywhere addressable.
    pub fn audio(
        scope: Scope,
        to: impl Into<String>,
        from: impl Into<String>,
        media_ref: impl Into<String>,
        mime_type: impl Into<String>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            scope,
            kind: MessageKind::Audio,
            text: String::new(),
            media_ref: media_ref.into(),
            mime_type: mime_type.into(),
            duration_seconds,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
