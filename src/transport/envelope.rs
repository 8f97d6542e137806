//! # Transport Envelope
//!
//! The unit handed to [`SenderHandle::send`](super::SenderHandle::send).
//! The body is exactly the bytes produced by the publisher; the envelope only
//! adds the metadata a broker needs to route and deduplicate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub message_id: Uuid,
    pub content_type: String,
    pub body: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Envelope {
    /// Wrap a UTF-8 JSON body
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            body,
            created_at: Utc::now(),
        }
    }

    /// Body as text, when it is valid UTF-8
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
