//! Contact and quote-request message models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Contact,
    Quote,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Contact => "contact",
            MessageKind::Quote => "quote",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact" => Ok(MessageKind::Contact),
            "quote" => Ok(MessageKind::Quote),
            other => Err(format!("unknown message kind: {other}")),
        }
    }
}

/// Inbound message from the public site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub kind: MessageKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    /// Set on quote requests that reference a catalog product
    pub product_id: Option<Uuid>,
    pub handled: bool,
    pub created_at: DateTime<Utc>,
}

/// Public intake payload for contact and quote forms
#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub product_id: Option<Uuid>,
}

/// Query parameters for the admin message listing
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MessageQuery {
    pub handled: Option<bool>,
    pub kind: Option<MessageKind>,
}
