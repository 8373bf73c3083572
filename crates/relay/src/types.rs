//! Shared value types for the relay domain.
//!
//! The serde attributes on these types define the wire formats: the inbound
//! event as posted by the email provider's parse API, the outbound chat
//! notification, and the provider's parse-route record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ProviderError, RelayError};

// ---------------------------------------------------------------------------
// Inbound email event
// ---------------------------------------------------------------------------

/// One MIME part reference inside an [`InboundEmailEvent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailPart {
    /// MIME headers of this part.
    #[serde(rename = "Headers", alias = "headers")]
    pub headers: HashMap<String, String>,

    /// Key of the top-level field holding this part's content (e.g. `Text-part`).
    #[serde(rename = "ContentRef", alias = "contentref", alias = "contentRef")]
    pub content_ref: String,
}

/// An inbound email as delivered to `POST /webhook` by the email provider.
///
/// Every field is optional on the wire and defaults to empty; unknown keys
/// are ignored. Keys are matched in the provider's spelling and in lower
/// case. Only [`from`](Self::from) and [`text_part`](Self::text_part) flow
/// into the chat notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundEmailEvent {
    /// Envelope sender (bounce address).
    #[serde(rename = "Sender", alias = "sender")]
    pub sender: String,

    /// Address the provider received the mail on.
    #[serde(rename = "Recipient", alias = "recipient")]
    pub recipient: String,

    /// Receive date as formatted by the provider.
    #[serde(rename = "Date", alias = "date")]
    pub date: String,

    /// Display name of the sender (`"Alice <alice@example.com>"` or `"Alice"`).
    #[serde(rename = "From", alias = "from")]
    pub from: String,

    /// Subject line.
    #[serde(rename = "Subject", alias = "subject")]
    pub subject: String,

    /// Top-level message headers.
    #[serde(rename = "Headers", alias = "headers")]
    pub headers: HashMap<String, String>,

    /// MIME part references, in message order.
    #[serde(rename = "Parts", alias = "parts")]
    pub parts: Vec<EmailPart>,

    /// Plain-text body.
    #[serde(rename = "Text-part", alias = "text-part")]
    pub text_part: String,

    /// HTML body.
    #[serde(rename = "Html-part", alias = "html-part")]
    pub html_part: String,

    /// Spam score computed by the provider.
    #[serde(rename = "SpamAssassinScore", alias = "spamassassinscore")]
    pub spam_assassin_score: f64,

    /// Caller-supplied tracking identifier.
    #[serde(rename = "CustomID", alias = "customid")]
    pub custom_id: String,

    /// Raw event payload echoed back by the provider.
    #[serde(rename = "Payload", alias = "payload")]
    pub payload: String,
}

impl InboundEmailEvent {
    /// Decodes a webhook request body.
    ///
    /// Only the first JSON value is read; anything after it is ignored. A
    /// top-level `null` decodes to the empty event and an empty body is a
    /// decode failure reading `EOF`. A decode failure carries the decoder's
    /// own error text, which is what the webhook caller receives.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, RelayError> {
        let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Option<Self>>();
        match values.next() {
            Some(Ok(event)) => Ok(event.unwrap_or_default()),
            Some(Err(e)) => Err(RelayError::Decode {
                message: e.to_string(),
            }),
            None => Err(RelayError::Decode {
                message: "EOF".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound chat notification
// ---------------------------------------------------------------------------

/// The JSON body posted to the chat incoming webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundNotification {
    /// Always the configured channel.
    pub channel: String,

    /// Display name shown as the poster.
    pub username: String,

    /// Message text.
    pub text: String,

    /// Always the configured icon emoji.
    pub icon_emoji: String,
}

/// Outcome of a delivered chat notification: the upstream HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchStatus {
    /// Numeric HTTP status code.
    pub code: u16,

    /// Status line as written back to the webhook caller, e.g. `"200 OK"`.
    pub line: String,
}

impl DispatchStatus {
    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

// ---------------------------------------------------------------------------
// Route registration
// ---------------------------------------------------------------------------

/// The provider's record that inbound mail for `email` is forwarded to `url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRegistration {
    /// Provider-assigned identifier. Absent on create requests.
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Address whose inbound mail is forwarded.
    #[serde(rename = "Email", default)]
    pub email: String,

    /// Webhook URL the provider posts to.
    #[serde(rename = "Url", default)]
    pub url: String,
}

/// How a lookup failure that is not a definite "not found" is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupFailurePolicy {
    /// Any failed lookup leads to a create attempt.
    #[default]
    CreateOnAnyFailure,

    /// Only a definite "not found" leads to a create attempt; transport and
    /// API errors are logged and the registration is abandoned.
    CreateOnNotFoundOnly,
}

/// Result of one route-registration attempt.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// A route for the sender address already existed; nothing was created.
    AlreadyRegistered(RouteRegistration),

    /// No route existed and one was created.
    Created(RouteRegistration),

    /// The lookup failed and the policy forbids creating on failure.
    LookupFailed(ProviderError),

    /// The create call failed. The service keeps running without a route.
    CreateFailed(ProviderError),

    /// The registration did not finish within its time bound.
    TimedOut,

    /// The registration task was cancelled or panicked.
    Aborted {
        /// Description of why the task ended.
        reason: String,
    },
}

impl RegistrationOutcome {
    /// Returns `true` if a route for the sender address is known to exist.
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::AlreadyRegistered(_) | Self::Created(_))
    }
}
