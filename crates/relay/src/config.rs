//! Configuration model.
//!
//! The configuration is read once at startup and never mutated afterwards. The
//! composition root wraps it in an `Arc` and hands it to the webhook handler
//! and the route registrar; nothing reads it from process-wide state.
//!
//! The JSON layout keeps the key names operators already use:
//!
//! ```json
//! { "MailjetConfig": { "APIKey": "...", "APISecret": "...", "Email": "...", "Domain": "..." },
//!   "SlackConfig":   { "Token": "...", "Channel": "...", "Emoji": "..." } }
//! ```

use std::io::Read;

use serde::Deserialize;

use crate::{ConfigError, EmailAddress};

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// A credential that must never reach the logs.
///
/// `Debug` and `Display` both render as `***`; use [`Secret::expose`] at the
/// single point where the raw value is sent over the wire.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a raw credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no credential was configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

// ---------------------------------------------------------------------------
// Configuration sections
// ---------------------------------------------------------------------------

/// Credentials and sender account at the email provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MailjetConfig {
    /// Public API key (basic-auth user).
    #[serde(rename = "APIKey")]
    pub api_key: String,

    /// Private API key (basic-auth password).
    #[serde(rename = "APISecret")]
    pub api_secret: Secret,

    /// Sender address whose inbound mail is forwarded to this service.
    #[serde(rename = "Email")]
    pub email: String,

    /// Host name this service listens on and advertises to the provider.
    ///
    /// Empty means "listen on every interface".
    #[serde(rename = "Domain")]
    pub domain: String,
}

impl MailjetConfig {
    /// Returns the configured sender address, or `None` if it is empty.
    pub fn sender_email(&self) -> Option<EmailAddress> {
        EmailAddress::new(self.email.clone())
    }

    /// Host the listener binds; every interface when no domain is configured.
    pub fn listen_host(&self) -> &str {
        if self.domain.is_empty() {
            "0.0.0.0"
        } else {
            &self.domain
        }
    }

    /// Public base URL of this service, e.g. `http://relay.example.com:3000`.
    pub fn base_url(&self, port: u16) -> String {
        format!("http://{}:{}", self.domain, port)
    }
}

/// Destination of the chat notifications.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming-webhook token, i.e. the path after `/services/`.
    #[serde(rename = "Token")]
    pub token: Secret,

    /// Channel every notification is posted to.
    #[serde(rename = "Channel")]
    pub channel: String,

    /// Icon emoji attached to every notification (e.g. `:email:`).
    #[serde(rename = "Emoji")]
    pub emoji: String,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Email provider account and listen address.
    #[serde(rename = "MailjetConfig")]
    pub mailjet: MailjetConfig,

    /// Chat notification destination.
    #[serde(rename = "SlackConfig")]
    pub slack: SlackConfig,
}

impl Config {
    /// Decodes a configuration from a JSON reader.
    ///
    /// Absent sections and fields default to empty. Only malformed JSON or a
    /// field of the wrong type is an error; an empty sender address or domain
    /// is handled at startup (registration skipped, bind on every interface).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Decodes a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_reader(json.as_bytes())
    }
}
