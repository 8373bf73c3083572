//! Error types for the relay domain.
//!
//! Each failure class has its own enum so callers can tell them apart:
//!
//! - [`ConfigError`]: the configuration could not be loaded. Fatal at startup.
//! - [`ProviderError`]: a call to the email provider failed. Only ever logged.
//! - [`DispatchError`]: the chat notification could not be sent. Reported to
//!   the webhook caller as response text.
//! - [`RelayError`]: everything the webhook handler can report to its caller.
//!
//! The `Display` text of [`DispatchError`] and [`RelayError`] is the exact
//! line written back to the webhook caller.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The configuration file is not a decodable [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file is not valid JSON or a field has the wrong type.
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Email provider
// ---------------------------------------------------------------------------

/// A call to the email provider's route API failed.
///
/// A route that simply does not exist is not an error; lookups report it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, connect, TLS, reset).
    #[error("provider transport error: {message}")]
    Transport {
        /// Description of the underlying transport failure.
        message: String,
    },

    /// The provider answered with an unexpected HTTP status.
    #[error("provider returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body, kept verbatim for diagnosis.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("could not decode provider response: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    /// A successful create call returned no route record.
    #[error("provider returned an empty route list")]
    EmptyResponse,
}

// ---------------------------------------------------------------------------
// Chat dispatch
// ---------------------------------------------------------------------------

/// The outbound chat notification could not be delivered.
///
/// A non-2xx answer from the chat service is not a `DispatchError`: the
/// status line is returned to the caller as-is.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The notification could not be serialised to JSON.
    #[error("{message}")]
    Serialize {
        /// Serialiser error text.
        message: String,
    },

    /// The outbound request could not be constructed (e.g. invalid URL).
    #[error("Error creating request: {message}")]
    BuildRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The request was sent but no response came back.
    #[error("Slack error response: {message}")]
    Transport {
        /// Description of the underlying transport failure.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Webhook handling
// ---------------------------------------------------------------------------

/// Every failure the webhook handler reports back to its caller.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound body is not a valid inbound email event.
    #[error("{message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },

    /// The translated notification could not be delivered.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
