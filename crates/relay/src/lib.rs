//! Core relay domain for mailhook.
//!
//! This crate contains every domain concept used to relay inbound email
//! notifications into a chat channel: the configuration model, the inbound and
//! outbound payload types, the translation between them, the route
//! registration decision logic, and the port traits the infrastructure crates
//! implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; `mailjet`, `slack` and `listener` define *how*
//! to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | Configuration file model (`Config`, `MailjetConfig`, `SlackConfig`, `Secret`) |
//! | [`identifiers`] | Newtype identifiers (`EmailAddress`, `RequestId`) |
//! | [`types`] | Wire and value types (`InboundEmailEvent`, `OutboundNotification`, etc.) |
//! | [`errors`] | Error enums per failure class |
//! | [`ports`] | `RouteProvider` and `NotificationDispatcher` traits |
//! | [`translate`] | Inbound event to notification mapping |
//! | [`registrar`] | Idempotent parse-route registration |

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod registrar;
pub mod translate;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{Config, MailjetConfig, Secret, SlackConfig};
pub use errors::{ConfigError, DispatchError, ProviderError, RelayError};
pub use identifiers::{EmailAddress, RequestId};
pub use ports::{NotificationDispatcher, RouteProvider};
pub use registrar::{ensure_route, webhook_url, WEBHOOK_PATH};
pub use translate::translate;
pub use types::{
    DispatchStatus, EmailPart, InboundEmailEvent, LookupFailurePolicy, OutboundNotification,
    RegistrationOutcome, RouteRegistration,
};
