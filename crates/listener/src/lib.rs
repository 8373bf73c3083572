//! mailhook inbound webhook server.
//!
//! Binds an HTTP server and receives inbound-email notifications from the
//! email provider on `POST /webhook`. Each call is decoded, translated into a
//! chat notification and dispatched through a [`relay::NotificationDispatcher`];
//! the one-line result is written back as the response body.
//!
//! The crate also owns the startup side of route registration:
//! [`spawn_route_registration`] runs [`relay::ensure_route`] once on a
//! detached task with a time bound, so the server never waits on the
//! provider unless the caller chooses to.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP framing, routing, response status selection and
//! task spawning live here. Payload semantics live in [`relay`].
//!
//! ## Response contract
//!
//! The response body is the success signal: either the upstream status line
//! (e.g. `200 OK`) or an error description, always newline-terminated. With
//! [`StatusPolicy::AlwaysOk`] (the default) the HTTP status is always 200; with
//! [`StatusPolicy::Strict`] failures carry a 4xx/5xx status.

pub mod errors;
pub mod handler;
pub mod server;
pub mod startup;

pub use errors::ListenerError;
pub use handler::{relay_event, router, AppState, StatusPolicy, MAX_BODY_BYTES};
pub use server::{bind, serve};
pub use startup::{spawn_route_registration, RegistrationHandle};
