//! Port traits implemented by the infrastructure crates.
//!
//! The domain never talks HTTP itself. `mailjet` implements [`RouteProvider`]
//! and `slack` implements [`NotificationDispatcher`]; tests substitute fakes.
//!
//! Implementations are shared between concurrent webhook handlers and the
//! startup registration task, hence the `Send + Sync` bounds.

use async_trait::async_trait;

use crate::{
    DispatchError, DispatchStatus, EmailAddress, OutboundNotification, ProviderError,
    RouteRegistration,
};

/// Access to the email provider's parse-route records.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Looks up the route registered for `email`.
    ///
    /// Returns `Ok(None)` when the provider definitively has no such route.
    async fn lookup_route(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<RouteRegistration>, ProviderError>;

    /// Registers a route forwarding inbound mail for `email` to `url`.
    async fn create_route(
        &self,
        email: &EmailAddress,
        url: &str,
    ) -> Result<RouteRegistration, ProviderError>;
}

/// Delivery of a chat notification.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Sends one notification and returns the upstream status.
    ///
    /// Exactly one outbound request per call; no retries.
    async fn dispatch(
        &self,
        notification: &OutboundNotification,
    ) -> Result<DispatchStatus, DispatchError>;
}
