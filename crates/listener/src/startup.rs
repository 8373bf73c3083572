//! One-shot route registration at startup.
//!
//! The registration runs on its own task so binding the listener never waits
//! on the provider. The returned [`RegistrationHandle`] is the completion
//! signal: await it to know the outcome, or drop it to leave the task
//! detached.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{error, info_span, Instrument};

use relay::{ensure_route, EmailAddress, LookupFailurePolicy, RegistrationOutcome, RouteProvider};

/// Completion signal of the startup registration task.
#[derive(Debug)]
pub struct RegistrationHandle {
    task: JoinHandle<RegistrationOutcome>,
}

impl RegistrationHandle {
    /// Waits for the registration to finish.
    pub async fn wait(self) -> RegistrationOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => RegistrationOutcome::Aborted {
                reason: e.to_string(),
            },
        }
    }
}

/// Spawns [`ensure_route`] for `email` with a time bound of `timeout`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_route_registration(
    provider: Arc<dyn RouteProvider>,
    email: EmailAddress,
    base_url: String,
    policy: LookupFailurePolicy,
    timeout: Duration,
) -> RegistrationHandle {
    let span = info_span!("route_registration", email = %email);

    let task = tokio::spawn(
        async move {
            let registration = ensure_route(provider.as_ref(), &email, &base_url, policy);
            match tokio::time::timeout(timeout, registration).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(timeout_secs = timeout.as_secs(), "Parse route registration timed out");
                    RegistrationOutcome::TimedOut
                }
            }
        }
        .instrument(span),
    );

    RegistrationHandle { task }
}
