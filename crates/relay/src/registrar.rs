//! Idempotent registration of the inbound parse route.
//!
//! At startup the service makes sure the provider forwards mail for the
//! configured sender address to `<base URL>/webhook`. The check is
//! lookup-then-create and is not atomic: two instances started against the
//! same account may both create a route.
//!
//! Every failure ends up in the returned [`RegistrationOutcome`] and in the
//! logs; none of them stops the service.

use tracing::{error, info, warn};

use crate::{EmailAddress, LookupFailurePolicy, RegistrationOutcome, RouteProvider};

/// Path the webhook handler is mounted on.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Returns the forward URL registered with the provider for `base_url`.
pub fn webhook_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), WEBHOOK_PATH)
}

/// Ensures a parse route exists for `email`, creating one if needed.
///
/// Issues at most one create call.
pub async fn ensure_route(
    provider: &dyn RouteProvider,
    email: &EmailAddress,
    base_url: &str,
    policy: LookupFailurePolicy,
) -> RegistrationOutcome {
    match provider.lookup_route(email).await {
        Ok(Some(route)) => {
            info!(email = %route.email, url = %route.url, "Parse route already registered");
            return RegistrationOutcome::AlreadyRegistered(route);
        }
        Ok(None) => {
            info!(email = %email, "No parse route registered");
        }
        Err(e) => match policy {
            LookupFailurePolicy::CreateOnAnyFailure => {
                warn!(
                    email = %email,
                    error = %e,
                    "Parse route lookup failed; treating as not found"
                );
            }
            LookupFailurePolicy::CreateOnNotFoundOnly => {
                error!(
                    email = %email,
                    error = %e,
                    "Parse route lookup failed; not creating a route"
                );
                return RegistrationOutcome::LookupFailed(e);
            }
        },
    }

    let url = webhook_url(base_url);
    match provider.create_route(email, &url).await {
        Ok(route) => {
            info!(email = %route.email, url = %route.url, "Parse route created");
            RegistrationOutcome::Created(route)
        }
        Err(e) => {
            error!(email = %email, url = %url, error = %e, "Failed to create parse route");
            RegistrationOutcome::CreateFailed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{ProviderError, RouteRegistration};

    enum Lookup {
        Found,
        NotFound,
        Fails,
    }

    struct FakeProvider {
        lookup: Lookup,
        create_fails: bool,
        creates: Mutex<Vec<(String, String)>>,
    }

    impl FakeProvider {
        fn new(lookup: Lookup, create_fails: bool) -> Self {
            Self {
                lookup,
                create_fails,
                creates: Mutex::new(Vec::new()),
            }
        }

        fn creates(&self) -> Vec<(String, String)> {
            self.creates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RouteProvider for FakeProvider {
        async fn lookup_route(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<RouteRegistration>, ProviderError> {
            match self.lookup {
                Lookup::Found => Ok(Some(RouteRegistration {
                    id: Some(7),
                    email: email.to_string(),
                    url: "http://old.example.com:3000/webhook".into(),
                })),
                Lookup::NotFound => Ok(None),
                Lookup::Fails => Err(ProviderError::Transport {
                    message: "connection reset".into(),
                }),
            }
        }

        async fn create_route(
            &self,
            email: &EmailAddress,
            url: &str,
        ) -> Result<RouteRegistration, ProviderError> {
            self.creates
                .lock()
                .unwrap()
                .push((email.to_string(), url.to_string()));
            if self.create_fails {
                return Err(ProviderError::Api {
                    status: 400,
                    body: "duplicate".into(),
                });
            }
            Ok(RouteRegistration {
                id: Some(8),
                email: email.to_string(),
                url: url.to_string(),
            })
        }
    }

    fn email() -> EmailAddress {
        EmailAddress::new("inbox@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_existing_route_issues_no_create() {
        let provider = FakeProvider::new(Lookup::Found, false);

        let outcome = ensure_route(
            &provider,
            &email(),
            "http://relay.example.com:3000",
            LookupFailurePolicy::default(),
        )
        .await;

        assert!(matches!(outcome, RegistrationOutcome::AlreadyRegistered(_)));
        assert!(provider.creates().is_empty());
    }

    #[tokio::test]
    async fn test_missing_route_is_created_once_at_webhook_path() {
        let provider = FakeProvider::new(Lookup::NotFound, false);

        let outcome = ensure_route(
            &provider,
            &email(),
            "http://relay.example.com:3000",
            LookupFailurePolicy::default(),
        )
        .await;

        assert!(outcome.is_registered());
        assert_eq!(
            provider.creates(),
            vec![(
                "inbox@example.com".to_string(),
                "http://relay.example.com:3000/webhook".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_lookup_error_creates_under_default_policy() {
        let provider = FakeProvider::new(Lookup::Fails, false);

        let outcome = ensure_route(
            &provider,
            &email(),
            "http://relay.example.com:3000",
            LookupFailurePolicy::CreateOnAnyFailure,
        )
        .await;

        assert!(matches!(outcome, RegistrationOutcome::Created(_)));
        assert_eq!(provider.creates().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_error_does_not_create_under_strict_policy() {
        let provider = FakeProvider::new(Lookup::Fails, false);

        let outcome = ensure_route(
            &provider,
            &email(),
            "http://relay.example.com:3000",
            LookupFailurePolicy::CreateOnNotFoundOnly,
        )
        .await;

        assert!(matches!(
            outcome,
            RegistrationOutcome::LookupFailed(ProviderError::Transport { .. })
        ));
        assert!(provider.creates().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_reported_not_raised() {
        let provider = FakeProvider::new(Lookup::NotFound, true);

        let outcome = ensure_route(
            &provider,
            &email(),
            "http://relay.example.com:3000",
            LookupFailurePolicy::default(),
        )
        .await;

        assert!(matches!(
            outcome,
            RegistrationOutcome::CreateFailed(ProviderError::Api { status: 400, .. })
        ));
        assert!(!outcome.is_registered());
    }

    #[test]
    fn test_webhook_url_trims_trailing_slash() {
        assert_eq!(
            webhook_url("http://relay.example.com:3000/"),
            "http://relay.example.com:3000/webhook"
        );
        assert_eq!(
            webhook_url("http://relay.example.com:3000"),
            "http://relay.example.com:3000/webhook"
        );
    }
}
