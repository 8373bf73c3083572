//! `POST /webhook`: decode, translate, dispatch, report.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tracing::{info, info_span, warn, Instrument};

use relay::{
    translate, Config, DispatchError, DispatchStatus, InboundEmailEvent, NotificationDispatcher,
    RelayError, RequestId, WEBHOOK_PATH,
};

/// Largest accepted webhook body. The provider inlines attachments, so the
/// framework default of 2 MiB is too small.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Status policy
// ---------------------------------------------------------------------------

/// Which HTTP status the webhook answers with.
///
/// The body text is the same under both policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Always 200. Callers must read the body to detect failure.
    #[default]
    AlwaysOk,

    /// 400 for an undecodable body, 413 for a body over the size limit, 500
    /// when the outbound request cannot be built, 502 when the chat service
    /// is unreachable or answers non-2xx.
    Strict,
}

impl StatusPolicy {
    fn for_error(self, err: &RelayError) -> StatusCode {
        match self {
            Self::AlwaysOk => StatusCode::OK,
            Self::Strict => match err {
                RelayError::Decode { .. } => StatusCode::BAD_REQUEST,
                RelayError::Dispatch(DispatchError::Serialize { .. })
                | RelayError::Dispatch(DispatchError::BuildRequest { .. }) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                RelayError::Dispatch(DispatchError::Transport { .. }) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn for_upstream(self, upstream: &DispatchStatus) -> StatusCode {
        match self {
            Self::Strict if !upstream.is_success() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::OK,
        }
    }

    fn for_rejection(self, rejection: &BytesRejection) -> StatusCode {
        match self {
            Self::AlwaysOk => StatusCode::OK,
            Self::Strict => rejection.status(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything a webhook call needs, shared read-only across requests.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    status_policy: StatusPolicy,
    body_limit: usize,
}

impl AppState {
    /// Creates the state with the default [`StatusPolicy::AlwaysOk`] and a
    /// body limit of [`MAX_BODY_BYTES`].
    pub fn new(config: Arc<Config>, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            status_policy: StatusPolicy::default(),
            body_limit: MAX_BODY_BYTES,
        }
    }

    /// Sets the response status policy.
    pub fn with_status_policy(mut self, status_policy: StatusPolicy) -> Self {
        self.status_policy = status_policy;
        self
    }

    /// Sets the largest accepted webhook body, in bytes.
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

/// Builds the router serving `POST /webhook`.
///
/// A body over the limit is answered like any other failure: its text is the
/// rejection reason and its status follows the [`StatusPolicy`].
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(webhook))
        .layer(DefaultBodyLimit::max(state.body_limit))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Relays one inbound webhook body to the chat service.
///
/// Issues exactly one dispatch for a decodable body and none otherwise.
pub async fn relay_event(
    config: &Config,
    dispatcher: &dyn NotificationDispatcher,
    body: &[u8],
) -> Result<DispatchStatus, RelayError> {
    let event = InboundEmailEvent::from_json_slice(body)?;
    info!(
        sender = %event.sender,
        subject = %event.subject,
        "Received inbound email"
    );

    let notification = translate(&event, &config.slack);
    let status = dispatcher.dispatch(&notification).await?;
    Ok(status)
}

async fn webhook(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = RequestId::new_random();
    let span = info_span!("webhook", request_id = %request_id);

    async move {
        let body = match body {
            Ok(body) => body,
            Err(rejection) => {
                warn!(error = %rejection, "Webhook body rejected");
                return text_reply(
                    state.status_policy.for_rejection(&rejection),
                    &rejection.body_text(),
                );
            }
        };

        match relay_event(&state.config, state.dispatcher.as_ref(), &body).await {
            Ok(upstream) => {
                info!(status = upstream.code, "Chat notification dispatched");
                text_reply(state.status_policy.for_upstream(&upstream), &upstream.line)
            }
            Err(e) => {
                warn!(error = %e, "Webhook relay failed");
                text_reply(state.status_policy.for_error(&e), &e.to_string())
            }
        }
    }
    .instrument(span)
    .await
}

fn text_reply(status: StatusCode, line: &str) -> Response {
    (status, format!("{line}\n")).into_response()
}
