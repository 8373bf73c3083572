//! Binding and running the webhook server.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use crate::{handler::router, AppState, ListenerError};

/// Binds `host:port`. `host` may be a name; it is resolved before binding.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}

/// Serves `POST /webhook` on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(local) = listener.local_addr() {
        info!(addr = %local, "Webhook server listening");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ListenerError::Serve)
}
