//! mailhook entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse flags and configuration**: read the JSON configuration file
//!    named by `-f` (default `config.json`). A file that cannot be read or
//!    parsed stops the process with exit code 1.
//! 2. **Wire observability**: install the `tracing` subscriber (see
//!    [`telemetry`]).
//! 3. **Construct infrastructure**: one shared `reqwest::Client` backs both
//!    the `MailjetClient` and the `SlackWebhookClient`.
//! 4. **Register the parse route**: spawn the one-shot registration task;
//!    the server does not wait for it unless `--wait-for-route` is given.
//!    Skipped with a warning when no sender address is configured.
//! 5. **Serve** `POST /webhook` on `<Domain>:<port>` (every interface when
//!    `Domain` is empty) until ctrl-c.

mod args;
mod telemetry;

use std::{fs::File, io::BufReader, path::Path, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use listener::{bind, serve, spawn_route_registration, AppState};
use mailjet::MailjetClient;
use relay::Config;
use slack::SlackWebhookClient;

use crate::args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _telemetry = match telemetry::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("mailhook stopped: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Arc::new(load_config(&cli.config)?);
    info!(path = %cli.config.display(), config = ?config, "Read config");

    let http = reqwest::Client::new();
    let base_url = config.mailjet.base_url(cli.port);

    match config.mailjet.sender_email() {
        Some(sender) => {
            let provider = MailjetClient::new(
                http.clone(),
                config.mailjet.api_key.clone(),
                config.mailjet.api_secret.clone(),
            );
            let registration = spawn_route_registration(
                Arc::new(provider),
                sender,
                base_url.clone(),
                cli.lookup_policy(),
                cli.registration_timeout(),
            );
            if cli.wait_for_route {
                let outcome = registration.wait().await;
                if !outcome.is_registered() {
                    warn!(outcome = ?outcome, "Serving without a registered parse route");
                }
            }
        }
        None => warn!("MailjetConfig.Email is empty; skipping parse route registration"),
    }

    let mut dispatcher = SlackWebhookClient::new(http, config.slack.token.clone());
    if let Some(timeout) = cli.dispatch_timeout() {
        dispatcher = dispatcher.with_timeout(timeout);
    }
    let state = AppState::new(Arc::clone(&config), Arc::new(dispatcher))
        .with_status_policy(cli.status_policy());

    let listener = bind(config.mailjet.listen_host(), cli.port).await?;
    info!(url = %base_url, "Server started");

    serve(listener, state, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path)
        .with_context(|| format!("Unable to read the config file ({})", path.display()))?;
    Config::from_reader(BufReader::new(file))
        .with_context(|| format!("Unable to read the config file ({})", path.display()))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for ctrl-c; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
