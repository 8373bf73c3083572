//! Command-line flags.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use listener::StatusPolicy;
use relay::LookupFailurePolicy;

/// Relays inbound Mailjet emails into a Slack channel.
#[derive(Debug, Parser)]
#[command(name = "mailhook", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short = 'f', long = "config", default_value = "config.json")]
    pub config: PathBuf,

    /// Port of the server
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Answer webhook failures with a 4xx/5xx status instead of 200
    #[arg(long)]
    pub strict_status: bool,

    /// Only create the parse route when the provider reports it missing,
    /// not when the lookup itself fails
    #[arg(long)]
    pub strict_route_lookup: bool,

    /// Upper bound on the startup route registration
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub registration_timeout: u64,

    /// Wait for route registration to finish before serving
    #[arg(long)]
    pub wait_for_route: bool,

    /// Timeout for each Slack webhook call (unbounded when absent)
    #[arg(long, value_name = "SECS")]
    pub dispatch_timeout: Option<u64>,
}

impl Cli {
    /// Webhook status policy selected by `--strict-status`.
    pub fn status_policy(&self) -> StatusPolicy {
        if self.strict_status {
            StatusPolicy::Strict
        } else {
            StatusPolicy::AlwaysOk
        }
    }

    /// Lookup failure policy selected by `--strict-route-lookup`.
    pub fn lookup_policy(&self) -> LookupFailurePolicy {
        if self.strict_route_lookup {
            LookupFailurePolicy::CreateOnNotFoundOnly
        } else {
            LookupFailurePolicy::CreateOnAnyFailure
        }
    }

    /// Time bound of the startup route registration.
    pub fn registration_timeout(&self) -> Duration {
        Duration::from_secs(self.registration_timeout)
    }

    /// Per-call Slack timeout, if one was given.
    pub fn dispatch_timeout(&self) -> Option<Duration> {
        self.dispatch_timeout.map(Duration::from_secs)
    }
}
