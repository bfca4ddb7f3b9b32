//! checkin - command-line client for the field check-in backend.
//!
//! A thin wrapper over `checkin-client`: log in once, then submit and
//! review check-ins. Tokens are kept in the user's data directory and
//! refreshed transparently when the backend rejects them.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let result = commands::handle(cli.global, cli.command).await;
    if let Err(ref e) = result
        && requires_login(e)
    {
        output::error("Your session is no longer valid. Run 'checkin login' to sign in again.");
    }
    result
}

/// Whether the failure can only be fixed by logging in again.
fn requires_login(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<checkin_core::Error>()
            .is_some_and(checkin_core::Error::requires_login)
    })
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
