//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(global: &GlobalArgs, _args: RefreshTokenArgs) -> Result<()> {
    let api = session::connect_logged_in(global).await?;

    output::status("Refreshing session...");

    api.client()
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    Ok(())
}
