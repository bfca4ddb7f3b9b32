//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(global: &GlobalArgs, _args: LogoutArgs) -> Result<()> {
    let api = session::connect(global)?;
    api.logout().await.context("Failed to clear session")?;
    output::success("Logged out");
    Ok(())
}
