//! Delete check-in command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct DeleteCheckinArgs {
    /// Check-in ID
    pub id: String,
}

pub async fn run(global: &GlobalArgs, args: DeleteCheckinArgs) -> Result<()> {
    let api = session::connect_logged_in(global).await?;
    api.delete_checkin(&args.id)
        .await
        .context("Failed to delete check-in")?;
    output::success(&format!("Deleted check-in {}", args.id));
    Ok(())
}
