//! Verify-email command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct VerifyEmailArgs {
    /// Token from the verification link
    pub token: String,
}

pub async fn run(global: &GlobalArgs, args: VerifyEmailArgs) -> Result<()> {
    let api = session::connect(global)?;
    api.verify_email(&args.token)
        .await
        .context("Failed to verify email")?;

    output::success("Email verified");
    output::status("You can now run 'checkin login'.");
    Ok(())
}
