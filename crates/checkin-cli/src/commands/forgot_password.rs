//! Forgot-password command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ForgotPasswordArgs {
    /// Account email
    #[arg(long)]
    pub email: String,
}

pub async fn run(global: &GlobalArgs, args: ForgotPasswordArgs) -> Result<()> {
    let api = session::connect(global)?;
    api.forgot_password(&args.email)
        .await
        .context("Failed to request a password reset")?;

    output::success("If that account exists, a reset link has been sent");
    Ok(())
}
