//! Reset-password command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Token from the reset link
    #[arg(long)]
    pub token: String,

    /// New password
    #[arg(long, env = "CHECKIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(global: &GlobalArgs, args: ResetPasswordArgs) -> Result<()> {
    let api = session::connect(global)?;
    api.reset_password(&args.token, &args.password)
        .await
        .context("Failed to reset password")?;

    output::success("Password reset");
    output::status("Log in with the new password.");
    Ok(())
}
