//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use checkin_core::Registration;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "CHECKIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Contact phone number
    #[arg(long)]
    pub phone: Option<String>,
}

pub async fn run(global: &GlobalArgs, args: RegisterArgs) -> Result<()> {
    let api = session::connect(global)?;

    let registration = Registration {
        name: args.name,
        email: args.email,
        phone: args.phone,
        password: args.password,
        role: None,
    };
    api.register(&registration)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    output::status("Check your inbox for a verification link before logging in.");
    Ok(())
}
