//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use checkin_core::Credentials;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "CHECKIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(global: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let api = session::connect(global)?;

    output::status("Logging in...");

    let user = api
        .login(Credentials::new(&args.email, &args.password))
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Name", &user.name);
    output::field("Role", user.role.as_str());
    output::field("API", api.client().config().base_url().as_str());

    Ok(())
}
