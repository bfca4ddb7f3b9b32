//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the user as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(global: &GlobalArgs, args: WhoamiArgs) -> Result<()> {
    let api = session::connect_logged_in(global).await?;
    let user = api.me().await.context("Failed to fetch current user")?;

    if args.json {
        return output::json_pretty(&user);
    }

    output::user(&user);
    output::field("API", api.client().config().base_url().as_str());
    Ok(())
}
