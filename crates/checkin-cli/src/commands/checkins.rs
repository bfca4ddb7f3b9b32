//! Supervisor check-in listing command implementation.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use checkin_core::CheckinFilter;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct CheckinsArgs {
    /// Only check-ins by this rep (user ID)
    #[arg(long)]
    pub rep: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Print check-ins as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(global: &GlobalArgs, args: CheckinsArgs) -> Result<()> {
    let api = session::connect_logged_in(global).await?;

    let filter = CheckinFilter {
        rep_id: args.rep,
        region: args.region,
        category: args.category,
        start_date: args.from,
        end_date: args.to,
    };
    let checkins = api
        .all_checkins(&filter)
        .await
        .context("Failed to list check-ins")?;

    output::checkins(&checkins, args.json)
}
