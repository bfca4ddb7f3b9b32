//! Report command implementation.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;

use checkin_client::report::{self, GroupBy};
use checkin_core::CheckinFilter;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,

    /// Group by rep, region or category
    #[arg(long, default_value = "rep")]
    pub group_by: GroupBy,

    /// Only this region
    #[arg(long)]
    pub region: Option<String>,

    /// Only this category
    #[arg(long)]
    pub category: Option<String>,

    /// Also export the check-ins as CSV
    #[arg(long)]
    pub csv: bool,

    /// CSV output path [default: checkins-report-<from>-to-<to>.csv]
    #[arg(long, short, requires = "csv")]
    pub output: Option<PathBuf>,
}

pub async fn run(global: &GlobalArgs, args: ReportArgs) -> Result<()> {
    ensure!(args.from <= args.to, "--from must not be after --to");

    let api = session::connect_logged_in(global).await?;

    let filter = CheckinFilter {
        region: args.region.clone(),
        category: args.category.clone(),
        start_date: Some(args.from),
        end_date: Some(args.to),
        ..Default::default()
    };
    let checkins = api
        .all_checkins(&filter)
        .await
        .context("Failed to fetch check-ins")?;

    let groups = report::group_checkins(&checkins, args.group_by);
    output::field("Period", &format!("{} to {}", args.from, args.to));
    output::field("Check-ins", &checkins.len().to_string());
    println!();
    for group in &groups {
        println!(
            "{:<30} {:>5} check-in(s)  {:>4} location(s)",
            group.name.bold(),
            group.count(),
            group.locations.len()
        );
    }

    if args.csv {
        let path = args
            .output
            .unwrap_or_else(|| PathBuf::from(report::report_file_name(args.from, args.to)));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        report::write_csv(&checkins, BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!();
        output::success(&format!("Wrote {}", path.display()));
    }

    Ok(())
}
