//! My check-ins command implementation.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;

use checkin_core::MyCheckinsQuery;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct MyCheckinsArgs {
    /// Month (1-12) [default: current month]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12), conflicts_with_all = ["from", "to"])]
    pub month: Option<u32>,

    /// Year [default: current year]
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub year: Option<i32>,

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

impl MyCheckinsArgs {
    fn query(&self, today: NaiveDate) -> MyCheckinsQuery {
        if self.from.is_some() || self.to.is_some() {
            return MyCheckinsQuery::Range {
                start_date: self.from,
                end_date: self.to,
            };
        }
        MyCheckinsQuery::Month {
            month: self.month.unwrap_or(today.month()),
            year: self.year.unwrap_or(today.year()),
        }
    }
}

pub async fn run(global: &GlobalArgs, args: MyCheckinsArgs) -> Result<()> {
    let api = session::connect_logged_in(global).await?;
    let query = args.query(Local::now().date_naive());

    let checkins = api
        .my_checkins(query)
        .await
        .context("Failed to list check-ins")?;

    output::checkins(&checkins, args.json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MyCheckinsArgs {
        MyCheckinsArgs {
            month: None,
            year: None,
            from: None,
            to: None,
            json: false,
        }
    }

    #[test]
    fn defaults_to_current_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(
            args().query(today),
            MyCheckinsQuery::Month { month: 3, year: 2025 }
        );

        let january = MyCheckinsArgs {
            month: Some(1),
            ..args()
        };
        assert_eq!(
            january.query(today),
            MyCheckinsQuery::Month { month: 1, year: 2025 }
        );
    }

    #[test]
    fn any_date_bound_selects_range() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let from = NaiveDate::from_ymd_opt(2025, 2, 1);
        let ranged = MyCheckinsArgs { from, ..args() };
        assert_eq!(
            ranged.query(today),
            MyCheckinsQuery::Range {
                start_date: from,
                end_date: None
            }
        );
    }
}
