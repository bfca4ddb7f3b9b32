//! Supervisor reports over a set of check-ins.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use checkin_core::CheckIn;
use checkin_core::error::InvalidInputError;

/// Label for check-ins with no value for the grouping key.
pub const UNASSIGNED: &str = "Unassigned";

const CSV_HEADER: [&str; 13] = [
    "Rep Name",
    "Region",
    "Category",
    "Business Name",
    "Contact",
    "Address",
    "Latitude",
    "Longitude",
    "Maps URL",
    "Date",
    "Time",
    "GPS Accuracy",
    "Notes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Rep,
    Region,
    Category,
}

impl GroupBy {
    fn key<'a>(&self, checkin: &'a CheckIn) -> Option<&'a str> {
        let value = match self {
            GroupBy::Rep => checkin.rep_name.as_deref(),
            GroupBy::Region => checkin.region.as_deref(),
            GroupBy::Category => checkin.category.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroupBy::Rep => "rep",
            GroupBy::Region => "region",
            GroupBy::Category => "category",
        })
    }
}

impl FromStr for GroupBy {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rep" => Ok(GroupBy::Rep),
            "region" => Ok(GroupBy::Region),
            "category" => Ok(GroupBy::Category),
            other => Err(InvalidInputError::Other {
                message: format!("unknown grouping '{}' (expected rep, region or category)", other),
            }),
        }
    }
}

/// Check-ins sharing one grouping value.
#[derive(Debug, Clone)]
pub struct ReportGroup {
    pub name: String,
    pub checkins: Vec<CheckIn>,
    /// Distinct business names visited by this group.
    pub locations: BTreeSet<String>,
}

impl ReportGroup {
    pub fn count(&self) -> usize {
        self.checkins.len()
    }
}

/// Group check-ins by `by`, busiest group first. Groups with equal counts
/// keep the order in which they were first seen.
pub fn group_checkins(checkins: &[CheckIn], by: GroupBy) -> Vec<ReportGroup> {
    let mut groups: Vec<ReportGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for checkin in checkins {
        let name = by.key(checkin).unwrap_or(UNASSIGNED);
        let slot = match index.get(name) {
            Some(&slot) => slot,
            None => {
                index.insert(name.to_string(), groups.len());
                groups.push(ReportGroup {
                    name: name.to_string(),
                    checkins: Vec::new(),
                    locations: BTreeSet::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        if let Some(ref location) = checkin.location_name {
            group.locations.insert(location.clone());
        }
        group.checkins.push(checkin.clone());
    }

    groups.sort_by(|a, b| b.count().cmp(&a.count()));
    groups
}

/// Write check-ins as CSV. Every field is quoted.
///
/// Date and time are rendered in the check-in's own timezone when it names
/// a known zone, UTC otherwise.
pub fn write_csv<W: Write>(checkins: &[CheckIn], mut out: W) -> io::Result<()> {
    write_row(&mut out, CSV_HEADER.iter().copied())?;

    for checkin in checkins {
        let (date, time) = local_date_time(checkin.checked_in_at, checkin.timezone.as_deref());
        let address = checkin
            .address_resolved
            .as_deref()
            .or(checkin.location_address.as_deref());

        let fields = [
            opt(checkin.rep_name.as_deref()),
            opt(checkin.region.as_deref()),
            opt(checkin.category.as_deref()),
            opt(checkin.location_name.as_deref()),
            checkin.contact_name.clone(),
            opt(address),
            num(checkin.gps_latitude),
            num(checkin.gps_longitude),
            opt(checkin.google_maps_url.as_deref()),
            date,
            time,
            num(checkin.gps_accuracy),
            opt(checkin.notes.as_deref()),
        ];
        write_row(&mut out, fields.iter().map(String::as_str))?;
    }

    out.flush()
}

/// `checkins-report-<start>-to-<end>.csv`
pub fn report_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "checkins-report-{}-to-{}.csv",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

fn write_row<'a, W: Write>(out: &mut W, fields: impl Iterator<Item = &'a str>) -> io::Result<()> {
    let line = fields
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{}", line)
}

fn local_date_time(at: DateTime<Utc>, timezone: Option<&str>) -> (String, String) {
    match timezone.and_then(|tz| tz.parse::<Tz>().ok()) {
        Some(tz) => {
            let local = at.with_timezone(&tz);
            (
                local.format("%Y-%m-%d").to_string(),
                local.format("%H:%M:%S").to_string(),
            )
        }
        None => (
            at.format("%Y-%m-%d").to_string(),
            at.format("%H:%M:%S").to_string(),
        ),
    }
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checkin(id: u32, rep: Option<&str>, location: &str, at: &str) -> CheckIn {
        serde_json::from_value(json!({
            "id": id,
            "user_id": 1,
            "contact_name": "Bob Buyer",
            "checked_in_at": at,
            "location_name": location,
            "rep_name": rep,
            "region": "North",
        }))
        .unwrap()
    }

    #[test]
    fn groups_sorted_by_count_with_unassigned_bucket() {
        let rows = vec![
            checkin(1, Some("Ada"), "Corner Shop", "2025-03-04T09:00:00Z"),
            checkin(2, Some("Ben"), "Mill Cafe", "2025-03-04T10:00:00Z"),
            checkin(3, Some("Ben"), "Mill Cafe", "2025-03-05T10:00:00Z"),
            checkin(4, None, "Depot", "2025-03-05T11:00:00Z"),
            checkin(5, Some("Ben"), "Bakery", "2025-03-06T10:00:00Z"),
        ];

        let groups = group_checkins(&rows, GroupBy::Rep);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Ben", "Ada", UNASSIGNED]);
        assert_eq!(groups[0].count(), 3);
        assert_eq!(
            groups[0].locations.iter().collect::<Vec<_>>(),
            ["Bakery", "Mill Cafe"]
        );

        let by_region = group_checkins(&rows, GroupBy::Region);
        assert_eq!(by_region.len(), 1);
        assert_eq!(by_region[0].count(), 5);
    }

    #[test]
    fn csv_quotes_every_field() {
        let mut row = checkin(1, Some("Ada \"The Rep\""), "Corner, Shop", "2025-03-04T09:05:30Z");
        row.gps_latitude = Some(51.5);
        row.notes = Some("line one".into());

        let mut out = Vec::new();
        write_csv(&[row], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"Rep Name\",\"Region\""));
        assert_eq!(
            lines[1],
            "\"Ada \"\"The Rep\"\"\",\"North\",\"\",\"Corner, Shop\",\"Bob Buyer\",\"\",\
             \"51.5\",\"\",\"\",\"2025-03-04\",\"09:05:30\",\"\",\"line one\""
        );
    }

    #[test]
    fn csv_uses_checkin_timezone() {
        let mut row = checkin(1, Some("Ada"), "Shop", "2025-03-04T23:30:00Z");
        row.timezone = Some("Asia/Tokyo".into());
        let mut out = Vec::new();
        write_csv(&[row.clone()], &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"2025-03-05\",\"08:30:00\""));

        row.timezone = Some("Not/AZone".into());
        let mut out = Vec::new();
        write_csv(&[row], &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"2025-03-04\",\"23:30:00\""));
    }

    #[test]
    fn file_name() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(
            report_file_name(start, end),
            "checkins-report-2025-03-01-to-2025-03-31.csv"
        );
    }

    #[test]
    fn group_by_parses() {
        assert_eq!("Region".parse::<GroupBy>().unwrap(), GroupBy::Region);
        assert!("team".parse::<GroupBy>().is_err());
    }
}
