//! Check-in records and query filters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::de;

/// A logged visit, joined with its location and (for supervisor listings)
/// the rep who made it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(deserialize_with = "de::id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub location_id: Option<String>,
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub gps_latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub gps_longitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub gps_accuracy: Option<f64>,
    #[serde(default)]
    pub address_resolved: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub checked_in_at: DateTime<Utc>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub location_address: Option<String>,
    #[serde(default)]
    pub google_maps_url: Option<String>,
    #[serde(default)]
    pub rep_name: Option<String>,
    #[serde(default)]
    pub rep_email: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Request body for `POST /api/checkins`.
///
/// `photo` is a `data:` URL; the backend uploads it and stores the hosted
/// URL. Coordinates are reverse-geocoded server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewCheckIn {
    pub business_name: String,
    pub contact_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_accuracy: Option<f64>,
}

/// Filters for the supervisor listing `GET /api/checkins/all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckinFilter {
    pub rep_id: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl CheckinFilter {
    /// Query-string pairs for the set filters, in a stable order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(ref rep_id) = self.rep_id {
            pairs.push(("rep_id".to_string(), rep_id.clone()));
        }
        if let Some(ref region) = self.region {
            pairs.push(("region".to_string(), region.clone()));
        }
        if let Some(ref category) = self.category {
            pairs.push(("category".to_string(), category.clone()));
        }
        push_dates(&mut pairs, self.start_date, self.end_date);
        pairs
    }
}

/// Selector for a rep's own history, `GET /api/checkins/my`.
///
/// The backend prefers a date range when either bound is present and falls
/// back to the current month otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MyCheckinsQuery {
    Month { month: u32, year: i32 },
    Range {
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    },
}

impl MyCheckinsQuery {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        match *self {
            MyCheckinsQuery::Month { month, year } => {
                pairs.push(("month".to_string(), month.to_string()));
                pairs.push(("year".to_string(), year.to_string()));
            }
            MyCheckinsQuery::Range {
                start_date,
                end_date,
            } => push_dates(&mut pairs, start_date, end_date),
        }
        pairs
    }
}

fn push_dates(
    pairs: &mut Vec<(String, String)>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) {
    if let Some(start) = start_date {
        pairs.push(("start_date".to_string(), start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = end_date {
        pairs.push(("end_date".to_string(), end.format("%Y-%m-%d").to_string()));
    }
}
