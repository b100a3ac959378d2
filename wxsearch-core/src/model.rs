use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::resolver::ResolvedQuery;

/// One provider day, before alignment. Input order is meaningful: the last
/// element is the fallback for days the provider does not cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub avg_temp_f: f64,
    pub condition_text: String,
    /// As delivered by the provider; may be protocol-relative (`//cdn...`).
    pub condition_icon: Option<String>,
}

/// One cell of the 7-day display window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDay {
    /// "Today" or the weekday name of `date`.
    pub label: String,
    /// Calendar day this entry is labelled as.
    pub date: NaiveDate,
    pub temp_f: i64,
    pub condition_text: String,
    pub icon_url: Option<String>,
    /// False when the provider did not cover `date` and the last provider day
    /// was substituted.
    pub date_matched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub region: Option<String>,
    pub country: String,
}

impl LocationInfo {
    pub fn display_name(&self) -> String {
        match self.region.as_deref().filter(|r| !r.is_empty()) {
            Some(region) => format!("{}, {}, {}", self.name, region, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_f: f64,
    pub feels_like_f: f64,
    pub condition_text: String,
    pub condition_icon: Option<String>,
    pub humidity_pct: u8,
    pub wind_mph: f64,
    pub observed_at: DateTime<Utc>,
}

/// Everything a provider returns for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: String,
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub days: Vec<ForecastDay>,
}

/// Result of a full search: what was asked, what the provider said, and the
/// aligned week.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome {
    pub query: ResolvedQuery,
    pub provider: String,
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub week: [DisplayDay; 7],
}
