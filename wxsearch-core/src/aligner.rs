//! Maps provider forecast days onto a fixed 7-day window starting today.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::{
    error::AlignError,
    model::{DisplayDay, ForecastDay},
};

pub const WEEK_LEN: usize = 7;

/// Build the 7-day display window.
///
/// Each slot `today + i` takes the provider day with that exact date. Slots
/// the provider does not cover reuse the last element of `days` (input order,
/// not date order) while keeping their own weekday label.
pub fn align(today: NaiveDate, days: &[ForecastDay]) -> Result<[DisplayDay; WEEK_LEN], AlignError> {
    let fallback = days.last().ok_or(AlignError::EmptyForecast)?;

    Ok(std::array::from_fn(|offset| {
        let target = today.checked_add_days(Days::new(offset as u64)).unwrap_or(NaiveDate::MAX);

        let (source, date_matched) = match days.iter().find(|d| d.date == target) {
            Some(day) => (day, true),
            None => {
                debug!(%target, fallback = %fallback.date, "No provider day, using last available");
                (fallback, false)
            }
        };

        DisplayDay {
            label: day_label(offset, target),
            date: target,
            temp_f: source.avg_temp_f.round() as i64,
            condition_text: source.condition_text.clone(),
            icon_url: normalize_icon_url(source.condition_icon.as_deref()),
            date_matched,
        }
    }))
}

fn day_label(offset: usize, date: NaiveDate) -> String {
    if offset == 0 { "Today".to_string() } else { date.format("%A").to_string() }
}

/// Protocol-relative icon paths (`//cdn...`) become `https:` URLs; other
/// values pass through. Missing or blank icons yield `None`.
pub fn normalize_icon_url(icon: Option<&str>) -> Option<String> {
    let icon = icon?.trim();

    if icon.is_empty() {
        None
    } else if icon.starts_with("//") {
        Some(format!("https:{icon}"))
    } else {
        Some(icon.to_string())
    }
}
