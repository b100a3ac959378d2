//! Plain-text rendering of search results.

use std::fmt;

use wxsearch_core::{DisplayDay, LookupOutcome, QueryKind, ResolvedQuery};

pub fn loading(query: &ResolvedQuery) -> String {
    match query.kind {
        QueryKind::CurrentLocation => "Loading weather for your current location...".to_string(),
        _ => format!("Loading weather for {}...", query.city),
    }
}

pub fn resolution(query: &ResolvedQuery) -> String {
    match &query.original {
        Some(original) => format!("{} -> {} ({})", original, query.city, query.kind),
        None => format!("{} ({})", query.city, query.kind),
    }
}

pub fn outcome(outcome: &LookupOutcome) -> String {
    Report(outcome).to_string()
}

/// Current-conditions card followed by the 7-day grid.
struct Report<'a>(&'a LookupOutcome);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let current = &outcome.current;

        writeln!(f, "{}", outcome.location.display_name())?;
        if let (Some(original), QueryKind::State | QueryKind::Nickname) =
            (&outcome.query.original, outcome.query.kind)
        {
            writeln!(f, "  (searched for \"{original}\")")?;
        }
        writeln!(
            f,
            "  {:.0}°F, feels like {:.0}°F, {}",
            current.temp_f, current.feels_like_f, current.condition_text
        )?;
        writeln!(f, "  Humidity {}%, wind {:.1} mph", current.humidity_pct, current.wind_mph)?;
        writeln!(f)?;

        for day in &outcome.week {
            writeln!(f, "{}", GridRow(day))?;
        }

        if outcome.week.iter().any(|d| !d.date_matched) {
            writeln!(f)?;
            writeln!(f, "* no forecast for this date; showing the last available day")?;
        }

        writeln!(f, "\nvia {}", outcome.provider)
    }
}

struct GridRow<'a>(&'a DisplayDay);

impl fmt::Display for GridRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = self.0;
        let marker = if day.date_matched { "" } else { "*" };
        let label = format!("{}{marker}", day.label);

        write!(f, "{label:<11} {:>4}°F  {}", day.temp_f, day.condition_text)?;
        if let Some(icon) = &day.icon_url {
            write!(f, "  {icon}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use wxsearch_core::{CurrentConditions, ForecastDay, LocationInfo, align};

    use super::*;

    fn sample(kind: QueryKind, original: Option<&str>) -> LookupOutcome {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let days = vec![ForecastDay {
            date: today,
            avg_temp_f: 64.6,
            condition_text: "Sunny".into(),
            condition_icon: Some("//cdn.example.com/113.png".into()),
        }];

        LookupOutcome {
            query: ResolvedQuery {
                city: "Austin".into(),
                kind,
                original: original.map(str::to_string),
            },
            provider: "weatherapi".into(),
            location: LocationInfo {
                name: "Austin".into(),
                region: Some("Texas".into()),
                country: "USA".into(),
            },
            current: CurrentConditions {
                temp_f: 70.4,
                feels_like_f: 69.6,
                condition_text: "Sunny".into(),
                condition_icon: None,
                humidity_pct: 40,
                wind_mph: 8.05,
                observed_at: Utc::now(),
            },
            week: align(today, &days).unwrap(),
        }
    }

    #[test]
    fn renders_card_and_grid() {
        let text = outcome(&sample(QueryKind::State, Some("tx")));

        assert!(text.starts_with("Austin, Texas, USA\n"));
        assert!(text.contains("(searched for \"tx\")"));
        assert!(text.contains("70°F, feels like 70°F, Sunny"));
        assert!(text.contains("Today"));
        assert!(text.contains("https://cdn.example.com/113.png"));
        assert!(text.contains("Saturday*"));
        assert!(text.contains("* no forecast for this date"));
        assert!(text.trim_end().ends_with("via weatherapi"));
    }

    #[test]
    fn grid_rows_mark_fallback_days() {
        let report = sample(QueryKind::Direct, None);
        let mut friday = report.week[0].clone();
        friday.icon_url = None;

        assert_eq!(GridRow(&friday).to_string(), "Today         65°F  Sunny");
        assert_eq!(
            GridRow(&report.week[1]).to_string(),
            "Saturday*     65°F  Sunny  https://cdn.example.com/113.png"
        );
    }

    #[test]
    fn direct_search_has_no_searched_for_line() {
        let text = outcome(&sample(QueryKind::Direct, None));
        assert!(!text.contains("searched for"));
    }

    #[test]
    fn resolution_lines() {
        let q = ResolvedQuery {
            city: "Chicago".into(),
            kind: QueryKind::Nickname,
            original: Some("windy city".into()),
        };
        assert_eq!(resolution(&q), "windy city -> Chicago (nickname)");

        let q = ResolvedQuery { city: "auto:ip".into(), kind: QueryKind::CurrentLocation, original: None };
        assert_eq!(resolution(&q), "auto:ip (current-location)");
        assert_eq!(loading(&q), "Loading weather for your current location...");
    }
}
