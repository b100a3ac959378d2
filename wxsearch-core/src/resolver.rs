use rand::{Rng, seq::SliceRandom};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::ResolveError,
    tables::{LocationTables, normalize_key},
};

/// Reserved query asking the provider to locate the caller by IP address.
pub const CURRENT_LOCATION_SENTINEL: &str = "auto:ip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Passed through as a literal city name.
    Direct,
    Nickname,
    /// A state name or abbreviation replaced by one of its cities.
    State,
    /// The [`CURRENT_LOCATION_SENTINEL`].
    CurrentLocation,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Direct => "direct",
            QueryKind::Nickname => "nickname",
            QueryKind::State => "state",
            QueryKind::CurrentLocation => "current-location",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
    /// String to hand to the weather provider.
    pub city: String,
    pub kind: QueryKind,
    /// Trimmed user input; set for nickname and state resolutions only.
    pub original: Option<String>,
}

/// Turns free-form search text into a provider query.
#[derive(Debug, Clone)]
pub struct SearchResolver {
    tables: LocationTables,
}

impl Default for SearchResolver {
    fn default() -> Self {
        Self::new(LocationTables::builtin())
    }
}

impl SearchResolver {
    pub fn new(tables: LocationTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &LocationTables {
        &self.tables
    }

    /// Resolve using the thread-local RNG for state city selection.
    pub fn resolve(&self, input: &str) -> Result<ResolvedQuery, ResolveError> {
        self.resolve_with(input, &mut rand::thread_rng())
    }

    /// Resolve with an explicit randomness source.
    ///
    /// State names resolve to a uniformly chosen candidate city, so two calls
    /// with the same state input may return different cities.
    pub fn resolve_with<R>(&self, input: &str, rng: &mut R) -> Result<ResolvedQuery, ResolveError>
    where
        R: Rng + ?Sized,
    {
        let trimmed = input.trim();

        if trimmed == CURRENT_LOCATION_SENTINEL {
            debug!("Current-location sentinel, skipping resolution");
            return Ok(ResolvedQuery {
                city: CURRENT_LOCATION_SENTINEL.to_string(),
                kind: QueryKind::CurrentLocation,
                original: None,
            });
        }

        if trimmed.is_empty() {
            return Err(ResolveError::Empty);
        }

        if is_numeric_noise(trimmed) {
            debug!(input = trimmed, "Rejecting numeric-only search input");
            return Err(ResolveError::NumericOnly { input: trimmed.to_string() });
        }

        let key = normalize_key(trimmed);

        if let Some(city) = self.tables.nickname(&key) {
            debug!(input = trimmed, city, "Resolved nickname");
            return Ok(ResolvedQuery {
                city: city.to_string(),
                kind: QueryKind::Nickname,
                original: Some(trimmed.to_string()),
            });
        }

        if let Some(city) = self.tables.state_cities(&key).and_then(|c| c.choose(rng)) {
            debug!(input = trimmed, city = city.as_str(), "Resolved state to city");
            return Ok(ResolvedQuery {
                city: city.clone(),
                kind: QueryKind::State,
                original: Some(trimmed.to_string()),
            });
        }

        Ok(ResolvedQuery { city: trimmed.to_string(), kind: QueryKind::Direct, original: None })
    }
}

/// Phone numbers, coordinates, zip-like noise: only digits and
/// `. , - + ( )` or whitespace, with at least one digit.
fn is_numeric_noise(input: &str) -> bool {
    let mut saw_digit = false;

    for c in input.chars() {
        match c {
            '0'..='9' => saw_digit = true,
            '.' | ',' | '-' | '+' | '(' | ')' => {}
            c if c.is_whitespace() => {}
            _ => return false,
        }
    }

    saw_digit
}
