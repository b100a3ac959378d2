//! Core library for the `wxsearch` CLI.
//!
//! This crate defines:
//! - Search text resolution (nicknames, state names, the current-location sentinel)
//! - Alignment of provider forecasts onto a 7-day window starting today
//! - Configuration & credentials handling
//! - Abstraction over weather providers
//!
//! It is used by `wxsearch-cli`, but can also be reused by other binaries or services.

pub mod aligner;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod tables;

pub use aligner::{WEEK_LEN, align, normalize_icon_url};
pub use config::{Config, ProviderConfig};
pub use error::{AlignError, ResolveError, TableError};
pub use lookup::WeatherLookup;
pub use model::{
    CurrentConditions, DisplayDay, ForecastDay, LocationInfo, LookupOutcome, WeatherReport,
};
pub use provider::{ProviderId, WeatherProvider};
pub use resolver::{CURRENT_LOCATION_SENTINEL, QueryKind, ResolvedQuery, SearchResolver};
pub use tables::LocationTables;
