use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::debug;

use crate::{
    aligner::align,
    model::LookupOutcome,
    provider::WeatherProvider,
    resolver::{ResolvedQuery, SearchResolver},
};

/// Runs one search end to end: resolve, a single provider call, align.
#[derive(Debug)]
pub struct WeatherLookup {
    resolver: SearchResolver,
    provider: Box<dyn WeatherProvider>,
    forecast_days: u8,
}

impl WeatherLookup {
    pub fn new(resolver: SearchResolver, provider: Box<dyn WeatherProvider>, forecast_days: u8) -> Self {
        Self { resolver, provider, forecast_days }
    }

    pub fn resolver(&self) -> &SearchResolver {
        &self.resolver
    }

    /// Invalid search text fails here without any network traffic.
    pub async fn search(&self, input: &str, today: NaiveDate) -> Result<LookupOutcome> {
        let query = self.resolver.resolve(input)?;
        self.fetch_resolved(query, today).await
    }

    pub async fn fetch_resolved(&self, query: ResolvedQuery, today: NaiveDate) -> Result<LookupOutcome> {
        debug!(city = query.city.as_str(), kind = %query.kind, "Fetching forecast");

        let report = self
            .provider
            .fetch_forecast(&query.city, self.forecast_days)
            .await
            .with_context(|| format!("Could not fetch weather for '{}'", query.city))?;

        let week = align(today, &report.days)
            .with_context(|| format!("No forecast available for '{}'", report.location.name))?;

        Ok(LookupOutcome {
            query,
            provider: report.provider,
            location: report.location,
            current: report.current,
            week,
        })
    }
}
