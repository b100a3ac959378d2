use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::model::{CurrentConditions, ForecastDay, LocationInfo, WeatherReport};

use super::{ProviderId, WeatherProvider, http_client, truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

/// WeatherAPI.com client. Understands the `auto:ip` query natively.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: Option<String>,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_f: f64,
    feelslike_f: f64,
    humidity: u8,
    wind_mph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_f: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaError,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: i64,
    message: String,
}

impl From<WaForecastResponse> for WeatherReport {
    fn from(parsed: WaForecastResponse) -> Self {
        let observed_at = parsed
            .current
            .last_updated_epoch
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        let days = parsed
            .forecast
            .forecastday
            .into_iter()
            .map(|fd| ForecastDay {
                date: fd.date,
                avg_temp_f: fd.day.avgtemp_f,
                condition_text: fd.day.condition.text,
                condition_icon: fd.day.condition.icon,
            })
            .collect();

        WeatherReport {
            provider: ProviderId::WeatherApi.to_string(),
            location: LocationInfo {
                name: parsed.location.name,
                region: parsed.location.region,
                country: parsed.location.country,
            },
            current: CurrentConditions {
                temp_f: parsed.current.temp_f,
                feels_like_f: parsed.current.feelslike_f,
                condition_text: parsed.current.condition.text,
                condition_icon: parsed.current.condition.icon,
                humidity_pct: parsed.current.humidity,
                wind_mph: parsed.current.wind_mph,
                observed_at,
            },
            days,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn fetch_forecast(&self, query: &str, days: u8) -> Result<WeatherReport> {
        let url = format!("{}/v1/forecast.json", self.base_url);
        let days = days.to_string();
        info!(query, days = days.as_str(), "Requesting WeatherAPI forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (forecast)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI forecast response body")?;

        if !status.is_success() {
            warn!(%status, "WeatherAPI forecast request failed");

            // The API reports "not found", bad keys etc. as a JSON error object.
            if let Ok(WaErrorBody { error }) = serde_json::from_str::<WaErrorBody>(&body) {
                return Err(anyhow!("WeatherAPI error {}: {}", error.code, error.message));
            }

            return Err(anyhow!(
                "WeatherAPI forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaForecastResponse =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI forecast JSON")?;

        Ok(parsed.into())
    }
}
