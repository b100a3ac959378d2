use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{info, warn};

use crate::{
    model::{CurrentConditions, ForecastDay, LocationInfo, WeatherReport},
    resolver::CURRENT_LOCATION_SENTINEL,
};

use super::{ProviderId, WeatherProvider, http_client, truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeather client. The free API only offers 5 days of 3-hour slots, which
/// are folded into one [`ForecastDay`] per local calendar date.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
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

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &str) -> Result<T> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", query), ("appid", self.api_key.as_str()), ("units", "imperial")])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {endpoint} response body"))?;

        if !status.is_success() {
            warn!(%status, endpoint, "OpenWeather request failed");

            if let Ok(err) = serde_json::from_str::<OwErrorBody>(&body) {
                return Err(anyhow!("OpenWeather error {}: {}", status.as_u16(), err.message));
            }

            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {endpoint} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    country: String,
    /// Seconds east of UTC.
    #[serde(default)]
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

fn icon_url(code: &str) -> String {
    format!("https://openweathermap.org/img/wn/{code}@2x.png")
}

fn describe(weather: &[OwWeather]) -> (String, Option<String>) {
    match weather.first() {
        Some(w) => (w.description.clone(), Some(icon_url(&w.icon))),
        None => ("Unknown".to_string(), None),
    }
}

/// Fold 3-hour slots into days by local date. Temperature is the mean of the
/// day's slots; the condition comes from the slot closest to local noon.
fn group_daily(entries: &[OwForecastEntry], utc_offset_secs: i64) -> Vec<ForecastDay> {
    let mut by_date: BTreeMap<NaiveDate, Vec<(u32, &OwForecastEntry)>> = BTreeMap::new();

    for entry in entries {
        let Some(local) = DateTime::<Utc>::from_timestamp(entry.dt + utc_offset_secs, 0) else {
            continue;
        };
        by_date.entry(local.date_naive()).or_default().push((local.hour(), entry));
    }

    by_date
        .into_iter()
        .filter_map(|(date, slots)| {
            let (_, noon) = slots.iter().min_by_key(|(hour, _)| hour.abs_diff(12))?;
            let avg_temp_f =
                slots.iter().map(|(_, e)| e.main.temp).sum::<f64>() / slots.len() as f64;
            let (condition_text, condition_icon) = describe(&noon.weather);

            Some(ForecastDay { date, avg_temp_f, condition_text, condition_icon })
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn fetch_forecast(&self, query: &str, days: u8) -> Result<WeatherReport> {
        if query == CURRENT_LOCATION_SENTINEL {
            bail!(
                "OpenWeather cannot look up your location automatically.\n\
                 Hint: search for a city name, or use the weatherapi provider."
            );
        }

        info!(query, days, "Requesting OpenWeather current weather and forecast");

        let (current, forecast) = tokio::try_join!(
            self.get_json::<OwCurrentResponse>("weather", query),
            self.get_json::<OwForecastResponse>("forecast", query),
        )?;

        let observed_at = DateTime::<Utc>::from_timestamp(current.dt, 0).unwrap_or_else(Utc::now);
        let (condition_text, condition_icon) = describe(&current.weather);

        let mut daily = group_daily(&forecast.list, forecast.city.timezone);
        daily.truncate(usize::from(days));

        Ok(WeatherReport {
            provider: ProviderId::OpenWeather.to_string(),
            location: LocationInfo {
                name: current.name,
                region: None,
                country: current.sys.country.unwrap_or(forecast.city.country),
            },
            current: CurrentConditions {
                temp_f: current.main.temp,
                feels_like_f: current.main.feels_like,
                condition_text,
                condition_icon,
                humidity_pct: current.main.humidity,
                wind_mph: current.wind.speed,
                observed_at,
            },
            days: daily,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    fn entry(dt: i64, temp: f64, description: &str) -> OwForecastEntry {
        OwForecastEntry {
            dt,
            main: OwMain { temp, feels_like: temp, humidity: 50 },
            weather: vec![OwWeather { description: description.into(), icon: "01d".into() }],
        }
    }

    // 2024-03-01T00:00:00Z
    const MARCH_1: i64 = 1709251200;
    const HOUR: i64 = 3600;

    #[test]
    fn groups_slots_by_local_date() {
        let entries = vec![
            entry(MARCH_1 + 9 * HOUR, 40.0, "morning"),
            entry(MARCH_1 + 12 * HOUR, 50.0, "noon"),
            entry(MARCH_1 + 21 * HOUR, 45.0, "evening"),
            entry(MARCH_1 + 24 * HOUR, 30.0, "next day"),
        ];

        let days = group_daily(&entries, 0);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(days[0].avg_temp_f, 45.0);
        assert_eq!(days[0].condition_text, "noon");
        assert_eq!(
            days[0].condition_icon.as_deref(),
            Some("https://openweathermap.org/img/wn/01d@2x.png")
        );
        assert_eq!(days[1].condition_text, "next day");
    }

    #[test]
    fn utc_offset_shifts_local_date() {
        // 03:00 UTC on March 1 is still February 29 at UTC-6.
        let entries = vec![entry(MARCH_1 + 3 * HOUR, 20.0, "late night")];

        let days = group_daily(&entries, -6 * HOUR);

        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[tokio::test]
    async fn rejects_current_location_sentinel() {
        let provider = OpenWeatherProvider::new("KEY".into()).unwrap();

        let err = provider.fetch_forecast(CURRENT_LOCATION_SENTINEL, 5).await.unwrap_err();

        assert!(err.to_string().contains("cannot look up your location"));
    }

    #[tokio::test]
    async fn combines_current_and_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Denver"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Denver",
                "dt": MARCH_1,
                "main": { "temp": 55.2, "feels_like": 53.0, "humidity": 20 },
                "weather": [{ "description": "clear sky", "icon": "01d" }],
                "wind": { "speed": 6.9 },
                "sys": { "country": "US" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "city": { "name": "Denver", "country": "US", "timezone": 0 },
                "list": [
                    {
                        "dt": MARCH_1 + 12 * HOUR,
                        "main": { "temp": 50.0, "feels_like": 48.0, "humidity": 25 },
                        "weather": [{ "description": "few clouds", "icon": "02d" }]
                    },
                    {
                        "dt": MARCH_1 + 36 * HOUR,
                        "main": { "temp": 44.0, "feels_like": 40.0, "humidity": 30 },
                        "weather": [{ "description": "light snow", "icon": "13d" }]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri()).unwrap();
        let report = provider.fetch_forecast("Denver", 1).await.unwrap();

        assert_eq!(report.provider, "openweather");
        assert_eq!(report.location.display_name(), "Denver, US");
        assert_eq!(report.current.condition_text, "clear sky");
        assert_eq!(report.days.len(), 1);
        assert_eq!(report.days[0].condition_text, "few clouds");
    }

    #[tokio::test]
    async fn surfaces_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri()).unwrap();
        let err = provider.fetch_forecast("Atlantis", 5).await.unwrap_err();

        assert_eq!(err.to_string(), "OpenWeather error 404: city not found");
    }
}
