use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fs, path::PathBuf};

use crate::{provider::ProviderId, tables::LocationTables};

/// Provider fetch window used when the config does not set one.
pub const DEFAULT_FORECAST_DAYS: u8 = 10;
pub const MAX_FORECAST_DAYS: u8 = 14;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, e.g. "weatherapi" or "openweather".
    pub default_provider: Option<String>,

    /// How many days to request from the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_days: Option<u8>,

    /// Example TOML:
    /// [providers.weatherapi]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Extra city aliases, merged over the built-in nickname table.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub nicknames: HashMap<String, String>,

    /// Extra or replacement state entries.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub states: HashMap<String, Vec<String>>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        let s = self.default_provider.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "No default provider configured.\n\
                 Hint: run `wxsearch configure <provider>` (e.g. `wxsearch configure weatherapi`) first."
            )
        })?;

        ProviderId::try_from(s.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Provider fetch window, clamped to what the providers accept.
    pub fn forecast_days(&self) -> u8 {
        self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS).clamp(1, MAX_FORECAST_DAYS)
    }

    /// Built-in lookup tables with this config's overrides applied.
    pub fn location_tables(&self) -> Result<LocationTables> {
        LocationTables::builtin()
            .with_overrides(&self.nicknames, &self.states)
            .context("Invalid [states] entry in configuration")
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wxsearch", "wxsearch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace a provider API key and optionally set default provider.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider. `WXSEARCH_<PROVIDER>_API_KEY` wins over the file.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<String> {
        self.provider_api_key_with_env(provider_id, |name| env::var(name).ok())
    }

    /// Like [`Config::provider_api_key`], reading variables through `lookup`.
    pub fn provider_api_key_with_env<F>(&self, provider_id: ProviderId, lookup: F) -> Option<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        lookup(provider_id.api_key_env_var())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.stored_api_key(provider_id).map(str::to_string))
    }

    /// API key from the config file only.
    pub fn stored_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn default_provider_id_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.default_provider_id().unwrap_err();

        assert!(err.to_string().contains("No default provider configured"));
    }

    #[test]
    fn set_api_key_and_default_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WA_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::WeatherApi);
        assert_eq!(cfg.stored_api_key(ProviderId::WeatherApi), Some("WA_KEY"));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WA_KEY".into());
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OW_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must exist");

        assert_eq!(default, ProviderId::WeatherApi);
        assert_eq!(cfg.stored_api_key(ProviderId::OpenWeather), Some("OW_KEY"));

        cfg.set_default_provider(ProviderId::OpenWeather);
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::OpenWeather);
    }

    #[test]
    fn env_key_takes_precedence_over_stored_key() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "FILE_KEY".into());

        let key = cfg.provider_api_key_with_env(ProviderId::WeatherApi, |name| {
            (name == "WXSEARCH_WEATHERAPI_API_KEY").then(|| "ENV_KEY".to_string())
        });
        assert_eq!(key.as_deref(), Some("ENV_KEY"));

        let key = cfg.provider_api_key_with_env(ProviderId::WeatherApi, |_| None);
        assert_eq!(key.as_deref(), Some("FILE_KEY"));

        let key = cfg.provider_api_key_with_env(ProviderId::WeatherApi, |_| Some("  ".into()));
        assert_eq!(key.as_deref(), Some("FILE_KEY"));
    }

    #[test]
    fn env_key_alone_is_enough() {
        let cfg = Config::default();

        let key = cfg.provider_api_key_with_env(ProviderId::OpenWeather, |_| Some("ENV".into()));
        assert_eq!(key.as_deref(), Some("ENV"));
        assert_eq!(cfg.provider_api_key_with_env(ProviderId::OpenWeather, |_| None), None);
    }

    #[test]
    fn stored_key_marks_provider_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OW_KEY".into());

        assert!(cfg.is_provider_configured(ProviderId::OpenWeather));
    }

    #[test]
    fn forecast_days_defaults_and_clamps() {
        let mut cfg = Config::default();
        assert_eq!(cfg.forecast_days(), DEFAULT_FORECAST_DAYS);

        cfg.forecast_days = Some(0);
        assert_eq!(cfg.forecast_days(), 1);

        cfg.forecast_days = Some(30);
        assert_eq!(cfg.forecast_days(), MAX_FORECAST_DAYS);
    }

    #[test]
    fn parses_table_overrides_from_toml() {
        let cfg = Config::from_toml(
            r#"
            default_provider = "weatherapi"
            forecast_days = 5

            [providers.weatherapi]
            api_key = "abc"

            [nicknames]
            "the 6ix" = "Toronto"

            [states]
            "puerto rico" = ["San Juan", "Ponce"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.forecast_days(), 5);
        assert_eq!(cfg.stored_api_key(ProviderId::WeatherApi), Some("abc"));

        let tables = cfg.location_tables().unwrap();
        assert_eq!(tables.nickname("the 6ix"), Some("Toronto"));
        assert_eq!(tables.state_cities("puerto rico").map(<[String]>::len), Some(2));
        // built-ins are still there
        assert_eq!(tables.nickname("big apple"), Some("New York"));
    }

    #[test]
    fn empty_state_override_is_rejected() {
        let cfg = Config::from_toml("[states]\natlantis = []\n").unwrap();

        let err = cfg.location_tables().unwrap_err();
        assert!(format!("{err:#}").contains("atlantis"));
    }

    #[test]
    fn minimal_file_parses() {
        let cfg = Config::from_toml("").unwrap();
        assert!(cfg.default_provider.is_none());
        assert!(cfg.providers.is_empty());
    }
}
