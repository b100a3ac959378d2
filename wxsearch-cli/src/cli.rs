use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode};
use tracing::info;
use wxsearch_core::{
    CURRENT_LOCATION_SENTINEL, Config, ProviderId, SearchResolver, WeatherLookup,
    provider::{default_provider_from_config, provider_from_config},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxsearch", version, about = "Weather lookup by city, nickname or US state")]
pub struct Cli {
    /// Log resolution and provider details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "weatherapi" or "openweather".
        provider: String,
    },

    /// Show current conditions and the 7-day forecast.
    Show {
        /// City, city nickname ("big apple") or state ("texas", "tx").
        #[arg(required_unless_present = "here")]
        query: Option<String>,

        /// Use the location derived from your network address instead.
        #[arg(long, conflicts_with = "query")]
        here: bool,

        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show how a search would be resolved, without calling a provider.
    Resolve {
        query: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { query, here, provider, json } => {
                let input = if here {
                    CURRENT_LOCATION_SENTINEL.to_string()
                } else {
                    query.unwrap_or_default()
                };
                show(&input, provider.as_deref(), json).await
            }
            Command::Resolve { query } => {
                let config = Config::load()?;
                let resolver = SearchResolver::new(config.location_tables()?);
                let resolved = resolver.resolve(&query)?;
                println!("{}", render::resolution(&resolved));
                Ok(())
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if config.is_provider_configured(id) {
        let replace = Confirm::new(&format!("An API key for {id} is already configured. Replace it?"))
            .with_default(false)
            .prompt()
            .context("Failed to read answer")?;
        if !replace {
            println!("Keeping the existing {id} API key.");
            return Ok(());
        }
    }

    let api_key = Password::new(&format!("{id} API key:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key);

    if config.default_provider.as_deref() != Some(id.as_str()) {
        let make_default = Confirm::new(&format!("Use {id} as the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    config.save()?;
    info!(provider = id.as_str(), "Saved provider configuration");
    println!("Saved {id} configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(input: &str, provider: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;

    let provider = match provider {
        Some(name) => provider_from_config(ProviderId::try_from(name)?, &config)?,
        None => default_provider_from_config(&config)?,
    };

    let resolver = SearchResolver::new(config.location_tables()?);
    let lookup = WeatherLookup::new(resolver, provider, config.forecast_days());

    let query = lookup.resolver().resolve(input)?;
    eprintln!("{}", render::loading(&query));

    let outcome = lookup.fetch_resolved(query, Local::now().date_naive()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render::outcome(&outcome));
    }

    Ok(())
}
