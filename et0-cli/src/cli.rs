use anyhow::anyhow;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use et0_core::{
    Address, Config, GeocodeError, Geocoder, Location, ProviderId, WeatherError,
    geocoder_from_config,
    solar::{day_of_year, estimate_solar_radiation},
    units::{UnitPreferences, UnitSystem},
    weather_service_from_config,
};
use inquire::{Password, PasswordDisplayMode, Select};
use serde::Serialize;

use crate::{form::CalculatorForm, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "et0", version, about = "Reference evapotranspiration (ET₀) calculator")]
pub struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Display units; overrides the configured preference.
    #[arg(long, global = true, value_enum)]
    pub units: Option<UnitsArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for UnitSystem {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Metric => UnitSystem::Metric,
            UnitsArg::Imperial => UnitSystem::Imperial,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the Google Maps API key and preferred units.
    Configure,

    /// Search for a place by free text.
    Search {
        query: String,

        /// Look up coordinates for results that only carry a place reference.
        #[arg(long)]
        resolve: bool,
    },

    /// Geocode a structured address.
    Geocode {
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
    },

    /// Find the address for a coordinate pair.
    Reverse {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Show today's weather inputs for a coordinate pair.
    Weather {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Show where each value came from.
        #[arg(long)]
        sources: bool,
    },

    /// Estimate ET₀. Values are read in the display units; anything not
    /// given is looked up from `--query` or `--lat/--lon`.
    Calculate(CalculateArgs),
}

#[derive(Debug, clap::Args)]
pub struct CalculateArgs {
    /// Place to geocode before fetching weather.
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub query: Option<String>,

    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Skip the weather lookup and only use the given values.
    #[arg(long)]
    pub no_fetch: bool,

    #[arg(long, allow_negative_numbers = true)]
    pub tmax: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub tmin: Option<f64>,

    /// Relative humidity, %.
    #[arg(long)]
    pub humidity: Option<f64>,

    #[arg(long)]
    pub wind: Option<f64>,

    /// Solar radiation, MJ/m²/day.
    #[arg(long)]
    pub solar: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub elevation: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CalculationOutput<'a> {
    form: &'a CalculatorForm,
    et0_mm_per_day: Option<f64>,
    missing: Vec<&'static str>,
    errors: Vec<String>,
}

fn geocode_failure(context: &str, e: GeocodeError) -> anyhow::Error {
    tracing::debug!(error = ?e, "{context}");
    anyhow!("{context}: {}", e.user_message())
}

fn weather_failure(e: WeatherError) -> anyhow::Error {
    tracing::debug!(error = ?e, "Weather lookup failed");
    anyhow!("Weather lookup failed: {}", e.user_message())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let units: UnitPreferences =
            self.units.map(UnitSystem::from).unwrap_or(config.units).into();

        match self.command {
            Command::Configure => configure(config)?,
            Command::Search { query, resolve } => {
                let geocoder = geocoder_from_config(&config)?;
                let mut results = geocoder
                    .search(&query)
                    .await
                    .map_err(|e| geocode_failure("Location search failed", e))?;

                if resolve {
                    results = resolve_all(&geocoder, results).await;
                }

                if self.json {
                    render::print_json(&results)?;
                } else {
                    render::geocode_results(&results);
                }
            }
            Command::Geocode { street, city, state, country, postal_code } => {
                let geocoder = geocoder_from_config(&config)?;
                let address = Address { street, city, state, country, postal_code };
                let results = geocoder
                    .geocode_address(&address)
                    .await
                    .map_err(|e| geocode_failure("Address lookup failed", e))?;

                if self.json {
                    render::print_json(&results)?;
                } else {
                    render::geocode_results(&results);
                }
            }
            Command::Reverse { lat, lon } => {
                let geocoder = geocoder_from_config(&config)?;
                let result = geocoder
                    .reverse(Location { latitude: lat, longitude: lon })
                    .await
                    .map_err(|e| geocode_failure("Reverse lookup failed", e))?;

                if self.json {
                    render::print_json(&result)?;
                } else {
                    render::geocode_results(std::slice::from_ref(&result));
                }
            }
            Command::Weather { lat, lon, sources } => {
                let service = weather_service_from_config(&config)?;
                let location = Location::new(lat, lon).map_err(weather_failure)?;
                let mut data = service.fetch(location).await.map_err(weather_failure)?;

                if self.json {
                    if !sources {
                        data.sources = None;
                    }
                    render::print_json(&data)?;
                } else {
                    render::weather(&data, units, sources);
                }
            }
            Command::Calculate(args) => calculate(&config, units, args, self.json).await?,
        }

        Ok(())
    }
}

/// Resolve place references one by one; failures keep the unresolved entry.
async fn resolve_all(
    geocoder: &Geocoder,
    results: Vec<et0_core::GeocodeResult>,
) -> Vec<et0_core::GeocodeResult> {
    let mut resolved = Vec::with_capacity(results.len());
    for r in results {
        let fallback = r.clone();
        match geocoder.ensure_resolved(r).await {
            Ok(r) => resolved.push(r),
            Err(e) => {
                eprintln!(
                    "Could not resolve '{}': {}",
                    fallback.formatted_address,
                    e.user_message()
                );
                resolved.push(fallback);
            }
        }
    }
    resolved
}

async fn calculate(
    config: &Config,
    units: UnitPreferences,
    args: CalculateArgs,
    json: bool,
) -> anyhow::Result<()> {
    let (form, errors) = fill_form(config, units, &args).await?;

    if json {
        render::print_json(&CalculationOutput {
            form: &form,
            et0_mm_per_day: form.et0(),
            missing: form.missing_fields(),
            errors,
        })?;
    } else {
        for e in &errors {
            eprintln!("{e}");
        }
        render::form(&form);
    }

    Ok(())
}

/// Populate the form from lookups and flags. Lookup failures are collected
/// as messages instead of aborting; only setup errors are returned.
async fn fill_form(
    config: &Config,
    units: UnitPreferences,
    args: &CalculateArgs,
) -> anyhow::Result<(CalculatorForm, Vec<String>)> {
    let mut form = CalculatorForm::new(units);
    let mut errors = Vec::new();

    if let Some(query) = &args.query {
        let geocoder = geocoder_from_config(config)?;
        match geocoder.locate(query).await {
            Ok(result) => form.apply_location(&result),
            Err(e) => errors.push(geocode_failure("Location lookup failed", e).to_string()),
        }
    }
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        form.latitude = Some(lat);
        form.longitude = Some(lon);
    }

    if !args.no_fetch {
        if let (Some(lat), Some(lon)) = (form.latitude, form.longitude) {
            let service = weather_service_from_config(config)?;
            let fetched = match Location::new(lat, lon) {
                Ok(location) => service.fetch(location).await,
                Err(e) => Err(e),
            };
            match fetched {
                Ok(data) => form.apply_weather(&data),
                Err(e) => errors.push(weather_failure(e).to_string()),
            }
        }
    }

    if form.solar_radiation.is_none() {
        if let Some(lat) = form.latitude {
            let day = day_of_year(Utc::now().date_naive());
            form.solar_radiation = Some(estimate_solar_radiation(lat, day));
        }
    }

    // Explicit values win over fetched ones.
    if let Some(v) = args.tmax {
        form.input_max_temperature(v);
    }
    if let Some(v) = args.tmin {
        form.input_min_temperature(v);
    }
    if let Some(v) = args.humidity {
        form.input_humidity(v);
    }
    if let Some(v) = args.wind {
        form.input_wind_speed(v);
    }
    if let Some(v) = args.solar {
        form.input_solar_radiation(v);
    }
    if let Some(v) = args.elevation {
        form.input_elevation(v);
    }

    Ok((form, errors))
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("Google Maps API key (leave empty to use OpenStreetMap only):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;

    if key.trim().is_empty() {
        config.remove_provider(ProviderId::Google);
    } else {
        config.upsert_provider_api_key(ProviderId::Google, key.trim().to_string());
    }

    let options = vec![UnitSystem::Metric, UnitSystem::Imperial];
    let start = options.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Preferred units:", options).with_starting_cursor(start).prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
