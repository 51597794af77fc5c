use anyhow::{Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};

use skycast_core::api::openweather::OpenWeatherApi;
use skycast_core::{
    Config, CurrentWeather, DomainError, ForecastCache, HourlyForecast, ResponseClassifier,
    StatusReceiver, StatusSender, StatusUpdate, WeatherRepository,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather forecast client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and defaults.
    Configure,

    /// Show current weather for a city.
    Current {
        /// City name; falls back to the configured default city.
        city: Option<String>,
    },

    /// Show an hourly forecast for a city.
    Forecast {
        /// City name; falls back to the configured default city.
        city: Option<String>,

        /// How many hours ahead to show.
        #[arg(long, default_value_t = 12)]
        hours: u32,
    },

    /// Drop all cached weather reports.
    ClearCache,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current { city } => current(city).await,
            Command::Forecast { city, hours } => forecast(city, hours).await,
            Command::ClearCache => clear_cache(),
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:").prompt()?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(anyhow!("API key cannot be empty."));
    }
    config.api_key = Some(api_key.to_string());

    let default_city = inquire::Text::new("Default city (leave empty to skip):").prompt()?;
    let default_city = default_city.trim();
    if !default_city.is_empty() {
        config.default_city = Some(default_city.to_string());
    }

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

fn clear_cache() -> Result<()> {
    let cache = ForecastCache::open_default()?;
    cache.clear()?;
    println!("Cache cleared.");
    Ok(())
}

fn build_repository(config: &Config) -> Result<(WeatherRepository, StatusReceiver)> {
    let api_key = config.api_key()?.to_owned();
    let (status, updates) = StatusSender::channel();

    let ttl_minutes = i64::try_from(config.cache_ttl_minutes()).unwrap_or(i64::MAX);
    let repository = WeatherRepository::new(
        Box::new(OpenWeatherApi::new(api_key)),
        ResponseClassifier::standard(),
        ForecastCache::open_default()?,
        chrono::Duration::minutes(ttl_minutes),
        status,
    );

    Ok((repository, updates))
}

/// Print status updates to stderr until the repository drops its sender.
fn spawn_status_printer(mut updates: StatusReceiver) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            match update {
                StatusUpdate::Fetching { endpoint, city } => {
                    eprintln!("Fetching {endpoint} for {city}...");
                }
                StatusUpdate::Fetched { .. } => {}
                StatusUpdate::ServedFromCache { city, age_minutes } => {
                    eprintln!("Using cached weather for {city} ({age_minutes} min old).");
                }
                StatusUpdate::FetchFailed { error, .. } => {
                    eprintln!("Fetch failed: {error}");
                }
            }
        }
    })
}

async fn current(city: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let city = config.resolve_city(city)?;

    let (repository, updates) = build_repository(&config)?;
    let printer = spawn_status_printer(updates);

    let result = repository.current_weather(&city).await;
    // Dropping the repository closes the status channel and ends the printer.
    drop(repository);
    let _ = printer.await;

    match result {
        Ok(weather) => {
            print_current(&weather);
            Ok(())
        }
        Err(err) => Err(anyhow!("{}", describe_error(&err))),
    }
}

async fn forecast(city: Option<String>, hours: u32) -> Result<()> {
    let config = Config::load()?;
    let city = config.resolve_city(city)?;

    let (repository, updates) = build_repository(&config)?;
    let printer = spawn_status_printer(updates);

    let result = repository.hourly_forecast(&city, hours).await;
    drop(repository);
    let _ = printer.await;

    match result {
        Ok(forecast) => {
            print_forecast(&forecast);
            Ok(())
        }
        Err(err) => Err(anyhow!("{}", describe_error(&err))),
    }
}

fn print_current(weather: &CurrentWeather) {
    let report = &weather.report;
    let observed = report.observation_time.with_timezone(&Local);

    println!("Weather in {}:", report.city);
    println!(
        "  {}  {:.1}°C (feels like {:.1}°C)",
        report.condition, report.temperature_c, report.feels_like_c
    );
    println!(
        "  humidity {}%, wind {:.1} m/s",
        report.humidity_pct, report.wind_speed_mps
    );
    println!("  observed at {}", observed.format("%Y-%m-%d %H:%M"));

    if weather.stale {
        let fetched = weather.fetched_at.with_timezone(&Local);
        println!(
            "  (offline: cached data from {}, may be out of date)",
            fetched.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_forecast(forecast: &HourlyForecast) {
    if forecast.entries.is_empty() {
        println!("No forecast data available for {}.", forecast.city);
        return;
    }

    println!("Hourly forecast for {}:", forecast.city);
    for entry in &forecast.entries {
        let time = entry.time.with_timezone(&Local);
        println!(
            "  {}  {:>6.1}°C  {:>3}% precip  {}",
            time.format("%a %H:%M"),
            entry.temperature_c,
            entry.precipitation_chance_pct,
            entry.condition
        );
    }
}

/// User-facing wording for each domain error.
fn describe_error(err: &DomainError) -> String {
    match err {
        DomainError::CityNotFound(city) => {
            format!("City '{city}' was not found. Check the spelling and try again.")
        }
        DomainError::NoInternet => {
            "No internet connection, and no cached weather is available yet.".to_string()
        }
        DomainError::ServerError { status, message } => {
            format!("The weather service returned an error (status {status}): {message}")
        }
        DomainError::Unexpected(message) => format!("Something went wrong: {message}"),
    }
}
