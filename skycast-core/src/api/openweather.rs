use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::{HourlyEntry, HourlyForecast, WeatherReport};
use crate::outcome::{CallOutcome, HttpFailure, TransportKind};

use super::WeatherApi;

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherApi {
    api_key: String,
    http: Client,
}

impl OpenWeatherApi {
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// A request that outlives `timeout` surfaces as `TransportKind::Timeout`.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { api_key, http }
    }

    /// One GET attempt: transport errors, non-2xx statuses and undecodable
    /// bodies all land in the matching [`CallOutcome`] arm. Never fails on
    /// its own account.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> CallOutcome<T> {
        let res = match self.http.get(url).query(query).send().await {
            Ok(res) => res,
            Err(err) => return CallOutcome::Transport(TransportKind::from_reqwest(&err)),
        };

        let status = res.status();
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => return CallOutcome::Transport(TransportKind::from_reqwest(&err)),
        };

        if !status.is_success() {
            return CallOutcome::Http(HttpFailure {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        match serde_json::from_str(&body) {
            Ok(parsed) => CallOutcome::Success(parsed),
            Err(err) => CallOutcome::Transport(TransportKind::Unknown(format!(
                "failed to parse OpenWeather response: {err}"
            ))),
        }
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherApi {
    async fn current_weather(&self, city: &str) -> CallOutcome<WeatherReport> {
        let outcome: CallOutcome<OwCurrentResponse> = self
            .get_json(
                CURRENT_URL,
                &[
                    ("q", city),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ],
            )
            .await;

        outcome.map(|parsed| {
            let observation_time = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);
            let condition = first_condition(&parsed.weather);

            WeatherReport {
                city: parsed.name,
                temperature_c: parsed.main.temp,
                feels_like_c: parsed.main.feels_like,
                condition,
                humidity_pct: parsed.main.humidity,
                wind_speed_mps: parsed.wind.speed,
                observation_time,
            }
        })
    }

    async fn hourly_forecast(&self, city: &str, hours: u32) -> CallOutcome<HourlyForecast> {
        let outcome: CallOutcome<OwForecastResponse> = self
            .get_json(
                FORECAST_URL,
                &[
                    ("q", city),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ],
            )
            .await;

        // The free forecast endpoint returns 3-hour steps for 5 days; keep
        // the entries inside the requested window.
        let cutoff = Utc::now() + chrono::Duration::hours(i64::from(hours));

        outcome.map(|parsed| {
            let entries = parsed
                .list
                .into_iter()
                .filter_map(|entry| {
                    let time = unix_to_utc(entry.dt)?;
                    if time > cutoff {
                        return None;
                    }
                    Some(HourlyEntry {
                        time,
                        temperature_c: entry.main.temp,
                        condition: first_condition(&entry.weather),
                        precipitation_chance_pct: pop_to_pct(entry.pop),
                    })
                })
                .collect();

            HourlyForecast {
                city: parsed.city.name,
                entries,
            }
        })
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
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

/// OpenWeather reports precipitation probability as 0.0..=1.0.
fn pop_to_pct(pop: Option<f64>) -> u8 {
    let pct = (pop.unwrap_or(0.0) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("{\"cod\":404}"), "{\"cod\":404}");
    }

    #[test]
    fn truncate_body_cuts_long_bodies() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "й".repeat(500);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }

    #[test]
    fn pop_converts_to_percent() {
        assert_eq!(pop_to_pct(None), 0);
        assert_eq!(pop_to_pct(Some(0.37)), 37);
        assert_eq!(pop_to_pct(Some(1.0)), 100);
        assert_eq!(pop_to_pct(Some(1.7)), 100);
    }

    #[test]
    fn current_response_parses() {
        let body = r#"{
            "name": "Paris",
            "dt": 1700000000,
            "main": {"temp": 12.3, "feels_like": 11.0, "humidity": 71},
            "weather": [{"description": "light rain"}],
            "wind": {"speed": 4.2}
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).expect("valid current JSON");
        assert_eq!(parsed.name, "Paris");
        assert_eq!(parsed.main.humidity, 71);
        assert_eq!(first_condition(&parsed.weather), "light rain");
    }

    #[test]
    fn forecast_response_parses_without_pop() {
        let body = r#"{
            "city": {"name": "Kyiv"},
            "list": [
                {"dt": 1700000000, "main": {"temp": 1.0, "feels_like": -2.0, "humidity": 80},
                 "weather": [{"description": "snow"}]}
            ]
        }"#;

        let parsed: OwForecastResponse = serde_json::from_str(body).expect("valid forecast JSON");
        assert_eq!(parsed.city.name, "Kyiv");
        assert_eq!(parsed.list.len(), 1);
        assert_eq!(parsed.list[0].pop, None);
    }
}
