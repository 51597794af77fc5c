//! Repository layer: fetch, classify, cache, fall back.

use chrono::{DateTime, Duration, Utc};

use crate::api::WeatherApi;
use crate::cache::ForecastCache;
use crate::classify::{Endpoint, RequestContext, ResponseClassifier};
use crate::error::DomainError;
use crate::model::{HourlyForecast, WeatherReport};
use crate::status::{StatusSender, StatusUpdate};

/// A report plus where it came from. `stale` is set when the network was
/// unreachable and the cache served an entry past its TTL.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub report: WeatherReport,
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
}

#[derive(Debug)]
pub struct WeatherRepository {
    api: Box<dyn WeatherApi>,
    classifier: ResponseClassifier,
    cache: ForecastCache,
    cache_ttl: Duration,
    status: StatusSender,
}

impl WeatherRepository {
    pub fn new(
        api: Box<dyn WeatherApi>,
        classifier: ResponseClassifier,
        cache: ForecastCache,
        cache_ttl: Duration,
        status: StatusSender,
    ) -> Self {
        Self {
            api,
            classifier,
            cache,
            cache_ttl,
            status,
        }
    }

    /// Current conditions for `city`.
    ///
    /// A cache entry within the TTL short-circuits the network entirely.
    /// Otherwise the call is fetched and classified; on [`DomainError::NoInternet`]
    /// any cached entry is served (flagged stale), every other error propagates.
    pub async fn current_weather(&self, city: &str) -> Result<CurrentWeather, DomainError> {
        let now = Utc::now();

        if let Some(cached) = self.cache.get_fresh(city, self.cache_ttl) {
            self.status.send(StatusUpdate::ServedFromCache {
                city: city.to_string(),
                age_minutes: cached.age_minutes(now),
            });
            return Ok(CurrentWeather {
                report: cached.report,
                fetched_at: cached.fetched_at,
                stale: false,
            });
        }

        self.status.send(StatusUpdate::Fetching {
            endpoint: Endpoint::CurrentWeather,
            city: city.to_string(),
        });

        let ctx = RequestContext::for_city(city);
        let outcome = self.api.current_weather(city).await;

        match self
            .classifier
            .classify(Endpoint::CurrentWeather, &ctx, outcome)
        {
            Ok(report) => {
                // A failed cache write must not fail the fetch.
                let _ = self.cache.put(report.clone());
                self.status.send(StatusUpdate::Fetched {
                    endpoint: Endpoint::CurrentWeather,
                    city: city.to_string(),
                });
                Ok(CurrentWeather {
                    report,
                    fetched_at: Utc::now(),
                    stale: false,
                })
            }
            Err(DomainError::NoInternet) => {
                self.status.send(StatusUpdate::FetchFailed {
                    endpoint: Endpoint::CurrentWeather,
                    error: DomainError::NoInternet,
                });
                match self.cache.get(city) {
                    Some(cached) => {
                        self.status.send(StatusUpdate::ServedFromCache {
                            city: city.to_string(),
                            age_minutes: cached.age_minutes(Utc::now()),
                        });
                        Ok(CurrentWeather {
                            report: cached.report,
                            fetched_at: cached.fetched_at,
                            stale: true,
                        })
                    }
                    None => Err(DomainError::NoInternet),
                }
            }
            Err(err) => {
                self.status.send(StatusUpdate::FetchFailed {
                    endpoint: Endpoint::CurrentWeather,
                    error: err.clone(),
                });
                Err(err)
            }
        }
    }

    /// Hourly forecast for `city`. Forecasts are not cached; only current
    /// conditions get the offline fallback.
    pub async fn hourly_forecast(
        &self,
        city: &str,
        hours: u32,
    ) -> Result<HourlyForecast, DomainError> {
        self.status.send(StatusUpdate::Fetching {
            endpoint: Endpoint::HourlyForecast,
            city: city.to_string(),
        });

        let ctx = RequestContext::for_city(city);
        let outcome = self.api.hourly_forecast(city, hours).await;

        match self
            .classifier
            .classify(Endpoint::HourlyForecast, &ctx, outcome)
        {
            Ok(forecast) => {
                self.status.send(StatusUpdate::Fetched {
                    endpoint: Endpoint::HourlyForecast,
                    city: city.to_string(),
                });
                Ok(forecast)
            }
            Err(err) => {
                self.status.send(StatusUpdate::FetchFailed {
                    endpoint: Endpoint::HourlyForecast,
                    error: err.clone(),
                });
                Err(err)
            }
        }
    }
}
