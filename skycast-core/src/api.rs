use std::fmt::Debug;

use async_trait::async_trait;

use crate::model::{HourlyForecast, WeatherReport};
use crate::outcome::CallOutcome;

pub mod openweather;

/// Access to the weather API. Implementations return the raw, unclassified
/// [`CallOutcome`] of each attempt; the repository runs it through the
/// classifier. The trait seam also lets tests script outcomes directly.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> CallOutcome<WeatherReport>;

    async fn hourly_forecast(&self, city: &str, hours: u32) -> CallOutcome<HourlyForecast>;
}
