//! Core library for the `skycast` weather client.
//!
//! This crate defines:
//! - The call-outcome model and the response classifier that turns raw
//!   network failures into typed domain errors
//! - The OpenWeather API client and the repository with its local cache
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod api;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod outcome;
pub mod repository;
pub mod status;

pub use api::WeatherApi;
pub use cache::ForecastCache;
pub use classify::{Endpoint, RequestContext, ResponseClassifier};
pub use config::Config;
pub use error::DomainError;
pub use model::{HourlyEntry, HourlyForecast, WeatherReport};
pub use outcome::{CallOutcome, HttpFailure, TransportKind};
pub use repository::{CurrentWeather, WeatherRepository};
pub use status::{StatusReceiver, StatusSender, StatusUpdate};
