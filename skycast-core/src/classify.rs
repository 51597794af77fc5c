//! Response classifier: turns a raw [`CallOutcome`] into either the payload
//! or exactly one [`DomainError`].
//!
//! Per-endpoint mapping rules are registered in an explicit table built at
//! startup, so the rule set is statically verifiable. The classifier itself
//! is pure and holds no mutable state, so it is safe to share across tasks.

use std::collections::HashMap;
use std::fmt;

use crate::error::DomainError;
use crate::outcome::{CallOutcome, HttpFailure, TransportKind};

/// One logical network operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CurrentWeather,
    HourlyForecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::CurrentWeather => "current-weather",
            Endpoint::HourlyForecast => "hourly-forecast",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[Endpoint::CurrentWeather, Endpoint::HourlyForecast]
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call arguments a mapping rule may need, e.g. the city name a 404 refers to.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub city: Option<String>,
}

impl RequestContext {
    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
        }
    }
}

/// Per-endpoint override for HTTP failures. Pure: may decline with `None`,
/// never fails, never touches anything outside its arguments.
pub type MappingRule =
    Box<dyn Fn(&HttpFailure, &RequestContext) -> Option<DomainError> + Send + Sync>;

/// On a city-lookup endpoint, a 404 means the city does not exist.
pub fn city_not_found_on_404(failure: &HttpFailure, ctx: &RequestContext) -> Option<DomainError> {
    if failure.status != 404 {
        return None;
    }
    let city = ctx.city.clone()?;
    Some(DomainError::CityNotFound(city))
}

pub struct ResponseClassifier {
    rules: HashMap<Endpoint, MappingRule>,
}

impl ResponseClassifier {
    /// A classifier with no per-endpoint rules; every HTTP failure maps to
    /// `ServerError`, including 404.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// The rule set the client actually runs with: both OpenWeather endpoints
    /// here are city lookups, so both opt into `CityNotFound` on 404.
    pub fn standard() -> Self {
        let mut classifier = Self::new();
        for endpoint in Endpoint::all() {
            classifier = classifier.with_rule(*endpoint, city_not_found_on_404);
        }
        classifier
    }

    pub fn with_rule(
        mut self,
        endpoint: Endpoint,
        rule: impl Fn(&HttpFailure, &RequestContext) -> Option<DomainError> + Send + Sync + 'static,
    ) -> Self {
        self.rules.insert(endpoint, Box::new(rule));
        self
    }

    /// Classify one call outcome. `Success` passes the payload through
    /// unchanged; everything else becomes exactly one [`DomainError`].
    pub fn classify<T>(
        &self,
        endpoint: Endpoint,
        ctx: &RequestContext,
        outcome: CallOutcome<T>,
    ) -> Result<T, DomainError> {
        match outcome {
            CallOutcome::Success(payload) => Ok(payload),
            CallOutcome::Http(failure) => {
                if let Some(rule) = self.rules.get(&endpoint) {
                    if let Some(mapped) = rule(&failure, ctx) {
                        return Err(mapped);
                    }
                }
                Err(DomainError::ServerError {
                    status: failure.status,
                    message: failure.message,
                })
            }
            CallOutcome::Transport(TransportKind::Timeout)
            | CallOutcome::Transport(TransportKind::ConnectivityLoss) => {
                Err(DomainError::NoInternet)
            }
            CallOutcome::Transport(TransportKind::Unknown(message)) => {
                Err(DomainError::Unexpected(message))
            }
        }
    }
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResponseClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut endpoints: Vec<&str> = self.rules.keys().map(Endpoint::as_str).collect();
        endpoints.sort_unstable();
        f.debug_struct("ResponseClassifier")
            .field("rules", &endpoints)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(city: &str) -> RequestContext {
        RequestContext::for_city(city)
    }

    #[test]
    fn success_passes_payload_through_unchanged() {
        let classifier = ResponseClassifier::standard();
        let payload = "sunny".to_string();

        let result = classifier.classify(
            Endpoint::CurrentWeather,
            &ctx("Paris"),
            CallOutcome::Success(payload.clone()),
        );

        assert_eq!(result, Ok(payload));
    }

    #[test]
    fn registered_rule_maps_404_to_city_not_found() {
        let classifier = ResponseClassifier::standard();

        let result: Result<(), _> = classifier.classify(
            Endpoint::CurrentWeather,
            &ctx("Paris"),
            CallOutcome::http(404, "city not found"),
        );

        assert_eq!(result, Err(DomainError::CityNotFound("Paris".into())));
    }

    #[test]
    fn unregistered_endpoint_maps_404_to_server_error() {
        let classifier = ResponseClassifier::new();

        let result: Result<(), _> = classifier.classify(
            Endpoint::CurrentWeather,
            &ctx("Paris"),
            CallOutcome::http(404, "city not found"),
        );

        assert_eq!(
            result,
            Err(DomainError::ServerError {
                status: 404,
                message: "city not found".into(),
            })
        );
    }

    #[test]
    fn rules_do_not_touch_other_status_codes() {
        let classifier = ResponseClassifier::standard();

        let result: Result<(), _> = classifier.classify(
            Endpoint::CurrentWeather,
            &ctx("Paris"),
            CallOutcome::http(500, "internal error"),
        );

        assert_eq!(
            result,
            Err(DomainError::ServerError {
                status: 500,
                message: "internal error".into(),
            })
        );
    }

    #[test]
    fn rule_declining_falls_back_to_default_mapping() {
        // Rule present, but without a city it cannot produce CityNotFound.
        let classifier = ResponseClassifier::standard();

        let result: Result<(), _> = classifier.classify(
            Endpoint::HourlyForecast,
            &RequestContext::default(),
            CallOutcome::http(404, "not found"),
        );

        assert_eq!(
            result,
            Err(DomainError::ServerError {
                status: 404,
                message: "not found".into(),
            })
        );
    }

    #[test]
    fn timeout_and_connectivity_loss_map_to_no_internet() {
        let classifier = ResponseClassifier::standard();

        for kind in [TransportKind::Timeout, TransportKind::ConnectivityLoss] {
            let result: Result<(), _> = classifier.classify(
                Endpoint::HourlyForecast,
                &ctx("Kyiv"),
                CallOutcome::Transport(kind),
            );
            assert_eq!(result, Err(DomainError::NoInternet));
        }
    }

    #[test]
    fn unknown_transport_failure_maps_to_unexpected() {
        let classifier = ResponseClassifier::standard();

        let result: Result<(), _> = classifier.classify(
            Endpoint::CurrentWeather,
            &ctx("Kyiv"),
            CallOutcome::Transport(TransportKind::Unknown("tls handshake failed".into())),
        );

        assert_eq!(
            result,
            Err(DomainError::Unexpected("tls handshake failed".into()))
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = ResponseClassifier::standard();
        let outcome = || CallOutcome::<()>::http(404, "city not found");

        let first = classifier.classify(Endpoint::CurrentWeather, &ctx("Lviv"), outcome());
        let second = classifier.classify(Endpoint::CurrentWeather, &ctx("Lviv"), outcome());

        assert_eq!(first, second);
    }

    #[test]
    fn custom_rule_may_map_other_statuses() {
        let classifier = ResponseClassifier::new().with_rule(Endpoint::CurrentWeather, |f, _| {
            (f.status == 503).then_some(DomainError::NoInternet)
        });

        let result: Result<(), _> = classifier.classify(
            Endpoint::CurrentWeather,
            &ctx("Paris"),
            CallOutcome::http(503, "maintenance"),
        );

        assert_eq!(result, Err(DomainError::NoInternet));
    }

    #[test]
    fn endpoint_ids_are_distinct() {
        let mut seen: Vec<&str> = Endpoint::all().iter().map(Endpoint::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), Endpoint::all().len());
    }
}
