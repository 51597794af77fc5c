//! Local cache of the last successful weather report per city.
//!
//! Backed by one JSON file under the platform cache directory. Entries never
//! expire on disk; freshness is decided by the caller-supplied TTL. The cache
//! is best-effort: a corrupt file is discarded, not fatal.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::model::WeatherReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedReport {
    pub report: WeatherReport,
    pub fetched_at: DateTime<Utc>,
}

impl CachedReport {
    pub fn fresh_within(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.fetched_at <= ttl
    }

    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.fetched_at).num_minutes()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    reports: HashMap<String, CachedReport>,
}

#[derive(Debug)]
pub struct ForecastCache {
    path: PathBuf,
    state: Mutex<CacheFile>,
}

impl ForecastCache {
    /// Open the cache at the platform default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(default_cache_path()?))
    }

    pub fn open(path: PathBuf) -> Self {
        let state = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => CacheFile::default(),
        };

        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn get(&self, city: &str) -> Option<CachedReport> {
        let state = self.state.lock().ok()?;
        state.reports.get(&key(city)).cloned()
    }

    pub fn get_fresh(&self, city: &str, ttl: Duration) -> Option<CachedReport> {
        let cached = self.get(city)?;
        cached.fresh_within(ttl, Utc::now()).then_some(cached)
    }

    /// Record a fresh report and persist the cache file.
    pub fn put(&self, report: WeatherReport) -> Result<()> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| anyhow!("weather cache lock poisoned"))?;
            state.reports.insert(
                key(&report.city),
                CachedReport {
                    report,
                    fetched_at: Utc::now(),
                },
            );
        }
        self.persist()
    }

    pub fn clear(&self) -> Result<()> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| anyhow!("weather cache lock poisoned"))?;
            state.reports.clear();
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let json = {
            let state = self
                .state
                .lock()
                .map_err(|_| anyhow!("weather cache lock poisoned"))?;
            serde_json::to_string_pretty(&*state).context("Failed to serialize weather cache")?
        };

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))
    }
}

/// Cache keys are case-insensitive city names.
fn key(city: &str) -> String {
    city.trim().to_lowercase()
}

fn default_cache_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "skycast", "skycast")
        .ok_or_else(|| anyhow!("Could not determine platform cache directory"))?;

    Ok(dirs.cache_dir().join("reports.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("skycast-cache-{}-{}.json", name, std::process::id()))
    }

    fn report(city: &str, temp: f64) -> WeatherReport {
        WeatherReport {
            city: city.to_string(),
            temperature_c: temp,
            feels_like_c: temp - 1.0,
            condition: "clear sky".to_string(),
            humidity_pct: 50,
            wind_speed_mps: 2.0,
            observation_time: Utc::now(),
        }
    }

    #[test]
    fn put_then_get_is_case_insensitive() {
        let path = temp_path("case");
        let cache = ForecastCache::open(path.clone());

        cache.put(report("Paris", 18.0)).expect("put should succeed");

        let cached = cache.get("  paris ").expect("entry should exist");
        assert_eq!(cached.report.city, "Paris");
        assert_eq!(cached.report.temperature_c, 18.0);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn cache_survives_reopen() {
        let path = temp_path("reopen");
        {
            let cache = ForecastCache::open(path.clone());
            cache.put(report("Kyiv", -3.0)).expect("put should succeed");
        }

        let cache = ForecastCache::open(path.clone());
        let cached = cache.get("Kyiv").expect("entry should survive reopen");
        assert_eq!(cached.report.temperature_c, -3.0);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_cache_file_is_discarded() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json at all").expect("write should succeed");

        let cache = ForecastCache::open(path.clone());
        assert!(cache.get("Paris").is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn freshness_respects_ttl() {
        let now = Utc::now();
        let cached = CachedReport {
            report: report("Lviv", 10.0),
            fetched_at: now - Duration::minutes(45),
        };

        assert!(cached.fresh_within(Duration::minutes(60), now));
        assert!(!cached.fresh_within(Duration::minutes(30), now));
        assert_eq!(cached.age_minutes(now), 45);
    }

    #[test]
    fn get_fresh_filters_stale_entries() {
        let path = temp_path("fresh");
        let cache = ForecastCache::open(path.clone());

        cache.put(report("Odesa", 22.0)).expect("put should succeed");

        assert!(cache.get_fresh("Odesa", Duration::minutes(30)).is_some());
        assert!(cache.get_fresh("Odesa", Duration::minutes(-1)).is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn clear_removes_all_entries() {
        let path = temp_path("clear");
        let cache = ForecastCache::open(path.clone());

        cache.put(report("Paris", 18.0)).expect("put should succeed");
        cache.clear().expect("clear should succeed");

        assert!(cache.get("Paris").is_none());

        let _ = fs::remove_file(path);
    }
}
