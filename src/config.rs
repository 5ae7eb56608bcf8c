//! Runtime configuration.
//!
//! Everything is read from `SENTINEL_*` environment variables with sensible
//! defaults, so a bare `sentinel` binary talks to a prediction service on
//! `localhost:8000`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

/// Default console port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

/// Default prediction service base URL.
pub const DEFAULT_PREDICTION_URL: &str = "http://localhost:8000";

/// Default upper bound on a single prediction request.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Largest accepted chart step: one day.
pub const MAX_FORECAST_STEP_MINUTES: u32 = 1440;

/// What the prediction client does when a request fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the error so the detail view can show a failed state with retry.
    #[default]
    Surfaced,

    /// Replace the error with the offline placeholder payload.
    SilentFallback,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surfaced" | "surface" | "error" => Ok(FailurePolicy::Surfaced),
            "fallback" | "silent" | "silent_fallback" => Ok(FailurePolicy::SilentFallback),
            other => bail!("unknown failure policy '{other}' (expected 'surfaced' or 'fallback')"),
        }
    }
}

/// Sentinel configuration.
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    /// Console listen port.
    pub port: u16,

    /// Base URL of the prediction service, without a trailing slash.
    pub prediction_url: String,

    /// Upper bound on a single prediction request.
    pub prediction_timeout: Duration,

    pub failure_policy: FailurePolicy,

    /// Spacing of chart points, for both forecast and history.
    pub forecast_step_minutes: u32,

    /// Sort alerts by severity before they reach the screen.
    pub sort_alerts: bool,

    /// Ambulance motion simulation period. `None` disables the simulation.
    pub jitter_interval: Option<Duration>,

    /// Header clock period.
    pub clock_interval: Duration,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            prediction_url: DEFAULT_PREDICTION_URL.to_string(),
            prediction_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            failure_policy: FailurePolicy::Surfaced,
            forecast_step_minutes: 30,
            sort_alerts: true,
            jitter_interval: Some(Duration::from_millis(2000)),
            clock_interval: Duration::from_millis(1000),
        }
    }
}

impl SentinelConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "SENTINEL_PORT", defaults.port)?;

        let prediction_url = lookup("SENTINEL_PREDICTION_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.prediction_url);
        if !prediction_url.starts_with("http://") && !prediction_url.starts_with("https://") {
            bail!("SENTINEL_PREDICTION_URL must be an http(s) URL, got '{prediction_url}'");
        }

        let timeout_ms: u64 = parse_or(&lookup, "SENTINEL_PREDICTION_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            bail!("SENTINEL_PREDICTION_TIMEOUT_MS must be greater than zero");
        }

        let failure_policy = match lookup("SENTINEL_FAILURE_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.failure_policy,
        };

        let forecast_step_minutes = parse_or(
            &lookup,
            "SENTINEL_FORECAST_STEP_MINUTES",
            defaults.forecast_step_minutes,
        )?;
        if forecast_step_minutes == 0 || forecast_step_minutes > MAX_FORECAST_STEP_MINUTES {
            bail!(
                "SENTINEL_FORECAST_STEP_MINUTES must be between 1 and {MAX_FORECAST_STEP_MINUTES}, got {forecast_step_minutes}"
            );
        }

        let sort_alerts = parse_or(&lookup, "SENTINEL_SORT_ALERTS", defaults.sort_alerts)?;

        let jitter_ms: u64 = parse_or(&lookup, "SENTINEL_JITTER_MS", 2000)?;
        let jitter_interval = (jitter_ms > 0).then(|| Duration::from_millis(jitter_ms));

        let clock_ms: u64 = parse_or(&lookup, "SENTINEL_CLOCK_MS", 1000)?;
        if clock_ms == 0 {
            bail!("SENTINEL_CLOCK_MS must be greater than zero");
        }

        Ok(Self {
            port,
            prediction_url,
            prediction_timeout: Duration::from_millis(timeout_ms),
            failure_policy,
            forecast_step_minutes,
            sort_alerts,
            jitter_interval,
            clock_interval: Duration::from_millis(clock_ms),
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value '{raw}' for {key}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SentinelConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.prediction_url, "http://localhost:8000");
        assert_eq!(config.prediction_timeout, Duration::from_secs(5));
        assert_eq!(config.failure_policy, FailurePolicy::Surfaced);
        assert_eq!(config.forecast_step_minutes, 30);
        assert!(config.sort_alerts);
        assert_eq!(config.jitter_interval, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_overrides() {
        let config = SentinelConfig::from_lookup(lookup(&[
            ("SENTINEL_PORT", "8080"),
            ("SENTINEL_PREDICTION_URL", "https://engine.example/"),
            ("SENTINEL_PREDICTION_TIMEOUT_MS", "750"),
            ("SENTINEL_FAILURE_POLICY", "fallback"),
            ("SENTINEL_FORECAST_STEP_MINUTES", "15"),
            ("SENTINEL_SORT_ALERTS", "false"),
            ("SENTINEL_JITTER_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.prediction_url, "https://engine.example");
        assert_eq!(config.prediction_timeout, Duration::from_millis(750));
        assert_eq!(config.failure_policy, FailurePolicy::SilentFallback);
        assert_eq!(config.forecast_step_minutes, 15);
        assert!(!config.sort_alerts);
        assert_eq!(config.jitter_interval, None);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SentinelConfig::from_lookup(lookup(&[("SENTINEL_PORT", "http")])).is_err());
        assert!(
            SentinelConfig::from_lookup(lookup(&[("SENTINEL_PREDICTION_TIMEOUT_MS", "0")]))
                .is_err()
        );
        assert!(SentinelConfig::from_lookup(lookup(&[("SENTINEL_FAILURE_POLICY", "retry")])).is_err());
        assert!(
            SentinelConfig::from_lookup(lookup(&[("SENTINEL_PREDICTION_URL", "localhost:8000")]))
                .is_err()
        );
    }

    #[test]
    fn test_forecast_step_bounded() {
        let step = |v: &str| {
            SentinelConfig::from_lookup(lookup(&[("SENTINEL_FORECAST_STEP_MINUTES", v)]))
        };
        assert_eq!(step("1440").unwrap().forecast_step_minutes, 1440);
        assert!(step("1441").is_err());
        assert!(step("4294967295").is_err());
        assert!(step("0").is_err());
    }
}
