//! Runtime configuration utilities for fda-signal.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

const DEFAULT_OPENFDA_BASE: &str = "https://api.fda.gov";
const DEFAULT_METADATA_URL: &str = "https://open.fda.gov/fields/drugevent.yaml";
const ANONYMOUS_CALLS_PER_MINUTE: usize = 40;
const KEYED_CALLS_PER_MINUTE: usize = 240;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the OpenFDA API.
    pub openfda_base: String,
    /// Optional OpenFDA API key, raises the request budget.
    pub openfda_api_key: Option<String>,
    /// Location of the drug-event field metadata YAML.
    pub metadata_url: String,
    /// Requests allowed per rate-limit window.
    pub rate_limit_calls: usize,
    /// Length of the rolling rate-limit window.
    pub rate_limit_period: Duration,
    /// Result cap applied when a query does not set one.
    pub default_limit: usize,
    /// Retries after HTTP 429 before giving up.
    pub max_retries: u32,
    /// Root folder for analytic outputs.
    pub outputs_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Self::resolve(|key| env::var(key).ok());
        std::fs::create_dir_all(&settings.outputs_dir).context("creating outputs dir")?;
        Ok(settings)
    }

    /// Resolve settings from an arbitrary key lookup.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let openfda_api_key = non_empty("OPENFDA_API_KEY");
        let default_calls = if openfda_api_key.is_some() {
            KEYED_CALLS_PER_MINUTE
        } else {
            ANONYMOUS_CALLS_PER_MINUTE
        };

        let openfda_base =
            non_empty("OPENFDA_BASE").unwrap_or_else(|| DEFAULT_OPENFDA_BASE.to_string());
        let metadata_url =
            non_empty("OPENFDA_METADATA_URL").unwrap_or_else(|| DEFAULT_METADATA_URL.to_string());
        let rate_limit_calls = non_empty("OPENFDA_RATE_LIMIT_CALLS")
            .and_then(|v| v.parse().ok())
            .filter(|calls: &usize| *calls > 0)
            .unwrap_or(default_calls);
        let rate_limit_period = non_empty("OPENFDA_RATE_LIMIT_PERIOD_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));
        let default_limit = non_empty("OPENFDA_DEFAULT_LIMIT")
            .and_then(|v| v.parse().ok())
            .filter(|limit: &usize| *limit > 0)
            .unwrap_or(1000);
        let max_retries = non_empty("OPENFDA_MAX_RETRIES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let outputs_dir = non_empty("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./outputs"));

        Self {
            openfda_base,
            openfda_api_key,
            metadata_url,
            rate_limit_calls,
            rate_limit_period,
            default_limit,
            max_retries,
            outputs_dir,
        }
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}
