use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::{
    client::Endpoints,
    error::{ForecastError, Result},
    fetch::DEFAULT_TIMEOUT,
    model::{MAX_FORECAST_DAYS, UnitSystem, Variable},
    render::OutputFormat,
};

pub const API_BASE_ENV: &str = "FORECAST_API_BASE";
pub const GEOCODING_BASE_ENV: &str = "FORECAST_GEOCODING_BASE";

/// Optional defaults read from disk. Every key may be omitted.
///
/// Example TOML:
/// units = "imperial"
/// forecast_days = 3
/// variables = ["temperature_2m", "precipitation"]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub units: Option<UnitSystem>,
    pub format: Option<OutputFormat>,
    pub timezone: Option<String>,
    pub forecast_days: Option<u8>,
    pub variables: Option<Vec<Variable>>,
    pub timeout_secs: Option<u64>,
    pub api_base: Option<String>,
    pub geocoding_base: Option<String>,
}

impl Config {
    /// Loads `explicit` if given (it must exist), otherwise the platform
    /// config file, or an empty default if that doesn't exist yet.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_file_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        debug!(path = %path.display(), "loading config");
        let contents = fs::read_to_string(&path).map_err(|e| ForecastError::Config {
            path: path.clone(),
            message: format!("failed to read file: {e}"),
        })?;

        Self::from_toml(&contents, &path)
    }

    pub fn from_toml(contents: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| ForecastError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.check_ranges(path)?;
        Ok(config)
    }

    /// Values serde accepts but a query can't use.
    fn check_ranges(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| ForecastError::Config { path: path.to_path_buf(), message };

        if self.timeout_secs == Some(0) {
            return Err(invalid("timeout_secs must be at least 1".to_string()));
        }
        if let Some(days) = self.forecast_days.filter(|d| !(1..=MAX_FORECAST_DAYS).contains(d)) {
            return Err(invalid(format!("forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {days}")));
        }
        Ok(())
    }

    /// Path to the default config file, if the platform has a config directory.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "forecast", "forecast").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    /// Endpoint base URLs; `env` lookups take precedence over the file.
    pub fn endpoints(&self, env: impl Fn(&str) -> Option<String>) -> Result<Endpoints> {
        let defaults = Endpoints::default();

        let forecast = pick_url(env(API_BASE_ENV), API_BASE_ENV, self.api_base.as_deref(), "api_base")?
            .unwrap_or(defaults.forecast);
        let geocoding = pick_url(
            env(GEOCODING_BASE_ENV),
            GEOCODING_BASE_ENV,
            self.geocoding_base.as_deref(),
            "geocoding_base",
        )?
        .unwrap_or(defaults.geocoding);

        Ok(Endpoints { forecast, geocoding })
    }
}

fn pick_url(
    from_env: Option<String>,
    env_name: &str,
    from_file: Option<&str>,
    key: &str,
) -> Result<Option<Url>> {
    let (raw, origin) = match (from_env.filter(|v| !v.trim().is_empty()), from_file) {
        (Some(v), _) => (v, format!("${env_name}")),
        (None, Some(v)) => (v.to_string(), key.to_string()),
        (None, None) => return Ok(None),
    };

    let url = Url::parse(raw.trim()).map_err(|e| ForecastError::Config {
        path: PathBuf::from(&origin),
        message: format!("invalid URL '{raw}': {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ForecastError::Config {
            path: PathBuf::from(origin),
            message: format!("URL '{raw}' must use http or https"),
        });
    }

    Ok(Some(url))
}
