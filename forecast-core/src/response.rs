use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ForecastError, Result},
    model::{Coordinates, UnitSystem, Variable},
    units::{Unit, convert},
};

/// Format of the `time` axis when no `timeformat` parameter is sent.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct WireForecast {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    hourly_units: HashMap<String, String>,
    #[serde(default)]
    hourly: Option<WireHourly>,
}

#[derive(Debug, Deserialize)]
struct WireHourly {
    time: Vec<String>,
    #[serde(flatten)]
    series: HashMap<String, Value>,
}

/// Body the endpoint sends alongside 4xx/5xx statuses.
#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// A parsed forecast, already converted into the requested unit system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    pub time: Vec<NaiveDateTime>,
    pub series: Vec<Series>,
}

/// One hourly variable aligned with `Forecast::time`. `None` marks hours the
/// endpoint has no value for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub variable: Variable,
    pub unit: Unit,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl Series {
    /// Min, max and mean over the present values; `None` when every hour is missing.
    pub fn summary(&self) -> Option<SeriesSummary> {
        let present: Vec<f64> = self.values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }

        let min = present.iter().copied().fold(f64::MAX, f64::min);
        let max = present.iter().copied().fold(f64::MIN, f64::max);
        let mean = present.iter().sum::<f64>() / present.len() as f64;

        Some(SeriesSummary { min, max, mean, count: present.len() })
    }
}

/// Parses a 2xx forecast body, keeping only `variables` and converting them
/// into `units`.
pub fn parse_forecast(body: &str, variables: &[Variable], units: UnitSystem) -> Result<Forecast> {
    let wire: WireForecast = serde_json::from_str(body).map_err(|e| {
        ForecastError::ResponseFormat { message: "body is not a forecast document".into(), source: Some(e) }
    })?;

    let mut hourly = wire.hourly.ok_or_else(|| ForecastError::format("response has no hourly block"))?;

    let time = hourly
        .time
        .iter()
        .map(|t| {
            NaiveDateTime::parse_from_str(t, TIME_FORMAT)
                .map_err(|_| ForecastError::format(format!("unrecognised timestamp '{t}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut series = Vec::with_capacity(variables.len());
    for &variable in variables {
        let raw = hourly.series.remove(variable.as_str()).ok_or_else(|| {
            ForecastError::format(format!("response is missing requested series '{variable}'"))
        })?;

        let values: Vec<Option<f64>> = serde_json::from_value(raw).map_err(|e| {
            ForecastError::ResponseFormat {
                message: format!("series '{variable}' is not a list of numbers"),
                source: Some(e),
            }
        })?;

        if values.len() != time.len() {
            return Err(ForecastError::format(format!(
                "series '{variable}' has {} values for {} timestamps",
                values.len(),
                time.len()
            )));
        }

        let from = match wire.hourly_units.get(variable.as_str()) {
            Some(label) => Unit::from_label(label).ok_or_else(|| {
                ForecastError::format(format!("unrecognised unit '{label}' for series '{variable}'"))
            })?,
            None => Unit::api_default(variable.quantity()),
        };
        let to = Unit::target(variable.quantity(), units);

        let values = values
            .into_iter()
            .map(|v| v.map(|v| convert(v, from, to)).transpose())
            .collect::<Result<Vec<_>>>()?;

        series.push(Series { variable, unit: to, values });
    }

    Ok(Forecast {
        coordinates: Coordinates { latitude: wire.latitude, longitude: wire.longitude },
        place: None,
        timezone: wire.timezone.unwrap_or_else(|| "GMT".to_string()),
        elevation: wire.elevation,
        time,
        series,
    })
}

/// Extracts the `reason` from an error body, if the body is one.
pub fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<WireError>(body)
        .ok()
        .filter(|e| e.error)
        .and_then(|e| e.reason)
}
