use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Longest horizon the forecast endpoint serves.
pub const MAX_FORECAST_DAYS: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ForecastError::usage(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ForecastError::usage(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude < 0.0 { 'S' } else { 'N' };
        let ew = if self.longitude < 0.0 { 'W' } else { 'E' };
        write!(f, "{:.4}°{ns}, {:.4}°{ew}", self.latitude.abs(), self.longitude.abs())
    }
}

/// Where the forecast is for. Place names are resolved to coordinates
/// before the forecast request is made.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Coordinates(Coordinates),
    Place(String),
}

/// Physical quantity behind a variable; drives conversion and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Temperature,
    Precipitation,
    Speed,
    Percentage,
    Code,
}

/// Hourly series the forecast endpoint can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Variable {
    #[serde(rename = "temperature_2m")]
    #[cfg_attr(feature = "clap", value(name = "temperature_2m"))]
    Temperature,
    #[serde(rename = "apparent_temperature")]
    #[cfg_attr(feature = "clap", value(name = "apparent_temperature"))]
    ApparentTemperature,
    #[serde(rename = "relative_humidity_2m")]
    #[cfg_attr(feature = "clap", value(name = "relative_humidity_2m"))]
    RelativeHumidity,
    #[serde(rename = "precipitation")]
    #[cfg_attr(feature = "clap", value(name = "precipitation"))]
    Precipitation,
    #[serde(rename = "precipitation_probability")]
    #[cfg_attr(feature = "clap", value(name = "precipitation_probability"))]
    PrecipitationProbability,
    #[serde(rename = "cloud_cover")]
    #[cfg_attr(feature = "clap", value(name = "cloud_cover"))]
    CloudCover,
    #[serde(rename = "wind_speed_10m")]
    #[cfg_attr(feature = "clap", value(name = "wind_speed_10m"))]
    WindSpeed,
    #[serde(rename = "wind_gusts_10m")]
    #[cfg_attr(feature = "clap", value(name = "wind_gusts_10m"))]
    WindGusts,
    #[serde(rename = "weather_code")]
    #[cfg_attr(feature = "clap", value(name = "weather_code"))]
    WeatherCode,
}

impl Variable {
    /// Name used on the wire, both in the `hourly` parameter and as the
    /// key of the returned series.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Temperature => "temperature_2m",
            Variable::ApparentTemperature => "apparent_temperature",
            Variable::RelativeHumidity => "relative_humidity_2m",
            Variable::Precipitation => "precipitation",
            Variable::PrecipitationProbability => "precipitation_probability",
            Variable::CloudCover => "cloud_cover",
            Variable::WindSpeed => "wind_speed_10m",
            Variable::WindGusts => "wind_gusts_10m",
            Variable::WeatherCode => "weather_code",
        }
    }

    pub const fn all() -> &'static [Variable] {
        &[
            Variable::Temperature,
            Variable::ApparentTemperature,
            Variable::RelativeHumidity,
            Variable::Precipitation,
            Variable::PrecipitationProbability,
            Variable::CloudCover,
            Variable::WindSpeed,
            Variable::WindGusts,
            Variable::WeatherCode,
        ]
    }

    pub const fn quantity(&self) -> Quantity {
        match self {
            Variable::Temperature | Variable::ApparentTemperature => Quantity::Temperature,
            Variable::Precipitation => Quantity::Precipitation,
            Variable::WindSpeed | Variable::WindGusts => Quantity::Speed,
            Variable::RelativeHumidity
            | Variable::PrecipitationProbability
            | Variable::CloudCover => Quantity::Percentage,
            Variable::WeatherCode => Quantity::Code,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = ForecastError;

    fn from_str(value: &str) -> Result<Self> {
        let lower = value.trim().to_lowercase();

        Variable::all().iter().copied().find(|v| v.as_str() == lower).ok_or_else(|| {
            let known: Vec<&str> = Variable::all().iter().map(Variable::as_str).collect();
            ForecastError::usage(format!(
                "unknown variable '{value}'. Supported variables: {}",
                known.join(", ")
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum UnitSystem {
    /// °C, km/h, mm
    #[default]
    Metric,
    /// °F, mph, inch
    Imperial,
}

impl FromStr for UnitSystem {
    type Err = ForecastError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(ForecastError::usage(format!(
                "unknown unit system '{value}'. Supported: metric, imperial"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    /// `forecast_days`, counted from today in the requested timezone.
    Days(u8),
    /// Inclusive `start_date` .. `end_date`.
    Dates { start: NaiveDate, end: NaiveDate },
}

impl TimeRange {
    pub fn days(days: u8) -> Result<Self> {
        if days == 0 || days > MAX_FORECAST_DAYS {
            return Err(ForecastError::usage(format!(
                "forecast days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
            )));
        }
        Ok(TimeRange::Days(days))
    }

    pub fn dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ForecastError::usage(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(TimeRange::Dates { start, end })
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Days(1)
    }
}

/// One forecast request, built from CLI input and consumed once.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastQuery {
    pub location: Location,
    pub variables: Vec<Variable>,
    pub units: UnitSystem,
    pub range: TimeRange,
    pub timezone: String,
}

impl ForecastQuery {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            variables: vec![Variable::Temperature],
            units: UnitSystem::default(),
            range: TimeRange::default(),
            timezone: "auto".to_string(),
        }
    }

    pub fn with_variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.clear();
        for v in variables {
            if !self.variables.contains(&v) {
                self.variables.push(v);
            }
        }
        self
    }

    /// Checks everything that must hold before a request is issued.
    pub fn validate(&self) -> Result<()> {
        match &self.location {
            Location::Coordinates(c) => {
                Coordinates::new(c.latitude, c.longitude)?;
            }
            Location::Place(name) if name.trim().is_empty() => {
                return Err(ForecastError::usage("place name must not be empty"));
            }
            Location::Place(_) => {}
        }

        if self.variables.is_empty() {
            return Err(ForecastError::usage("at least one variable must be requested"));
        }

        match self.range {
            TimeRange::Days(days) => {
                TimeRange::days(days)?;
            }
            TimeRange::Dates { start, end } => {
                TimeRange::dates(start, end)?;
            }
        }

        if self.timezone.trim().is_empty() {
            return Err(ForecastError::usage("timezone must not be empty"));
        }

        Ok(())
    }

    /// Query parameters for the forecast endpoint, in request order.
    pub fn query_pairs(&self, at: Coordinates) -> Vec<(&'static str, String)> {
        let hourly: Vec<&str> = self.variables.iter().map(Variable::as_str).collect();

        let mut pairs = vec![
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("hourly", hourly.join(",")),
        ];

        match self.range {
            TimeRange::Days(days) => pairs.push(("forecast_days", days.to_string())),
            TimeRange::Dates { start, end } => {
                pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
                pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
            }
        }

        pairs.push(("timezone", self.timezone.clone()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin() -> Location {
        Location::Coordinates(Coordinates { latitude: 52.52, longitude: 13.41 })
    }

    #[test]
    fn variable_as_str_roundtrip() {
        for v in Variable::all() {
            let parsed: Variable = v.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*v, parsed);
        }
    }

    #[test]
    fn unknown_variable_lists_supported_ones() {
        let err = "snowfall_depth".parse::<Variable>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown variable 'snowfall_depth'"));
        assert!(msg.contains("temperature_2m"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn coordinates_out_of_range_are_usage_errors() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());

        let err = Coordinates::new(91.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("latitude"));

        let err = Coordinates::new(0.0, -180.5).unwrap_err();
        assert!(err.to_string().contains("longitude"));

        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn coordinates_display_uses_hemispheres() {
        let c = Coordinates { latitude: -33.8688, longitude: 151.2093 };
        assert_eq!(c.to_string(), "33.8688°S, 151.2093°E");
    }

    #[test]
    fn time_range_bounds() {
        assert!(TimeRange::days(1).is_ok());
        assert!(TimeRange::days(MAX_FORECAST_DAYS).is_ok());
        assert!(TimeRange::days(0).is_err());
        assert!(TimeRange::days(MAX_FORECAST_DAYS + 1).is_err());

        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert!(TimeRange::dates(d("2025-03-01"), d("2025-03-01")).is_ok());
        let err = TimeRange::dates(d("2025-03-02"), d("2025-03-01")).unwrap_err();
        assert!(err.to_string().contains("before start date"));
    }

    #[test]
    fn defaults_match_single_day_temperature() {
        let q = ForecastQuery::new(berlin());
        assert_eq!(q.variables, vec![Variable::Temperature]);
        assert_eq!(q.units, UnitSystem::Metric);
        assert_eq!(q.range, TimeRange::Days(1));
        assert_eq!(q.timezone, "auto");
        assert!(q.validate().is_ok());
    }

    #[test]
    fn with_variables_deduplicates_preserving_order() {
        let q = ForecastQuery::new(berlin()).with_variables([
            Variable::Precipitation,
            Variable::Temperature,
            Variable::Precipitation,
        ]);
        assert_eq!(q.variables, vec![Variable::Precipitation, Variable::Temperature]);
    }

    #[test]
    fn validate_rejects_missing_pieces() {
        let q = ForecastQuery::new(Location::Place("   ".into()));
        assert!(q.validate().unwrap_err().to_string().contains("place name"));

        let q = ForecastQuery::new(berlin()).with_variables([]);
        assert!(q.validate().unwrap_err().to_string().contains("at least one variable"));

        let mut q = ForecastQuery::new(berlin());
        q.range = TimeRange::Days(30);
        assert!(q.validate().is_err());
    }

    #[test]
    fn query_pairs_for_date_range() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let mut q = ForecastQuery::new(berlin())
            .with_variables([Variable::Temperature, Variable::WindSpeed]);
        q.range = TimeRange::dates(d("2025-06-01"), d("2025-06-03")).unwrap();
        q.timezone = "Europe/Berlin".into();

        let pairs = q.query_pairs(Coordinates { latitude: 52.52, longitude: 13.41 });
        let expected: Vec<(&str, String)> = vec![
            ("latitude", "52.52".into()),
            ("longitude", "13.41".into()),
            ("hourly", "temperature_2m,wind_speed_10m".into()),
            ("start_date", "2025-06-01".into()),
            ("end_date", "2025-06-03".into()),
            ("timezone", "Europe/Berlin".into()),
        ];
        assert_eq!(pairs, expected);
    }
}
