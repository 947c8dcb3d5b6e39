//! Measurement units reported by the forecast endpoint and the local
//! conversions between them.
//!
//! The forecast is always requested in the endpoint's default units; the
//! `hourly_units` block of the response says what actually arrived, and
//! values are converted here into the unit system the user asked for.

use serde::Serialize;

use crate::{
    error::{ForecastError, Result},
    model::{Quantity, UnitSystem},
};

/// 9/5, the Celsius to Fahrenheit slope.
const CONVERSION_RATE_CF: f64 = 9.0 / 5.0;
const MM_PER_INCH: f64 = 25.4;
const MPS_PER_KMH: f64 = 1.0 / 3.6;
const MPS_PER_MPH: f64 = 0.447_04;
const MPS_PER_KNOT: f64 = 1852.0 / 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Celsius,
    Fahrenheit,
    KilometresPerHour,
    MetresPerSecond,
    MilesPerHour,
    Knots,
    Millimetres,
    Inches,
    Percent,
    WmoCode,
}

impl Unit {
    /// Parses a label as it appears in `hourly_units`.
    pub fn from_label(label: &str) -> Option<Unit> {
        match label.trim() {
            "°C" => Some(Unit::Celsius),
            "°F" => Some(Unit::Fahrenheit),
            "km/h" => Some(Unit::KilometresPerHour),
            "m/s" => Some(Unit::MetresPerSecond),
            "mph" => Some(Unit::MilesPerHour),
            "kn" => Some(Unit::Knots),
            "mm" => Some(Unit::Millimetres),
            "inch" => Some(Unit::Inches),
            "%" => Some(Unit::Percent),
            "wmo code" => Some(Unit::WmoCode),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::KilometresPerHour => "km/h",
            Unit::MetresPerSecond => "m/s",
            Unit::MilesPerHour => "mph",
            Unit::Knots => "kn",
            Unit::Millimetres => "mm",
            Unit::Inches => "in",
            Unit::Percent => "%",
            Unit::WmoCode => "",
        }
    }

    pub const fn quantity(&self) -> Quantity {
        match self {
            Unit::Celsius | Unit::Fahrenheit => Quantity::Temperature,
            Unit::KilometresPerHour | Unit::MetresPerSecond | Unit::MilesPerHour | Unit::Knots => {
                Quantity::Speed
            }
            Unit::Millimetres | Unit::Inches => Quantity::Precipitation,
            Unit::Percent => Quantity::Percentage,
            Unit::WmoCode => Quantity::Code,
        }
    }

    /// What the endpoint sends when no unit parameters are given.
    pub const fn api_default(quantity: Quantity) -> Unit {
        match quantity {
            Quantity::Temperature => Unit::Celsius,
            Quantity::Precipitation => Unit::Millimetres,
            Quantity::Speed => Unit::KilometresPerHour,
            Quantity::Percentage => Unit::Percent,
            Quantity::Code => Unit::WmoCode,
        }
    }

    /// Unit a quantity is displayed in for the given system.
    pub const fn target(quantity: Quantity, system: UnitSystem) -> Unit {
        match (quantity, system) {
            (Quantity::Temperature, UnitSystem::Imperial) => Unit::Fahrenheit,
            (Quantity::Precipitation, UnitSystem::Imperial) => Unit::Inches,
            (Quantity::Speed, UnitSystem::Imperial) => Unit::MilesPerHour,
            (quantity, _) => Unit::api_default(quantity),
        }
    }
}

/// Converts `value` between two units of the same quantity.
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64> {
    if from == to {
        return Ok(value);
    }
    if from.quantity() != to.quantity() {
        return Err(ForecastError::format(format!(
            "cannot convert {} into {}",
            from.symbol(),
            to.symbol()
        )));
    }

    let converted = match from.quantity() {
        Quantity::Temperature => {
            let celsius = match from {
                Unit::Fahrenheit => (value - 32.0) / CONVERSION_RATE_CF,
                _ => value,
            };
            match to {
                Unit::Fahrenheit => celsius * CONVERSION_RATE_CF + 32.0,
                _ => celsius,
            }
        }
        Quantity::Speed => {
            let mps = value * mps_factor(from);
            mps / mps_factor(to)
        }
        Quantity::Precipitation => {
            let mm = match from {
                Unit::Inches => value * MM_PER_INCH,
                _ => value,
            };
            match to {
                Unit::Inches => mm / MM_PER_INCH,
                _ => mm,
            }
        }
        Quantity::Percentage | Quantity::Code => value,
    };

    Ok(converted)
}

fn mps_factor(unit: Unit) -> f64 {
    match unit {
        Unit::KilometresPerHour => MPS_PER_KMH,
        Unit::MilesPerHour => MPS_PER_MPH,
        Unit::Knots => MPS_PER_KNOT,
        _ => 1.0,
    }
}
