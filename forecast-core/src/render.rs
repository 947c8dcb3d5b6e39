use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{
    model::Quantity,
    response::{Forecast, Series},
    units::Unit,
};

const TIME_COLUMN: &str = "%Y-%m-%d %H:%M";
const MISSING: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// Header, hourly table and per-variable summary
    #[default]
    Text,
    /// The converted forecast as pretty-printed JSON
    Json,
}

/// Renders the whole forecast into one string, so that callers can write it
/// in a single go.
pub fn render(forecast: &Forecast, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(forecast)),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(forecast)?;
            out.push('\n');
            Ok(out)
        }
    }
}

pub fn render_text(forecast: &Forecast) -> String {
    let mut out = String::new();

    match &forecast.place {
        Some(place) => {
            let _ = writeln!(out, "Forecast for {place} ({})", forecast.coordinates);
        }
        None => {
            let _ = writeln!(out, "Forecast for {}", forecast.coordinates);
        }
    }
    match forecast.elevation {
        Some(elevation) => {
            let _ = writeln!(out, "Timezone {} · elevation {elevation:.0} m", forecast.timezone);
        }
        None => {
            let _ = writeln!(out, "Timezone {}", forecast.timezone);
        }
    }
    out.push('\n');

    if forecast.time.is_empty() {
        out.push_str("No hourly data returned.\n");
        return out;
    }

    let mut columns: Vec<Vec<String>> = Vec::with_capacity(forecast.series.len() + 1);
    columns.push(
        std::iter::once("time".to_string())
            .chain(forecast.time.iter().map(|t| t.format(TIME_COLUMN).to_string()))
            .collect(),
    );
    for series in &forecast.series {
        columns.push(
            std::iter::once(series.variable.to_string())
                .chain(series.values.iter().map(|v| format_cell(*v, series.unit)))
                .collect(),
        );
    }

    let widths: Vec<usize> = columns
        .iter()
        .map(|col| col.iter().map(|cell| cell.chars().count()).max().unwrap_or(0))
        .collect();

    for row in 0..=forecast.time.len() {
        let mut line = String::new();
        for (i, col) in columns.iter().enumerate() {
            let cell = col.get(row).map_or(MISSING, String::as_str);
            let pad = widths[i] - cell.chars().count();
            if i == 0 {
                line.push_str(cell);
                line.push_str(&" ".repeat(pad));
            } else {
                line.push_str("  ");
                line.push_str(&" ".repeat(pad));
                line.push_str(cell);
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let summaries: Vec<String> = forecast.series.iter().filter_map(summary_line).collect();
    if !summaries.is_empty() {
        out.push('\n');
        for line in summaries {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

fn summary_line(series: &Series) -> Option<String> {
    if series.unit.quantity() == Quantity::Code {
        return None;
    }

    let line = match series.summary() {
        Some(s) => format!(
            "{}: min {} · max {} · mean {} ({} h)",
            series.variable,
            format_value(s.min, series.unit),
            format_value(s.max, series.unit),
            format_value(s.mean, series.unit),
            s.count
        ),
        None => format!("{}: no data", series.variable),
    };
    Some(line)
}

fn format_cell(value: Option<f64>, unit: Unit) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format_value(v, unit))
}

pub fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Celsius | Unit::Fahrenheit => format!("{value:.1}{}", unit.symbol()),
        Unit::Percent => format!("{value:.0}{}", unit.symbol()),
        Unit::Inches => format!("{value:.2} {}", unit.symbol()),
        Unit::WmoCode => {
            let code = value.round() as i64;
            format!("{code} {}", weather_code_description(code))
        }
        _ => format!("{value:.1} {}", unit.symbol()),
    }
}

/// WMO weather interpretation code to text.
pub fn weather_code_description(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{Coordinates, Variable};

    fn forecast() -> Forecast {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        Forecast {
            coordinates: Coordinates { latitude: 52.52, longitude: 13.41 },
            place: Some("Berlin, Germany".into()),
            timezone: "Europe/Berlin".into(),
            elevation: Some(38.0),
            time: vec![day.and_hms_opt(0, 0, 0).unwrap(), day.and_hms_opt(1, 0, 0).unwrap()],
            series: vec![
                Series {
                    variable: Variable::Temperature,
                    unit: Unit::Fahrenheit,
                    values: vec![Some(68.0), Some(70.6)],
                },
                Series {
                    variable: Variable::WeatherCode,
                    unit: Unit::WmoCode,
                    values: vec![Some(3.0), None],
                },
            ],
        }
    }

    #[test]
    fn text_has_header_rows_and_summary() {
        let text = render_text(&forecast());

        assert!(text.starts_with("Forecast for Berlin, Germany (52.5200°N, 13.4100°E)\n"));
        assert!(text.contains("Timezone Europe/Berlin · elevation 38 m"));
        assert!(text.contains("2025-06-01 00:00"));
        assert!(text.contains("68.0°F"));
        assert!(text.contains("70.6°F"));
        assert!(text.contains("3 Overcast"));
        assert!(text.contains("temperature_2m: min 68.0°F · max 70.6°F · mean 69.3°F (2 h)"));
        assert!(!text.contains("weather_code:"));
    }

    #[test]
    fn missing_values_show_a_dash() {
        let text = render_text(&forecast());
        let last_row = text.lines().find(|l| l.starts_with("2025-06-01 01:00")).unwrap();
        assert!(last_row.trim_end().ends_with(MISSING));
    }

    #[test]
    fn short_series_pads_with_a_dash() {
        let mut f = forecast();
        f.series[0].values.truncate(1);

        let text = render_text(&f);
        let last_row = text.lines().find(|l| l.starts_with("2025-06-01 01:00")).unwrap();
        let cells: Vec<&str> = last_row.split_whitespace().collect();
        assert_eq!(cells, ["2025-06-01", "01:00", MISSING, MISSING]);
    }

    #[test]
    fn empty_time_axis() {
        let mut f = forecast();
        f.time.clear();
        f.series.clear();
        assert!(render_text(&f).contains("No hourly data returned."));
    }

    #[test]
    fn json_is_the_converted_forecast() {
        let json = render(&forecast(), OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(v["place"], "Berlin, Germany");
        assert_eq!(v["series"][0]["variable"], "temperature_2m");
        assert_eq!(v["series"][0]["unit"], "fahrenheit");
        assert_eq!(v["series"][0]["values"][0], 68.0);
        assert!(v["series"][1]["values"][1].is_null());
        assert_eq!(v["time"][0], "2025-06-01T00:00:00");
    }

    #[test]
    fn value_formatting_per_unit() {
        assert_eq!(format_value(20.04, Unit::Celsius), "20.0°C");
        assert_eq!(format_value(-3.46, Unit::Fahrenheit), "-3.5°F");
        assert_eq!(format_value(12.34, Unit::KilometresPerHour), "12.3 km/h");
        assert_eq!(format_value(0.1, Unit::Inches), "0.10 in");
        assert_eq!(format_value(1.26, Unit::Millimetres), "1.3 mm");
        assert_eq!(format_value(61.0, Unit::WmoCode), "61 Slight rain");
        assert_eq!(weather_code_description(42), "Unknown");
    }
}
