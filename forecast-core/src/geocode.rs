use serde::Deserialize;

use crate::{
    error::{ForecastError, Result},
    model::Coordinates,
};

#[derive(Debug, Deserialize)]
struct GeocodeResp {
    results: Option<Vec<GeoItem>>,
}

#[derive(Debug, Deserialize)]
struct GeoItem {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// First geocoding match for a place name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub label: String,
    pub coordinates: Coordinates,
}

/// Query parameters for the geocoding endpoint.
pub fn geocode_pairs(name: &str) -> [(&'static str, String); 4] {
    [
        ("name", name.trim().to_string()),
        ("count", "1".to_string()),
        ("language", "en".to_string()),
        ("format", "json".to_string()),
    ]
}

pub fn parse_geocoding(body: &str, name: &str) -> Result<ResolvedPlace> {
    let resp: GeocodeResp = serde_json::from_str(body).map_err(|e| ForecastError::ResponseFormat {
        message: "geocoding body is not a search result".into(),
        source: Some(e),
    })?;

    let item = resp
        .results
        .and_then(|v| v.into_iter().next())
        .ok_or_else(|| ForecastError::PlaceNotFound(name.trim().to_string()))?;

    let label = [Some(item.name), item.admin1, item.country]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .fold(Vec::<String>::new(), |mut parts, part| {
            if !parts.contains(&part) {
                parts.push(part);
            }
            parts
        })
        .join(", ");

    Ok(ResolvedPlace {
        label,
        coordinates: Coordinates::new(item.latitude, item.longitude)
            .map_err(|_| ForecastError::format("geocoding returned coordinates out of range"))?,
    })
}
