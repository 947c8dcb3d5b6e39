use reqwest::Url;
use tracing::{debug, info};

use crate::{
    error::{ForecastError, Result},
    fetch::{HttpFetch, HttpReply},
    geocode::{geocode_pairs, parse_geocoding},
    model::{Coordinates, ForecastQuery, Location},
    response::{Forecast, error_reason, parse_forecast},
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Base URLs of the two endpoints the client talks to.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub forecast: Url,
    pub geocoding: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: Url::parse(FORECAST_URL).expect("FORECAST_URL is a valid URL"),
            geocoding: Url::parse(GEOCODING_URL).expect("GEOCODING_URL is a valid URL"),
        }
    }
}

#[derive(Debug)]
pub struct ForecastClient<F> {
    fetch: F,
    endpoints: Endpoints,
}

impl<F: HttpFetch> ForecastClient<F> {
    pub fn new(fetch: F, endpoints: Endpoints) -> Self {
        Self { fetch, endpoints }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    /// The forecast request URL: base URL plus exactly the query's parameters.
    pub fn forecast_url(&self, query: &ForecastQuery, at: Coordinates) -> Url {
        let mut url = self.endpoints.forecast.clone();
        url.query_pairs_mut().clear().extend_pairs(query.query_pairs(at));
        url
    }

    fn geocoding_url(&self, name: &str) -> Url {
        let mut url = self.endpoints.geocoding.clone();
        url.query_pairs_mut().clear().extend_pairs(geocode_pairs(name));
        url
    }

    /// Turns a location into coordinates, plus a display label for places.
    pub async fn resolve(&self, location: &Location) -> Result<(Coordinates, Option<String>)> {
        match location {
            Location::Coordinates(c) => Ok((*c, None)),
            Location::Place(name) => {
                let url = self.geocoding_url(name);
                let reply = self.fetch.get(&url).await?;
                let body = success_body("geocoding", reply)?;

                let place = parse_geocoding(&body, name)?;
                info!(place = %place.label, coordinates = %place.coordinates, "resolved place name");
                Ok((place.coordinates, Some(place.label)))
            }
        }
    }

    /// Validates the query, resolves its location and performs the forecast
    /// request. Nothing is written anywhere; rendering is up to the caller.
    pub async fn fetch(&self, query: &ForecastQuery) -> Result<Forecast> {
        query.validate()?;

        let (at, place) = self.resolve(&query.location).await?;
        let url = self.forecast_url(query, at);
        debug!(%url, "requesting forecast");

        let reply = self.fetch.get(&url).await?;
        let body = success_body("forecast", reply)?;

        let mut forecast = parse_forecast(&body, &query.variables, query.units)?;
        forecast.place = place;
        Ok(forecast)
    }
}

fn success_body(endpoint: &'static str, reply: HttpReply) -> Result<String> {
    if reply.is_success() {
        return Ok(reply.body);
    }

    Err(ForecastError::Upstream {
        endpoint,
        status: reply.status,
        reason: error_reason(&reply.body),
    })
}
