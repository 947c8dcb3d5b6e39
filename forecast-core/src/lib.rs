//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - The `ForecastQuery` model and its validation
//! - The Open-Meteo client (URL construction, geocoding, response parsing)
//! - Unit conversion and text/JSON rendering
//! - The error taxonomy and its exit codes
//! - Optional on-disk defaults
//!
//! It is used by `forecast-cli`, but nothing here prints or exits.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod model;
pub mod render;
pub mod response;
pub mod units;

pub use client::{Endpoints, ForecastClient};
pub use config::Config;
pub use error::{ForecastError, Result};
pub use fetch::{HttpFetch, HttpReply, ReqwestFetch};
pub use model::{Coordinates, ForecastQuery, Location, TimeRange, UnitSystem, Variable};
pub use render::{OutputFormat, render};
pub use response::Forecast;

pub use reqwest::Url;
