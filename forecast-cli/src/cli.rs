use std::{env, io::Write, path::PathBuf, time::Duration};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use forecast_core::{
    Config, Coordinates, ForecastClient, ForecastError, ForecastQuery, HttpFetch, Location,
    OutputFormat, ReqwestFetch, TimeRange, UnitSystem, Variable, render,
};
use inquire::CustomType;
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "forecast",
    version,
    about = "Print the Open-Meteo hourly weather forecast for a location",
    after_help = "Examples:\n  forecast --latitude 52.52 --longitude 13.41\n  forecast --place Lisbon --variables temperature_2m,precipitation --units imperial"
)]
pub struct Cli {
    /// Latitude in decimal degrees (-90..90).
    #[arg(long, allow_negative_numbers = true, requires = "longitude", conflicts_with = "place")]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees (-180..180).
    #[arg(long, allow_negative_numbers = true, requires = "latitude", conflicts_with = "place")]
    pub longitude: Option<f64>,

    /// Place name, resolved to coordinates through Open-Meteo geocoding.
    #[arg(long)]
    pub place: Option<String>,

    /// Hourly variables to request, comma separated [default: temperature_2m].
    #[arg(long, value_enum, value_delimiter = ',')]
    pub variables: Vec<Variable>,

    /// Number of days to forecast, starting today (1..16) [default: 1].
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    pub forecast_days: Option<u8>,

    /// First day of the range (YYYY-MM-DD).
    #[arg(long, requires = "end_date")]
    pub start_date: Option<NaiveDate>,

    /// Last day of the range, inclusive (YYYY-MM-DD).
    #[arg(long, requires = "start_date")]
    pub end_date: Option<NaiveDate>,

    /// Unit system for displayed values [default: metric].
    #[arg(long, value_enum)]
    pub units: Option<UnitSystem>,

    /// Output format [default: text].
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// IANA timezone for the time axis, or "auto" for the location's own [default: auto].
    #[arg(long)]
    pub timezone: Option<String>,

    /// Request timeout in seconds [default: 30].
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Read defaults from this TOML file instead of the platform config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Prompt for latitude and longitude when no location is given.
    #[arg(short, long)]
    pub interactive: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the real client from config and environment, then executes.
    pub async fn run(self, out: &mut impl Write) -> anyhow::Result<()> {
        let location = self.require_location()?;

        let config = Config::load(self.config.as_deref())?;
        let endpoints = config.endpoints(|name| env::var(name).ok())?;
        let timeout = self.timeout.map_or_else(|| config.timeout(), Duration::from_secs);
        let client = ForecastClient::new(ReqwestFetch::new(timeout)?, endpoints);

        self.execute(location, &config, &client, out).await
    }

    /// Location from flags, or from prompts in interactive mode.
    fn require_location(&self) -> Result<Location, ForecastError> {
        if let Some(location) = self.location()? {
            return Ok(location);
        }
        if self.interactive {
            return prompt_coordinates();
        }
        Err(ForecastError::usage(
            "a location is required: pass --latitude and --longitude, or --place (see --help)",
        ))
    }

    fn location(&self) -> Result<Option<Location>, ForecastError> {
        match (self.latitude, self.longitude, &self.place) {
            (Some(latitude), Some(longitude), _) => {
                Ok(Some(Location::Coordinates(Coordinates::new(latitude, longitude)?)))
            }
            (_, _, Some(place)) => Ok(Some(Location::Place(place.clone()))),
            _ => Ok(None),
        }
    }

    /// Flags win over the config file, which wins over built-in defaults.
    pub fn query(&self, location: Location, config: &Config) -> Result<ForecastQuery, ForecastError> {
        let mut query = ForecastQuery::new(location);

        let variables = if self.variables.is_empty() {
            config.variables.clone().unwrap_or_default()
        } else {
            self.variables.clone()
        };
        if !variables.is_empty() {
            query = query.with_variables(variables);
        }

        query.units = self.units.or(config.units).unwrap_or_default();

        query.range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => TimeRange::dates(start, end)?,
            _ => TimeRange::days(self.forecast_days.or(config.forecast_days).unwrap_or(1))?,
        };

        if let Some(timezone) = self.timezone.clone().or_else(|| config.timezone.clone()) {
            query.timezone = timezone;
        }

        query.validate()?;
        Ok(query)
    }

    async fn execute<F: HttpFetch>(
        self,
        location: Location,
        config: &Config,
        client: &ForecastClient<F>,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        let format = self.format.or(config.format).unwrap_or_default();
        let query = self.query(location, config)?;
        info!(?query, "built forecast query");

        let forecast = client.fetch(&query).await?;
        let rendered = render(&forecast, format).context("failed to render forecast")?;

        out.write_all(rendered.as_bytes()).context("failed to write forecast to stdout")?;
        out.flush().context("failed to write forecast to stdout")?;
        Ok(())
    }
}

fn prompt_coordinates() -> Result<Location, ForecastError> {
    let latitude = CustomType::<f64>::new("Enter latitude:")
        .with_help_message("decimal degrees, -90 to 90")
        .prompt()
        .map_err(|e| ForecastError::usage(format!("no latitude given: {e}")))?;
    let longitude = CustomType::<f64>::new("Enter longitude:")
        .with_help_message("decimal degrees, -180 to 180")
        .prompt()
        .map_err(|e| ForecastError::usage(format!("no longitude given: {e}")))?;

    Ok(Location::Coordinates(Coordinates::new(latitude, longitude)?))
}

/// Exit code for an error surfaced by `Cli::run`.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ForecastError>()
        .map_or(1, |e| u8::try_from(e.exit_code()).unwrap_or(1))
}
