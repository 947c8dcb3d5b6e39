use std::{error::Error as StdError, path::PathBuf};

use thiserror::Error;

/// Boxed transport cause, so that test transports can report failures
/// without having to fabricate a `reqwest::Error`.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Every way a single invocation can fail. All of them are terminal.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("{0}")]
    Usage(String),

    #[error("network error while requesting {url}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("{}", upstream_message(.endpoint, .status, .reason.as_deref()))]
    Upstream { endpoint: &'static str, status: u16, reason: Option<String> },

    #[error("unexpected response from forecast API: {message}")]
    ResponseFormat {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("no location found matching '{0}'")]
    PlaceNotFound(String),

    #[error("config error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

fn upstream_message(endpoint: &str, status: &u16, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{endpoint} API returned HTTP {status}: {reason}"),
        None => format!("{endpoint} API returned HTTP {status}"),
    }
}

impl ForecastError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::ResponseFormat { message: message.into(), source: None }
    }

    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network { url: url.into(), source: source.into() }
    }

    /// Process exit code for this failure category.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Network { .. } => 3,
            Self::Upstream { .. } => 4,
            Self::ResponseFormat { .. } => 5,
            Self::PlaceNotFound(_) => 6,
            Self::Config { .. } => 7,
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
