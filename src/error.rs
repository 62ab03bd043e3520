//! Error types for the weather lookups.

use std::fmt;

use thiserror::Error;

/// Which remote service a network failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Geocoding,
    Forecast,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Geocoding => write!(f, "geocoding"),
            Service::Forecast => write!(f, "forecast"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WeatherError {
    /// The geocoding service had no match for the city name.
    #[error("no place matches {name:?}")]
    NotFound { name: String },

    /// Transport failure, non-success status or undecodable body.
    #[error("{service} request failed: {source}")]
    Network {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    /// Superseded by a newer request of the same kind.
    #[error("request cancelled")]
    Cancelled,
}

impl WeatherError {
    pub fn network(service: Service, source: reqwest::Error) -> Self {
        Self::Network { service, source }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WeatherError::Cancelled)
    }

    /// The message shown in place of the forecast. `None` for errors that are
    /// never shown to the user.
    pub fn user_message(&self) -> Option<String> {
        let msg = match self {
            WeatherError::NotFound { .. } => "Şehir bulunamadı!!",
            WeatherError::Network { service, .. } => match service {
                Service::Geocoding => "Geocoding failed",
                Service::Forecast => "Hava durumu verisi alınamadı!!!",
            },
            WeatherError::Cancelled => return None,
        };
        Some(msg.to_string())
    }
}
