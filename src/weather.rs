use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::WeatherError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Outcome of a forward geocode: where the city is and what the service calls it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub coordinates: Coordinates,
    pub resolved_name: String,
}

/// Outcome of a reverse geocode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    pub name: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub weather_code: Option<i32>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
}

/// One entry per day, chronological, starting today in the location's timezone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyForecast {
    pub days: Vec<DayForecast>,
}

impl DailyForecast {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a city name to coordinates.
    async fn forward(&self, name: &str) -> Result<GeocodeResult, WeatherError>;

    /// Resolve coordinates to a place. Best effort: `None` on any failure.
    async fn reverse(&self, coordinates: Coordinates) -> Option<Place>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn daily(&self, coordinates: Coordinates) -> Result<DailyForecast, WeatherError>;
}
