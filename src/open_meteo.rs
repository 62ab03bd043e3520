use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::error::{Service, WeatherError};
use crate::weather::{
    Coordinates, DailyForecast, DayForecast, ForecastSource, GeocodeResult, Geocoder, Place,
};

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const USER_AGENT: &str = concat!("hava/", env!("CARGO_PKG_VERSION"));
const LANGUAGE: &str = "tr";
const COUNTRY: &str = "TR";

pub mod geocoding {
    use super::*;

    #[derive(Deserialize, Debug, Default)]
    struct SearchResponse {
        #[serde(default)]
        results: Vec<SearchResult>,
    }

    #[derive(Deserialize, Debug)]
    struct SearchResult {
        latitude: f64,
        longitude: f64,
        name: String,
    }

    #[derive(Deserialize, Debug, Default)]
    struct ReverseResponse {
        #[serde(default)]
        results: Vec<ReverseResult>,
    }

    #[derive(Deserialize, Debug)]
    struct ReverseResult {
        name: Option<String>,
        country_code: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct GeocodingClient {
        client: Client,
        base_url: String,
    }

    impl GeocodingClient {
        pub fn new(client: Client, base_url: &str) -> Self {
            Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            }
        }
    }

    #[async_trait]
    impl Geocoder for GeocodingClient {
        async fn forward(&self, name: &str) -> Result<GeocodeResult, WeatherError> {
            let url = format!("{}/search", self.base_url);
            let query = [
                ("name", name),
                ("count", "1"),
                ("language", LANGUAGE),
                ("format", "json"),
                ("country", COUNTRY),
            ];
            let body: SearchResponse = get_web_json(&self.client, &url, &query)
                .await
                .and_then(Response::error_for_status)
                .map_err(|e| WeatherError::network(Service::Geocoding, e))?
                .json()
                .await
                .map_err(|e| WeatherError::network(Service::Geocoding, e))?;

            let place = body
                .results
                .into_iter()
                .next()
                .ok_or_else(|| WeatherError::NotFound {
                    name: name.to_string(),
                })?;

            Ok(GeocodeResult {
                coordinates: Coordinates::new(place.latitude, place.longitude),
                resolved_name: place.name,
            })
        }

        async fn reverse(&self, coordinates: Coordinates) -> Option<Place> {
            let url = format!("{}/reverse", self.base_url);
            let query = [
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("language", LANGUAGE.to_string()),
                ("format", "json".to_string()),
                ("count", "1".to_string()),
            ];

            let response = match get_web_json(&self.client, &url, &query).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("Reverse geocode request failed: {}", e);
                    return None;
                }
            };

            if !response.status().is_success() {
                tracing::debug!("Reverse geocode returned status {}", response.status());
                return None;
            }

            let body: ReverseResponse = match response.json().await {
                Ok(b) => b,
                Err(e) => {
                    tracing::debug!("Reverse geocode parse error: {}", e);
                    return None;
                }
            };

            let place = body.results.into_iter().next()?;
            Some(Place {
                name: place.name,
                country_code: place.country_code,
            })
        }
    }
}

pub mod forecast {
    use super::*;
    use chrono::NaiveDate;

    pub const FORECAST_DAYS: u8 = 7;

    /// A body without `daily` decodes to an empty forecast.
    #[derive(Deserialize, Debug)]
    struct ForecastResponse {
        #[serde(default)]
        daily: Daily,
    }

    #[derive(Deserialize, Debug, Default)]
    struct Daily {
        #[serde(default)]
        time: Vec<NaiveDate>,

        #[serde(default)]
        weathercode: Vec<Option<i32>>,

        #[serde(default)]
        temperature_2m_max: Vec<Option<f64>>,

        #[serde(default)]
        temperature_2m_min: Vec<Option<f64>>,
    }

    impl From<Daily> for DailyForecast {
        fn from(daily: Daily) -> Self {
            let len = daily
                .time
                .len()
                .min(daily.weathercode.len())
                .min(daily.temperature_2m_max.len())
                .min(daily.temperature_2m_min.len());
            if len != daily.time.len() {
                tracing::warn!(
                    "Forecast arrays misaligned: {} days, {} codes, {} max, {} min",
                    daily.time.len(),
                    daily.weathercode.len(),
                    daily.temperature_2m_max.len(),
                    daily.temperature_2m_min.len()
                );
            }

            let days = (0..len)
                .map(|i| DayForecast {
                    date: daily.time[i],
                    weather_code: daily.weathercode[i],
                    temp_max: daily.temperature_2m_max[i],
                    temp_min: daily.temperature_2m_min[i],
                })
                .collect();
            DailyForecast { days }
        }
    }

    #[derive(Debug, Clone)]
    pub struct ForecastClient {
        client: Client,
        base_url: String,
    }

    impl ForecastClient {
        pub fn new(client: Client, base_url: &str) -> Self {
            Self {
                client,
                base_url: base_url.to_string(),
            }
        }
    }

    #[async_trait]
    impl ForecastSource for ForecastClient {
        async fn daily(&self, coordinates: Coordinates) -> Result<DailyForecast, WeatherError> {
            let query = [
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                (
                    "daily",
                    "weathercode,temperature_2m_max,temperature_2m_min".to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ];
            let body: ForecastResponse = get_web_json(&self.client, &self.base_url, &query)
                .await
                .and_then(Response::error_for_status)
                .map_err(|e| WeatherError::network(Service::Forecast, e))?
                .json()
                .await
                .map_err(|e| WeatherError::network(Service::Forecast, e))?;

            Ok(body.daily.into())
        }
    }
}

/// Shared HTTP client for both services.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(USER_AGENT).build()
}

async fn get_web_json<Q: serde::Serialize + ?Sized>(
    client: &Client,
    url: &str,
    query: &Q,
) -> Result<Response, reqwest::Error> {
    tracing::debug!("GET {}", url);
    client
        .get(url)
        .query(query)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
}
