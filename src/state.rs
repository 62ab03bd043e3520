//! Weather state and its transitions.
//!
//! `reduce` is pure: it mutates the state and returns the side effects the
//! coordinator has to run. Every outgoing request carries the generation that
//! was current when it was issued; results from an older generation are
//! dropped on arrival.

use crate::error::WeatherError;
use crate::weather::{Coordinates, DailyForecast, GeocodeResult, Place};

pub const DEFAULT_CITY: &str = "İstanbul";
pub const COUNTRY_CODE: &str = "TR";

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherState {
    city_name: String,
    coordinates: Option<Coordinates>,
    forecast: Option<DailyForecast>,
    loading: bool,
    error: Option<String>,

    geocode_generation: u64,
    forecast_generation: u64,
    /// The user picked a city themselves; a late location guess must not override it.
    user_selected: bool,
    /// `city_name` was set from a geocoder's canonical name and must not be renamed again.
    canonical: bool,
}

impl WeatherState {
    pub fn new(city_name: &str) -> Self {
        Self {
            city_name: city_name.to_string(),
            coordinates: None,
            forecast: None,
            loading: false,
            error: None,
            geocode_generation: 0,
            forecast_generation: 0,
            user_selected: false,
            canonical: false,
        }
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn forecast(&self) -> Option<&DailyForecast> {
        self.forecast.as_ref()
    }

    /// A geocode or forecast request is outstanding for the current city.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// State as it looks after a finished forecast, for view tests.
    #[cfg(test)]
    pub(crate) fn loaded(forecast: DailyForecast) -> Self {
        let mut state = Self::default();
        state.set_forecast(forecast);
        state
    }

    /// State as it looks after a failed lookup, for view tests.
    #[cfg(test)]
    pub(crate) fn failed(message: &str) -> Self {
        let mut state = Self::default();
        state.set_error(message.to_string());
        state
    }

    /// State while a lookup is outstanding, for view tests.
    #[cfg(test)]
    pub(crate) fn pending() -> Self {
        let mut state = Self::default();
        state.loading = true;
        state
    }

    fn set_forecast(&mut self, forecast: DailyForecast) {
        self.forecast = Some(forecast);
        self.error = None;
        self.loading = false;
    }

    fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.forecast = None;
        self.loading = false;
    }

    fn clear_results(&mut self) {
        self.forecast = None;
        self.error = None;
    }
}

impl Default for WeatherState {
    fn default() -> Self {
        Self::new(DEFAULT_CITY)
    }
}

#[derive(Debug)]
pub enum Event {
    /// The app came up.
    Started,
    /// The user picked a city from the list.
    CitySelected(String),
    /// Device position lookup finished; `None` if it failed or timed out.
    Located(Option<Coordinates>),
    /// Reverse geocode of the device position finished.
    PlaceResolved(Option<Place>),
    GeocodeFinished {
        generation: u64,
        result: Result<GeocodeResult, WeatherError>,
    },
    ForecastFinished {
        generation: u64,
        result: Result<DailyForecast, WeatherError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Forward-geocode `name`, superseding any geocode in flight.
    Geocode { generation: u64, name: String },
    /// Fetch the daily forecast, superseding any fetch in flight.
    FetchForecast {
        generation: u64,
        coordinates: Coordinates,
    },
    /// Drop the forecast fetch in flight, if any.
    CancelForecast,
    /// Query the device position once.
    Locate,
    ReverseGeocode(Coordinates),
}

pub fn reduce(state: &mut WeatherState, event: Event) -> Vec<Effect> {
    match event {
        Event::Started => {
            let mut effects = begin_geocode(state);
            effects.push(Effect::Locate);
            effects
        }
        Event::CitySelected(name) => {
            state.user_selected = true;
            change_city(state, name, false)
        }
        Event::Located(Some(coordinates)) => vec![Effect::ReverseGeocode(coordinates)],
        Event::Located(None) => vec![],
        Event::PlaceResolved(Some(place)) => match place {
            Place {
                name: Some(name),
                country_code: Some(country),
            } if country == COUNTRY_CODE && !name.is_empty() => {
                if state.user_selected {
                    tracing::debug!("Ignoring located city {}: user already chose", name);
                    return vec![];
                }
                tracing::info!("Located in {}", name);
                change_city(state, name, false)
            }
            other => {
                tracing::debug!("Located place not usable: {:?}", other);
                vec![]
            }
        },
        Event::PlaceResolved(None) => vec![],
        Event::GeocodeFinished { generation, result } => {
            if generation != state.geocode_generation {
                tracing::debug!("Dropping stale geocode result (generation {})", generation);
                return vec![];
            }
            match result {
                Ok(found) => {
                    let renamed = !found.resolved_name.is_empty()
                        && found.resolved_name != state.city_name
                        && !state.canonical;
                    if renamed {
                        tracing::info!(
                            "Geocoder calls {} {}",
                            state.city_name,
                            found.resolved_name
                        );
                        // The new name invalidates the coordinates we just got.
                        return change_city(state, found.resolved_name, true);
                    }
                    set_coordinates(state, found.coordinates)
                }
                Err(e) if e.is_cancelled() => vec![],
                Err(e) => {
                    tracing::warn!("Geocoding {} failed: {}", state.city_name, e);
                    state.set_error(e.user_message().unwrap_or_default());
                    vec![]
                }
            }
        }
        Event::ForecastFinished { generation, result } => {
            if generation != state.forecast_generation {
                tracing::debug!("Dropping stale forecast (generation {})", generation);
                return vec![];
            }
            match result {
                Ok(forecast) => {
                    tracing::info!("Forecast for {}: {} days", state.city_name, forecast.len());
                    state.set_forecast(forecast);
                    vec![]
                }
                Err(e) if e.is_cancelled() => vec![],
                Err(e) => {
                    tracing::warn!("Forecast for {} failed: {}", state.city_name, e);
                    state.set_error(e.user_message().unwrap_or_default());
                    vec![]
                }
            }
        }
    }
}

fn change_city(state: &mut WeatherState, name: String, canonical: bool) -> Vec<Effect> {
    if name == state.city_name {
        return vec![];
    }
    state.city_name = name;
    state.canonical = canonical;
    begin_geocode(state)
}

fn begin_geocode(state: &mut WeatherState) -> Vec<Effect> {
    state.clear_results();
    state.coordinates = None;
    state.geocode_generation += 1;
    state.forecast_generation += 1;

    if state.city_name.is_empty() {
        state.loading = false;
        return vec![Effect::CancelForecast];
    }

    state.loading = true;
    tracing::info!("Geocoding {}", state.city_name);
    vec![
        Effect::CancelForecast,
        Effect::Geocode {
            generation: state.geocode_generation,
            name: state.city_name.clone(),
        },
    ]
}

fn set_coordinates(state: &mut WeatherState, coordinates: Coordinates) -> Vec<Effect> {
    state.clear_results();
    state.coordinates = Some(coordinates);
    state.loading = true;
    state.forecast_generation += 1;
    vec![Effect::FetchForecast {
        generation: state.forecast_generation,
        coordinates,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::DayForecast;
    use chrono::NaiveDate;

    const ISTANBUL: Coordinates = Coordinates {
        latitude: 41.01,
        longitude: 28.96,
    };

    fn found(name: &str, coordinates: Coordinates) -> Result<GeocodeResult, WeatherError> {
        Ok(GeocodeResult {
            coordinates,
            resolved_name: name.to_string(),
        })
    }

    fn week() -> DailyForecast {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        DailyForecast {
            days: start
                .iter_days()
                .take(7)
                .map(|date| DayForecast {
                    date,
                    weather_code: Some(0),
                    temp_max: Some(20.0),
                    temp_min: Some(10.0),
                })
                .collect(),
        }
    }

    fn geocode_generation(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Geocode { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("no geocode effect")
    }

    fn forecast_generation(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::FetchForecast { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("no forecast effect")
    }

    #[test]
    fn start_geocodes_default_city_and_locates() {
        let mut state = WeatherState::default();
        let effects = reduce(&mut state, Event::Started);

        assert!(state.loading);
        assert!(effects.contains(&Effect::Locate));
        assert!(effects.contains(&Effect::Geocode {
            generation: 1,
            name: "İstanbul".into()
        }));
    }

    #[test]
    fn happy_path_loads_forecast() {
        let mut state = WeatherState::default();
        let effects = reduce(&mut state, Event::Started);
        let generation = geocode_generation(&effects);

        let effects = reduce(
            &mut state,
            Event::GeocodeFinished {
                generation,
                result: found("İstanbul", ISTANBUL),
            },
        );
        assert_eq!(state.coordinates, Some(ISTANBUL));
        assert!(state.loading);
        let generation = forecast_generation(&effects);

        reduce(
            &mut state,
            Event::ForecastFinished {
                generation,
                result: Ok(week()),
            },
        );
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.forecast.as_ref().map(DailyForecast::len), Some(7));
    }

    #[test]
    fn unknown_city_sets_error_only() {
        let mut state = WeatherState::default();
        reduce(&mut state, Event::Started);
        let effects = reduce(&mut state, Event::CitySelected("Qwxyzfoo".into()));
        let generation = geocode_generation(&effects);

        let effects = reduce(
            &mut state,
            Event::GeocodeFinished {
                generation,
                result: Err(WeatherError::NotFound {
                    name: "Qwxyzfoo".into(),
                }),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(state.error.as_deref(), Some("Şehir bulunamadı!!"));
        assert_eq!(state.forecast, None);
        assert!(!state.loading);
    }

    #[test]
    fn only_latest_geocode_applies() {
        let mut state = WeatherState::default();
        let a = geocode_generation(&reduce(&mut state, Event::CitySelected("Ankara".into())));
        let b = geocode_generation(&reduce(&mut state, Event::CitySelected("Bursa".into())));

        let effects = reduce(
            &mut state,
            Event::GeocodeFinished {
                generation: a,
                result: found("Ankara", Coordinates::new(39.93, 32.86)),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state.coordinates, None);
        assert!(state.loading);

        reduce(
            &mut state,
            Event::GeocodeFinished {
                generation: b,
                result: found("Bursa", Coordinates::new(40.19, 29.06)),
            },
        );
        assert_eq!(state.city_name, "Bursa");
        assert_eq!(state.coordinates, Some(Coordinates::new(40.19, 29.06)));
    }

    #[test]
    fn stale_forecast_is_dropped() {
        let mut state = WeatherState::default();
        let g = geocode_generation(&reduce(&mut state, Event::Started));
        let old = forecast_generation(&reduce(
            &mut state,
            Event::GeocodeFinished {
                generation: g,
                result: found("İstanbul", ISTANBUL),
            },
        ));

        let effects = reduce(&mut state, Event::CitySelected("Ankara".into()));
        assert!(effects.contains(&Effect::CancelForecast));

        reduce(
            &mut state,
            Event::ForecastFinished {
                generation: old,
                result: Ok(week()),
            },
        );
        assert_eq!(state.forecast, None);
        assert!(state.loading);
    }

    #[test]
    fn cancellation_is_not_an_error() {
        let mut state = WeatherState::default();
        let g = geocode_generation(&reduce(&mut state, Event::Started));
        let f = forecast_generation(&reduce(
            &mut state,
            Event::GeocodeFinished {
                generation: g,
                result: found("İstanbul", ISTANBUL),
            },
        ));

        reduce(
            &mut state,
            Event::ForecastFinished {
                generation: f,
                result: Err(WeatherError::Cancelled),
            },
        );
        assert_eq!(state.error, None);
        assert!(state.loading);
    }

    #[test]
    fn canonical_name_renames_once() {
        let mut state = WeatherState::new("istanbul");
        let g = geocode_generation(&reduce(&mut state, Event::Started));

        let effects = reduce(
            &mut state,
            Event::GeocodeFinished {
                generation: g,
                result: found("İstanbul", ISTANBUL),
            },
        );
        assert_eq!(state.city_name, "İstanbul");
        assert_eq!(state.coordinates, None);
        let g = geocode_generation(&effects);

        // A service that keeps changing its mind still converges.
        let effects = reduce(
            &mut state,
            Event::GeocodeFinished {
                generation: g,
                result: found("ISTANBUL", ISTANBUL),
            },
        );
        assert_eq!(state.city_name, "İstanbul");
        assert_eq!(state.coordinates, Some(ISTANBUL));
        forecast_generation(&effects);
    }

    #[test]
    fn reselecting_same_city_is_a_no_op() {
        let mut state = WeatherState::default();
        reduce(&mut state, Event::Started);
        let effects = reduce(&mut state, Event::CitySelected("İstanbul".into()));
        assert!(effects.is_empty());
    }

    #[test]
    fn located_place_in_turkey_replaces_default() {
        let mut state = WeatherState::default();
        reduce(&mut state, Event::Started);

        let effects = reduce(
            &mut state,
            Event::Located(Some(Coordinates::new(39.93, 32.86))),
        );
        assert_eq!(
            effects,
            vec![Effect::ReverseGeocode(Coordinates::new(39.93, 32.86))]
        );

        let effects = reduce(
            &mut state,
            Event::PlaceResolved(Some(Place {
                name: Some("Ankara".into()),
                country_code: Some("TR".into()),
            })),
        );
        assert_eq!(state.city_name, "Ankara");
        geocode_generation(&effects);
    }

    #[test]
    fn located_place_abroad_is_ignored() {
        let mut state = WeatherState::default();
        reduce(&mut state, Event::Started);
        let effects = reduce(
            &mut state,
            Event::PlaceResolved(Some(Place {
                name: Some("Athens".into()),
                country_code: Some("GR".into()),
            })),
        );
        assert!(effects.is_empty());
        assert_eq!(state.city_name, "İstanbul");
    }

    #[test]
    fn location_failure_leaves_default_without_error() {
        let mut state = WeatherState::default();
        reduce(&mut state, Event::Started);
        assert!(reduce(&mut state, Event::Located(None)).is_empty());
        assert!(reduce(&mut state, Event::PlaceResolved(None)).is_empty());
        assert_eq!(state.city_name, "İstanbul");
        assert_eq!(state.error, None);
    }

    #[test]
    fn located_place_does_not_override_user_choice() {
        let mut state = WeatherState::default();
        reduce(&mut state, Event::Started);
        reduce(&mut state, Event::CitySelected("İzmir".into()));
        let effects = reduce(
            &mut state,
            Event::PlaceResolved(Some(Place {
                name: Some("Ankara".into()),
                country_code: Some("TR".into()),
            })),
        );
        assert!(effects.is_empty());
        assert_eq!(state.city_name, "İzmir");
    }

    #[test]
    fn forecast_failure_clears_forecast() {
        let mut state = WeatherState::default();
        let g = geocode_generation(&reduce(&mut state, Event::Started));
        let f = forecast_generation(&reduce(
            &mut state,
            Event::GeocodeFinished {
                generation: g,
                result: found("İstanbul", ISTANBUL),
            },
        ));
        reduce(
            &mut state,
            Event::ForecastFinished {
                generation: f,
                result: Err(WeatherError::NotFound {
                    name: String::new(),
                }),
            },
        );
        assert!(state.error.is_some());
        assert_eq!(state.forecast, None);
        assert!(!state.loading);
    }

    #[test]
    fn empty_city_name_does_nothing() {
        let mut state = WeatherState::new("");
        let effects = reduce(&mut state, Event::Started);
        assert!(!state.loading);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::Geocode { .. })));
    }
}
