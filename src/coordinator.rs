//! Runs the effects produced by [`reduce`] and feeds their outcomes back in.
//!
//! All state lives here and is only touched from the task that owns the
//! coordinator. Spawned requests report back over a channel. Starting a request
//! cancels the one of the same kind still in flight, so at most one geocode and
//! one forecast fetch are outstanding at any time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::WeatherError;
use crate::location::Locator;
use crate::state::{reduce, Effect, Event, WeatherState};
use crate::weather::{ForecastSource, Geocoder};

pub const LOCATE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Coordinator {
    state: WeatherState,
    geocoder: Arc<dyn Geocoder>,
    forecaster: Arc<dyn ForecastSource>,
    locator: Arc<dyn Locator>,
    locate_timeout: Duration,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    geocode_in_flight: Option<CancellationToken>,
    forecast_in_flight: Option<CancellationToken>,
}

impl Coordinator {
    pub fn new(
        state: WeatherState,
        geocoder: Arc<dyn Geocoder>,
        forecaster: Arc<dyn ForecastSource>,
        locator: Arc<dyn Locator>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            geocoder,
            forecaster,
            locator,
            locate_timeout: LOCATE_TIMEOUT,
            tx,
            rx,
            geocode_in_flight: None,
            forecast_in_flight: None,
        }
    }

    pub fn with_locate_timeout(mut self, timeout: Duration) -> Self {
        self.locate_timeout = timeout;
        self
    }

    pub fn state(&self) -> &WeatherState {
        &self.state
    }

    /// Apply an event and start whatever it asks for.
    pub fn dispatch(&mut self, event: Event) {
        for effect in reduce(&mut self.state, event) {
            self.run(effect);
        }
    }

    /// Wait for the next request outcome.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Geocode { generation, name } => {
                let token = supersede(&mut self.geocode_in_flight);
                let geocoder = Arc::clone(&self.geocoder);
                spawn_cancellable(
                    self.tx.clone(),
                    token,
                    async move { geocoder.forward(&name).await },
                    move |result| Event::GeocodeFinished { generation, result },
                );
            }
            Effect::FetchForecast {
                generation,
                coordinates,
            } => {
                let token = supersede(&mut self.forecast_in_flight);
                let forecaster = Arc::clone(&self.forecaster);
                spawn_cancellable(
                    self.tx.clone(),
                    token,
                    async move { forecaster.daily(coordinates).await },
                    move |result| Event::ForecastFinished { generation, result },
                );
            }
            Effect::CancelForecast => {
                if let Some(token) = self.forecast_in_flight.take() {
                    token.cancel();
                }
            }
            Effect::Locate => {
                let locator = Arc::clone(&self.locator);
                let timeout = self.locate_timeout;
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let position =
                        match tokio::time::timeout(timeout, locator.current_position()).await {
                            Ok(Ok(position)) => Some(position),
                            Ok(Err(e)) => {
                                tracing::debug!("Device location unavailable: {}", e);
                                None
                            }
                            Err(_) => {
                                tracing::debug!("Device location timed out after {:?}", timeout);
                                None
                            }
                        };
                    let _ = tx.send(Event::Located(position));
                });
            }
            Effect::ReverseGeocode(coordinates) => {
                let geocoder = Arc::clone(&self.geocoder);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let place = geocoder.reverse(coordinates).await;
                    let _ = tx.send(Event::PlaceResolved(place));
                });
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        for token in [self.geocode_in_flight.take(), self.forecast_in_flight.take()]
            .into_iter()
            .flatten()
        {
            token.cancel();
        }
    }
}

/// Cancel the request in `slot`, if any, and put a fresh token in its place.
fn supersede(slot: &mut Option<CancellationToken>) -> CancellationToken {
    if let Some(previous) = slot.take() {
        previous.cancel();
    }
    let token = CancellationToken::new();
    *slot = Some(token.clone());
    token
}

fn spawn_cancellable<T, F, E>(
    tx: mpsc::UnboundedSender<Event>,
    token: CancellationToken,
    request: F,
    into_event: E,
) where
    T: Send + 'static,
    F: Future<Output = Result<T, WeatherError>> + Send + 'static,
    E: FnOnce(Result<T, WeatherError>) -> Event + Send + 'static,
{
    tokio::spawn(async move {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(WeatherError::Cancelled),
            result = request => result,
        };
        let _ = tx.send(into_event(result));
    });
}
