//! Seven-day weather forecast for Turkish cities, in the terminal.
//!
//! A city name is geocoded to coordinates, the coordinates are used to fetch a
//! daily forecast from Open-Meteo, and the result is drawn as a list of day
//! cards. Picking another city supersedes whatever is still in flight.

pub mod app;
pub mod cities;
pub mod cli;
pub mod codes;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod location;
pub mod open_meteo;
pub mod presenter;
pub mod state;
pub mod weather;
