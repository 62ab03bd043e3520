//! Turns the weather state into what the screen shows.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::codes::{self, Condition};
use crate::state::WeatherState;
use crate::weather::DailyForecast;

pub const LOADING: &str = "Yükleniyor…";
pub const EMPTY: &str = "Veri yok";
pub const MISSING: &str = "--";

#[derive(Debug, Clone, PartialEq)]
pub struct DayCard {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub condition: Condition,
    pub temp_max: Option<i64>,
    pub temp_min: Option<i64>,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Days(Vec<DayCard>),
}

/// Pick what to show. Loading beats errors, errors beat an empty forecast.
pub fn view(state: &WeatherState, today: NaiveDate) -> View<'_> {
    if state.loading() {
        return View::Loading;
    }
    if let Some(error) = state.error() {
        return View::Error(error);
    }
    match state.forecast() {
        Some(forecast) if !forecast.is_empty() => View::Days(cards(forecast, today)),
        _ => View::Empty,
    }
}

/// One card per forecast day. At most one card, the first dated `today`, is
/// flagged as today.
pub fn cards(forecast: &DailyForecast, today: NaiveDate) -> Vec<DayCard> {
    let mut seen_today = false;
    forecast
        .days
        .iter()
        .map(|day| {
            let is_today = !seen_today && day.date == today;
            seen_today |= is_today;
            DayCard {
                date: day.date,
                day_name: weekday_name(day.date.weekday()),
                condition: day.weather_code.map_or(codes::UNKNOWN, codes::lookup),
                temp_max: day.temp_max.map(round_temp),
                temp_min: day.temp_min.map(round_temp),
                is_today,
            }
        })
        .collect()
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Pazartesi",
        Weekday::Tue => "Salı",
        Weekday::Wed => "Çarşamba",
        Weekday::Thu => "Perşembe",
        Weekday::Fri => "Cuma",
        Weekday::Sat => "Cumartesi",
        Weekday::Sun => "Pazar",
    }
}

pub fn format_temp(temp: Option<i64>) -> String {
    match temp {
        Some(t) => format!("{t}°"),
        None => MISSING.to_string(),
    }
}

/// Nearest integer, halves toward positive infinity (-0.5 -> 0, 2.5 -> 3).
fn round_temp(temp: f64) -> i64 {
    (temp + 0.5).floor() as i64
}
