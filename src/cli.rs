use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::location::parse_position;
use crate::open_meteo::{FORECAST_URL, GEOCODING_URL};
use crate::state::DEFAULT_CITY;
use crate::weather::Coordinates;

const ABOUT: &str = "Türkiye weather forecast TUI";

const LONG_ABOUT: &str = "
TUI for viewing a 7-day forecast for a Turkish city, sourced from Open-Meteo.

Pick a city from the list on the left. If you pass your position with --at, the nearest
Turkish city is selected at startup instead of the default.

Logs go to a file since the terminal is taken by the UI; set RUST_LOG to change the level.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to show first (e.g. Ankara, İzmir)", default_value = DEFAULT_CITY)]
    pub city: String,

    #[arg(
        long,
        value_name = "LAT,LON",
        value_parser = parse_position,
        help = "Device position used to guess the starting city"
    )]
    pub at: Option<Coordinates>,

    #[arg(long, help = "Do not guess the starting city from the device position")]
    pub no_locate: bool,

    #[arg(long, env = "HAVA_GEOCODING_URL", default_value = GEOCODING_URL, help = "Geocoding API base URL")]
    pub geocoding_url: String,

    #[arg(long, env = "HAVA_FORECAST_URL", default_value = FORECAST_URL, help = "Forecast API URL")]
    pub forecast_url: String,

    #[arg(long, value_name = "PATH", help = "Log file [default: <tmp>/hava.log]")]
    pub log_file: Option<PathBuf>,
}
