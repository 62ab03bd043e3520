use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;
use crate::coordinator::LOCATE_TIMEOUT;
use crate::weather::Coordinates;

#[derive(Debug, Clone)]
pub struct Config {
    pub initial_city: String,
    /// Where the device is, if known and wanted.
    pub position: Option<Coordinates>,
    pub locate_timeout: Duration,
    pub geocoding_url: String,
    pub forecast_url: String,
    pub log_file: PathBuf,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            initial_city: args.city.trim().to_string(),
            position: if args.no_locate { None } else { args.at },
            locate_timeout: LOCATE_TIMEOUT,
            geocoding_url: args.geocoding_url,
            forecast_url: args.forecast_url,
            log_file: args
                .log_file
                .unwrap_or_else(|| std::env::temp_dir().join("hava.log")),
        }
    }
}
