use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use hava::app::{run_app, App};
use hava::cli::Args;
use hava::config::Config;
use hava::coordinator::Coordinator;
use hava::location::{FixedLocator, Locator, Unavailable};
use hava::open_meteo::{forecast::ForecastClient, geocoding::GeocodingClient, http_client};
use hava::state::WeatherState;

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_app(config: &Config) -> anyhow::Result<App> {
    let client = http_client().context("cannot build HTTP client")?;
    let geocoder = GeocodingClient::new(client.clone(), &config.geocoding_url);
    let forecaster = ForecastClient::new(client, &config.forecast_url);
    let locator: Arc<dyn Locator> = match config.position {
        Some(position) => Arc::new(FixedLocator(position)),
        None => Arc::new(Unavailable),
    };

    let coordinator = Coordinator::new(
        WeatherState::new(&config.initial_city),
        Arc::new(geocoder),
        Arc::new(forecaster),
        locator,
    )
    .with_locate_timeout(config.locate_timeout);
    Ok(App::new(coordinator))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from(Args::parse());
    init_logging(&config)?;
    tracing::info!("Starting with {:?}", config);

    let app = build_app(&config)?;

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let res = run_app(&mut terminal, app).await;

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("{}", err);
        println!("{:?}", err)
    }

    Ok(())
}
