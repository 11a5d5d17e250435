//! Uptime Monitor Binary

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uptime_monitor::cli::{Cli, LogFormat};
use uptime_monitor::{load_endpoints, Monitor, MonitorSettings, Result, SleepTicker};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(cli.log_format);

    info!("Starting uptime monitor v{}", env!("CARGO_PKG_VERSION"));

    let endpoints = match load_endpoints(&cli.config_file) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let settings = MonitorSettings::default().with_concurrency(cli.concurrent);
    let mut ticker = SleepTicker::new(settings.interval);

    let mut monitor = match Monitor::with_http(endpoints, settings) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    monitor.run(&mut ticker).await;

    Ok(())
}

/// Initialize leveled, timestamped logging on stderr
fn initialize_tracing(format: LogFormat) {
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter_layer);

    match format {
        LogFormat::Text => registry.with(fmt_layer).init(),
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
    }
}
