//! memorialqr - command-line admin panel for the memorial QR service.
//!
//! Every protected command passes the session guard before touching the API,
//! so a missing or rejected session token sends the user back to `login`.

mod cli;
mod commands;
mod context;
mod output;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use memorialqr_core::Config;

use cli::{Cli, Commands};
use context::App;

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
/// With a log directory, a daily-rotated file receives the same events.
fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "memorialqr.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(url) = cli.api_url.as_deref() {
        config.override_api_url(url);
    }

    let log_dir = if config.log_to_file {
        config.data_dir().ok().map(|dir| dir.join("logs"))
    } else {
        None
    };
    let _log_guard = init_tracing(cli.verbose, log_dir.as_deref());
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(api_url = %config.effective_api_url(), "memorialqr starting");

    let mut app = App::new(config, cli.json)?;

    match cli.command {
        Commands::Login { email } => commands::auth::login(&mut app, email).await,
        Commands::Logout => commands::auth::logout(&app),
        Commands::Status => commands::auth::status(&app),
        Commands::Verify => commands::auth::verify(&app).await,
        Commands::Open { path } => commands::auth::open(&app, &path).await,
        Commands::Persons { command } => commands::persons::handle(&app, command).await,
        Commands::Companies { command } => commands::companies::handle(&app, command).await,
    }
}
