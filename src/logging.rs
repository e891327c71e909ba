use std::io;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber. `RUST_LOG` takes precedence over `--quiet`.
///
/// Standard output carries command results, so log lines go to standard error unless a log file is configured.
/// Records emitted through the `log` facade end up here too.
pub fn setup_tracing(config: &Config) -> anyhow::Result<()> {
    let default_level = if config.quiet() { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let dest_writer = Mutex::new(if let Some(log_file) = config.log_file() {
        let file = std::fs::OpenOptions::new().create(true).append(true).open(log_file)?;
        Box::new(file) as Box<dyn io::Write + Send>
    }
    else {
        Box::new(io::stderr()) as Box<dyn io::Write + Send>
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(dest_writer)
                .with_ansi(config.log_file().is_none()),
        )
        .try_init()?;

    info!("Tracing initialized");

    Ok(())
}
