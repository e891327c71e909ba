use std::process::ExitCode;

use serde_json::json;
use sitesafe::app::SiteSafe;
use sitesafe::config::Config;
use sitesafe::error::Error;
use sitesafe::logging::setup_tracing;

async fn run(config: &Config) -> Result<serde_json::Value, Error> {
    let app = SiteSafe::connect(config).await?;
    let outcome = app.execute(config.command()).await;
    if let Err(err) = app.close().await {
        tracing::warn!("checkpoint on shutdown failed: {err}");
    }
    outcome
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    if let Err(err) = setup_tracing(&config) {
        eprintln!("Failed to initialize tracing: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(&config).await {
        Ok(value) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{:#}", json!({ "error": err.code(), "message": err.to_string() }));
            if err.is_conflict() {
                ExitCode::from(2)
            }
            else {
                ExitCode::FAILURE
            }
        }
    }
}
