use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murmur::cli;
use murmur::node;
use murmur::settings::{self, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args and env vars
    let args = cli::Cli::parse();
    let settings = args.into_settings();

    // stdout carries protocol messages only, so all logs go to stderr
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "murmur=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    info!(
        "Starting {} {} ({} fanout)",
        settings::APP_NAME,
        settings::APP_VERSION,
        settings.fanout_mode
    );
    node::run(
        settings,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    Ok(())
}
