use std::sync::Arc;

use tracing::{error, info};

use feedbeat::heartbeat::shutdown_channel;
use feedbeat::{Config, Database, Heartbeat, HttpFetcher, SubscriptionStore, WebhookSink};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = feedbeat::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feedbeat::logging::init_console_only(&config.logging.level);
    }

    info!("Feedbeat - feed notifications for chat channels");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> feedbeat::Result<()> {
    let db = Arc::new(Database::open(&config.storage.path).await?);
    let store = Arc::new(SubscriptionStore::new(db));
    let fetcher = HttpFetcher::new(&config.fetcher)?;
    let sink = WebhookSink::new(&config.sink)?;

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let heartbeat = Heartbeat::new(
        store,
        fetcher,
        sink,
        &config.heartbeat,
        config.display.clone(),
        &config.sink,
        shutdown_rx,
    );
    let handle = tokio::spawn(heartbeat.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // An in-flight pass finishes before the loop exits.
    let _ = shutdown_tx.send(true);
    if let Err(e) = handle.await {
        error!("Heartbeat task panicked: {e}");
    }

    info!("Feedbeat stopped");
    Ok(())
}
