use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use pricewatch::checker::PriceChecker;
use pricewatch::config::AppConfig;
use pricewatch::fetch::HttpFetcher;
use pricewatch::notify::LogMessenger;
use pricewatch::scrape::PriceScraper;
use pricewatch::session::SessionStore;
use pricewatch::store::{ProductStore, SqliteStore};
use pricewatch::workflow::AdditionWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pricewatch=debug".parse()?),
        )
        .init();

    info!("Starting pricewatch...");

    let config = AppConfig::from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    let store = Arc::new(SqliteStore::new(pool));
    store.migrate().await?;

    let fetcher = Arc::new(HttpFetcher::new(&config.scraper)?);
    let scraper = Arc::new(PriceScraper::new(fetcher));

    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.sessions.ttl_minutes * 60,
    )));
    // The chat transport drives this; it is constructed here so transport
    // adapters only need the workflow handle.
    let _workflow = AdditionWorkflow::new(
        Arc::clone(&scraper),
        Arc::clone(&store) as Arc<dyn ProductStore>,
        sessions,
    );

    let checker = Arc::new(PriceChecker::new(
        Arc::clone(&store) as Arc<dyn ProductStore>,
        scraper,
        Arc::new(LogMessenger),
        config.checker.clone(),
    ));
    let checker_handle = checker.spawn();
    info!(
        interval_minutes = config.checker.interval_minutes,
        "price checker running"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    checker_handle.abort();

    Ok(())
}
