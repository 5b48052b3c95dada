//! micro-crm - HTTP server entry point.

use micro_crm::{api, config::Config, scheduler::TaskScheduler, store::Database};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "micro_crm=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration: database={}", config.database_path.display());

    let db = Database::open(&config.database_path).await?;

    let scheduler = TaskScheduler::new(db.clone(), &config);
    scheduler.start().await;

    api::serve(config, db).await?;

    // Server has shut down; stop the scan loop before exiting.
    scheduler.stop().await;

    Ok(())
}
