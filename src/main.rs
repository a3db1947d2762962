//! Campus Events maintenance worker
//!
//! Applies migrations and keeps event statuses in line with the clock.

use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use campus_events::{
    config::Settings,
    database::{create_pool, run_migrations, DatabaseConfig, DatabaseService},
    services::{LifecycleService, ServiceFactory},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", campus_events::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;
    run_migrations(&pool).await?;

    let services = ServiceFactory::new(DatabaseService::new(pool.clone()));
    let health = services.health_check().await;
    if !health.is_healthy() {
        for issue in health.get_issues() {
            warn!("Health check: {}", issue);
        }
    }

    if settings.lifecycle.sweep_on_startup {
        run_sweep(&services.lifecycle).await;
    }

    let interval_seconds = settings.lifecycle.sweep_interval_seconds;
    if interval_seconds == 0 {
        info!("Sweep interval is 0, exiting");
        pool.close().await;
        return Ok(());
    }

    info!(interval_seconds = interval_seconds, "Running periodic status sweeps");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => run_sweep(&services.lifecycle).await,
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    error!(error = %err, "Failed to listen for shutdown signal");
                }
                info!("Shutting down");
                break;
            }
        }
    }

    pool.close().await;
    Ok(())
}

/// One sweep; failures are logged and never stop the worker
async fn run_sweep(lifecycle: &LifecycleService<DatabaseService>) {
    match lifecycle.recompute_statuses(Utc::now()).await {
        Ok(report) => info!(
            examined = report.examined,
            changed = report.changed(),
            failed = report.failed,
            "Status sweep complete"
        ),
        Err(err) if err.is_retryable() => warn!(error = %err, "Status sweep skipped, store unavailable"),
        Err(err) => error!(error = %err, "Status sweep failed"),
    }
}
