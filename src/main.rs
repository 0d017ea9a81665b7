use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use battletrack_collector::reconcile::ReconcileEngine;
use battletrack_collector::scheduler::{Scheduler, SchedulerConfig};
use battletrack_db::SharedDatabase;
use battletrack_upstream_api::UpstreamClient;

mod config;
mod logging;

use config::Config;

#[tokio::main]
async fn main() {
    logging::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    info!("⚽ starting battletrack");

    let db = match SharedDatabase::new(&config.db_path) {
        Ok(db) => db,
        Err(e) => {
            error!("cannot open database at {}: {e}", config.db_path);
            std::process::exit(1);
        }
    };
    db.init().await;

    let api = Arc::new(UpstreamClient::new(config.upstream_base_url.clone()));
    api.start_metrics_logging();

    let engine = ReconcileEngine::new(api, db);
    let scheduler = Arc::new(Scheduler::new(
        engine,
        SchedulerConfig {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            retention_window: Duration::from_secs(config.retention_days * 24 * 3600),
            ..SchedulerConfig::default()
        },
    ));
    scheduler.clone().start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
    info!("shutdown requested, stopping");
}
