use anyhow::Result;
use dashboard_rust::{DashboardConfig, DashboardSession};
use dotenv::dotenv;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting dashboard_rust...");

    let config = DashboardConfig::from_env()?;
    let session = Arc::new(DashboardSession::new(config));

    let runner = session.clone();
    let run_task = tokio::spawn(async move { runner.run().await });

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    session.shutdown();
    run_task.await??;

    Ok(())
}
