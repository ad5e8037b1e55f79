// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Prize wheel service entry point.

use std::{process, sync::Arc, time::Duration};

use core_types::{AppConfig, ConfigError};
use ledger::{FileLedgerStore, LedgerConfig, LedgerError, LedgerFileStats};
use log::{info, warn};
use metrics::WheelMetrics;
use spin_engine::{EngineConfig, PrizeTable, PrizeTableError, SpinEngine};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wheel_api::ApiState;

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("wheel failed: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let mut ledger_config = LedgerConfig::new(&config.ledger_path);
    ledger_config.bootstrap_if_missing = config.bootstrap_ledger;
    let (store, stats) = FileLedgerStore::bootstrap(ledger_config)?;
    log_storage_summary(&stats);

    let prizes = PrizeTable::load(&config.prize_table_path)?;
    let admin_secret = config.admin_secret().map(str::to_string);
    if admin_secret.is_none() {
        warn!("ADMIN_KEY is not set; /api/admin/add-code is disabled");
    }
    if config.rng_seed.is_some() {
        warn!("rng_seed is set; prize draws are reproducible");
    }
    let engine = SpinEngine::new(
        store,
        prizes,
        EngineConfig {
            admin_secret,
            seed: config.rng_seed,
        },
    );

    let metrics = WheelMetrics::new()?;
    let state = ApiState::new(Arc::new(engine), Arc::new(metrics));
    let bind_addr = config.bind_addr()?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: bind_addr.to_string(),
            source,
        })?;

    wheel_api::serve(state, listener, wait_for_shutdown_signal()).await?;
    info!("wheel stopped");
    Ok(())
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Prizes(#[from] PrizeTableError),
    #[error("failed to register metrics: {0}")]
    Metrics(#[from] metrics::MetricsError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

fn log_storage_summary(stats: &LedgerFileStats) {
    info!(
        "ledger file: {} (size={} bytes, codes={}, init_time={})",
        stats.path.display(),
        stats.file_size,
        stats.code_count,
        format_creation_duration(stats.creation_duration)
    );
}

fn format_creation_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(dur) => format!("{:?}", dur),
        None => "existing".to_string(),
    }
}

async fn wait_for_shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
