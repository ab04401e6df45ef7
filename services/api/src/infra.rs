use crate::cli::DatabaseArgs;
use internsafe::config::AppConfig;
use internsafe::error::AppError;
use internsafe::{telemetry, Marketplace};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load configuration, start tracing and open the marketplace database.
pub(crate) fn open_marketplace(
    args: DatabaseArgs,
) -> Result<(Arc<Marketplace>, AppConfig), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.database {
        config.database.path = path;
    }

    telemetry::init(&config.telemetry)?;

    let market = Marketplace::open(&config)?;
    info!(path = %config.database.path.display(), "database ready");
    Ok((Arc::new(market), config))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    println!("{rendered}");
    Ok(())
}
