mod config;
mod error;
mod logging;
mod probe;
mod runtime;

pub use error::AppError;
pub use probe::ProbeReport;
pub use runtime::{CycleOutcome, CycleReport, SystemClock, WatchSettings, Watcher};

pub fn run() -> Result<(), AppError> {
    logging::init()?;

    let config = config::AppConfig::from_env()?;

    tracing::info!(
        device = ?config.device,
        poll_interval_secs = config.poll_interval_secs,
        active_kbps = config.active_kbps,
        debounce_secs = config.debounce_secs,
        usage_log_path = %config.usage_log_path,
        state_path = %config.state_path,
        notifications = config.telegram.is_some(),
        "watcher bootstrap initialized"
    );

    runtime::run(config)
}

pub fn run_probe() -> Result<ProbeReport, AppError> {
    logging::init()?;

    let config = config::AppConfig::from_env()?;
    probe::probe(&config)
}
