//! Logging initialization

use crate::settings::LoggingConfig;
use crate::ConfigError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber. Call once per process.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| ConfigError::Logging(format!("unknown level {:?}", config.level)))?;

    let result = if config.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| ConfigError::Logging(e.to_string()))
}
