//! Claim Denial Pipeline Configuration
//!
//! One YAML document drives every binary: data locations, feature lists,
//! model hyperparameters, the HTTP server and logging.

mod logging;
mod settings;

pub use logging::init_logging;
pub use data_validator::ValidationConfig;
pub use settings::{
    AppConfig, DataConfig, FeaturesConfig, LoggingConfig, ModelConfig, PathsConfig,
    RateLimitConfig, ServerConfig, DEFAULT_CONFIG_PATH, ENV_PREFIX,
};

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
