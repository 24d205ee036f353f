//! Application settings

use crate::ConfigError;
use claim_data::BASE_DATASET_FILE;
use data_validator::ValidationConfig;
use feature_engine::{ExperienceImputation, FeatureColumn, FeatureConfig};
use inference_engine::{LogisticRegressionConfig, PreprocessorConfig, MODEL_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Prefix of environment overrides, e.g. `CLAIMS__SERVER__BIND_ADDR`
pub const ENV_PREFIX: &str = "CLAIMS";

/// Data and artifact locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the five raw source tables
    pub raw_data: PathBuf,
    pub processed_data: PathBuf,
    pub model_dir: PathBuf,
    /// Drop directory for claims awaiting batch scoring
    pub new_data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_data: PathBuf::from("data/raw"),
            processed_data: PathBuf::from("data/processed"),
            model_dir: PathBuf::from("models"),
            new_data_dir: PathBuf::from("data/incoming"),
            output_dir: PathBuf::from("data/scored"),
        }
    }
}

impl PathsConfig {
    /// Persisted pipeline location
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE_NAME)
    }

    /// Labeled training dataset location
    pub fn base_dataset_path(&self) -> PathBuf {
        self.processed_data.join(BASE_DATASET_FILE)
    }
}

/// Column names of the raw claim tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub claim_id_column: String,
    pub target_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            claim_id_column: "claim_id".to_string(),
            target_column: "is_denied".to_string(),
        }
    }
}

/// Feature selection and column roles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesConfig {
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub high_risk_insurance: Vec<String>,
    pub final_features: Vec<String>,
    #[serde(default)]
    pub years_experience_imputation: ExperienceImputation,
    #[serde(default)]
    pub years_experience_median: Option<f64>,
}

/// Training and decision settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tolerance: f64,
    /// Inverse L2 strength
    pub regularization: f64,
    pub balanced_class_weight: bool,
    pub test_size: f64,
    pub random_seed: u64,
    pub decision_threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let lr = LogisticRegressionConfig::default();
        Self {
            max_iter: lr.max_iter,
            learning_rate: lr.learning_rate,
            tolerance: lr.tolerance,
            regularization: lr.regularization,
            balanced_class_weight: lr.balanced_class_weight,
            test_size: 0.2,
            random_seed: 42,
            decision_threshold: 0.5,
        }
    }
}

/// Per-IP request quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Requests allowed at once
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst_size: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration. `paths`, `data` and `features` are
/// required sections; the rest fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub data: DataConfig,
    pub features: FeaturesConfig,
    /// Data quality ranges used by the feature transform
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load a YAML file with `CLAIMS__` environment overrides, then validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: &Path, env_prefix: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.validate()?;
        info!("Loaded configuration from {}", path.display());
        debug!("{:?}", app);
        Ok(app)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.feature_config()
            .resolve_features()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let final_features = &self.features.final_features;
        for name in self
            .features
            .numeric_features
            .iter()
            .chain(&self.features.categorical_features)
        {
            if !final_features
                .iter()
                .any(|f| FeatureColumn::same_feature(f, name))
            {
                return Err(ConfigError::Invalid(format!(
                    "{:?} is listed as numeric or categorical but not in final_features",
                    name
                )));
            }
        }
        if self.features.numeric_features.is_empty() && self.features.categorical_features.is_empty() {
            return Err(ConfigError::Invalid(
                "no numeric or categorical features configured".to_string(),
            ));
        }

        let v = &self.validation;
        for (name, (min, max)) in [
            ("billed_amount_range", v.billed_amount_range),
            ("age_range", v.age_range),
            ("length_of_stay_range", v.length_of_stay_range),
            ("years_experience_range", v.years_experience_range),
        ] {
            if min.is_nan() || max.is_nan() || min > max {
                return Err(ConfigError::Invalid(format!(
                    "validation.{} must be [min, max] with min <= max, got [{}, {}]",
                    name, min, max
                )));
            }
        }

        let m = &self.model;
        if !(m.test_size > 0.0 && m.test_size < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "model.test_size must be in (0, 1), got {}",
                m.test_size
            )));
        }
        if !(0.0..=1.0).contains(&m.decision_threshold) {
            return Err(ConfigError::Invalid(format!(
                "model.decision_threshold must be in [0, 1], got {}",
                m.decision_threshold
            )));
        }
        self.model_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let rl = &self.server.rate_limit;
        if rl.per_second == 0 || rl.burst_size == 0 {
            return Err(ConfigError::Invalid(
                "server.rate_limit values must be positive".to_string(),
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown logging.level {:?}",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Feature transform settings
    pub fn feature_config(&self) -> FeatureConfig {
        FeatureConfig {
            high_risk_insurance: self.features.high_risk_insurance.iter().cloned().collect(),
            final_features: self.features.final_features.clone(),
            years_experience_imputation: self.features.years_experience_imputation,
            years_experience_median: self.features.years_experience_median,
            validation: self.validation.clone(),
        }
    }

    /// Column roles for the preprocessor
    pub fn preprocessor_config(&self) -> PreprocessorConfig {
        PreprocessorConfig {
            numeric_features: self.features.numeric_features.clone(),
            categorical_features: self.features.categorical_features.clone(),
        }
    }

    /// Classifier hyperparameters
    pub fn model_config(&self) -> LogisticRegressionConfig {
        LogisticRegressionConfig {
            max_iter: self.model.max_iter,
            learning_rate: self.model.learning_rate,
            tolerance: self.model.tolerance,
            regularization: self.model.regularization,
            balanced_class_weight: self.model.balanced_class_weight,
        }
    }
}
