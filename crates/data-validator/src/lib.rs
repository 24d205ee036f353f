//! Claim Data Quality Checks
//!
//! Range checks over raw claims. Findings are warnings: the feature
//! pipeline defaults invalid values instead of rejecting rows.

mod validator;
mod warning;

pub use validator::{ClaimValidator, ValidationConfig};
pub use warning::DataQualityWarning;
