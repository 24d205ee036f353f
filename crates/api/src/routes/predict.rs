//! Prediction Routes

use axum::{extract::State, Json};
use claim_data::ClaimRecord;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{ApiError, AppState};

/// Raw claim as submitted by clients
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClaimRequest {
    pub billed_amount: f64,
    pub length_of_stay: Option<f64>,
    pub age: i32,
    pub insurance_type: String,
    pub visit_type: String,
    #[serde(alias = "department")]
    pub department_x: String,
    pub admission_type: Option<String>,
    pub diagnosis_code: Option<String>,
    pub years_experience: Option<f64>,
    /// Absent means "No"; an explicit null stays missing
    #[serde(default = "default_readmitted")]
    pub readmitted_flag: Option<String>,
}

fn default_readmitted() -> Option<String> {
    Some("No".to_string())
}

impl From<ClaimRequest> for ClaimRecord {
    fn from(req: ClaimRequest) -> Self {
        ClaimRecord {
            claim_id: None,
            billed_amount: Some(req.billed_amount),
            length_of_stay: req.length_of_stay,
            age: Some(f64::from(req.age)),
            insurance_type: Some(req.insurance_type),
            visit_type: Some(req.visit_type),
            department: Some(req.department_x),
            admission_type: req.admission_type,
            diagnosis_code: req.diagnosis_code,
            years_experience: req.years_experience,
            readmitted_flag: req.readmitted_flag,
        }
    }
}

/// Denial decision for one claim
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictResponse {
    pub is_denied_prediction: u8,
    /// Rounded to 4 decimal places
    pub denial_risk_probability: f64,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Score a single claim
pub async fn predict_claim_denial(
    State(state): State<Arc<AppState>>,
    Json(claim): Json<ClaimRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    counter!("predict_requests_total").increment(1);
    let result = state.engine.predict(claim.into())?;
    debug!(
        "Prediction p={:.4} in {}ms",
        result.prediction.probability, result.latency_ms
    );

    Ok(Json(PredictResponse {
        is_denied_prediction: u8::from(result.prediction.is_denied),
        denial_risk_probability: round4(result.prediction.probability),
    }))
}
