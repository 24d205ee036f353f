//! Binary logistic regression

use crate::InferenceError;
use feature_engine::{Estimator, Transformer};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Optimizer and penalty settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Upper bound on gradient descent iterations
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Stop once every gradient component is below this
    pub tolerance: f64,
    /// Inverse L2 strength; larger means weaker penalty
    pub regularization: f64,
    /// Weight each class by n / (2 * n_class)
    pub balanced_class_weight: bool,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.1,
            tolerance: 1e-6,
            regularization: 1.0,
            balanced_class_weight: true,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.max_iter == 0 {
            return Err(InferenceError::InvalidConfig("max_iter must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(InferenceError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(InferenceError::InvalidConfig(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Err(InferenceError::InvalidConfig(format!(
                "regularization must be positive, got {}",
                self.regularization
            )));
        }
        Ok(())
    }
}

/// Unfitted classifier
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
}

impl LogisticRegression {
    pub fn new(config: LogisticRegressionConfig) -> Result<Self, InferenceError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }

    fn sample_weights(&self, target: &[u8]) -> Array1<f64> {
        if !self.config.balanced_class_weight {
            return Array1::ones(target.len());
        }
        let n = target.len() as f64;
        let positives = target.iter().filter(|&&t| t == 1).count() as f64;
        let negatives = n - positives;
        let w_pos = n / (2.0 * positives);
        let w_neg = n / (2.0 * negatives);
        target
            .iter()
            .map(|&t| if t == 1 { w_pos } else { w_neg })
            .collect()
    }
}

/// Fitted classifier; outputs the probability of the positive class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl FittedLogisticRegression {
    /// Number of input columns
    pub fn width(&self) -> usize {
        self.coefficients.len()
    }
}

impl Estimator for LogisticRegression {
    type Input = Array2<f64>;
    type Fitted = FittedLogisticRegression;
    type Error = InferenceError;

    fn fit(&self, x: &Array2<f64>, target: &[u8]) -> Result<FittedLogisticRegression, InferenceError> {
        let (rows, cols) = x.dim();
        if rows == 0 {
            return Err(InferenceError::EmptyTrainingData);
        }
        if target.len() != rows {
            return Err(InferenceError::LabelMismatch {
                rows,
                labels: target.len(),
            });
        }
        if let Some(&bad) = target.iter().find(|&&t| t > 1) {
            return Err(InferenceError::InvalidInputShape {
                expected: "labels in {0, 1}".to_string(),
                actual: format!("label {}", bad),
            });
        }
        let positives = target.iter().filter(|&&t| t == 1).count();
        if positives == 0 || positives == rows {
            return Err(InferenceError::SingleClass);
        }

        let y: Array1<f64> = target.iter().map(|&t| f64::from(t)).collect();
        let weights = self.sample_weights(target);
        let weight_sum = weights.sum();
        let penalty = 1.0 / (self.config.regularization * weight_sum);

        let mut beta = Array1::<f64>::zeros(cols);
        let mut intercept = 0.0;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iter {
            iterations += 1;

            let z = x.dot(&beta) + intercept;
            let residual = (z.mapv(sigmoid) - &y) * &weights;

            let grad_beta = x.t().dot(&residual) / weight_sum + &beta * penalty;
            let grad_intercept = residual.sum() / weight_sum;

            let max_grad = grad_beta
                .iter()
                .fold(grad_intercept.abs(), |m, g| m.max(g.abs()));
            if max_grad < self.config.tolerance {
                converged = true;
                break;
            }

            beta.scaled_add(-self.config.learning_rate, &grad_beta);
            intercept -= self.config.learning_rate * grad_intercept;
        }

        if converged {
            info!(
                "Logistic regression converged after {} iterations ({} features)",
                iterations, cols
            );
        } else {
            warn!(
                "Logistic regression did not converge in {} iterations",
                self.config.max_iter
            );
        }
        debug!("intercept={:.6}", intercept);

        Ok(FittedLogisticRegression {
            coefficients: beta.to_vec(),
            intercept,
            iterations,
            converged,
        })
    }
}

impl Transformer for FittedLogisticRegression {
    type Input = Array2<f64>;
    type Output = Vec<f64>;
    type Error = InferenceError;

    fn transform(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        if x.ncols() != self.coefficients.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} columns", self.coefficients.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        let beta = ArrayView1::from(&self.coefficients[..]);
        Ok(x
            .axis_iter(Axis(0))
            .map(|row| sigmoid(row.dot(&beta) + self.intercept))
            .collect())
    }
}

/// Logistic function without overflow for large |z|
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> LogisticRegression {
        LogisticRegression::new(LogisticRegressionConfig::default()).unwrap()
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(-800.0).is_finite());
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_learns_monotone_relationship() {
        let x = array![[-2.0], [-1.5], [-1.0], [1.0], [1.5], [2.0]];
        let y = [0, 0, 0, 1, 1, 1];
        let fitted = model().fit(&x, &y).unwrap();

        assert!(fitted.coefficients[0] > 0.0);
        let probs = fitted.transform(&x).unwrap();
        assert!(probs[..3].iter().all(|&p| p < 0.5));
        assert!(probs[3..].iter().all(|&p| p > 0.5));
        assert!(probs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_balanced_weights_shift_intercept_toward_minority() {
        let x = array![[0.0], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0]];
        let y = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0];

        let balanced = model().fit(&x, &y).unwrap();
        let plain = LogisticRegression::new(LogisticRegressionConfig {
            balanced_class_weight: false,
            ..Default::default()
        })
        .unwrap()
        .fit(&x, &y)
        .unwrap();

        let p_balanced = balanced.transform(&x).unwrap()[0];
        let p_plain = plain.transform(&x).unwrap()[0];
        assert!((p_balanced - 0.5).abs() < 0.01);
        assert!(p_plain < 0.2);
    }

    #[test]
    fn test_stronger_penalty_shrinks_coefficients() {
        let x = array![[-1.0], [-0.5], [0.5], [1.0], [-0.2], [0.2]];
        let y = [0, 0, 1, 1, 1, 0];
        let loose = model().fit(&x, &y).unwrap();
        let tight = LogisticRegression::new(LogisticRegressionConfig {
            regularization: 0.01,
            ..Default::default()
        })
        .unwrap()
        .fit(&x, &y)
        .unwrap();
        assert!(tight.coefficients[0].abs() < loose.coefficients[0].abs());
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        assert!(matches!(model().fit(&x, &[1, 1]), Err(InferenceError::SingleClass)));
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let x = array![[1.0], [2.0]];
        assert!(matches!(
            model().fit(&x, &[1]),
            Err(InferenceError::LabelMismatch { rows: 2, labels: 1 })
        ));
    }

    #[test]
    fn test_empty_training_rejected() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(matches!(model().fit(&x, &[]), Err(InferenceError::EmptyTrainingData)));
    }

    #[test]
    fn test_wrong_width_rejected_at_predict() {
        let fitted = FittedLogisticRegression {
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
            iterations: 1,
            converged: true,
        };
        let x = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            fitted.transform(&x),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        for config in [
            LogisticRegressionConfig { max_iter: 0, ..Default::default() },
            LogisticRegressionConfig { learning_rate: 0.0, ..Default::default() },
            LogisticRegressionConfig { regularization: -1.0, ..Default::default() },
            LogisticRegressionConfig { tolerance: f64::NAN, ..Default::default() },
        ] {
            assert!(LogisticRegression::new(config).is_err());
        }
    }
}
