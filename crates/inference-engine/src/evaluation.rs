//! Held-out evaluation metrics

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary classification summary for the positive (denied) class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub support: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub accuracy: f64,
    /// 0 when nothing is predicted positive
    pub precision: f64,
    /// 0 when there are no positives
    pub recall: f64,
    pub f1: f64,
    /// Undefined when only one class is present
    pub roc_auc: Option<f64>,
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "support    {}", self.support)?;
        writeln!(f, "accuracy   {:.4}", self.accuracy)?;
        writeln!(f, "precision  {:.4}", self.precision)?;
        writeln!(f, "recall     {:.4}", self.recall)?;
        writeln!(f, "f1         {:.4}", self.f1)?;
        match self.roc_auc {
            Some(auc) => writeln!(f, "roc_auc    {:.4}", auc)?,
            None => writeln!(f, "roc_auc    n/a")?,
        }
        write!(
            f,
            "confusion  tn={} fp={} fn={} tp={}",
            self.true_negatives, self.false_positives, self.false_negatives, self.true_positives
        )
    }
}

/// Score probabilities against labels; a row is predicted positive when
/// its probability is at least `threshold`
pub fn evaluate(
    labels: &[u8],
    probabilities: &[f64],
    threshold: f64,
) -> Result<ClassificationReport, InferenceError> {
    if labels.len() != probabilities.len() {
        return Err(InferenceError::LabelMismatch {
            rows: probabilities.len(),
            labels: labels.len(),
        });
    }
    if labels.is_empty() {
        return Err(InferenceError::EmptyTrainingData);
    }

    let (mut tp, mut fp, mut tn, mut fn_) = (0, 0, 0, 0);
    for (&label, &p) in labels.iter().zip(probabilities) {
        match (label == 1, p >= threshold) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    Ok(ClassificationReport {
        support: labels.len(),
        true_positives: tp,
        false_positives: fp,
        true_negatives: tn,
        false_negatives: fn_,
        accuracy: ratio(tp + tn, labels.len()),
        precision,
        recall,
        f1,
        roc_auc: roc_auc(labels, probabilities),
    })
}

/// Area under the ROC curve via the rank-sum statistic; tied scores share
/// their average rank
fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based
        let avg_rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            if labels[i] == 1 {
                positive_rank_sum += avg_rank;
            }
        }
        start = end;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}
