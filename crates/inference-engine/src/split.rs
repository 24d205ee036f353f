//! Stratified train/test split

use crate::InferenceError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of each side of a split, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows so each class keeps its share on both sides.
///
/// Each class sends `round(n_class * test_size)` rows to the test side,
/// keeping at least one row on the train side. The same seed always
/// yields the same split.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> Result<Split, InferenceError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(InferenceError::InvalidConfig(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    if labels.is_empty() {
        return Err(InferenceError::EmptyTrainingData);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [0u8, 1] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.shuffle(&mut rng);

        let n_test = ((members.len() as f64 * test_size).round() as usize).min(members.len() - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    if train.len() + test.len() != labels.len() {
        return Err(InferenceError::InvalidInputShape {
            expected: "labels in {0, 1}".to_string(),
            actual: format!("{} rows outside both classes", labels.len() - train.len() - test.len()),
        });
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_preserves_class_ratio() {
        let labels: Vec<u8> = (0..100).map(|i| u8::from(i % 5 == 0)).collect();
        let split = stratified_split(&labels, 0.2, 42).unwrap();

        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
        let test_pos = split.test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(test_pos, 4);
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let labels: Vec<u8> = (0..50).map(|i| u8::from(i % 3 == 0)).collect();
        let a = stratified_split(&labels, 0.3, 7).unwrap();
        let b = stratified_split(&labels, 0.3, 7).unwrap();
        let c = stratified_split(&labels, 0.3, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_tiny_class_stays_in_train() {
        let labels = [0, 0, 0, 0, 1];
        let split = stratified_split(&labels, 0.2, 1).unwrap();
        assert!(split.train.contains(&4));
    }

    #[test]
    fn test_invalid_test_size_rejected() {
        assert!(stratified_split(&[0, 1], 0.0, 1).is_err());
        assert!(stratified_split(&[0, 1], 1.0, 1).is_err());
    }

    #[test]
    fn test_non_binary_label_rejected() {
        assert!(stratified_split(&[0, 1, 2], 0.5, 1).is_err());
    }

    proptest! {
        #[test]
        fn prop_split_partitions_rows(labels in prop::collection::vec(0u8..2, 1..200), seed in any::<u64>()) {
            let split = stratified_split(&labels, 0.25, seed).unwrap();
            let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
        }
    }
}
