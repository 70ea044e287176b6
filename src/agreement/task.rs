//! Multi-rater agreement statistics over category tallies.
//!
//! An [`AgreementTask`] wraps a validated annotation set and derives the
//! agreement statistics from it: per-item category tallies, observed
//! agreement, and the chance-corrected kappa and pi scores. The tallies
//! are built in a single pass per item; nothing is precomputed or cached.

use crate::models::{AgreementError, AnnotationSet, DEFAULT_NEGATIVE_LABEL};
use std::collections::HashMap;
use tracing::debug;

/// A single agreement computation over a validated annotation set.
pub struct AgreementTask<'a> {
    workers: &'a [Vec<String>],
    negative_label: String,
}

impl<'a> AgreementTask<'a> {
    /// Creates a task for the given annotation set, validating its shape.
    pub fn new(set: &'a AnnotationSet) -> Result<Self, AgreementError> {
        set.validate()?;
        Ok(Self {
            workers: &set.workers,
            negative_label: DEFAULT_NEGATIVE_LABEL.to_string(),
        })
    }

    /// Replaces the negative label used by the no-annotation check.
    pub fn with_negative_label(mut self, label: impl Into<String>) -> Self {
        self.negative_label = label.into();
        self
    }

    /// Returns the number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of items each worker labeled.
    pub fn item_count(&self) -> usize {
        self.workers[0].len()
    }

    /// True when every tag of every worker equals the negative label,
    /// i.e. no worker annotated anything. Vacuously true for zero items.
    pub fn is_all_negative(&self) -> bool {
        self.workers
            .iter()
            .flatten()
            .all(|tag| *tag == self.negative_label)
    }

    /// Counts how many workers assigned each tag at one item position.
    pub fn category_tally(&self, item: usize) -> HashMap<&str, usize> {
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for tags in self.workers {
            *tally.entry(tags[item].as_str()).or_insert(0) += 1;
        }
        tally
    }

    /// Total count of each label across all workers and items.
    pub fn label_distribution(&self) -> HashMap<String, usize> {
        let mut distribution: HashMap<String, usize> = HashMap::new();
        for tag in self.workers.iter().flatten() {
            *distribution.entry(tag.clone()).or_insert(0) += 1;
        }
        distribution
    }

    /// Mean pairwise agreement across items.
    ///
    /// An item where `n_k` of `n` workers chose tag `k` contributes
    /// `sum_k n_k * (n_k - 1) / (n * (n - 1))`. Requires at least one
    /// item.
    pub fn observed_agreement(&self) -> f64 {
        let n = self.worker_count() as f64;
        let items = self.item_count();

        let mut total = 0.0;
        for item in 0..items {
            let tally = self.category_tally(item);
            let agreeing: f64 = tally
                .values()
                .map(|&count| (count * (count - 1)) as f64)
                .sum();
            total += agreeing / (n * (n - 1.0));
        }
        total / items as f64
    }

    /// Agreement expected by chance from each worker's own label
    /// frequencies, averaged over all unordered worker pairs.
    pub fn expected_agreement(&self) -> f64 {
        let items = self.item_count() as f64;
        let marginals: Vec<HashMap<&str, usize>> = self
            .workers
            .iter()
            .map(|tags| {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for tag in tags {
                    *counts.entry(tag.as_str()).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut total = 0.0;
        let mut pairs = 0usize;
        for a in 0..marginals.len() {
            for b in (a + 1)..marginals.len() {
                let mut pair_expected = 0.0;
                for (tag, &count_a) in &marginals[a] {
                    if let Some(&count_b) = marginals[b].get(tag) {
                        pair_expected += (count_a as f64 / items) * (count_b as f64 / items);
                    }
                }
                total += pair_expected;
                pairs += 1;
            }
        }
        total / pairs as f64
    }

    /// Agreement expected by chance from label frequencies pooled over
    /// all workers.
    fn expected_agreement_pooled(&self) -> f64 {
        let observations = (self.worker_count() * self.item_count()) as f64;
        self.label_distribution()
            .values()
            .map(|&count| (count as f64 / observations).powi(2))
            .sum()
    }

    /// Multi-rater kappa: chance correction from per-worker label
    /// frequencies.
    ///
    /// When every worker assigns one single label everywhere, expected
    /// agreement reaches 1 and the ratio is undefined; observed agreement
    /// is also 1 there, so the task reports perfect agreement.
    pub fn multi_kappa(&self) -> f64 {
        let observed = self.observed_agreement();
        let expected = self.expected_agreement();
        if (1.0 - expected).abs() < f64::EPSILON {
            return 1.0;
        }
        (observed - expected) / (1.0 - expected)
    }

    /// Multi-rater pi: same observed agreement as [`Self::multi_kappa`],
    /// chance correction from pooled label frequencies.
    #[allow(dead_code)] // Alternative statistic for comparison runs
    pub fn multi_pi(&self) -> f64 {
        let observed = self.observed_agreement();
        let expected = self.expected_agreement_pooled();
        if (1.0 - expected).abs() < f64::EPSILON {
            return 1.0;
        }
        (observed - expected) / (1.0 - expected)
    }

    /// The agreement score: exactly `1.0` when no worker annotated
    /// anything, otherwise the multi-rater kappa.
    pub fn score(&self) -> f64 {
        if self.is_all_negative() {
            debug!(
                "every tag equals the negative label {:?}, scoring as perfect agreement",
                self.negative_label
            );
            return 1.0;
        }
        self.multi_kappa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agreement::fleiss_kappa;

    fn tags(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|tag| tag.to_string()).collect())
            .collect()
    }

    fn reference_example() -> Vec<Vec<String>> {
        tags(&[
            &["B-POS", "I-POS", "O"],
            &["B-POS", "O", "O"],
            &["B-POS", "I-POS", "I-POS"],
        ])
    }

    fn task_for(set: &AnnotationSet) -> AgreementTask<'_> {
        AgreementTask::new(set).unwrap()
    }

    #[test]
    fn test_reference_example_score() {
        let score = fleiss_kappa(&reference_example()).unwrap();
        assert!((score - 0.4).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn test_all_negative_returns_exactly_one() {
        let score = fleiss_kappa(&tags(&[&["O", "O"], &["O", "O"]])).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_all_negative_many_workers() {
        let rows = vec![vec!["O".to_string(); 7]; 5];
        assert_eq!(fleiss_kappa(&rows).unwrap(), 1.0);
    }

    #[test]
    fn test_zero_items_scored_as_all_negative() {
        let rows = vec![Vec::new(), Vec::new()];
        assert_eq!(fleiss_kappa(&rows).unwrap(), 1.0);
    }

    #[test]
    fn test_identical_constant_workers() {
        let score = fleiss_kappa(&tags(&[&["A", "A"], &["A", "A"], &["A", "A"]])).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_identical_mixed_workers() {
        let rows = tags(&[&["B-LOC", "I-LOC", "O"], &["B-LOC", "I-LOC", "O"]]);
        let score = fleiss_kappa(&rows).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_worker_rejected() {
        let err = fleiss_kappa(&tags(&[&["B-POS", "O"]])).unwrap_err();
        assert_eq!(err, AgreementError::NotEnoughWorkers(1));
    }

    #[test]
    fn test_no_workers_rejected() {
        let err = fleiss_kappa(&[]).unwrap_err();
        assert_eq!(err, AgreementError::NotEnoughWorkers(0));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = fleiss_kappa(&tags(&[&["O", "O"], &["O"]])).unwrap_err();
        assert_eq!(
            err,
            AgreementError::LengthMismatch {
                worker: 1,
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_worker_order_symmetry() {
        let rows = reference_example();
        let base = fleiss_kappa(&rows).unwrap();

        let permutations = [
            vec![rows[1].clone(), rows[0].clone(), rows[2].clone()],
            vec![rows[2].clone(), rows[1].clone(), rows[0].clone()],
            vec![rows[2].clone(), rows[0].clone(), rows[1].clone()],
        ];
        for permutation in permutations {
            let score = fleiss_kappa(&permutation).unwrap();
            assert!((score - base).abs() < 1e-12);
        }
    }

    #[test]
    fn test_total_disagreement_is_finite_and_negative() {
        let rows = tags(&[&["A", "B", "C"], &["B", "C", "A"], &["C", "A", "B"]]);
        let score = fleiss_kappa(&rows).unwrap();
        assert!(score.is_finite());
        assert!(score < 0.0);
    }

    #[test]
    fn test_observed_and_expected_agreement() {
        let set = AnnotationSet::new(reference_example());
        let task = task_for(&set);
        assert!((task.observed_agreement() - 5.0 / 9.0).abs() < 1e-12);
        assert!((task.expected_agreement() - 7.0 / 27.0).abs() < 1e-12);
    }

    #[test]
    fn test_multi_pi_pooled_marginals() {
        let set = AnnotationSet::new(reference_example());
        let task = task_for(&set);
        assert!((task.multi_pi() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_category_tally() {
        let set = AnnotationSet::new(reference_example());
        let task = task_for(&set);

        let tally = task.category_tally(1);
        assert_eq!(tally.get("I-POS"), Some(&2));
        assert_eq!(tally.get("O"), Some(&1));
        assert_eq!(tally.len(), 2);
    }

    #[test]
    fn test_label_distribution() {
        let set = AnnotationSet::new(reference_example());
        let task = task_for(&set);

        let distribution = task.label_distribution();
        assert_eq!(distribution.get("B-POS"), Some(&3));
        assert_eq!(distribution.get("I-POS"), Some(&3));
        assert_eq!(distribution.get("O"), Some(&3));
    }

    #[test]
    fn test_custom_negative_label() {
        let set = AnnotationSet::new(tags(&[&["NONE", "NONE"], &["NONE", "NONE"]]));
        let task = task_for(&set).with_negative_label("NONE");
        assert!(task.is_all_negative());
        assert_eq!(task.score(), 1.0);
    }

    #[test]
    fn test_negative_label_not_matched_goes_through_formula() {
        let set = AnnotationSet::new(reference_example());
        let task = task_for(&set).with_negative_label("NONE");
        assert!(!task.is_all_negative());
        assert!((task.score() - 0.4).abs() < 1e-12);
    }
}
