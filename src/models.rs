//! Data models for the agreement calculator.
//!
//! This module contains the core data structures used throughout
//! the application for representing annotation sets, errors, and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The label treated as "no annotation" unless configured otherwise.
pub const DEFAULT_NEGATIVE_LABEL: &str = "O";

/// Errors produced when an annotation set fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgreementError {
    #[error("at least 2 worker sequences are required, got {0}")]
    NotEnoughWorkers(usize),

    #[error("worker {worker} has {actual} tags, expected {expected}")]
    LengthMismatch {
        worker: usize,
        expected: usize,
        actual: usize,
    },

    #[error("worker {worker} has an empty tag at position {position}")]
    EmptyTag { worker: usize, position: usize },
}

/// A set of annotations: one tag sequence per worker, all covering
/// the same items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSet {
    /// One tag sequence per worker, in worker order.
    pub workers: Vec<Vec<String>>,
}

impl AnnotationSet {
    /// Creates an annotation set from raw worker sequences.
    pub fn new(workers: Vec<Vec<String>>) -> Self {
        Self { workers }
    }

    /// Returns the number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of items, taken from the first worker.
    pub fn item_count(&self) -> usize {
        self.workers.first().map(|tags| tags.len()).unwrap_or(0)
    }

    /// Checks the shape invariants: at least 2 workers, equal-length
    /// sequences, no empty tags.
    pub fn validate(&self) -> Result<(), AgreementError> {
        if self.workers.len() < 2 {
            return Err(AgreementError::NotEnoughWorkers(self.workers.len()));
        }

        let expected = self.workers[0].len();
        for (worker, tags) in self.workers.iter().enumerate() {
            if tags.len() != expected {
                return Err(AgreementError::LengthMismatch {
                    worker,
                    expected,
                    actual: tags.len(),
                });
            }

            for (position, tag) in tags.iter().enumerate() {
                if tag.is_empty() {
                    return Err(AgreementError::EmptyTag { worker, position });
                }
            }
        }

        Ok(())
    }

    /// Parses an annotation set from a JSON document of the form
    /// `{"workers": [["B-POS", "O"], ["B-POS", "B-POS"]]}`.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Qualitative reading of an agreement score (Landis-Koch bands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpretation {
    /// Below 0 - agreement worse than chance
    Poor,
    /// 0.0 to 0.2
    Slight,
    /// 0.2 to 0.4
    Fair,
    /// 0.4 to 0.6
    Moderate,
    /// 0.6 to 0.8
    Substantial,
    /// 0.8 to 1.0
    AlmostPerfect,
}

impl Interpretation {
    /// Classifies a score into its band.
    pub fn from_score(score: f64) -> Self {
        if score < 0.0 {
            Interpretation::Poor
        } else if score <= 0.2 {
            Interpretation::Slight
        } else if score <= 0.4 {
            Interpretation::Fair
        } else if score <= 0.6 {
            Interpretation::Moderate
        } else if score <= 0.8 {
            Interpretation::Substantial
        } else {
            Interpretation::AlmostPerfect
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpretation::Poor => write!(f, "poor"),
            Interpretation::Slight => write!(f, "slight"),
            Interpretation::Fair => write!(f, "fair"),
            Interpretation::Moderate => write!(f, "moderate"),
            Interpretation::Substantial => write!(f, "substantial"),
            Interpretation::AlmostPerfect => write!(f, "almost perfect"),
        }
    }
}

/// Metadata about one agreement computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time of the computation.
    pub computed_at: DateTime<Utc>,
    /// Number of workers in the annotation set.
    pub worker_count: usize,
    /// Number of items each worker labeled.
    pub item_count: usize,
    /// Number of distinct labels used across all workers.
    pub distinct_labels: usize,
}

/// The complete agreement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementReport {
    /// Metadata about the computation.
    pub metadata: ReportMetadata,
    /// The agreement score.
    pub score: f64,
    /// Mean pairwise agreement across items; absent when no worker
    /// annotated anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_agreement: Option<f64>,
    /// Agreement expected by chance; absent when no worker annotated
    /// anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_agreement: Option<f64>,
    /// True when every tag equals the negative label.
    pub all_negative: bool,
    /// Total count of each label across all workers and items.
    pub label_distribution: HashMap<String, usize>,
    /// Qualitative reading of the score.
    pub interpretation: Interpretation,
}
