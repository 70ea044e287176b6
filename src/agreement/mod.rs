//! Inter-annotator agreement computation.
//!
//! This module scores how consistently several workers labeled the same
//! item sequence, using multi-rater chance-corrected agreement statistics
//! computed from per-item category tallies.

pub mod task;

pub use task::AgreementTask;

use crate::models::{AgreementError, AnnotationSet};

/// Calculates the agreement score of several (>=2) workers' annotations
/// on the same sequence.
///
/// When every worker marked every item with the negative label `"O"`,
/// the sequence carries no annotation spans at all and the score is
/// exactly `1.0`. Otherwise the score is the multi-rater kappa of the
/// annotation set.
pub fn fleiss_kappa(worker_tags: &[Vec<String>]) -> Result<f64, AgreementError> {
    let set = AnnotationSet::new(worker_tags.to_vec());
    let task = AgreementTask::new(&set)?;
    Ok(task.score())
}
