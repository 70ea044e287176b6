//! Agreement report generation.
//!
//! This module renders an [`AgreementReport`] as human-readable text
//! or JSON.

use crate::models::AgreementReport;
use anyhow::Result;

/// Generate a complete text report.
pub fn generate_text_report(report: &AgreementReport, precision: usize) -> String {
    let mut output = String::new();

    output.push_str("Inter-Annotator Agreement Report\n");
    output.push_str("================================\n\n");

    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_score_section(report, precision));
    output.push_str(&generate_label_section(report));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &AgreementReport) -> String {
    let mut section = String::new();
    let metadata = &report.metadata;

    section.push_str(&format!(
        "Computed:  {}\n",
        metadata.computed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("Workers:   {}\n", metadata.worker_count));
    section.push_str(&format!("Items:     {}\n", metadata.item_count));
    section.push_str(&format!("Labels:    {}\n\n", metadata.distinct_labels));

    section
}

/// Generate the score section.
fn generate_score_section(report: &AgreementReport, precision: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "Score:     {:.prec$} ({})\n",
        report.score,
        report.interpretation,
        prec = precision
    ));

    if report.all_negative {
        section.push_str("Note:      no worker annotated any item; scored as perfect agreement\n");
    }

    if let Some(observed) = report.observed_agreement {
        section.push_str(&format!("Observed:  {:.prec$}\n", observed, prec = precision));
    }
    if let Some(expected) = report.expected_agreement {
        section.push_str(&format!("Expected:  {:.prec$}\n", expected, prec = precision));
    }

    section.push('\n');
    section
}

/// Generate the label distribution section, most frequent first.
fn generate_label_section(report: &AgreementReport) -> String {
    let mut section = String::new();

    section.push_str("Label distribution:\n");

    let mut labels: Vec<_> = report.label_distribution.iter().collect();
    labels.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (label, count) in labels {
        section.push_str(&format!("  {:<12} {}\n", label, count));
    }

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AgreementReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
