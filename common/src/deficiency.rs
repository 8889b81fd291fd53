//! Deficiency model and aggregation
//!
//! Three fixed-layout sources feed one report: pre-inspection rows and
//! post-inspection rows from the findings summary sheet, and the examiner's
//! free-text notes. `aggregate` merges them and assigns the one running
//! number every renderer prints.

use crate::schema::PLACEHOLDER;
use serde::{Deserialize, Serialize};

/// Where an aggregated item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeficiencySource {
    Pre,
    Post,
    ExaminerNote,
}

/// One row of the findings summary sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficiencyRow {
    /// Source-local number derived from the row position.
    pub number: u32,
    pub finding: String,
    pub doc_required: String,
    pub photo_required: String,
    pub reinspect: String,
}

/// Identifying cells of the findings summary sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficiencyMeta {
    pub report_number: String,
    pub manufacturer: String,
    pub license: String,
    pub vin: String,
}

/// Everything read from the findings summary sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficiencies {
    pub pre: Vec<DeficiencyRow>,
    pub post: Vec<DeficiencyRow>,
    pub meta: DeficiencyMeta,
}

/// One examiner note row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExaminerNote {
    /// Two-level label such as "10.3". Ignored on write.
    pub label: String,
    pub finding: String,
    pub doc_required: String,
    pub photo_required: String,
}

impl ExaminerNote {
    pub fn new(finding: impl Into<String>) -> Self {
        Self {
            finding: finding.into(),
            ..Default::default()
        }
    }
}

/// One numbered line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateItem {
    /// Global 1-based number.
    pub number: usize,
    pub source: DeficiencySource,
    pub text: String,
    pub doc_required: String,
    pub photo_required: String,
    pub reinspect: String,
}

/// Whether a finding counts as present.
pub fn has_finding(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Notes additionally drop the lone-dash placeholder.
pub fn is_note_present(text: &str) -> bool {
    has_finding(text) && text.trim() != PLACEHOLDER
}

/// Merge pre rows, post rows and notes into the numbered report list.
///
/// Order is fixed: pre, post, notes. Numbering ignores the source-local
/// numbers entirely.
pub fn aggregate(
    pre: &[DeficiencyRow],
    post: &[DeficiencyRow],
    notes: &[ExaminerNote],
) -> Vec<AggregateItem> {
    let rows = pre
        .iter()
        .map(|row| (DeficiencySource::Pre, row))
        .chain(post.iter().map(|row| (DeficiencySource::Post, row)))
        .filter(|(_, row)| has_finding(&row.finding))
        .map(|(source, row)| {
            (
                source,
                row.finding.as_str(),
                row.doc_required.as_str(),
                row.photo_required.as_str(),
                row.reinspect.as_str(),
            )
        });

    let notes = notes
        .iter()
        .filter(|note| is_note_present(&note.finding))
        .map(|note| {
            (
                DeficiencySource::ExaminerNote,
                note.finding.as_str(),
                note.doc_required.as_str(),
                note.photo_required.as_str(),
                "",
            )
        });

    rows.chain(notes)
        .enumerate()
        .map(|(idx, (source, text, doc, photo, reinspect))| AggregateItem {
            number: idx + 1,
            source,
            text: text.trim().to_string(),
            doc_required: doc.to_string(),
            photo_required: photo.to_string(),
            reinspect: reinspect.to_string(),
        })
        .collect()
}
