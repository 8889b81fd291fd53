//! Examiner sheet reads and writes
//!
//! Writes are partial updates: only non-blank values are written, so a form
//! that submits a subset of fields never clears the others. A missing
//! examiner sheet fails the write before any cell is touched.

use crate::error::{InspectError, Result};
use crate::reference::read_fields;
use crate::sheets;
use crate::workbook::Workbook;
use inspect_common::schema::{examiner_schema, CLASSIFICATION_TARGETS, NOTE_LAYOUT};
use inspect_common::{CellRef, ExaminerNote, FieldMap, FieldSpec, SheetRole};
use log::{debug, info, warn};
use serde::Serialize;

/// What a write actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Field names or note labels that were written.
    pub written: Vec<String>,
    /// Field names not in the examiner schema.
    pub skipped_unknown: Vec<String>,
}

/// Examiner fields as trimmed text. Empty when there is no examiner sheet.
pub fn read_examiner<W: Workbook + ?Sized>(workbook: &W) -> FieldMap {
    match sheets::resolve(workbook, SheetRole::Examiner) {
        Some(sheet) => read_fields(workbook, &sheet, examiner_schema()),
        None => FieldMap::new(),
    }
}

/// Write known, non-blank fields and save.
pub fn write_examiner<W: Workbook + ?Sized>(workbook: &mut W, data: &FieldMap) -> Result<WriteSummary> {
    let sheet = sheets::require(workbook, SheetRole::Examiner)?;
    let mut summary = WriteSummary::default();

    for (name, value) in data {
        let Some(field) = FieldSpec::lookup(examiner_schema(), name) else {
            debug!("skipping unknown examiner field {:?}", name);
            summary.skipped_unknown.push(name.clone());
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        workbook.set_cell(&sheet, field.cell, value)?;
        summary.written.push(name.clone());
    }

    workbook.save()?;
    info!(
        "examiner data written: {} field(s), {} unknown",
        summary.written.len(),
        summary.skipped_unknown.len()
    );
    Ok(summary)
}

/// One note per row of the note block, blank rows included.
pub fn read_notes<W: Workbook + ?Sized>(workbook: &W) -> Vec<ExaminerNote> {
    let Some(sheet) = sheets::resolve(workbook, SheetRole::Examiner) else {
        return Vec::new();
    };
    let layout = NOTE_LAYOUT;
    layout
        .rows
        .rows()
        .map(|(offset, row)| ExaminerNote {
            label: layout.label(offset),
            finding: workbook.field_text(&sheet, CellRef::new(row, layout.finding)),
            doc_required: workbook.field_text(&sheet, CellRef::new(row, layout.doc_required)),
            photo_required: workbook.field_text(&sheet, CellRef::new(row, layout.photo_required)),
        })
        .collect()
}

/// Write up to eight notes into the note block and save. Notes beyond the
/// block are dropped with a warning; blank parts leave the cell unchanged.
pub fn write_notes<W: Workbook + ?Sized>(workbook: &mut W, notes: &[ExaminerNote]) -> Result<WriteSummary> {
    let sheet = sheets::require(workbook, SheetRole::Examiner)?;
    let layout = NOTE_LAYOUT;
    if notes.len() > layout.capacity() {
        warn!(
            "{} notes given, only the first {} fit the note block",
            notes.len(),
            layout.capacity()
        );
    }

    let mut summary = WriteSummary::default();
    for ((offset, row), note) in layout.rows.rows().zip(notes) {
        let parts = [
            (layout.finding, note.finding.trim()),
            (layout.doc_required, note.doc_required.trim()),
            (layout.photo_required, note.photo_required.trim()),
        ];
        let mut touched = false;
        for (col, value) in parts {
            if !value.is_empty() {
                workbook.set_cell(&sheet, CellRef::new(row, col), value)?;
                touched = true;
            }
        }
        if touched {
            summary.written.push(layout.label(offset));
        }
    }

    workbook.save()?;
    info!("examiner notes written: {}", summary.written.len());
    Ok(summary)
}

/// Store the chosen vehicle classification in both examiner target cells.
pub fn save_classification<W: Workbook + ?Sized>(workbook: &mut W, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InspectError::InvalidInput("classification is empty".to_string()));
    }
    let sheet = sheets::require(workbook, SheetRole::Examiner)?;
    for cell in CLASSIFICATION_TARGETS {
        workbook.set_cell(&sheet, cell, value)?;
    }
    workbook.save()?;
    info!("classification saved: {}", value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::MemoryWorkbook;
    use pretty_assertions::assert_eq;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_round_trip_every_field() {
        let mut wb = MemoryWorkbook::new().with_sheet("בוחן");
        let data: FieldMap = examiner_schema()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.to_string(), format!("value {i}")))
            .collect();
        let summary = write_examiner(&mut wb, &data).unwrap();
        assert_eq!(summary.written.len(), examiner_schema().len());
        assert_eq!(read_examiner(&wb), data);
        assert_eq!(wb.save_count(), 1);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut wb = MemoryWorkbook::new()
            .with_cell("בוחן", "E42", "11-111-11")
            .with_cell("בוחן", "E43", "red");
        write_examiner(&mut wb, &fields(&[("color", "blue"), ("license", "")])).unwrap();
        let data = read_examiner(&wb);
        assert_eq!(data["license"], "11-111-11");
        assert_eq!(data["color"], "blue");
    }

    #[test]
    fn test_unknown_fields_reported() {
        let mut wb = MemoryWorkbook::new().with_sheet("בוחן");
        let summary = write_examiner(&mut wb, &fields(&[("bogus", "x"), ("color", "red")])).unwrap();
        assert_eq!(summary.written, vec!["color".to_string()]);
        assert_eq!(summary.skipped_unknown, vec!["bogus".to_string()]);
    }

    #[test]
    fn test_missing_sheet_no_mutation() {
        let mut wb = MemoryWorkbook::new().with_sheet("מזכירה");
        let err = write_examiner(&mut wb, &fields(&[("color", "red")])).unwrap_err();
        assert!(matches!(err, InspectError::SheetNotFound(SheetRole::Examiner)));
        assert_eq!(wb.cell_count("מזכירה"), 0);
        assert_eq!(wb.save_count(), 0);
    }

    #[test]
    fn test_save_failure_propagates() {
        let mut wb = MemoryWorkbook::new().with_sheet("בוחן").failing_saves();
        let err = write_examiner(&mut wb, &fields(&[("color", "red")])).unwrap_err();
        assert!(matches!(err, InspectError::PersistFailure { .. }));
    }

    #[test]
    fn test_notes_round_trip() {
        let mut wb = MemoryWorkbook::new().with_sheet("בוחן");
        let notes = vec![
            ExaminerNote::new("broken mirror"),
            ExaminerNote::default(),
            ExaminerNote {
                finding: "missing plate".into(),
                doc_required: "yes".into(),
                ..Default::default()
            },
        ];
        let summary = write_notes(&mut wb, &notes).unwrap();
        assert_eq!(summary.written, vec!["10.1".to_string(), "10.3".to_string()]);

        let read = read_notes(&wb);
        assert_eq!(read.len(), 8);
        assert_eq!(read[0].label, "10.1");
        assert_eq!(read[0].finding, "broken mirror");
        assert_eq!(read[1].finding, "");
        assert_eq!(read[2].doc_required, "yes");
        assert_eq!(read[7].label, "10.8");
    }

    #[test]
    fn test_notes_capped_at_block() {
        let mut wb = MemoryWorkbook::new().with_sheet("בוחן");
        let notes: Vec<_> = (0..10).map(|i| ExaminerNote::new(format!("n{i}"))).collect();
        let summary = write_notes(&mut wb, &notes).unwrap();
        assert_eq!(summary.written.len(), 8);
        assert_eq!(wb.field_text("בוחן", CellRef::a1("D319")), "n7");
        assert_eq!(wb.field_text("בוחן", CellRef::a1("D320")), "");
    }

    #[test]
    fn test_save_classification() {
        let mut wb = MemoryWorkbook::new().with_sheet("בוחן");
        save_classification(&mut wb, " משאית ").unwrap();
        assert_eq!(wb.field_text("בוחן", CellRef::a1("E87")), "משאית");
        assert_eq!(wb.field_text("בוחן", CellRef::a1("E88")), "משאית");

        let err = save_classification(&mut wb, "  ").unwrap_err();
        assert!(matches!(err, InspectError::InvalidInput(_)));
    }
}
