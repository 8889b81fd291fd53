//! Vehicle classification options from the helper sheet
//!
//! The options live in column D of the helper sheet, below a header cell
//! containing `T_13`. The list has no explicit end marker, so the scan ends
//! on a run of blank rows once a plausible number of options has been
//! seen. This heuristic breaks if the helper sheet layout changes.

use crate::sheets;
use crate::workbook::{open_workbook, Workbook};
use inspect_common::schema::{
    CLASSIFICATION_BLANK_RUN, CLASSIFICATION_COLUMN, CLASSIFICATION_HEADER, CLASSIFICATION_MIN_OPTIONS,
    CLASSIFICATION_SCAN_ROWS, PLACEHOLDER,
};
use inspect_common::{CellRef, Fallback, FallbackReason, SheetRole};
use log::{debug, warn};
use std::path::Path;

pub fn extract_classification_options<W: Workbook + ?Sized>(workbook: &W) -> Fallback<Vec<String>> {
    let Some(sheet) = sheets::resolve(workbook, SheetRole::Helper) else {
        return Fallback::defaulted(Vec::new(), FallbackReason::SheetMissing(SheetRole::Helper));
    };

    let mut options = Vec::new();
    let mut in_list = false;
    let mut blank_run = 0;

    for row in 0..CLASSIFICATION_SCAN_ROWS {
        let text = workbook.field_text(&sheet, CellRef::new(row, CLASSIFICATION_COLUMN));
        if text.contains(CLASSIFICATION_HEADER) {
            in_list = true;
            continue;
        }
        if !in_list {
            continue;
        }
        if text.is_empty() {
            blank_run += 1;
            if blank_run >= CLASSIFICATION_BLANK_RUN && options.len() > CLASSIFICATION_MIN_OPTIONS {
                break;
            }
            continue;
        }
        blank_run = 0;
        if text != PLACEHOLDER {
            options.push(text);
        }
    }

    if !in_list {
        return Fallback::defaulted(
            Vec::new(),
            FallbackReason::MarkerMissing(CLASSIFICATION_HEADER.to_string()),
        );
    }
    debug!("{} classification option(s)", options.len());
    Fallback::read(options)
}

/// `extract_classification_options` on a workbook file.
pub fn extract_classification_options_at(path: &Path) -> Fallback<Vec<String>> {
    match open_workbook(path) {
        Ok(workbook) => extract_classification_options(&workbook),
        Err(e) => {
            warn!("classification options unavailable: {}", e);
            Fallback::defaulted(Vec::new(), FallbackReason::Unreadable(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::MemoryWorkbook;
    use pretty_assertions::assert_eq;

    fn helper(column: &[&str]) -> MemoryWorkbook {
        column
            .iter()
            .enumerate()
            .fold(MemoryWorkbook::new().with_sheet("עזר"), |wb, (i, value)| {
                wb.with_cell("עזר", &format!("D{}", i + 1), value)
            })
    }

    #[test]
    fn test_stray_blank_inside_list() {
        let wb = helper(&["x", "T_13", "a", "b", "c", "d", "e", "", "f", "g", "", "", "zzz"]);
        let options = extract_classification_options(&wb);
        assert!(!options.is_default());
        assert_eq!(options.value, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_short_list_tolerates_blank_run() {
        let wb = helper(&["T_13", "a", "", "", "b", "", ""]);
        let options = extract_classification_options(&wb).into_inner();
        assert_eq!(options, vec!["a", "b"]);
    }

    #[test]
    fn test_dash_and_whitespace_dropped() {
        let wb = helper(&["hdr T_13", " a ", "-", "   ", "b", "-x", "c", "d", "", ""]);
        let options = extract_classification_options(&wb).into_inner();
        assert_eq!(options, vec!["a", "b", "-x", "c", "d"]);
    }

    #[test]
    fn test_repeated_header_not_an_option() {
        let wb = helper(&["T_13", "a", "b", "T_13 again", "c", "d", "", ""]);
        let options = extract_classification_options(&wb).into_inner();
        assert_eq!(options, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_missing_marker() {
        let wb = helper(&["a", "b"]);
        let options = extract_classification_options(&wb);
        assert!(options.value.is_empty());
        assert_eq!(options.reason, Some(FallbackReason::MarkerMissing("T_13".to_string())));
    }

    #[test]
    fn test_missing_sheet() {
        let wb = MemoryWorkbook::new().with_sheet("בוחן");
        let options = extract_classification_options(&wb);
        assert_eq!(options.reason, Some(FallbackReason::SheetMissing(SheetRole::Helper)));
    }
}
