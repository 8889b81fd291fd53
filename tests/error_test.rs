//! Error case tests
//!
//! Failure paths and degraded reads, checked against real files.

mod support;

use inspect_common::{FallbackReason, SheetRole};
use std::path::Path;
use tempfile::tempdir;
use vehicle_inspect::error::InspectError;
use vehicle_inspect::{extract_classification_options_at, open_workbook, save_classification, MemoryWorkbook};

/// Opening a workbook that does not exist
#[test]
fn test_open_nonexistent_workbook() {
    let result = open_workbook(Path::new("/nonexistent/path/12345.xlsx"));
    assert!(matches!(result, Err(InspectError::WorkbookUnreadable { .. })));
}

/// Opening something that is not an xlsx file
#[test]
fn test_open_corrupt_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("corrupt.xlsx");
    std::fs::write(&path, "hello").unwrap();

    let result = open_workbook(&path);
    assert!(matches!(result, Err(InspectError::WorkbookUnreadable { .. })));
}

/// Classification extraction degrades instead of failing
#[test]
fn test_classification_unreadable_and_missing_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");

    let options = extract_classification_options_at(&dir.path().join("none.xlsx"));
    assert!(options.value.is_empty());
    assert!(matches!(options.reason, Some(FallbackReason::Unreadable(_))));

    let path = dir.path().join("no-helper.xlsx");
    support::build(&path, &[support::EXAMINER], &[]).unwrap();
    let options = extract_classification_options_at(&path);
    assert!(options.value.is_empty());
    assert_eq!(options.reason, Some(FallbackReason::SheetMissing(SheetRole::Helper)));
}

/// Save failures surface as persist errors
#[test]
fn test_persist_failure() {
    let mut workbook = MemoryWorkbook::new().with_sheet("בוחן").failing_saves();
    let err = save_classification(&mut workbook, "truck").unwrap_err();
    assert!(matches!(err, InspectError::PersistFailure { .. }));
}

/// InspectError Display
#[test]
fn test_error_display() {
    let errors = vec![
        InspectError::SheetNotFound(SheetRole::Examiner),
        InspectError::WorkbookUnreadable {
            path: "a.xlsx".into(),
            reason: "not a zip".into(),
        },
        InspectError::Config("no root".to_string()),
        InspectError::FileNotFound("v.xlsx".to_string()),
        InspectError::InvalidInput("empty".to_string()),
        InspectError::FontLoad("no font".to_string()),
        InspectError::PdfGeneration("PDF error".to_string()),
        InspectError::ImageGeneration("PNG error".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Display for {:?} is empty", err);
    }

    let display = InspectError::SheetNotFound(SheetRole::Examiner).to_string();
    assert!(display.contains("בוחן"));
}

/// Common-crate errors convert transparently
#[test]
fn test_common_error_conversion() {
    let err: InspectError = inspect_common::Error::UnknownField("bogus".into()).into();
    assert!(err.to_string().contains("bogus"));
}
