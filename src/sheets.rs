//! Sheet resolution by role marker
//!
//! Sheet names drift between workbook revisions ("בוחן", " בוחן ",
//! "דף בוחן 2"), so sheets are found by a marker substring, never by exact
//! name.

use crate::error::{InspectError, Result};
use crate::workbook::Workbook;
use inspect_common::SheetRole;

/// First sheet, in stored order, whose trimmed lower-cased name contains
/// the role marker.
pub fn resolve<W: Workbook + ?Sized>(workbook: &W, role: SheetRole) -> Option<String> {
    let marker = role.marker().to_lowercase();
    workbook
        .sheet_names()
        .iter()
        .find(|name| name.trim().to_lowercase().contains(&marker))
        .cloned()
}

/// Like `resolve`, for write paths that cannot proceed without the sheet.
pub fn require<W: Workbook + ?Sized>(workbook: &W, role: SheetRole) -> Result<String> {
    resolve(workbook, role).ok_or(InspectError::SheetNotFound(role))
}
