//! Reference ("secretary") sheet reads
//!
//! The office fills in registration data before the examiner arrives. This
//! module reads it by schema, detects the vehicle category and builds the
//! identity block shown on every report.

use crate::sheets;
use crate::workbook::{open_workbook, Workbook};
use inspect_common::schema::{reference_schema, CATEGORY_CELL, LICENSE_CELL, VIN_CELL};
use inspect_common::{Category, Fallback, FallbackReason, FieldMap, FieldSpec, ReportIdentity, SheetRole};
use log::{debug, warn};
use std::path::Path;

/// Read every field of `table` from `sheet` as trimmed text.
pub(crate) fn read_fields<W: Workbook + ?Sized>(workbook: &W, sheet: &str, table: &[FieldSpec]) -> FieldMap {
    table
        .iter()
        .map(|field| (field.name.to_string(), workbook.field_text(sheet, field.cell)))
        .collect()
}

/// Reference fields for `category`. Empty when there is no reference sheet.
pub fn read_reference<W: Workbook + ?Sized>(workbook: &W, category: &Category) -> FieldMap {
    let Some(sheet) = sheets::resolve(workbook, SheetRole::Reference) else {
        debug!("no reference sheet, returning empty field map");
        return FieldMap::new();
    };
    read_fields(workbook, &sheet, reference_schema(category.reference_variant()))
}

/// Category code from the reference sheet, `N2` when it cannot be read.
pub fn detect_category<W: Workbook + ?Sized>(workbook: &W) -> Fallback<Category> {
    let Some(sheet) = sheets::resolve(workbook, SheetRole::Reference) else {
        return Fallback::defaulted(Category::default(), FallbackReason::SheetMissing(SheetRole::Reference));
    };
    let code = workbook.field_text(&sheet, CATEGORY_CELL);
    if code.is_empty() {
        Fallback::defaulted(Category::default(), FallbackReason::BlankCell)
    } else {
        Fallback::read(Category::from_code(&code))
    }
}

/// `detect_category` on a workbook file. Open failures also fall back.
pub fn detect_category_at(path: &Path) -> Fallback<Category> {
    match open_workbook(path) {
        Ok(workbook) => detect_category(&workbook),
        Err(e) => {
            warn!("category detection fell back to default: {}", e);
            Fallback::defaulted(Category::default(), FallbackReason::Unreadable(e.to_string()))
        }
    }
}

/// Identity block for reports: license `D16` and VIN `D25` of the
/// reference sheet, with the folder name standing in when both are blank.
pub fn read_identity<W: Workbook + ?Sized>(workbook: &W, manufacturer: &str, vehicle_name: &str) -> ReportIdentity {
    let (license, vin) = match sheets::resolve(workbook, SheetRole::Reference) {
        Some(sheet) => (
            workbook.field_text(&sheet, LICENSE_CELL),
            workbook.field_text(&sheet, VIN_CELL),
        ),
        None => (String::new(), String::new()),
    };
    ReportIdentity::new(manufacturer, &license, &vin, vehicle_name)
}
