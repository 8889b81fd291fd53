//! Findings summary reads and report assembly

use crate::examiner::read_notes;
use crate::reference::read_identity;
use crate::sheets;
use crate::workbook::Workbook;
use inspect_common::schema::{RowBlock, SUMMARY_LAYOUT};
use inspect_common::{aggregate, CellRef, Deficiencies, DeficiencyMeta, DeficiencyReport, DeficiencyRow, ExaminerNote, SheetRole};
use log::debug;

fn read_block<W: Workbook + ?Sized>(workbook: &W, sheet: &str, block: RowBlock) -> Vec<DeficiencyRow> {
    let columns = SUMMARY_LAYOUT.columns;
    block
        .rows()
        .map(|(offset, row)| DeficiencyRow {
            number: block.number_at(offset),
            finding: workbook.field_text(sheet, CellRef::new(row, columns.finding)),
            doc_required: workbook.field_text(sheet, CellRef::new(row, columns.doc_required)),
            photo_required: workbook.field_text(sheet, CellRef::new(row, columns.photo_required)),
            reinspect: workbook.field_text(sheet, CellRef::new(row, columns.reinspect)),
        })
        .collect()
}

/// Every pre/post row of the summary, blank findings included, plus the
/// header cells. All empty when there is no summary sheet.
pub fn read_deficiencies<W: Workbook + ?Sized>(workbook: &W) -> Deficiencies {
    let Some(sheet) = sheets::resolve(workbook, SheetRole::DeficiencySummary) else {
        debug!("no deficiency summary sheet");
        return Deficiencies::default();
    };
    let layout = SUMMARY_LAYOUT;
    Deficiencies {
        pre: read_block(workbook, &sheet, layout.pre),
        post: read_block(workbook, &sheet, layout.post),
        meta: DeficiencyMeta {
            report_number: workbook.field_text(&sheet, layout.report_number),
            manufacturer: workbook.field_text(&sheet, layout.manufacturer),
            license: workbook.field_text(&sheet, layout.license),
            vin: workbook.field_text(&sheet, layout.vin),
        },
    }
}

pub fn read_examiner_notes<W: Workbook + ?Sized>(workbook: &W) -> Vec<ExaminerNote> {
    read_notes(workbook)
}

/// Aggregate and identity for one vehicle, ready for any renderer.
pub fn build_report<W: Workbook + ?Sized>(workbook: &W, manufacturer: &str, vehicle_name: &str) -> DeficiencyReport {
    let deficiencies = read_deficiencies(workbook);
    let notes = read_examiner_notes(workbook);
    let items = aggregate(&deficiencies.pre, &deficiencies.post, &notes);
    debug!(
        "report: {} pre, {} post, {} notes -> {} items",
        deficiencies.pre.len(),
        deficiencies.post.len(),
        notes.len(),
        items.len()
    );
    DeficiencyReport::new(read_identity(workbook, manufacturer, vehicle_name), items)
}
