//! Workbook handle
//!
//! Readers and writers only see the `Workbook` trait: sheet names in stored
//! order, cell text by coordinate, cell writes, save. `XlsxWorkbook` is the
//! file-backed implementation; `MemoryWorkbook` holds cells in memory.

mod memory;
mod patch;
mod xlsx;

pub use memory::MemoryWorkbook;
pub use xlsx::XlsxWorkbook;

use crate::error::Result;
use inspect_common::CellRef;
use std::path::Path;

pub trait Workbook {
    /// Sheet names in stored order.
    fn sheet_names(&self) -> &[String];

    /// Raw cell text, `None` when the cell is empty or the sheet is unknown.
    fn cell_text(&self, sheet: &str, cell: CellRef) -> Option<String>;

    /// Stage a string value for `cell`. Visible to `cell_text` immediately,
    /// persisted by `save`.
    fn set_cell(&mut self, sheet: &str, cell: CellRef, value: &str) -> Result<()>;

    /// Persist staged values. Cells that were not set stay as they are.
    fn save(&mut self) -> Result<()>;

    /// Trimmed text, empty string for blank cells.
    fn field_text(&self, sheet: &str, cell: CellRef) -> String {
        self.cell_text(sheet, cell)
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }
}

/// Open an xlsx workbook by path.
pub fn open_workbook(path: &Path) -> Result<XlsxWorkbook> {
    XlsxWorkbook::open(path)
}
