use super::Workbook;
use crate::error::{InspectError, Result};
use inspect_common::CellRef;
use std::collections::HashMap;
use std::path::PathBuf;

/// Workbook kept entirely in memory.
///
/// Used by callers that assemble data without a file, and by tests. Saving
/// only counts calls unless a failure has been injected.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    names: Vec<String>,
    cells: HashMap<String, HashMap<CellRef, String>>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty sheet (builder style).
    pub fn with_sheet(mut self, name: &str) -> Self {
        self.add_sheet(name);
        self
    }

    /// Put `value` at an A1 reference (builder style). Adds the sheet if
    /// needed. Panics on a malformed reference.
    pub fn with_cell(mut self, sheet: &str, reference: &str, value: &str) -> Self {
        let cell = CellRef::a1(reference);
        self.add_sheet(sheet);
        self.cells
            .entry(sheet.to_string())
            .or_default()
            .insert(cell, value.to_string());
        self
    }

    /// Make every `save` fail with a persist error.
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn add_sheet(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
            self.cells.entry(name.to_string()).or_default();
        }
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Number of non-empty cells on a sheet.
    pub fn cell_count(&self, sheet: &str) -> usize {
        self.cells.get(sheet).map(HashMap::len).unwrap_or(0)
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> &[String] {
        &self.names
    }

    fn cell_text(&self, sheet: &str, cell: CellRef) -> Option<String> {
        self.cells
            .get(sheet)?
            .get(&cell)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn set_cell(&mut self, sheet: &str, cell: CellRef, value: &str) -> Result<()> {
        let cells = self
            .cells
            .get_mut(sheet)
            .ok_or_else(|| InspectError::InvalidInput(format!("unknown sheet: {sheet}")))?;
        cells.insert(cell, value.to_string());
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if self.fail_saves {
            return Err(InspectError::PersistFailure {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "save disabled"),
            });
        }
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_sheet_order() {
        let wb = MemoryWorkbook::new()
            .with_sheet("b")
            .with_cell("a", "A1", "x")
            .with_sheet("b");
        assert_eq!(wb.sheet_names(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_empty_string_reads_as_blank() {
        let wb = MemoryWorkbook::new().with_cell("s", "A1", "");
        assert_eq!(wb.cell_text("s", CellRef::a1("A1")), None);
        assert_eq!(wb.field_text("s", CellRef::a1("A1")), "");
    }

    #[test]
    fn test_field_text_trims() {
        let wb = MemoryWorkbook::new().with_cell("s", "B2", "  N3 ");
        assert_eq!(wb.field_text("s", CellRef::a1("B2")), "N3");
    }

    #[test]
    fn test_set_cell_unknown_sheet() {
        let mut wb = MemoryWorkbook::new();
        assert!(wb.set_cell("nope", CellRef::a1("A1"), "x").is_err());
    }

    #[test]
    fn test_failing_saves() {
        let mut wb = MemoryWorkbook::new().failing_saves();
        assert!(matches!(wb.save(), Err(InspectError::PersistFailure { .. })));
        assert_eq!(wb.save_count(), 0);
    }
}
