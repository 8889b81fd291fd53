//! xlsx-backed workbook
//!
//! Cells are read once through calamine. Writes are staged in an overlay
//! and applied to the file by `patch` on save.

use super::{patch, Workbook};
use crate::error::{InspectError, Result};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use inspect_common::CellRef;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub struct XlsxWorkbook {
    path: PathBuf,
    names: Vec<String>,
    sheets: HashMap<String, Range<Data>>,
    edits: BTreeMap<String, BTreeMap<CellRef, String>>,
    dirty: bool,
}

impl XlsxWorkbook {
    /// Open and load every worksheet. Sheets calamine cannot parse are kept
    /// by name and read as empty.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(InspectError::unreadable(path, "file not found"));
        }
        let mut xlsx: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| InspectError::unreadable(path, e))?;
        let names = xlsx.sheet_names().to_vec();

        let mut sheets = HashMap::new();
        for name in &names {
            match xlsx.worksheet_range(name) {
                Ok(range) => {
                    sheets.insert(name.clone(), range);
                }
                Err(e) => warn!("sheet {:?} in {} unreadable: {}", name, path.display(), e),
            }
        }
        debug!("opened {} ({} sheets)", path.display(), names.len());

        Ok(Self {
            path: path.to_path_buf(),
            names,
            sheets,
            edits: BTreeMap::new(),
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Workbook for XlsxWorkbook {
    fn sheet_names(&self) -> &[String] {
        &self.names
    }

    fn cell_text(&self, sheet: &str, cell: CellRef) -> Option<String> {
        if let Some(value) = self.edits.get(sheet).and_then(|cells| cells.get(&cell)) {
            return Some(value.clone()).filter(|v| !v.is_empty());
        }
        let range = self.sheets.get(sheet)?;
        range.get_value((cell.row, cell.col)).and_then(data_text)
    }

    fn set_cell(&mut self, sheet: &str, cell: CellRef, value: &str) -> Result<()> {
        if !self.names.iter().any(|name| name == sheet) {
            return Err(InspectError::InvalidInput(format!("unknown sheet: {sheet}")));
        }
        debug!("{}!{} = {:?}", sheet, cell, value);
        self.edits
            .entry(sheet.to_string())
            .or_default()
            .insert(cell, value.to_string());
        self.dirty = true;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        patch::save_edits(&self.path, &self.edits)?;
        self.dirty = false;
        let count: usize = self.edits.values().map(BTreeMap::len).sum();
        info!("saved {} ({} cell(s) set)", self.path.display(), count);
        Ok(())
    }
}

/// Cell value as display text. Whole floats print without a fraction.
fn data_text(data: &Data) -> Option<String> {
    let text = match data {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format_number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    };
    Some(text).filter(|t| !t.is_empty())
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_data_text() {
        assert_eq!(data_text(&Data::Empty), None);
        assert_eq!(data_text(&Data::String(String::new())), None);
        assert_eq!(data_text(&Data::String("N3".into())), Some("N3".into()));
        assert_eq!(data_text(&Data::Float(1234567.0)), Some("1234567".into()));
        assert_eq!(data_text(&Data::Int(7)), Some("7".into()));
        assert_eq!(data_text(&Data::Bool(true)), Some("TRUE".into()));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = XlsxWorkbook::open(&dir.path().join("none.xlsx"));
        assert!(matches!(result, Err(InspectError::WorkbookUnreadable { .. })));
    }
}
