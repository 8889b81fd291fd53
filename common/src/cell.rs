//! Typed cell coordinates
//!
//! Schema tables are written in A1 notation but stored as `(row, col)`.
//! `CellRef::a1` is a `const fn`, so a malformed coordinate in a table
//! fails the build instead of failing a read at runtime.

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// Zero-based `(row, col)` coordinate inside a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    /// Build from zero-based indices.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse A1 notation at compile time.
    ///
    /// Panics on malformed input, which turns into a compile error when used
    /// in a `const`/`static` initialiser.
    pub const fn a1(reference: &str) -> Self {
        match parse_a1(reference.as_bytes()) {
            Some(cell) => cell,
            None => panic!("invalid A1 cell reference"),
        }
    }

    /// Parse A1 notation at runtime.
    pub fn parse(reference: &str) -> Result<Self> {
        parse_a1(reference.trim().as_bytes())
            .ok_or_else(|| Error::InvalidCellRef(reference.to_string()))
    }

    /// 1-based row number as shown in the spreadsheet UI.
    pub const fn row_number(&self) -> u32 {
        self.row + 1
    }

    /// Same column, `offset` rows further down.
    pub const fn down(&self, offset: u32) -> Self {
        Self {
            row: self.row + offset,
            col: self.col,
        }
    }

    /// Column letters ("A", "Z", "AA", ...).
    pub fn column_letters(&self) -> String {
        column_letters(self.col)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row_number())
    }
}

impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Zero-based column index → letters.
pub fn column_letters(col: u32) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

// Excel limits: 16384 columns (XFD), 1048576 rows.
const MAX_COL: u32 = 16_384;
const MAX_ROW: u32 = 1_048_576;

const fn parse_a1(bytes: &[u8]) -> Option<CellRef> {
    let mut i = 0;
    let mut col: u32 = 0;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        let letter = bytes[i].to_ascii_uppercase();
        col = col * 26 + (letter - b'A' + 1) as u32;
        if col > MAX_COL {
            return None;
        }
        i += 1;
    }
    if i == 0 || i == bytes.len() {
        return None;
    }

    let mut row: u32 = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            return None;
        }
        row = row * 10 + (bytes[i] - b'0') as u32;
        if row > MAX_ROW {
            return None;
        }
        i += 1;
    }
    if row == 0 {
        return None;
    }

    Some(CellRef {
        row: row - 1,
        col: col - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_basic() {
        let cell = CellRef::a1("D16");
        assert_eq!(cell.row, 15);
        assert_eq!(cell.col, 3);
        assert_eq!(cell.row_number(), 16);
    }

    #[test]
    fn test_a1_const_context() {
        const CELL: CellRef = CellRef::a1("E135");
        assert_eq!(CELL, CellRef::new(134, 4));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["A1", "D17", "Z9", "AA10", "AZ300", "XFD1048576"] {
            let cell = CellRef::parse(text).unwrap();
            assert_eq!(cell.to_string(), text);
        }
    }

    #[test]
    fn test_parse_lowercase_and_whitespace() {
        assert_eq!(CellRef::parse(" e42 ").unwrap(), CellRef::a1("E42"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "42", "E", "E0", "4E", "E4E", "XFE1", "A1048577"] {
            assert!(CellRef::parse(text).is_err(), "should reject {text:?}");
        }
    }

    #[test]
    fn test_down() {
        assert_eq!(CellRef::a1("B22").down(5), CellRef::a1("B27"));
    }

    #[test]
    fn test_serialize_as_a1() {
        let json = serde_json::to_string(&CellRef::a1("J13")).unwrap();
        assert_eq!(json, "\"J13\"");
    }
}
