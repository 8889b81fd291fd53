//! Fixture workbooks built with rust_xlsxwriter.

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::{Path, PathBuf};

pub const REFERENCE: &str = "מזכירה";
pub const EXAMINER: &str = "דף בוחן";
pub const SUMMARY: &str = "ממצאים";
pub const HELPER: &str = "עזר";

/// `(sheet, A1 cell, value)`
pub type Cells<'a> = &'a [(&'a str, &'a str, &'a str)];

fn a1(reference: &str) -> (u32, u16) {
    let split = reference.find(|c: char| c.is_ascii_digit()).unwrap();
    let (letters, digits) = reference.split_at(split);
    let col = letters
        .bytes()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1))
        - 1;
    (digits.parse::<u32>().unwrap() - 1, col as u16)
}

/// Write a workbook with the given sheets (in order) and string cells.
pub fn build(path: &Path, sheets: &[&str], cells: Cells) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    for name in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        for (_, cell, value) in cells.iter().filter(|(s, _, _)| s == name) {
            let (row, col) = a1(cell);
            match value.parse::<f64>() {
                Ok(number) if !value.contains('-') => sheet.write_number(row, col, number)?,
                _ => sheet.write_string(row, col, *value)?,
            };
        }
    }
    workbook.save(path)
}

/// A complete inspection workbook for one N3 truck.
pub fn inspection_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("12-345-67.xlsx");
    build(
        &path,
        &[REFERENCE, EXAMINER, SUMMARY, HELPER],
        &[
            (REFERENCE, "D16", "12-345-67"),
            (REFERENCE, "D17", "N3"),
            (REFERENCE, "D25", "YV2RT40A"),
            (REFERENCE, "D33", "Volvo"),
            (EXAMINER, "E42", "12-345-67"),
            (EXAMINER, "E43", "white"),
            (EXAMINER, "E49", "6"),
            (EXAMINER, "D312", "cracked mirror"),
            (EXAMINER, "D313", "-"),
            (SUMMARY, "A13", "R-100"),
            (SUMMARY, "B22", "missing extinguisher"),
            (SUMMARY, "H22", "yes"),
            (SUMMARY, "B30", "worn tyres"),
            (HELPER, "D2", "T_13"),
            (HELPER, "D3", "truck"),
            (HELPER, "D4", "tractor"),
            (HELPER, "D5", "tanker"),
            (HELPER, "D6", "tipper"),
            (HELPER, "D7", "crane"),
            // D8 blank
            (HELPER, "D9", "bus"),
            (HELPER, "D10", "van"),
            // D11, D12 blank
            (HELPER, "D13", "unrelated"),
        ],
    )
    .unwrap();
    path
}
