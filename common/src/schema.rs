//! Field schema tables
//!
//! Every reader and writer is driven by these tables. A new field is added
//! by adding a row here, never by branching on a field name elsewhere.
//!
//! Coordinates are checked at compile time by `CellRef::a1`.

use crate::category::SchemaVariant;
use crate::cell::CellRef;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

// ============================================
// Sheet roles
// ============================================

/// Logical sheet inside a vehicle workbook.
///
/// Sheet names differ slightly between workbook instances, so each role is
/// found by a marker substring rather than an exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetRole {
    /// Office-entered reference data ("secretary").
    Reference,
    /// Field examiner's sheet.
    Examiner,
    /// Findings summary.
    DeficiencySummary,
    /// Auxiliary lookup sheet.
    Helper,
}

impl SheetRole {
    pub const ALL: [SheetRole; 4] = [
        SheetRole::Reference,
        SheetRole::Examiner,
        SheetRole::DeficiencySummary,
        SheetRole::Helper,
    ];

    /// Substring a sheet name must contain to play this role.
    pub const fn marker(&self) -> &'static str {
        match self {
            SheetRole::Reference => "מזכיר",
            SheetRole::Examiner => "בוחן",
            SheetRole::DeficiencySummary => "ממצאים",
            SheetRole::Helper => "עזר",
        }
    }
}

impl fmt::Display for SheetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SheetRole::Reference => "reference",
            SheetRole::Examiner => "examiner",
            SheetRole::DeficiencySummary => "deficiency summary",
            SheetRole::Helper => "helper",
        };
        write!(f, "{} ({})", name, self.marker())
    }
}

// ============================================
// Field definitions
// ============================================

/// One semantic field and the cell that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub cell: CellRef,
}

const fn field(name: &'static str, cell: &str) -> FieldSpec {
    FieldSpec {
        name,
        cell: CellRef::a1(cell),
    }
}

impl FieldSpec {
    /// Find a field by name in a table.
    pub fn lookup<'a>(table: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
        table.iter().find(|f| f.name == name)
    }

    /// Like `lookup`, but an unknown name is an error.
    pub fn require<'a>(table: &'a [FieldSpec], name: &str) -> Result<&'a FieldSpec> {
        Self::lookup(table, name).ok_or_else(|| Error::UnknownField(name.to_string()))
    }
}

/// Reference sheet, N variant (N2/N3).
pub const REFERENCE_N: &[FieldSpec] = &[
    field("license", "D16"),
    field("category", "D17"),
    field("tire_front", "D22"),
    field("tire_rear", "D23"),
    field("total_weight", "D24"),
    field("vin", "D25"),
    field("num_wheels", "D29"),
    field("color", "D30"),
    field("axle_distance", "D32"),
    field("manufacturer", "D33"),
    field("num_axles", "D42"),
    field("tire_front_hr", "D44"),
    field("tire_rear_hr", "D47"),
    field("wvta", "D50"),
    field("weight_total", "D51"),
    field("weight_front", "D52"),
    field("weight_rear", "D53"),
    field("axle_dist_hr", "D55"),
    // Device 1
    field("sec_dev1_installer", "D100"),
    field("sec_dev1_name", "D102"),
    field("sec_dev1_manufacturer", "D108"),
    field("sec_dev1_model", "D109"),
    field("sec_dev1_serial", "D110"),
    // Device 2
    field("sec_dev2_installer", "D126"),
    field("sec_dev2_name", "D128"),
    field("sec_dev2_manufacturer", "D141"),
    field("sec_dev2_model", "D142"),
    field("sec_dev2_serial", "D143"),
    // Device 3
    field("sec_dev3_installer", "D152"),
    field("sec_dev3_name", "D154"),
    field("sec_dev3_manufacturer", "D167"),
    field("sec_dev3_model", "D168"),
    field("sec_dev3_serial", "D169"),
];

/// Reference sheet, M variant (M1).
pub const REFERENCE_M: &[FieldSpec] = &[
    field("license", "D16"),
    field("category", "D17"),
    field("tire_front", "D22"),
    field("tire_rear", "D23"),
    field("total_weight", "D24"),
    field("vin", "D25"),
    field("color", "D30"),
    field("axle_distance", "D32"),
    field("manufacturer", "D33"),
];

/// Examiner sheet. Only the N layout is known; the M examiner sheet is not
/// assumed to share these coordinates.
pub const EXAMINER_N: &[FieldSpec] = &[
    field("license", "E42"),
    field("color", "E43"),
    field("seats_beside", "E44"),
    field("seats_behind", "E45"),
    field("sleeping", "E46"),
    field("num_axles", "E48"),
    field("num_wheels", "E49"),
    field("tire1", "E50"),
    field("tire2", "E51"),
    field("tire3", "E52"),
    field("tire4", "E53"),
    field("vin", "E63"),
    field("category", "E65"),
    field("manufacturer", "E69"),
    field("wvta", "E70"),
    field("weight_total", "E72"),
    field("weight_coupled", "E73"),
    field("weight_axle1", "E74"),
    field("weight_axle2", "E75"),
    field("weight_axle3", "E76"),
    field("weight_axle4", "E77"),
    field("weight_front", "E80"),
    field("weight_rear", "E81"),
    // Devices
    field("dev1_name", "E105"),
    field("dev1_installer", "E107"),
    field("dev1_manufacturer", "E108"),
    field("dev1_model", "E109"),
    field("dev1_serial", "E110"),
    field("dev2_name", "E112"),
    field("dev2_installer", "E114"),
    field("dev2_manufacturer", "E115"),
    field("dev2_model", "E116"),
    field("dev2_serial", "E117"),
    field("dev3_name", "E119"),
    field("dev3_installer", "E121"),
    field("dev3_manufacturer", "E122"),
    field("dev3_model", "E123"),
    field("dev3_serial", "E124"),
    // Dimensions
    field("total_length", "E134"),
    field("axle_distance", "E135"),
    field("body_length", "E138"),
    field("front_axle_to_edge", "E139"),
    field("rear_axle_to_edge", "E141"),
    field("rear_overhang", "E145"),
    // Weighing, examiner scale
    field("exam_axle1_right", "E158"),
    field("exam_axle1_left", "E159"),
    field("exam_axle2_right", "E161"),
    field("exam_axle2_left", "E162"),
    // Weighing, bridge
    field("bridge_front_axles", "E163"),
    field("bridge_rear_axles", "E164"),
    field("bridge_total", "E165"),
];

/// Reference table for a schema variant.
pub fn reference_schema(variant: SchemaVariant) -> &'static [FieldSpec] {
    match variant {
        SchemaVariant::N => REFERENCE_N,
        SchemaVariant::M => REFERENCE_M,
    }
}

/// Examiner table (single variant).
pub fn examiner_schema() -> &'static [FieldSpec] {
    EXAMINER_N
}

// ============================================
// Fixed cells
// ============================================

/// Reference cell holding the category code.
pub const CATEGORY_CELL: CellRef = CellRef::a1("D17");
/// Reference cells used for the report identity line.
pub const LICENSE_CELL: CellRef = CellRef::a1("D16");
pub const VIN_CELL: CellRef = CellRef::a1("D25");

/// Examiner cells that receive the selected classification.
pub const CLASSIFICATION_TARGETS: [CellRef; 2] = [CellRef::a1("E87"), CellRef::a1("E88")];

/// Helper sheet scan for classification options.
pub const CLASSIFICATION_COLUMN: u32 = 3; // D
pub const CLASSIFICATION_HEADER: &str = "T_13";
/// Rows 1..=299 are scanned.
pub const CLASSIFICATION_SCAN_ROWS: u32 = 299;
/// The scan may stop only after more than this many options.
pub const CLASSIFICATION_MIN_OPTIONS: usize = 3;
/// Consecutive blank rows that end the option list.
pub const CLASSIFICATION_BLANK_RUN: u32 = 2;

/// Marker for "no value" used by examiners.
pub const PLACEHOLDER: &str = "-";

// ============================================
// Row blocks
// ============================================

/// Contiguous block of rows sharing one column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBlock {
    /// First row of the block (zero-based).
    pub first_row: u32,
    /// Number of rows.
    pub len: u32,
    /// Display number of the first row; later rows count up from it.
    pub first_number: u32,
}

impl RowBlock {
    const fn new(first_row_number: u32, last_row_number: u32, first_number: u32) -> Self {
        Self {
            first_row: first_row_number - 1,
            len: last_row_number - first_row_number + 1,
            first_number,
        }
    }

    /// `(offset, row)` for every row of the block.
    pub fn rows(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.len).map(move |offset| (offset, self.first_row + offset))
    }

    /// Display number for a row at `offset`, blank or not.
    pub fn number_at(&self, offset: u32) -> u32 {
        self.first_number + offset
    }
}

/// Column layout of a summary-sheet deficiency row.
#[derive(Debug, Clone, Copy)]
pub struct DeficiencyColumns {
    pub finding: u32,
    pub doc_required: u32,
    pub photo_required: u32,
    pub reinspect: u32,
}

/// Findings summary sheet layout.
#[derive(Debug, Clone, Copy)]
pub struct SummaryLayout {
    pub pre: RowBlock,
    pub post: RowBlock,
    pub columns: DeficiencyColumns,
    pub report_number: CellRef,
    pub manufacturer: CellRef,
    pub license: CellRef,
    pub vin: CellRef,
}

pub const SUMMARY_LAYOUT: SummaryLayout = SummaryLayout {
    pre: RowBlock::new(22, 27, 1),
    post: RowBlock::new(29, 34, 7),
    columns: DeficiencyColumns {
        finding: 1,        // B
        doc_required: 7,   // H
        photo_required: 8, // I
        reinspect: 9,      // J
    },
    report_number: CellRef::a1("A13"),
    manufacturer: CellRef::a1("E13"),
    license: CellRef::a1("H13"),
    vin: CellRef::a1("J13"),
};

/// Examiner note block (section 10 of the examiner sheet).
#[derive(Debug, Clone, Copy)]
pub struct NoteLayout {
    pub rows: RowBlock,
    pub section: u32,
    pub finding: u32,
    pub doc_required: u32,
    pub photo_required: u32,
}

impl NoteLayout {
    /// Maximum notes the block can hold.
    pub fn capacity(&self) -> usize {
        self.rows.len as usize
    }

    /// Two-level label, e.g. "10.3".
    pub fn label(&self, offset: u32) -> String {
        format!("{}.{}", self.section, self.rows.number_at(offset))
    }
}

pub const NOTE_LAYOUT: NoteLayout = NoteLayout {
    rows: RowBlock::new(312, 319, 1),
    section: 10,
    finding: 3,        // D
    doc_required: 6,   // G
    photo_required: 7, // H
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique(table: &[FieldSpec]) {
        let names: HashSet<_> = table.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), table.len(), "duplicate field name");
        let cells: HashSet<_> = table.iter().map(|f| f.cell).collect();
        assert_eq!(cells.len(), table.len(), "duplicate coordinate");
    }

    #[test]
    fn test_tables_unique() {
        assert_unique(REFERENCE_N);
        assert_unique(REFERENCE_M);
        assert_unique(EXAMINER_N);
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(REFERENCE_N.len(), 33);
        assert_eq!(REFERENCE_M.len(), 9);
        assert_eq!(EXAMINER_N.len(), 51);
    }

    #[test]
    fn test_m_is_subset_of_n() {
        for f in REFERENCE_M {
            let n = FieldSpec::lookup(REFERENCE_N, f.name).expect("M field missing from N");
            assert_eq!(n.cell, f.cell, "{} moved between variants", f.name);
        }
        assert!(FieldSpec::lookup(REFERENCE_M, "num_wheels").is_none());
        assert!(FieldSpec::lookup(REFERENCE_M, "sec_dev3_serial").is_none());
    }

    #[test]
    fn test_fixed_cells_agree_with_reference_table() {
        let n = reference_schema(SchemaVariant::N);
        assert_eq!(FieldSpec::require(n, "license").unwrap().cell, LICENSE_CELL);
        assert_eq!(FieldSpec::require(n, "vin").unwrap().cell, VIN_CELL);
        assert_eq!(FieldSpec::require(n, "category").unwrap().cell, CATEGORY_CELL);
    }

    #[test]
    fn test_require_unknown_field() {
        let err = FieldSpec::require(examiner_schema(), "nope").unwrap_err();
        assert!(matches!(err, Error::UnknownField(name) if name == "nope"));
    }

    #[test]
    fn test_classification_targets_not_in_examiner_table() {
        for target in CLASSIFICATION_TARGETS {
            assert!(EXAMINER_N.iter().all(|f| f.cell != target));
        }
    }

    #[test]
    fn test_summary_blocks() {
        let pre: Vec<_> = SUMMARY_LAYOUT.pre.rows().collect();
        assert_eq!(pre.first(), Some(&(0, 21)));
        assert_eq!(pre.last(), Some(&(5, 26)));
        assert_eq!(SUMMARY_LAYOUT.post.first_row, 28);
        assert_eq!(SUMMARY_LAYOUT.post.number_at(0), 7);
        assert_eq!(SUMMARY_LAYOUT.post.number_at(5), 12);
    }

    #[test]
    fn test_note_layout() {
        assert_eq!(NOTE_LAYOUT.capacity(), 8);
        assert_eq!(NOTE_LAYOUT.label(0), "10.1");
        assert_eq!(NOTE_LAYOUT.label(7), "10.8");
        assert_eq!(NOTE_LAYOUT.rows.first_row, CellRef::a1("D312").row);
    }

    #[test]
    fn test_role_markers_distinct() {
        let markers: HashSet<_> = SheetRole::ALL.iter().map(|r| r.marker()).collect();
        assert_eq!(markers.len(), SheetRole::ALL.len());
    }
}
