//! Vehicle inspection workbook engine
//!
//! Maps semantic field names to fixed cells of a multi-sheet inspection
//! workbook, reads and writes them with partial-update semantics, and turns
//! the recorded deficiencies into one numbered report rendered as text, PDF
//! or PNG.

pub mod classification;
pub mod cli;
pub mod config;
pub mod deficiency;
pub mod error;
pub mod examiner;
pub mod export;
pub mod fonts;
pub mod reference;
pub mod sheets;
pub mod vehicle;
pub mod workbook;

pub use classification::{extract_classification_options, extract_classification_options_at};
pub use deficiency::{build_report, read_deficiencies, read_examiner_notes};
pub use error::{InspectError, Result};
pub use examiner::{read_examiner, read_notes, save_classification, write_examiner, write_notes, WriteSummary};
pub use export::image::render_image;
pub use export::pdf::render_document;
pub use export::{export_report, render_report, ReportFormat};
pub use inspect_common::{aggregate, render_text};
pub use reference::{detect_category, detect_category_at, read_identity, read_reference};
pub use workbook::{open_workbook, MemoryWorkbook, Workbook, XlsxWorkbook};
