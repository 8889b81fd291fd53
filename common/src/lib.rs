//! Vehicle Inspection Common Library
//!
//! Workbook schema, deficiency aggregation and the text report, shared by
//! every front end. Nothing in here touches the file system.

pub mod bidi;
pub mod category;
pub mod cell;
pub mod deficiency;
pub mod error;
pub mod fallback;
pub mod layout;
pub mod report;
pub mod schema;

pub use category::{Category, SchemaVariant, DEFAULT_CATEGORY_CODE};
pub use cell::CellRef;
pub use deficiency::{aggregate, AggregateItem, Deficiencies, DeficiencyMeta, DeficiencyRow, DeficiencySource, ExaminerNote};
pub use error::{Error, Result};
pub use fallback::{Fallback, FallbackReason};
pub use report::{render_text, DeficiencyReport, ReportIdentity};
pub use schema::{FieldSpec, SheetRole};

/// Semantic field name → trimmed cell text.
pub type FieldMap = std::collections::BTreeMap<String, String>;
