//! Vehicle category model
//!
//! The reference sheet stores the vehicle class as a short code in one cell.
//! Only two schema variants exist; every other code is kept verbatim and
//! treated as unsupported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Code used when the workbook does not say otherwise.
pub const DEFAULT_CATEGORY_CODE: &str = "N2";

/// Schema variant a category resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Goods vehicles (N2/N3): wheel count and a third device block.
    N,
    /// Passenger vehicles (M1): base layout only.
    M,
}

/// Vehicle category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    N2,
    N3,
    M1,
    /// Any other code found in the workbook or passed by the caller.
    Unsupported(String),
}

impl Category {
    /// Parse a category code. Never fails; unknown codes are unsupported.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "N2" => Category::N2,
            "N3" => Category::N3,
            "M1" => Category::M1,
            _ => Category::Unsupported(code.trim().to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Category::N2 => "N2",
            Category::N3 => "N3",
            Category::M1 => "M1",
            Category::Unsupported(code) => code,
        }
    }

    /// Schema variant, `None` for unsupported categories.
    pub fn variant(&self) -> Option<SchemaVariant> {
        match self {
            Category::N2 | Category::N3 => Some(SchemaVariant::N),
            Category::M1 => Some(SchemaVariant::M),
            Category::Unsupported(_) => None,
        }
    }

    /// Variant used for reference reads. Unsupported categories read the
    /// M layout, which every workbook shares.
    pub fn reference_variant(&self) -> SchemaVariant {
        self.variant().unwrap_or(SchemaVariant::M)
    }

    /// Whether the full examiner form exists for this category.
    pub fn has_inspection_form(&self) -> bool {
        self.variant() == Some(SchemaVariant::N)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::from_code(s))
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Category::from_code(&code))
    }
}
