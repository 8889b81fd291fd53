//! Soft-fail results for best-effort reads
//!
//! Category detection and classification extraction never fail towards the
//! caller. Instead of swallowing the cause they return the value together
//! with the reason a default was used, so callers and tests can tell
//! "no such sheet" from "the read actually failed".

use crate::schema::SheetRole;
use serde::Serialize;
use std::fmt;

/// Why a default value was returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The source cell exists but is blank.
    BlankCell,
    /// No sheet matches the role.
    SheetMissing(SheetRole),
    /// A required marker was not found inside the sheet.
    MarkerMissing(String),
    /// The workbook could not be opened or parsed.
    Unreadable(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::BlankCell => write!(f, "cell is blank"),
            FallbackReason::SheetMissing(role) => write!(f, "no {} sheet", role),
            FallbackReason::MarkerMissing(marker) => write!(f, "marker {marker:?} not found"),
            FallbackReason::Unreadable(reason) => write!(f, "workbook unreadable: {reason}"),
        }
    }
}

/// A value plus the reason it is a default, if it is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback<T> {
    pub value: T,
    pub reason: Option<FallbackReason>,
}

impl<T> Fallback<T> {
    /// Value actually read from the workbook.
    pub fn read(value: T) -> Self {
        Self { value, reason: None }
    }

    /// Default value used because of `reason`.
    pub fn defaulted(value: T, reason: FallbackReason) -> Self {
        Self {
            value,
            reason: Some(reason),
        }
    }

    pub fn is_default(&self) -> bool {
        self.reason.is_some()
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fallback<U> {
        Fallback {
            value: f(self.value),
            reason: self.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_has_no_reason() {
        let value = Fallback::read(3);
        assert!(!value.is_default());
        assert_eq!(value.into_inner(), 3);
    }

    #[test]
    fn test_defaulted_keeps_reason() {
        let value = Fallback::defaulted(Vec::<String>::new(), FallbackReason::SheetMissing(SheetRole::Helper));
        assert!(value.is_default());
        assert_eq!(value.reason, Some(FallbackReason::SheetMissing(SheetRole::Helper)));
    }

    #[test]
    fn test_map_preserves_reason() {
        let value = Fallback::defaulted("N2", FallbackReason::BlankCell).map(str::len);
        assert_eq!(value.value, 2);
        assert_eq!(value.reason, Some(FallbackReason::BlankCell));
    }

    #[test]
    fn test_reason_display() {
        let text = FallbackReason::Unreadable("bad zip".into()).to_string();
        assert!(text.contains("bad zip"));
        let text = FallbackReason::SheetMissing(SheetRole::Reference).to_string();
        assert!(text.contains("מזכיר"));
    }
}
