use inspect_common::SheetRole;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Sheet not found: {0}")]
    SheetNotFound(SheetRole),

    #[error("Workbook unreadable: {path}: {reason}")]
    WorkbookUnreadable { path: PathBuf, reason: String },

    #[error("Failed to save {path}: {source}")]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Font load error: {0}")]
    FontLoad(String),

    #[error("PDF generation error: {0}")]
    PdfGeneration(String),

    #[error("Image generation error: {0}")]
    ImageGeneration(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] inspect_common::Error),
}

impl InspectError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        InspectError::WorkbookUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InspectError>;
