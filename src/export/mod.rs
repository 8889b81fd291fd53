pub mod image;
pub mod pdf;

use crate::error::{InspectError, Result};
use crate::fonts::FontSet;
use chrono::Local;
use inspect_common::{render_text, DeficiencyReport};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Pdf,
    Png,
    #[default]
    All,
}

impl ReportFormat {
    pub fn includes_text(&self) -> bool {
        matches!(self, ReportFormat::Text | ReportFormat::All)
    }

    pub fn includes_pdf(&self) -> bool {
        matches!(self, ReportFormat::Pdf | ReportFormat::All)
    }

    pub fn includes_png(&self) -> bool {
        matches!(self, ReportFormat::Png | ReportFormat::All)
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "pdf" => Ok(ReportFormat::Pdf),
            "png" | "image" => Ok(ReportFormat::Png),
            "all" => Ok(ReportFormat::All),
            _ => Err(format!("Unknown format: {}. Use text, pdf, png, or all", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Pdf => write!(f, "pdf"),
            ReportFormat::Png => write!(f, "png"),
            ReportFormat::All => write!(f, "all"),
        }
    }
}

// ============================================
// Shared row model
// ============================================

/// One report line as a renderer draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderRow {
    pub number: usize,
    pub label: String,
    /// Logical-order text; renderers reorder for display.
    pub text: String,
}

/// Rows in report order, numbered from `AggregateItem::number`.
pub(crate) fn render_rows(report: &DeficiencyReport, label: impl Fn(usize) -> String) -> Vec<RenderRow> {
    report
        .items
        .iter()
        .map(|item| RenderRow {
            number: item.number,
            label: label(item.number),
            text: item.text.clone(),
        })
        .collect()
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
pub(crate) fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty() || measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut `text` to fit `max_width`, marking the cut with an ellipsis.
pub(crate) fn fit_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> String {
    if measure(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "…";
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}

// ============================================
// Artifacts
// ============================================

/// Write `<stem>.<ext>` into `dir`. If that fails (typically the file is
/// open in a viewer) retry once as `<stem>_HHMMSS.<ext>`.
pub fn save_artifact(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(format!("{stem}.{ext}"));
    match std::fs::write(&path, bytes) {
        Ok(()) => Ok(path),
        Err(e) => {
            warn!("cannot write {}: {}, retrying with timestamp", path.display(), e);
            let fallback = dir.join(format!("{}_{}.{}", stem, Local::now().format("%H%M%S"), ext));
            std::fs::write(&fallback, bytes).map_err(|source| InspectError::PersistFailure {
                path: fallback.clone(),
                source,
            })?;
            Ok(fallback)
        }
    }
}

/// Rendered report in the requested formats.
#[derive(Debug, Default)]
pub struct RenderedReport {
    pub text: Option<String>,
    pub pdf: Option<Vec<u8>>,
    pub png: Option<Vec<u8>>,
}

pub fn render_report(report: &DeficiencyReport, format: ReportFormat, fonts: Option<&FontSet>) -> Result<RenderedReport> {
    let mut rendered = RenderedReport::default();
    if format.includes_text() {
        rendered.text = Some(render_text(report));
    }
    if format.includes_pdf() || format.includes_png() {
        let fonts = fonts.ok_or_else(|| InspectError::FontLoad("no font available".to_string()))?;
        if format.includes_pdf() {
            rendered.pdf = Some(pdf::render_document(report, fonts)?);
        }
        if format.includes_png() {
            rendered.png = Some(image::render_image(report, fonts)?);
        }
    }
    Ok(rendered)
}

/// What `export_report` produced.
#[derive(Debug, Default)]
pub struct ExportOutcome {
    pub text: Option<String>,
    pub files: Vec<PathBuf>,
}

/// Render and write the PDF/PNG artifacts into `dir`.
pub fn export_report(
    report: &DeficiencyReport,
    format: ReportFormat,
    fonts: Option<&FontSet>,
    dir: &Path,
    stem: &str,
) -> Result<ExportOutcome> {
    let rendered = render_report(report, format, fonts)?;
    let mut files = Vec::new();
    if let Some(pdf) = &rendered.pdf {
        let path = save_artifact(dir, stem, "pdf", pdf)?;
        info!("PDF written: {}", path.display());
        files.push(path);
    }
    if let Some(png) = &rendered.png {
        let path = save_artifact(dir, stem, "png", png)?;
        info!("PNG written: {}", path.display());
        files.push(path);
    }
    Ok(ExportOutcome {
        text: rendered.text,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspect_common::{aggregate, DeficiencyRow, ExaminerNote, ReportIdentity};
    use pretty_assertions::assert_eq;

    fn char_width(text: &str) -> f32 {
        text.chars().count() as f32
    }

    fn report() -> DeficiencyReport {
        let pre = vec![DeficiencyRow {
            number: 1,
            finding: "A".into(),
            ..Default::default()
        }];
        let post = vec![DeficiencyRow {
            number: 7,
            finding: "B".into(),
            ..Default::default()
        }];
        let notes = vec![ExaminerNote::new("C")];
        DeficiencyReport::new(
            ReportIdentity::new("Volvo", "1", "", "v"),
            aggregate(&pre, &post, &notes),
        )
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("PDF".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert_eq!("image".parse::<ReportFormat>().unwrap(), ReportFormat::Png);
        assert!("excel".parse::<ReportFormat>().is_err());
        assert!(ReportFormat::All.includes_text() && ReportFormat::All.includes_png());
        assert!(!ReportFormat::Text.includes_pdf());
    }

    #[test]
    fn test_rows_follow_aggregate_numbers() {
        let rows = render_rows(&report(), |n| format!("{n}."));
        let numbers: Vec<_> = rows.iter().map(|r| (r.number, r.label.as_str(), r.text.as_str())).collect();
        assert_eq!(numbers, vec![(1, "1.", "A"), (2, "2.", "B"), (3, "3.", "C")]);
    }

    #[test]
    fn test_renderers_share_numbering() {
        let report = report();
        let from_text: Vec<usize> = render_text(&report)
            .lines()
            .filter_map(|line| line.split_once(". "))
            .filter_map(|(number, _)| number.parse().ok())
            .collect();
        let from_pdf: Vec<usize> = render_rows(&report, super::pdf::number_label)
            .iter()
            .map(|row| row.label.trim_end_matches('.').parse().unwrap())
            .collect();
        let from_png: Vec<usize> = render_rows(&report, super::image::number_label)
            .iter()
            .map(|row| row.label.trim_start_matches('.').parse().unwrap())
            .collect();
        assert_eq!(from_text, vec![1, 2, 3]);
        assert_eq!(from_pdf, from_text);
        assert_eq!(from_png, from_text);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("aa bb cc", 5.0, char_width), vec!["aa bb", "cc"]);
        assert_eq!(wrap_text("toolongword x", 4.0, char_width), vec!["toolongword", "x"]);
        assert_eq!(wrap_text("", 4.0, char_width), vec![""]);
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("short", 10.0, char_width), "short");
        assert_eq!(fit_text("abcdefgh", 4.0, char_width), "abc…");
    }

    #[test]
    fn test_text_only_needs_no_fonts() {
        let rendered = render_report(&report(), ReportFormat::Text, None).unwrap();
        assert!(rendered.text.unwrap().contains("3. C"));
        assert!(rendered.pdf.is_none());
    }

    #[test]
    fn test_pdf_without_fonts_fails() {
        let result = render_report(&report(), ReportFormat::Pdf, None);
        assert!(matches!(result, Err(InspectError::FontLoad(_))));
    }

    #[test]
    fn test_save_artifact_fallback() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the canonical write fail.
        std::fs::create_dir(dir.path().join("v - report.pdf")).unwrap();
        let path = save_artifact(dir.path(), "v - report", "pdf", b"%PDF").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("v - report_"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF");
    }

    #[test]
    fn test_save_artifact_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_artifact(dir.path(), "v", "png", b"x").unwrap();
        assert_eq!(path, dir.path().join("v.png"));
    }
}
