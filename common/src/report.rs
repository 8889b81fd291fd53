//! Deficiency report and text rendering
//!
//! A `DeficiencyReport` is the aggregate plus the identifying fields. The
//! text renderer lives here because it needs no fonts or files; the
//! document and image renderers in the CLI crate read the same
//! `AggregateItem::number` values.

use crate::deficiency::{AggregateItem, DeficiencySource};
use serde::Serialize;

pub const REPORT_TITLE: &str = "חוסרים";
pub const NO_ITEMS: &str = "אין חוסרים";
pub const INFO_SEPARATOR: &str = "  |  ";

const TEXT_TITLE: &str = "📋 *חוסרים ופערים*";
const TEXT_MANUFACTURER: &str = "יצרן";
const TEXT_LICENSE: &str = "מס׳ רישוי";
const TEXT_VIN: &str = "מס׳ שלדה";
const TEXT_PRE_HEADER: &str = "⚠️ *פערים טרם הבדיקה:*";
const TEXT_POST_HEADER: &str = "🔴 *פערים לאחר בדיקה:*";

/// Manufacturer, license and VIN shown on every report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportIdentity {
    pub manufacturer: String,
    pub license: String,
    pub vin: String,
    /// Vehicle folder name, used when the workbook has no license or VIN.
    pub vehicle_name: String,
}

impl ReportIdentity {
    /// Build from the reference cells. When both license and VIN are blank
    /// the folder name stands in for the license.
    pub fn new(manufacturer: &str, license: &str, vin: &str, vehicle_name: &str) -> Self {
        let license = license.trim();
        let vin = vin.trim();
        let license = if license.is_empty() && vin.is_empty() {
            vehicle_name.trim()
        } else {
            license
        };
        Self {
            manufacturer: manufacturer.trim().to_string(),
            license: license.to_string(),
            vin: vin.to_string(),
            vehicle_name: vehicle_name.trim().to_string(),
        }
    }

    /// Subtitle used by the document and image renderers.
    pub fn info_line(&self) -> String {
        let parts: Vec<&str> = [&self.manufacturer, &self.license, &self.vin]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            self.vehicle_name.clone()
        } else {
            parts.join(INFO_SEPARATOR)
        }
    }
}

/// Aggregated items plus identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeficiencyReport {
    pub identity: ReportIdentity,
    pub items: Vec<AggregateItem>,
}

impl DeficiencyReport {
    pub fn new(identity: ReportIdentity, items: Vec<AggregateItem>) -> Self {
        Self { identity, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items from one source, in report order.
    pub fn from_source(&self, source: DeficiencySource) -> impl Iterator<Item = &AggregateItem> {
        self.items.iter().filter(move |item| item.source == source)
    }

    /// `(number, text)` pairs in report order.
    pub fn numbered(&self) -> Vec<(usize, &str)> {
        self.items
            .iter()
            .map(|item| (item.number, item.text.as_str()))
            .collect()
    }
}

/// Line-oriented message for chat apps.
pub fn render_text(report: &DeficiencyReport) -> String {
    let identity = &report.identity;
    let mut lines: Vec<String> = vec![TEXT_TITLE.to_string()];
    if !identity.manufacturer.is_empty() {
        lines.push(format!("{}: {}", TEXT_MANUFACTURER, identity.manufacturer));
    }
    if !identity.license.is_empty() {
        lines.push(format!("{}: {}", TEXT_LICENSE, identity.license));
    }
    if !identity.vin.is_empty() {
        lines.push(format!("{}: {}", TEXT_VIN, identity.vin));
    }
    lines.push(String::new());

    let groups = [
        (DeficiencySource::Pre, Some(TEXT_PRE_HEADER)),
        (DeficiencySource::Post, Some(TEXT_POST_HEADER)),
        (DeficiencySource::ExaminerNote, None),
    ];
    for (source, header) in groups {
        let mut group = report.from_source(source).peekable();
        if group.peek().is_none() {
            continue;
        }
        if let Some(header) = header {
            lines.push(header.to_string());
        }
        for item in group {
            lines.push(format!("{}. {}", item.number, item.text));
        }
        lines.push(String::new());
    }

    if report.is_empty() {
        lines.push(format!("{}.", NO_ITEMS));
    }

    lines.join("\n")
}
