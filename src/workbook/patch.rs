//! In-place xlsx patching
//!
//! Saving rewrites only the `<c>` elements that were set. Every other zip
//! entry is copied raw, and inside a patched worksheet every untouched
//! element is copied event-for-event, so styles, formulas, merged ranges
//! and cells the engine never set survive a save unchanged.
//!
//! New values are written as inline strings. A replaced cell keeps its
//! style index. If a replaced cell held a formula the calculation chain is
//! dropped so Excel rebuilds it instead of repairing the file.

use crate::error::{InspectError, Result};
use inspect_common::CellRef;
use log::debug;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

type XmlResult<T> = std::result::Result<T, quick_xml::Error>;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

/// Write `edits` (sheet name → cell → value) into the xlsx file at `path`.
pub(super) fn save_edits(path: &Path, edits: &BTreeMap<String, BTreeMap<CellRef, String>>) -> Result<()> {
    let bytes = std::fs::read(path).map_err(|e| InspectError::unreadable(path, e))?;
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| InspectError::unreadable(path, e))?;

    let parts = sheet_parts(&mut archive).map_err(|e| InspectError::unreadable(path, e))?;

    let mut replaced: HashMap<String, Vec<u8>> = HashMap::new();
    let mut dropped_formula = false;
    for (sheet, cells) in edits {
        if cells.is_empty() {
            continue;
        }
        let part = parts
            .get(sheet)
            .ok_or_else(|| InspectError::unreadable(path, format!("no worksheet part for {sheet}")))?;
        let xml = read_entry(&mut archive, part).map_err(|e| InspectError::unreadable(path, e))?;
        let patched = patch_sheet_xml(&xml, cells).map_err(|e| InspectError::unreadable(path, e))?;
        debug!("patched {} cell(s) in {} ({})", cells.len(), sheet, part);
        dropped_formula |= patched.dropped_formula;
        replaced.insert(part.clone(), patched.xml);
    }

    let mut skipped: HashSet<String> = HashSet::new();
    if dropped_formula && archive.index_for_name(CALC_CHAIN_PART).is_some() {
        debug!("formula cell overwritten, dropping {}", CALC_CHAIN_PART);
        skipped.insert(CALC_CHAIN_PART.to_string());
        let types = read_entry(&mut archive, CONTENT_TYPES_PART).map_err(|e| InspectError::unreadable(path, e))?;
        let types = remove_elements(&types, b"Override", |e| {
            attr_value(e, b"PartName").is_some_and(|p| p.ends_with("calcChain.xml"))
        })
        .map_err(|e| InspectError::unreadable(path, e))?;
        replaced.insert(CONTENT_TYPES_PART.to_string(), types);

        let rels = read_entry(&mut archive, WORKBOOK_RELS_PART).map_err(|e| InspectError::unreadable(path, e))?;
        let rels = remove_elements(&rels, b"Relationship", |e| {
            attr_value(e, b"Target").is_some_and(|t| t.ends_with("calcChain.xml"))
        })
        .map_err(|e| InspectError::unreadable(path, e))?;
        replaced.insert(WORKBOOK_RELS_PART.to_string(), rels);
    }

    write_archive(path, &mut archive, &replaced, &skipped)
}

fn persist_error(path: &Path, e: impl ToString) -> InspectError {
    InspectError::PersistFailure {
        path: path.to_path_buf(),
        source: std::io::Error::other(e.to_string()),
    }
}

/// Rebuild the archive next to `path`, then rename it over the original.
fn write_archive(
    path: &Path,
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    replaced: &HashMap<String, Vec<u8>>,
    skipped: &HashSet<String>,
) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| InspectError::PersistFailure {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = ZipWriter::new(temp);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let name = archive
            .by_index_raw(index)
            .map_err(|e| InspectError::unreadable(path, e))?
            .name()
            .to_string();
        if skipped.contains(&name) {
            continue;
        }
        if let Some(content) = replaced.get(&name) {
            writer.start_file(name, options).map_err(|e| persist_error(path, e))?;
            writer.write_all(content).map_err(|e| persist_error(path, e))?;
        } else {
            let entry = archive.by_index_raw(index).map_err(|e| InspectError::unreadable(path, e))?;
            writer.raw_copy_file(entry).map_err(|e| persist_error(path, e))?;
        }
    }

    let temp = writer.finish().map_err(|e| persist_error(path, e))?;
    temp.persist(path).map_err(|e| InspectError::PersistFailure {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> std::result::Result<Vec<u8>, String> {
    let mut entry = archive.by_name(name).map_err(|e| format!("{name}: {e}"))?;
    let mut out = Vec::new();
    entry.read_to_end(&mut out).map_err(|e| format!("{name}: {e}"))?;
    Ok(out)
}

// ============================================
// Workbook part lookup
// ============================================

/// Sheet name → worksheet part path inside the archive.
fn sheet_parts(archive: &mut ZipArchive<Cursor<Vec<u8>>>) -> std::result::Result<HashMap<String, String>, String> {
    let workbook = read_entry(archive, WORKBOOK_PART)?;
    let rels = read_entry(archive, WORKBOOK_RELS_PART)?;
    let sheets = parse_sheet_ids(&workbook).map_err(|e| e.to_string())?;
    let targets = parse_relationships(&rels).map_err(|e| e.to_string())?;

    Ok(sheets
        .into_iter()
        .filter_map(|(name, rid)| {
            targets
                .get(&rid)
                .map(|target| (name, resolve_target(target)))
        })
        .collect())
}

/// `(sheet name, relationship id)` in stored order.
fn parse_sheet_ids(xml: &[u8]) -> XmlResult<Vec<(String, String)>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rid = None;
                for attr in e.attributes().flatten() {
                    let key = attr.key.as_ref();
                    if key == b"name" {
                        name = unescaped(&attr);
                    } else if key == b"r:id" || key.ends_with(b":id") {
                        rid = unescaped(&attr);
                    }
                }
                if let (Some(name), Some(rid)) = (name, rid) {
                    sheets.push((name, rid));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

/// Relationship id → target.
fn parse_relationships(xml: &[u8]) -> XmlResult<HashMap<String, String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id"), attr_value(&e, b"Target")) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

/// Relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = vec!["xl"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| unescaped(&attr))
}

/// Attribute value with entities resolved. Parts are always UTF-8, so the
/// raw bytes are decoded directly rather than through the reader's encoding.
fn unescaped(attr: &Attribute<'_>) -> Option<String> {
    let raw = std::str::from_utf8(&attr.value).ok()?;
    quick_xml::escape::unescape(raw).ok().map(|v| v.into_owned())
}

/// Copy `xml`, leaving out every element named `local` that `matches`.
fn remove_elements(xml: &[u8], local: &[u8], matches: impl Fn(&BytesStart<'_>) -> bool) -> XmlResult<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut buf = Vec::new();
    let mut skip_depth = 0usize;
    loop {
        let event = reader.read_event_into(&mut buf)?;
        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }
        match event {
            Event::Empty(e) if e.local_name().as_ref() == local && matches(&e) => {}
            Event::Start(e) if e.local_name().as_ref() == local && matches(&e) => skip_depth = 1,
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }
    Ok(writer.into_inner())
}

// ============================================
// Worksheet patching
// ============================================

pub(super) struct PatchedSheet {
    pub xml: Vec<u8>,
    /// A replaced cell carried a formula.
    pub dropped_formula: bool,
}

struct SheetPatch<'a> {
    writer: Writer<Vec<u8>>,
    pending: Vec<(CellRef, &'a str)>,
    next: usize,
    prefix: String,
    dropped_formula: bool,
}

impl<'a> SheetPatch<'a> {
    fn peek(&self) -> Option<(CellRef, &'a str)> {
        self.pending.get(self.next).copied()
    }

    fn tag(&self, local: &str) -> String {
        format!("{}{}", self.prefix, local)
    }

    /// Emit new `<row>` elements for pending cells above `limit`
    /// (all remaining rows when `limit` is `None`).
    fn flush_rows(&mut self, limit: Option<u32>) -> XmlResult<()> {
        while let Some((cell, _)) = self.peek() {
            if limit.is_some_and(|limit| cell.row >= limit) {
                break;
            }
            let row_tag = self.tag("row");
            let mut start = BytesStart::new(row_tag.clone());
            start.push_attribute(("r", cell.row_number().to_string().as_str()));
            self.writer.write_event(Event::Start(start))?;
            self.flush_cells(cell.row, None)?;
            self.writer.write_event(Event::End(BytesEnd::new(row_tag)))?;
        }
        Ok(())
    }

    /// Emit new `<c>` elements for pending cells of `row` left of `limit`.
    fn flush_cells(&mut self, row: u32, limit: Option<u32>) -> XmlResult<()> {
        while let Some((cell, value)) = self.peek() {
            if cell.row != row || limit.is_some_and(|limit| cell.col >= limit) {
                break;
            }
            self.write_cell(cell, None, value)?;
            self.next += 1;
        }
        Ok(())
    }

    fn has_pending_in_row(&self, row: u32) -> bool {
        self.peek().is_some_and(|(cell, _)| cell.row == row)
    }

    fn write_cell(&mut self, cell: CellRef, style: Option<String>, value: &str) -> XmlResult<()> {
        let c_tag = self.tag("c");
        let is_tag = self.tag("is");
        let t_tag = self.tag("t");

        let mut start = BytesStart::new(c_tag.clone());
        start.push_attribute(("r", cell.to_string().as_str()));
        if let Some(style) = style.as_deref() {
            start.push_attribute(("s", style));
        }
        start.push_attribute(("t", "inlineStr"));
        self.writer.write_event(Event::Start(start))?;
        self.writer.write_event(Event::Start(BytesStart::new(is_tag.clone())))?;
        let mut text = BytesStart::new(t_tag.clone());
        text.push_attribute(("xml:space", "preserve"));
        self.writer.write_event(Event::Start(text))?;
        self.writer.write_event(Event::Text(BytesText::new(value)))?;
        self.writer.write_event(Event::End(BytesEnd::new(t_tag)))?;
        self.writer.write_event(Event::End(BytesEnd::new(is_tag)))?;
        self.writer.write_event(Event::End(BytesEnd::new(c_tag)))?;
        Ok(())
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn prefix_of(e: &BytesStart<'_>) -> String {
    let name = element_name(e);
    match name.split_once(':') {
        Some((prefix, _)) => format!("{prefix}:"),
        None => String::new(),
    }
}

/// Row number attribute (`r`, 1-based) as a zero-based row.
fn row_index(e: &BytesStart<'_>) -> Option<u32> {
    attr_value(e, b"r")
        .and_then(|r| r.trim().parse::<u32>().ok())
        .filter(|r| *r > 0)
        .map(|r| r - 1)
}

fn cell_ref(e: &BytesStart<'_>) -> Option<CellRef> {
    attr_value(e, b"r").and_then(|r| CellRef::parse(&r).ok())
}

/// Copy of `e` without the `spans` hint, which no longer holds once cells
/// are added to the row.
fn without_spans(e: &BytesStart<'_>) -> BytesStart<'static> {
    let mut start = BytesStart::new(element_name(e));
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() != b"spans" {
            start.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    start
}

/// Widen `<dimension ref>` so it covers every edited cell.
fn widen_dimension(e: &BytesStart<'_>, cells: &BTreeMap<CellRef, String>) -> BytesStart<'static> {
    let current = attr_value(e, b"ref").unwrap_or_default();
    let mut bounds: Option<(CellRef, CellRef)> = None;
    for part in current.split(':') {
        if let Ok(cell) = CellRef::parse(part) {
            bounds = Some(extend(bounds, cell));
        }
    }
    for cell in cells.keys() {
        bounds = Some(extend(bounds, *cell));
    }

    let mut start = BytesStart::new(element_name(e));
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() != b"ref" {
            start.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    if let Some((min, max)) = bounds {
        let range = if min == max {
            min.to_string()
        } else {
            format!("{min}:{max}")
        };
        start.push_attribute(("ref", range.as_str()));
    }
    start
}

fn extend(bounds: Option<(CellRef, CellRef)>, cell: CellRef) -> (CellRef, CellRef) {
    match bounds {
        None => (cell, cell),
        Some((min, max)) => (
            CellRef::new(min.row.min(cell.row), min.col.min(cell.col)),
            CellRef::new(max.row.max(cell.row), max.col.max(cell.col)),
        ),
    }
}

/// Apply `cells` to one worksheet XML document.
pub(super) fn patch_sheet_xml(xml: &[u8], cells: &BTreeMap<CellRef, String>) -> XmlResult<PatchedSheet> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut patch = SheetPatch {
        writer: Writer::new(Vec::with_capacity(xml.len() + cells.len() * 64)),
        pending: cells.iter().map(|(cell, value)| (*cell, value.as_str())).collect(),
        next: 0,
        prefix: String::new(),
        dropped_formula: false,
    };

    let mut in_sheet_data = false;
    let mut current_row: Option<u32> = None;
    let mut last_row: Option<u32> = None;
    let mut last_col: Option<u32> = None;
    // Depth inside an original cell that is being replaced.
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf)?;

        if skip_depth > 0 {
            match &event {
                Event::Start(e) => {
                    if e.local_name().as_ref() == b"f" {
                        patch.dropped_formula = true;
                    }
                    skip_depth += 1;
                }
                Event::Empty(e) if e.local_name().as_ref() == b"f" => patch.dropped_formula = true,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        match event {
            Event::Empty(e) if !in_sheet_data && e.local_name().as_ref() == b"dimension" => {
                patch.writer.write_event(Event::Empty(widen_dimension(&e, cells)))?;
            }
            Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                patch.prefix = prefix_of(&e);
                in_sheet_data = true;
                patch.writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                patch.prefix = prefix_of(&e);
                let name = element_name(&e);
                if patch.peek().is_none() {
                    patch.writer.write_event(Event::Empty(e))?;
                } else {
                    patch.writer.write_event(Event::Start(e))?;
                    patch.flush_rows(None)?;
                    patch.writer.write_event(Event::End(BytesEnd::new(name)))?;
                }
            }
            Event::End(e) if in_sheet_data && current_row.is_none() && e.local_name().as_ref() == b"sheetData" => {
                patch.flush_rows(None)?;
                in_sheet_data = false;
                patch.writer.write_event(Event::End(e))?;
            }
            Event::Start(e) if in_sheet_data && current_row.is_none() && e.local_name().as_ref() == b"row" => {
                let row = row_index(&e).unwrap_or_else(|| last_row.map_or(0, |r| r + 1));
                patch.flush_rows(Some(row))?;
                current_row = Some(row);
                last_col = None;
                if patch.has_pending_in_row(row) {
                    patch.writer.write_event(Event::Start(without_spans(&e)))?;
                } else {
                    patch.writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) if in_sheet_data && current_row.is_none() && e.local_name().as_ref() == b"row" => {
                let row = row_index(&e).unwrap_or_else(|| last_row.map_or(0, |r| r + 1));
                patch.flush_rows(Some(row))?;
                if patch.has_pending_in_row(row) {
                    let start = without_spans(&e);
                    let name = element_name(&start);
                    patch.writer.write_event(Event::Start(start))?;
                    patch.flush_cells(row, None)?;
                    patch.writer.write_event(Event::End(BytesEnd::new(name)))?;
                } else {
                    patch.writer.write_event(Event::Empty(e))?;
                }
                last_row = Some(row);
            }
            Event::End(e) if e.local_name().as_ref() == b"row" && current_row.is_some() => {
                if let Some(row) = current_row.take() {
                    patch.flush_cells(row, None)?;
                    last_row = Some(row);
                }
                patch.writer.write_event(Event::End(e))?;
            }
            Event::Start(e) if current_row.is_some() && e.local_name().as_ref() == b"c" => {
                let row = current_row.unwrap_or_default();
                let cell = cell_ref(&e).unwrap_or_else(|| CellRef::new(row, last_col.map_or(0, |c| c + 1)));
                patch.flush_cells(row, Some(cell.col))?;
                last_col = Some(cell.col);
                match patch.peek() {
                    Some((target, value)) if target == cell => {
                        patch.write_cell(cell, attr_value(&e, b"s"), value)?;
                        patch.next += 1;
                        skip_depth = 1;
                    }
                    _ => patch.writer.write_event(Event::Start(e))?,
                }
            }
            Event::Empty(e) if current_row.is_some() && e.local_name().as_ref() == b"c" => {
                let row = current_row.unwrap_or_default();
                let cell = cell_ref(&e).unwrap_or_else(|| CellRef::new(row, last_col.map_or(0, |c| c + 1)));
                patch.flush_cells(row, Some(cell.col))?;
                last_col = Some(cell.col);
                match patch.peek() {
                    Some((target, value)) if target == cell => {
                        patch.write_cell(cell, attr_value(&e, b"s"), value)?;
                        patch.next += 1;
                    }
                    _ => patch.writer.write_event(Event::Empty(e))?,
                }
            }
            Event::Eof => break,
            other => patch.writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(PatchedSheet {
        xml: patch.writer.into_inner(),
        dropped_formula: patch.dropped_formula,
    })
}
