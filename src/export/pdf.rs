use super::{render_rows, wrap_text, RenderRow};
use crate::error::{InspectError, Result};
use crate::fonts::{FontFace, FontSet};
use inspect_common::bidi::visual_order;
use inspect_common::layout::*;
use inspect_common::report::{NO_ITEMS, REPORT_TITLE};
use inspect_common::DeficiencyReport;
use printpdf::{Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rgb};

const BLACK: Rgb8 = [0, 0, 0];

fn color([r, g, b]: Rgb8) -> Color {
    Color::Rgb(Rgb::new(f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0, None))
}

/// Number label in the number column.
pub(crate) fn number_label(number: usize) -> String {
    format!("{number}.")
}

/// Current page plus the font handles registered with the document.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    fonts: &'a FontSet,
    /// Distance from the page bottom, in mm.
    y: f32,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = A4_HEIGHT_MM - MARGIN_MM;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN_MM {
            self.new_page();
        }
    }

    fn text_width_mm(face: &FontFace, text: &str, size_pt: f32) -> f32 {
        face.text_width(text, size_pt) / MM_TO_PT
    }

    fn centered(&self, text: &str, size_pt: f32, bold: bool, rgb: Rgb8) {
        let (face, font) = if bold {
            (&self.fonts.bold, &self.bold)
        } else {
            (&self.fonts.regular, &self.regular)
        };
        let text = visual_order(text);
        let width = Self::text_width_mm(face, &text, size_pt);
        let x = ((A4_WIDTH_MM - width) / 2.0).max(MARGIN_MM);
        self.layer.set_fill_color(color(rgb));
        self.layer.use_text(text, size_pt, Mm(x), Mm(self.y), font);
    }

    /// Right-aligned so that the text ends at `right` (mm from the left edge).
    fn right_aligned(&self, text: &str, size_pt: f32, right: f32) {
        let width = Self::text_width_mm(&self.fonts.regular, text, size_pt);
        self.layer.set_fill_color(color(BLACK));
        self.layer
            .use_text(text, size_pt, Mm((right - width).max(MARGIN_MM)), Mm(self.y), &self.regular);
    }

    fn rule(&self, rgb: Rgb8, thickness: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM), Mm(self.y)), false),
                (Point::new(Mm(A4_WIDTH_MM - MARGIN_MM), Mm(self.y)), false),
            ],
            is_closed: false,
        };
        self.layer.set_outline_color(color(rgb));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(line);
    }

    fn item(&mut self, row: &RenderRow) {
        let right = A4_WIDTH_MM - MARGIN_MM;
        let text_right = right - NUMBER_COL_MM;
        let text_width = text_right - MARGIN_MM;
        let fonts = self.fonts;
        let face = &fonts.regular;
        let lines = wrap_text(&row.text, text_width, |s| Self::text_width_mm(face, s, ITEM_PT));

        self.ensure_space(ITEM_ROW_MM * lines.len() as f32 + ITEM_GAP_MM);
        for (idx, line) in lines.iter().enumerate() {
            self.y -= ITEM_ROW_MM;
            if idx == 0 {
                self.right_aligned(&row.label, ITEM_PT, right);
            }
            self.right_aligned(&visual_order(line), ITEM_PT, text_right);
        }
        self.y -= ITEM_GAP_MM;
        self.rule(DOC_ITEM_RULE_COLOR, 0.5);
    }
}

/// A4 PDF with a centered title, the identity line and one numbered row per
/// item. Rows that do not fit move to a new page.
pub fn render_document(report: &DeficiencyReport, fonts: &FontSet) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(REPORT_TITLE, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
    let regular = doc
        .add_external_font(fonts.regular.bytes())
        .map_err(|e| InspectError::PdfGeneration(format!("font embedding failed: {:?}", e)))?;
    let bold = doc
        .add_external_font(fonts.bold.bytes())
        .map_err(|e| InspectError::PdfGeneration(format!("font embedding failed: {:?}", e)))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut writer = PageWriter {
        doc: &doc,
        layer,
        regular,
        bold,
        fonts,
        y: A4_HEIGHT_MM - MARGIN_MM,
    };

    writer.y -= TITLE_ROW_MM;
    writer.centered(REPORT_TITLE, TITLE_PT, true, BLACK);
    writer.y -= INFO_ROW_MM;
    writer.centered(&report.identity.info_line(), INFO_PT, false, DOC_INFO_COLOR);
    writer.y -= ITEM_GAP_MM * 2.0;
    writer.rule(DOC_RULE_COLOR, 1.0);
    writer.y -= ITEM_GAP_MM;

    if report.is_empty() {
        writer.y -= ITEM_ROW_MM * 2.0;
        writer.centered(NO_ITEMS, EMPTY_PT, false, DOC_INFO_COLOR);
    } else {
        for row in render_rows(report, number_label) {
            writer.item(&row);
        }
    }
    drop(writer);

    doc.save_to_bytes()
        .map_err(|e| InspectError::PdfGeneration(format!("PDF save failed: {:?}", e)))
}
