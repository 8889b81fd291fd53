//! Shareable PNG summary
//!
//! Fixed-width dark card: centered title and identity line, a separator,
//! then one right-aligned line per item with its number on the right.

use super::{fit_text, render_rows};
use crate::error::{InspectError, Result};
use crate::fonts::{FontFace, FontSet};
use ::image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ab_glyph::PxScale;
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut, text_size};
use inspect_common::bidi::visual_order;
use inspect_common::layout::*;
use inspect_common::report::{NO_ITEMS, REPORT_TITLE};
use inspect_common::DeficiencyReport;
use std::io::Cursor;

/// Number label, written with the dot first for right-to-left reading.
pub(crate) fn number_label(number: usize) -> String {
    format!(".{number}")
}

fn text_width(face: &FontFace, size: f32, text: &str) -> i32 {
    text_size(PxScale::from(size), face.font(), text).0 as i32
}

fn draw(img: &mut RgbImage, face: &FontFace, size: f32, color: Rgb8, x: i32, y: i32, text: &str) {
    draw_text_mut(img, Rgb(color), x, y, PxScale::from(size), face.font(), text);
}

fn draw_centered(img: &mut RgbImage, face: &FontFace, size: f32, color: Rgb8, y: i32, text: &str) {
    let text = visual_order(text);
    let x = (IMAGE_WIDTH_PX as i32 - text_width(face, size, &text)) / 2;
    draw(img, face, size, color, x.max(0), y, &text);
}

fn draw_right(img: &mut RgbImage, face: &FontFace, size: f32, color: Rgb8, right: i32, y: i32, text: &str) {
    let x = right - text_width(face, size, text);
    draw(img, face, size, color, x.max(0), y, text);
}

pub fn render_image(report: &DeficiencyReport, fonts: &FontSet) -> Result<Vec<u8>> {
    let rows = render_rows(report, number_label);
    let height = image_height(rows.len());
    let mut img = RgbImage::from_pixel(IMAGE_WIDTH_PX, height, Rgb(IMAGE_BACKGROUND));

    let padding = IMAGE_PADDING_PX as i32;
    let right = IMAGE_WIDTH_PX as i32 - padding;

    draw_centered(&mut img, &fonts.bold, IMAGE_TITLE_PX, IMAGE_TITLE_COLOR, 50, REPORT_TITLE);
    draw_centered(
        &mut img,
        &fonts.regular,
        IMAGE_SUB_PX,
        IMAGE_SUB_COLOR,
        120,
        &report.identity.info_line(),
    );
    let rule_y = (IMAGE_HEADER_PX - 20) as f32;
    draw_line_segment_mut(
        &mut img,
        (padding as f32, rule_y),
        (right as f32, rule_y),
        Rgb(IMAGE_RULE_COLOR),
    );

    if rows.is_empty() {
        draw_centered(
            &mut img,
            &fonts.regular,
            IMAGE_ITEM_PX,
            IMAGE_SUB_COLOR,
            IMAGE_HEADER_PX as i32 + 30,
            NO_ITEMS,
        );
    } else {
        let text_right = right - IMAGE_NUMBER_COL_PX as i32;
        let max_width = (text_right - padding) as f32;
        for (idx, row) in rows.iter().enumerate() {
            let y = IMAGE_HEADER_PX as i32 + idx as i32 * IMAGE_LINE_PX as i32 + 10;
            draw_right(&mut img, &fonts.bold, IMAGE_ITEM_PX, IMAGE_NUMBER_COLOR, right, y, &row.label);
            let line = fit_text(&row.text, max_width, |s| {
                text_width(&fonts.regular, IMAGE_ITEM_PX, s) as f32
            });
            draw_right(
                &mut img,
                &fonts.regular,
                IMAGE_ITEM_PX,
                IMAGE_ITEM_COLOR,
                text_right,
                y,
                &visual_order(&line),
            );
        }
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| InspectError::ImageGeneration(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}
