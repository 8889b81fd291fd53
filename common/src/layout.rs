//! Render layout settings
//!
//! Fixed sizes shared by the document and image renderers.

// ============================================
// Document (A4, mm based)
// ============================================

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;

/// Width of the number column in front of each item.
pub const NUMBER_COL_MM: f32 = 12.0;
/// Height of one item row plus the gap under its separator.
pub const ITEM_ROW_MM: f32 = 9.0;
pub const ITEM_GAP_MM: f32 = 2.0;

pub const TITLE_PT: f32 = 20.0;
pub const TITLE_ROW_MM: f32 = 14.0;
pub const INFO_PT: f32 = 11.0;
pub const INFO_ROW_MM: f32 = 8.0;
pub const ITEM_PT: f32 = 11.0;
pub const EMPTY_PT: f32 = 12.0;

/// mm → pt (1mm = 72/25.4 pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// RGB in 0..=255
pub type Rgb8 = [u8; 3];

pub const DOC_INFO_COLOR: Rgb8 = [100, 100, 100];
pub const DOC_RULE_COLOR: Rgb8 = [200, 200, 200];
pub const DOC_ITEM_RULE_COLOR: Rgb8 = [230, 230, 230];

// ============================================
// Image (px based)
// ============================================

pub const IMAGE_WIDTH_PX: u32 = 1080;
pub const IMAGE_PADDING_PX: u32 = 60;
pub const IMAGE_LINE_PX: u32 = 50;
pub const IMAGE_HEADER_PX: u32 = 200;
/// Space between the number column and the item text.
pub const IMAGE_NUMBER_COL_PX: u32 = 60;

pub const IMAGE_TITLE_PX: f32 = 48.0;
pub const IMAGE_SUB_PX: f32 = 28.0;
pub const IMAGE_ITEM_PX: f32 = 30.0;

pub const IMAGE_BACKGROUND: Rgb8 = [15, 23, 42];
pub const IMAGE_TITLE_COLOR: Rgb8 = [255, 255, 255];
pub const IMAGE_SUB_COLOR: Rgb8 = [148, 163, 184];
pub const IMAGE_RULE_COLOR: Rgb8 = [51, 65, 85];
pub const IMAGE_NUMBER_COLOR: Rgb8 = [59, 130, 246];
pub const IMAGE_ITEM_COLOR: Rgb8 = [241, 245, 249];

/// Canvas height for `item_count` lines: header, content, bottom padding.
pub fn image_height(item_count: usize) -> u32 {
    let content = (item_count as u32 * IMAGE_LINE_PX + 40).max(100);
    IMAGE_HEADER_PX + content + IMAGE_PADDING_PX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_height_minimum() {
        assert_eq!(image_height(0), 200 + 100 + 60);
        assert_eq!(image_height(1), 200 + 100 + 60);
    }

    #[test]
    fn test_image_height_grows_per_item() {
        assert_eq!(image_height(10), 200 + 540 + 60);
        assert_eq!(image_height(11) - image_height(10), IMAGE_LINE_PX);
    }
}
