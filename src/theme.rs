//! Fixed page geometry, type scale, and palette.
//!
//! Values are PDF points, converted from the original millimeter layout
//! grid (A4 portrait). Layout code treats these as configuration constants;
//! nothing here varies per export.

use crate::canvas::Color;

// Page geometry (A4 portrait).
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN_LEFT: f32 = 34.0;
pub const MARGIN_RIGHT: f32 = 34.0;
pub const MARGIN_BOTTOM: f32 = 51.0;

// Header and footer bands.
pub const HEADER_HEIGHT: f32 = 51.0;
pub const FOOTER_HEIGHT: f32 = 34.0;
/// First usable y on a fresh page: header band plus a breathing gap.
pub const CONTENT_TOP: f32 = HEADER_HEIGHT + 17.0;
/// Last usable y: page bottom minus margin and footer band.
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN_BOTTOM - FOOTER_HEIGHT;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

// Type scale (points).
pub const TITLE_FONT: f32 = 24.0;
pub const HEADING_FONT: f32 = 16.0;
pub const QUESTION_FONT: f32 = 11.0;
pub const OPTION_FONT: f32 = 10.0;
pub const LABEL_FONT: f32 = 9.0;
pub const FOOTER_FONT: f32 = 8.0;
pub const CODE_FONT: f32 = 9.0;

// Question card metrics.
pub const CARD_PADDING: f32 = 23.0;
pub const CARD_MARGIN: f32 = 17.0;
pub const CARD_RADIUS: f32 = 8.5;
/// Text inset from the card edge.
pub const TEXT_INSET: f32 = 8.5;
/// Height of the title strip section (strip plus gap beneath it).
pub const HEADER_SECTION_HEIGHT: f32 = 42.5;
pub const HEADER_STRIP_HEIGHT: f32 = 23.0;
pub const QUESTION_TEXT_GAP: f32 = 14.0;

// Option buttons.
pub const BUTTON_MIN_HEIGHT: f32 = 28.0;
pub const BUTTON_PADDING: f32 = 8.5;
pub const BUTTON_RADIUS: f32 = 6.0;
pub const OPTION_GAP: f32 = 11.0;
pub const OPTIONS_TRAILING_GAP: f32 = 8.5;

// Essay answer stack.
pub const SCORE_BADGE_HEIGHT: f32 = 28.0;
pub const SCORE_BADGE_GAP: f32 = 8.5;
pub const ANSWER_BOX_PAD: f32 = 28.0;
pub const ANSWER_BOX_MIN: f32 = 45.0;
pub const ANSWER_BOX_GAP: f32 = 6.0;
pub const ANSWER_LABEL_OFFSET: f32 = 11.5;
pub const ANSWER_CONTENT_OFFSET: f32 = 22.5;

// Explanation box.
pub const EXPLANATION_PAD: f32 = 25.5;
pub const EXPLANATION_MIN: f32 = 40.0;
pub const EXPLANATION_CONTENT_OFFSET: f32 = 20.0;

// Code panels and inline-code pills.
pub const CODE_LINE_HEIGHT: f32 = 12.0;
pub const CODE_LABEL_ROW: f32 = 17.0;
pub const CODE_BOTTOM_PAD: f32 = 6.0;
pub const CODE_GAP_AFTER: f32 = 6.0;
pub const CODE_GUTTER: f32 = 8.5;
pub const CODE_RADIUS: f32 = 4.0;
pub const PILL_PAD_X: f32 = 3.0;
pub const PILL_GAP: f32 = 2.0;
pub const PILL_RADIUS: f32 = 2.5;

/// Floor for any rendered markdown body, so even degenerate content keeps
/// boxes from collapsing.
pub const MIN_BLOCK_HEIGHT: f32 = 11.3;

// Images.
pub const IMAGE_MAX_HEIGHT: f32 = 142.0;
pub const IMAGE_GAP: f32 = 14.0;
/// Intrinsic pixel dimensions are interpreted at 96 dpi, as the original did.
pub const PX_TO_PT: f32 = 0.75;

// Pagination.
/// Remaining space below which a new question forces a page break instead
/// of stranding a bare header at the page bottom.
pub const MIN_QUESTION_SPACE: f32 = 90.0;
/// Vertical extent of the results-mode score block on page one.
pub const SCORE_BLOCK_HEIGHT: f32 = 320.0;

// Footer progress dots.
pub const PROGRESS_DOTS: usize = 5;
pub const DOT_SPACING: f32 = 10.0;
pub const DOT_RADIUS: f32 = 2.0;

// Palette, lifted from the app's gamification theme.
pub const PRIMARY: Color = Color::rgb(106, 90, 205);
pub const SUCCESS: Color = Color::rgb(46, 213, 115);
pub const ERROR: Color = Color::rgb(255, 71, 87);
pub const WARNING: Color = Color::rgb(255, 168, 1);
pub const TEXT_DARK: Color = Color::rgb(30, 41, 59);
pub const TEXT_LIGHT: Color = Color::rgb(100, 116, 139);
pub const TEXT_WHITE: Color = Color::rgb(255, 255, 255);
pub const BUTTON_CORRECT: Color = Color::rgb(16, 185, 129);
pub const BUTTON_WRONG: Color = Color::rgb(239, 68, 68);
pub const BUTTON_NEUTRAL: Color = Color::rgb(203, 213, 225);
pub const PROGRESS_BG: Color = Color::rgb(226, 232, 240);
pub const CODE_BG: Color = Color::rgb(240, 242, 246);
pub const CODE_BORDER: Color = Color::rgb(180, 185, 200);
pub const CODE_TEXT: Color = Color::rgb(50, 60, 100);
pub const INLINE_CODE_BG: Color = Color::rgb(235, 237, 244);
pub const ANSWER_BOX_BG: Color = Color::rgb(245, 247, 250);
pub const FORMAL_BOX_BG: Color = Color::rgb(240, 253, 244);
pub const EXPLANATION_BG: Color = Color::rgb(255, 251, 235);
pub const FOOTER_BG: Color = Color::rgb(240, 242, 245);
