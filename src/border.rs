//! Border Module — Box-drawing glyph sets and the box model around them.
//!
//! Responsibilities:
//! - Six fixed glyph sets (single, double, rounded, bold, ascii, hidden)
//! - Per-side visibility and per-side style overrides
//! - Interior (content area) math shared by the layout engine and renderers
//!
//! Everything here is a pure function of its inputs and never panics.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::text_utils::fit_to_width;
use crate::types::Edges;

// ============================================================================
// Border Style
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    Rounded,
    Bold,
    Ascii,
    /// Reserves the border cells but draws spaces.
    Hidden,
}

impl BorderStyle {
    /// Strict tag lookup. Returns `None` for unknown tags.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "single" => Some(Self::Single),
            "double" => Some(Self::Double),
            "rounded" => Some(Self::Rounded),
            "bold" => Some(Self::Bold),
            "ascii" => Some(Self::Ascii),
            "hidden" => Some(Self::Hidden),
            _ => None,
        }
    }

    /// Lenient tag lookup: unknown tags fall back to `Single`.
    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_default()
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Rounded => "rounded",
            Self::Bold => "bold",
            Self::Ascii => "ascii",
            Self::Hidden => "hidden",
        }
    }

    pub fn glyphs(self) -> BorderGlyphs {
        match self {
            Self::Single => BorderGlyphs::new('┌', '┐', '└', '┘', '─', '│'),
            Self::Double => BorderGlyphs::new('╔', '╗', '╚', '╝', '═', '║'),
            Self::Rounded => BorderGlyphs::new('╭', '╮', '╰', '╯', '─', '│'),
            Self::Bold => BorderGlyphs::new('┏', '┓', '┗', '┛', '━', '┃'),
            Self::Ascii => BorderGlyphs::new('+', '+', '+', '+', '-', '|'),
            Self::Hidden => BorderGlyphs::new(' ', ' ', ' ', ' ', ' ', ' '),
        }
    }
}

impl From<String> for BorderStyle {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<BorderStyle> for String {
    fn from(style: BorderStyle) -> Self {
        style.tag().to_string()
    }
}

/// The eight glyphs of one border style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub top: char,
    pub bottom: char,
    pub left: char,
    pub right: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderGlyphs {
    const fn new(tl: char, tr: char, bl: char, br: char, horiz: char, vert: char) -> Self {
        Self {
            top: horiz,
            bottom: horiz,
            left: vert,
            right: vert,
            top_left: tl,
            top_right: tr,
            bottom_left: bl,
            bottom_right: br,
        }
    }
}

// ============================================================================
// Border Sides (bitflags)
// ============================================================================

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BorderSides: u8 {
        const TOP    = 0b0000_0001;
        const RIGHT  = 0b0000_0010;
        const BOTTOM = 0b0000_0100;
        const LEFT   = 0b0000_1000;
        const ALL    = Self::TOP.bits() | Self::RIGHT.bits() | Self::BOTTOM.bits() | Self::LEFT.bits();
    }
}

impl Default for BorderSides {
    fn default() -> Self {
        Self::ALL
    }
}

// ============================================================================
// Border Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBorderConfig", into = "RawBorderConfig")]
pub struct BorderConfig {
    pub style: BorderStyle,
    pub sides: BorderSides,
    pub top_style: Option<BorderStyle>,
    pub right_style: Option<BorderStyle>,
    pub bottom_style: Option<BorderStyle>,
    pub left_style: Option<BorderStyle>,
    /// When false, corners take the adjoining horizontal edge glyph so
    /// neighbouring boxes join without seams.
    pub corners: bool,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self::new(BorderStyle::Single)
    }
}

impl BorderConfig {
    pub fn new(style: BorderStyle) -> Self {
        Self {
            style,
            sides: BorderSides::ALL,
            top_style: None,
            right_style: None,
            bottom_style: None,
            left_style: None,
            corners: true,
        }
    }

    pub fn with_sides(mut self, sides: BorderSides) -> Self {
        self.sides = sides;
        self
    }

    pub fn with_corners(mut self, corners: bool) -> Self {
        self.corners = corners;
        self
    }

    /// Override the style of the given sides; other sides keep the global style.
    pub fn with_side_style(mut self, sides: BorderSides, style: BorderStyle) -> Self {
        if sides.contains(BorderSides::TOP) {
            self.top_style = Some(style);
        }
        if sides.contains(BorderSides::RIGHT) {
            self.right_style = Some(style);
        }
        if sides.contains(BorderSides::BOTTOM) {
            self.bottom_style = Some(style);
        }
        if sides.contains(BorderSides::LEFT) {
            self.left_style = Some(style);
        }
        self
    }

    /// Cells consumed on each side (0 or 1).
    pub fn insets(&self) -> Edges {
        let cell = |side: BorderSides| u16::from(self.sides.contains(side));
        Edges {
            top: cell(BorderSides::TOP),
            right: cell(BorderSides::RIGHT),
            bottom: cell(BorderSides::BOTTOM),
            left: cell(BorderSides::LEFT),
        }
    }

    fn glyphs_for(&self, side: Option<BorderStyle>) -> BorderGlyphs {
        side.unwrap_or(self.style).glyphs()
    }
}

/// Wire shape of a border config. Missing fields default conservatively:
/// all sides shown, global style, corners shown.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawBorderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bottom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    left: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bottom_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    left_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    corners: Option<bool>,
}

impl From<RawBorderConfig> for BorderConfig {
    fn from(raw: RawBorderConfig) -> Self {
        let mut sides = BorderSides::empty();
        sides.set(BorderSides::TOP, raw.top.unwrap_or(true));
        sides.set(BorderSides::RIGHT, raw.right.unwrap_or(true));
        sides.set(BorderSides::BOTTOM, raw.bottom.unwrap_or(true));
        sides.set(BorderSides::LEFT, raw.left.unwrap_or(true));

        // Unknown per-side tags fall back to the global style, not to single.
        let side = |tag: Option<String>| tag.as_deref().and_then(BorderStyle::parse);
        Self {
            style: raw
                .style
                .as_deref()
                .map(BorderStyle::from_tag)
                .unwrap_or_default(),
            sides,
            top_style: side(raw.top_style),
            right_style: side(raw.right_style),
            bottom_style: side(raw.bottom_style),
            left_style: side(raw.left_style),
            corners: raw.corners.unwrap_or(true),
        }
    }
}

impl From<BorderConfig> for RawBorderConfig {
    fn from(config: BorderConfig) -> Self {
        let shown = |side: BorderSides| (!config.sides.contains(side)).then_some(false);
        let tag = |style: Option<BorderStyle>| style.map(String::from);
        Self {
            style: Some(config.style.into()),
            top: shown(BorderSides::TOP),
            right: shown(BorderSides::RIGHT),
            bottom: shown(BorderSides::BOTTOM),
            left: shown(BorderSides::LEFT),
            top_style: tag(config.top_style),
            right_style: tag(config.right_style),
            bottom_style: tag(config.bottom_style),
            left_style: tag(config.left_style),
            corners: (!config.corners).then_some(false),
        }
    }
}

// ============================================================================
// Box Model
// ============================================================================

/// Interior size left for content inside a bordered box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentArea {
    pub width: u16,
    pub height: u16,
}

/// Which border cells actually fit in a `width` x `height` box.
///
/// A 1-cell-wide box with both side borders only has room for the left one;
/// a 1-row box with top and bottom borders only draws the top.
struct Frame {
    top: bool,
    right: bool,
    bottom: bool,
    left: bool,
    inner_width: usize,
    inner_height: usize,
}

impl Frame {
    fn fit(width: usize, height: usize, sides: BorderSides) -> Self {
        let left = sides.contains(BorderSides::LEFT) && width > 0;
        let right = sides.contains(BorderSides::RIGHT) && width > usize::from(left);
        let top = sides.contains(BorderSides::TOP) && height > 0;
        let bottom = sides.contains(BorderSides::BOTTOM) && height > usize::from(top);
        Self {
            top,
            right,
            bottom,
            left,
            inner_width: width - usize::from(left) - usize::from(right),
            inner_height: height - usize::from(top) - usize::from(bottom),
        }
    }
}

/// Interior dimensions after subtracting one cell per enabled side.
///
/// Matches exactly what `render_box` leaves between the border glyphs.
pub fn content_area(width: u16, height: u16, config: &BorderConfig) -> ContentArea {
    let frame = Frame::fit(width as usize, height as usize, config.sides);
    ContentArea {
        width: frame.inner_width as u16,
        height: frame.inner_height as u16,
    }
}

/// Draw a box of exactly `height` lines, each exactly `width` cells wide.
///
/// Content lines are clipped or padded to the interior width; missing lines
/// are blank and extra lines are dropped. Content is never wrapped.
pub fn render_box<S: AsRef<str>>(
    content: &[S],
    width: u16,
    height: u16,
    config: &BorderConfig,
) -> Vec<String> {
    let frame = Frame::fit(width as usize, height as usize, config.sides);
    let global = config.style.glyphs();
    let top = config.glyphs_for(config.top_style);
    let bottom = config.glyphs_for(config.bottom_style);
    let left = config.glyphs_for(config.left_style);
    let right = config.glyphs_for(config.right_style);

    let mut lines = Vec::with_capacity(height as usize);

    if frame.top {
        let corner_l = if config.corners { global.top_left } else { top.top };
        let corner_r = if config.corners { global.top_right } else { top.top };
        lines.push(edge_line(&frame, corner_l, top.top, corner_r));
    }

    for row in 0..frame.inner_height {
        let text = content.get(row).map(AsRef::as_ref).unwrap_or("");
        let mut line = String::new();
        if frame.left {
            line.push(left.left);
        }
        line.push_str(&fit_to_width(text, frame.inner_width));
        if frame.right {
            line.push(right.right);
        }
        lines.push(line);
    }

    if frame.bottom {
        let corner_l = if config.corners { global.bottom_left } else { bottom.bottom };
        let corner_r = if config.corners { global.bottom_right } else { bottom.bottom };
        lines.push(edge_line(&frame, corner_l, bottom.bottom, corner_r));
    }

    lines
}

fn edge_line(frame: &Frame, corner_l: char, fill: char, corner_r: char) -> String {
    let mut line = String::with_capacity((frame.inner_width + 2) * 3);
    if frame.left {
        line.push(corner_l);
    }
    line.extend(std::iter::repeat(fill).take(frame.inner_width));
    if frame.right {
        line.push(corner_r);
    }
    line
}

/// A single line of one repeated glyph, defaulting to the style's horizontal edge.
pub fn render_divider(width: u16, style: BorderStyle, glyph: Option<char>) -> String {
    let ch = glyph.unwrap_or(style.glyphs().top);
    std::iter::repeat(ch).take(width as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_utils::display_width;

    fn single() -> BorderConfig {
        BorderConfig::new(BorderStyle::Single)
    }

    #[test]
    fn test_button_box_scenario() {
        let lines = render_box(&[" OK "], 6, 3, &single());
        assert_eq!(lines, vec!["┌────┐", "│ OK │", "└────┘"]);
    }

    #[test]
    fn test_content_area_matches_render_interior() {
        for (w, h) in [(0u16, 0u16), (1, 1), (2, 2), (5, 3), (12, 7)] {
            let lines = render_box::<&str>(&[], w, h, &single());
            let area = content_area(w, h, &single());
            assert_eq!(lines.len(), h as usize);
            for line in &lines {
                assert_eq!(display_width(line), w as usize);
            }
            if w >= 2 && h >= 2 {
                let interior = &lines[1][3..lines[1].len() - 3];
                assert_eq!(display_width(interior), area.width as usize);
                assert_eq!(lines.len() - 2, area.height as usize);
            }
        }
    }

    #[test]
    fn test_content_clipped_not_wrapped() {
        let lines = render_box(&["hello world", "x"], 7, 4, &single());
        assert_eq!(lines[1], "│hello│");
        assert_eq!(lines[2], "│x    │");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_disabled_sides_reserve_nothing() {
        let config = single().with_sides(BorderSides::TOP | BorderSides::BOTTOM);
        let lines = render_box(&["abcd"], 4, 3, &config);
        assert_eq!(lines, vec!["────", "abcd", "────"]);
        assert_eq!(
            content_area(4, 3, &config),
            ContentArea { width: 4, height: 1 }
        );
    }

    #[test]
    fn test_hidden_style_reserves_cells() {
        let config = BorderConfig::new(BorderStyle::Hidden);
        let lines = render_box(&["ab"], 4, 3, &config);
        assert_eq!(lines, vec!["    ", " ab ", "    "]);
        assert_eq!(
            content_area(4, 3, &config),
            ContentArea { width: 2, height: 1 }
        );
    }

    #[test]
    fn test_corners_off_use_edge_glyphs() {
        let config = single().with_corners(false);
        let lines = render_box::<&str>(&[], 4, 2, &config);
        assert_eq!(lines, vec!["────", "────"]);
    }

    #[test]
    fn test_side_style_override() {
        let config = single().with_side_style(BorderSides::TOP, BorderStyle::Double);
        let lines = render_box::<&str>(&[], 4, 3, &config);
        // Corners keep the global style, the top edge uses the override.
        assert_eq!(lines[0], "┌══┐");
        assert_eq!(lines[1], "│  │");
        assert_eq!(lines[2], "└──┘");
    }

    #[test]
    fn test_degenerate_sizes_keep_exact_width() {
        let lines = render_box(&["zz"], 1, 1, &single());
        assert_eq!(lines, vec!["┌"]);
        assert_eq!(content_area(1, 1, &single()), ContentArea { width: 0, height: 0 });
        assert!(render_box::<&str>(&[], 3, 0, &single()).is_empty());
    }

    #[test]
    fn test_unknown_tag_falls_back_to_single() {
        assert_eq!(BorderStyle::from_tag("wavy"), BorderStyle::Single);
        assert_eq!(BorderStyle::parse("wavy"), None);
        assert_eq!(BorderStyle::from_tag("ascii").glyphs().top_left, '+');
    }

    #[test]
    fn test_divider() {
        assert_eq!(render_divider(3, BorderStyle::Double, None), "═══");
        assert_eq!(render_divider(4, BorderStyle::Single, Some('·')), "····");
        assert_eq!(render_divider(0, BorderStyle::Bold, None), "");
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config: BorderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BorderConfig::default());

        let config: BorderConfig = serde_json::from_str(
            r#"{"style":"rounded","left":false,"topStyle":"nope","bottomStyle":"bold","corners":false}"#,
        )
        .unwrap();
        assert_eq!(config.style, BorderStyle::Rounded);
        assert!(!config.sides.contains(BorderSides::LEFT));
        assert!(config.sides.contains(BorderSides::RIGHT));
        assert_eq!(config.top_style, None);
        assert_eq!(config.bottom_style, Some(BorderStyle::Bold));
        assert!(!config.corners);
    }

    #[test]
    fn test_config_json_keeps_overrides() {
        let config = single()
            .with_sides(BorderSides::ALL - BorderSides::RIGHT)
            .with_side_style(BorderSides::LEFT, BorderStyle::Ascii);
        let json = serde_json::to_string(&config).unwrap();
        let back: BorderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
