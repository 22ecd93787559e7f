//! Preview Module — Text rendering of a laid-out component tree.
//!
//! Responsibilities:
//! - Traverse the tree and draw visible nodes into a cell buffer
//! - Draw bordered nodes through the border renderer, content inside the
//!   content area (buttons centered)
//! - Draw unbordered leaves as clipped content lines
//! - Clip children to their parent's box; later nodes draw over earlier ones

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::border::{content_area, render_box};
use crate::layout::LayoutEngine;
use crate::sizing::SizingTable;
use crate::text_utils::{center_in_width, display_width, fit_to_width};
use crate::types::{Buffer, Cell, ComponentNode, ComponentType, ResolvedBox};

// ============================================================================
// Clip Rectangle
// ============================================================================

/// Axis-aligned clip rectangle in absolute screen coordinates.
#[derive(Debug, Clone, Copy)]
struct ClipRect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl ClipRect {
    fn full(width: u16, height: u16) -> Self {
        Self {
            x: 0,
            y: 0,
            w: i32::from(width),
            h: i32::from(height),
        }
    }

    fn from_box(b: ResolvedBox) -> Self {
        Self {
            x: i32::from(b.x),
            y: i32::from(b.y),
            w: i32::from(b.width),
            h: i32::from(b.height),
        }
    }

    /// Intersect with another clip rect, producing the tighter bound.
    fn intersect(self, other: ClipRect) -> ClipRect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.w).min(other.x + other.w);
        let y2 = (self.y + self.h).min(other.y + other.h);
        ClipRect {
            x: x1,
            y: y1,
            w: (x2 - x1).max(0),
            h: (y2 - y1).max(0),
        }
    }

    fn contains(self, sx: i32, sy: i32) -> bool {
        sx >= self.x && sx < self.x + self.w && sy >= self.y && sy < self.y + self.h
    }
}

/// Write one symbol, respecting the clip rect. Half-overwritten wide glyphs
/// are blanked so every row keeps its exact width.
fn clip_set(buffer: &mut Buffer, sx: i32, sy: i32, symbol: &str, clip: ClipRect) {
    if !clip.contains(sx, sy) || sx < 0 || sy < 0 {
        return;
    }
    let (x, y) = (sx as u16, sy as u16);
    if let Some(old) = buffer.get(x, y) {
        if old.symbol.is_empty() && x > 0 {
            buffer.set(x - 1, y, Cell::default());
        } else if UnicodeWidthStr::width(old.symbol.as_str()) > 1
            && buffer.get(x + 1, y).is_some_and(|c| c.symbol.is_empty())
        {
            buffer.set(x + 1, y, Cell::default());
        }
    }
    buffer.set(
        x,
        y,
        Cell {
            symbol: symbol.to_string(),
        },
    );
}

/// Write a line of text starting at (sx, sy). Wide glyphs that do not fit
/// entirely inside the clip are replaced by spaces.
fn write_text(buffer: &mut Buffer, sx: i32, sy: i32, text: &str, clip: ClipRect) {
    let mut col = sx;
    for grapheme in text.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme) as i32;
        if w == 0 {
            continue;
        }
        if w == 1 {
            clip_set(buffer, col, sy, grapheme, clip);
        } else if clip.contains(col, sy) && clip.contains(col + 1, sy) {
            clip_set(buffer, col, sy, grapheme, clip);
            clip_set(buffer, col + 1, sy, "", clip);
        } else {
            clip_set(buffer, col, sy, " ", clip);
            clip_set(buffer, col + 1, sy, " ", clip);
        }
        col += w;
    }
}

// ============================================================================
// Frame Rendering
// ============================================================================

/// Render the last layout computed by `engine` as exactly `height` lines of
/// exactly `width` cells.
pub fn render_frame(
    root: Option<&ComponentNode>,
    engine: &LayoutEngine,
    width: u16,
    height: u16,
) -> Vec<String> {
    let mut buffer = Buffer::new(width, height);
    if let Some(root) = root {
        let clip = ClipRect::full(width, height);
        render_node(&mut buffer, root, engine, engine.sizing(), clip);
    }
    buffer.to_lines()
}

fn render_node(
    buffer: &mut Buffer,
    node: &ComponentNode,
    engine: &LayoutEngine,
    sizing: &SizingTable,
    clip: ClipRect,
) {
    if node.hidden {
        return;
    }
    let Some(bounds) = engine.get_layout(&node.id) else {
        return;
    };
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }

    let lines = sizing.content_lines(&node.widget());
    let x = i32::from(bounds.x);
    let y = i32::from(bounds.y);

    match node.style.border_config() {
        Some(config) => {
            let area = content_area(bounds.width, bounds.height, &config);
            let interior = lay_out_content(node, &lines, area.width, area.height);
            for (row, line) in render_box(&interior, bounds.width, bounds.height, &config)
                .iter()
                .enumerate()
            {
                write_text(buffer, x, y + row as i32, line, clip);
            }
        }
        None if !lines.is_empty() => {
            let content = engine.get_content_box(&node.id).unwrap_or(bounds);
            let cx = i32::from(content.x);
            let cy = i32::from(content.y);
            for (row, line) in lines.iter().take(content.height as usize).enumerate() {
                let text = fit_to_width(line, content.width as usize);
                write_text(buffer, cx, cy + row as i32, &text, clip);
            }
        }
        None => {}
    }

    let child_clip = clip.intersect(ClipRect::from_box(bounds));
    for child in &node.children {
        render_node(buffer, child, engine, sizing, child_clip);
    }
}

/// Place content lines inside a `width` x `height` interior, honouring the
/// node's padding. Buttons are centered horizontally.
fn lay_out_content(node: &ComponentNode, lines: &[String], width: u16, height: u16) -> Vec<String> {
    let padding = node.layout.padding;
    let inner_width = width.saturating_sub(padding.horizontal()) as usize;
    let left = " ".repeat(usize::from(padding.left.min(width)));
    let center = node.component_type == ComponentType::Button;

    (0..height)
        .map(|row| {
            let Some(line) = row
                .checked_sub(padding.top)
                .and_then(|i| lines.get(usize::from(i)))
            else {
                return String::new();
            };
            let text = if center && display_width(line) < inner_width {
                center_in_width(line, inner_width)
            } else {
                fit_to_width(line, inner_width)
            };
            format!("{left}{text}")
        })
        .collect()
}
