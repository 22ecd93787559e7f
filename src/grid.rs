//! Grid Module — Equal-track grid placement.
//!
//! Tracks are `available / count` cells each with the remainder added to the
//! last track. Children fill cells in row-major order; children past
//! `columns * rows` are left unplaced.

use crate::layout::{clamp_u32, fills_region, overflow, Cycle, Extent, LayoutPass, Size};
use crate::types::{Axis, ComponentNode, GridLayout, LayoutWarning, ResolvedBox};

/// Offsets and sizes of tracks along one axis.
#[derive(Debug, PartialEq, Eq)]
struct Tracks {
    starts: Vec<u32>,
    sizes: Vec<u16>,
}

/// Split `available` cells into `count` tracks separated by `gap`.
/// Returns the tracks and the gap deficit when gaps alone do not fit.
fn partition(start: u32, available: u16, count: u16, gap: u16) -> (Tracks, u32) {
    let count = u32::from(count.max(1));
    let gaps = u32::from(gap) * (count - 1);
    let deficit = gaps.saturating_sub(u32::from(available));
    let usable = u32::from(available).saturating_sub(gaps);
    let base = usable / count;
    let rem = usable % count;

    let mut tracks = Tracks {
        starts: Vec::with_capacity(count as usize),
        sizes: Vec::with_capacity(count as usize),
    };
    let mut pos = start;
    for i in 0..count {
        let size = if i == count - 1 { base + rem } else { base };
        tracks.starts.push(pos);
        tracks.sizes.push(clamp_u32(size));
        pos += size + u32::from(gap);
    }
    (tracks, deficit)
}

impl LayoutPass<'_> {
    /// Columns and rows, coerced to at least 1 with a warning.
    fn grid_dimensions(&mut self, node: &ComponentNode, grid: &GridLayout) -> (u16, u16) {
        let mut coerce = |count: u16, what: &str| {
            if count == 0 {
                self.warn(
                    &node.id,
                    LayoutWarning::ConstraintViolation {
                        constraint: format!("grid {what} must be at least 1"),
                    },
                );
                1
            } else {
                count
            }
        };
        let columns = coerce(grid.columns, "columns");
        let rows = coerce(grid.rows, "rows");
        (columns, rows)
    }

    /// Natural size: every track as large as the largest child.
    pub(crate) fn grid_demand(
        &mut self,
        node: &ComponentNode,
        grid: &GridLayout,
        inner: Extent,
    ) -> Result<Size, Cycle> {
        let columns = grid.columns.max(1);
        let rows = grid.rows.max(1);
        let capacity = usize::from(columns) * usize::from(rows);

        let cell = Extent {
            width: inner
                .width
                .map(|w| w.saturating_sub(grid.column_gap.saturating_mul(columns - 1)) / columns),
            height: inner
                .height
                .map(|h| h.saturating_sub(grid.row_gap.saturating_mul(rows - 1)) / rows),
        };

        let mut widest = 0u32;
        let mut tallest = 0u32;
        for child in node.visible_children().take(capacity) {
            let size = self.outer_size(child, cell, Extent::UNKNOWN)?;
            let margin = child.layout.margin;
            widest = widest.max(u32::from(size.width) + u32::from(margin.horizontal()));
            tallest = tallest.max(u32::from(size.height) + u32::from(margin.vertical()));
        }

        let width = widest * u32::from(columns) + u32::from(grid.column_gap) * u32::from(columns - 1);
        let height = tallest * u32::from(rows) + u32::from(grid.row_gap) * u32::from(rows - 1);
        Ok(Size::new(clamp_u32(width), clamp_u32(height)))
    }

    pub(crate) fn place_grid<'n>(
        &mut self,
        node: &'n ComponentNode,
        grid: &GridLayout,
        content: ResolvedBox,
    ) -> Vec<(&'n ComponentNode, ResolvedBox)> {
        let (columns, rows) = self.grid_dimensions(node, grid);
        let (cols, col_deficit) =
            partition(u32::from(content.x), content.width, columns, grid.column_gap);
        let (rws, row_deficit) =
            partition(u32::from(content.y), content.height, rows, grid.row_gap);
        if col_deficit > 0 {
            self.warn(&node.id, overflow(Axis::Horizontal, col_deficit));
        }
        if row_deficit > 0 {
            self.warn(&node.id, overflow(Axis::Vertical, row_deficit));
        }

        let children: Vec<&ComponentNode> = node.visible_children().collect();
        let capacity = usize::from(columns) * usize::from(rows);
        if children.len() > capacity {
            let excess = children.len() - capacity;
            self.warn(
                &node.id,
                LayoutWarning::ConstraintViolation {
                    constraint: format!(
                        "{excess} children exceed {columns}x{rows} grid capacity"
                    ),
                },
            );
        }

        let mut placed = Vec::with_capacity(children.len().min(capacity));
        for (index, child) in children.into_iter().take(capacity).enumerate() {
            let col = index % usize::from(columns);
            let row = index / usize::from(columns);
            let cell = ResolvedBox::new(
                clamp_u32(cols.starts[col]),
                clamp_u32(rws.starts[row]),
                cols.sizes[col],
                rws.sizes[row],
            );

            let region = self.inset_margin(child, cell);
            let fill = if fills_region(child) {
                Extent::known(region.width, region.height)
            } else {
                Extent::UNKNOWN
            };
            let size = self
                .outer_size(child, Extent::known(cell.width, cell.height), fill)
                .unwrap_or_default();
            placed.push((child, self.clamp_to(child, size, region)));
        }
        placed
    }
}
