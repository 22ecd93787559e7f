//! Flexbox Module — Single-axis flow with wrapping, justification and alignment.
//!
//! Items keep their natural main size. A non-wrapping line that does not fit
//! clips the protruding items and warns once on the container; a wrapping
//! container starts a new line instead.

use crate::layout::{clamp_u32, overflow, Cycle, Extent, LayoutPass, Size};
use crate::types::{Align, Axis, ComponentNode, FlexDirection, FlexLayout, Justify, ResolvedBox};

struct FlexItem<'n> {
    node: &'n ComponentNode,
    main: u16,
    cross: u16,
    margin_main: (u16, u16),
    margin_cross: (u16, u16),
    stretch: bool,
}

impl FlexItem<'_> {
    fn outer_main(&self) -> u32 {
        u32::from(self.main) + u32::from(self.margin_main.0) + u32::from(self.margin_main.1)
    }

    fn outer_cross(&self) -> u32 {
        u32::from(self.cross) + self.margin_cross_total()
    }

    fn margin_cross_total(&self) -> u32 {
        u32::from(self.margin_cross.0) + u32::from(self.margin_cross.1)
    }
}

// ============================================================================
// Axis helpers
// ============================================================================

fn main_axis(direction: FlexDirection) -> Axis {
    match direction {
        FlexDirection::Row => Axis::Horizontal,
        FlexDirection::Column => Axis::Vertical,
    }
}

fn cross_axis(direction: FlexDirection) -> Axis {
    match direction {
        FlexDirection::Row => Axis::Vertical,
        FlexDirection::Column => Axis::Horizontal,
    }
}

/// (width, height) -> (main, cross)
fn split<T>(direction: FlexDirection, width: T, height: T) -> (T, T) {
    match direction {
        FlexDirection::Row => (width, height),
        FlexDirection::Column => (height, width),
    }
}

/// (main, cross) -> (width, height)
fn join<T>(direction: FlexDirection, main: T, cross: T) -> (T, T) {
    split(direction, main, cross)
}

/// Main-axis extent of a line: outer sizes plus gaps between items.
fn line_extent(items: &[FlexItem<'_>], gap: u32) -> u32 {
    let sum: u32 = items.iter().map(FlexItem::outer_main).sum();
    sum + gap * (items.len().saturating_sub(1) as u32)
}

/// Leading offset and extra space after each of the first `n - 1` items.
fn justify_offsets(justify: Justify, leftover: u32, n: usize) -> (u32, Vec<u32>) {
    let gaps = n.saturating_sub(1);
    match justify {
        Justify::Start => (0, vec![0; gaps]),
        Justify::End => (leftover, vec![0; gaps]),
        Justify::Center => (leftover / 2, vec![0; gaps]),
        Justify::SpaceBetween if gaps == 0 => (0, Vec::new()),
        Justify::SpaceBetween => {
            let base = leftover / gaps as u32;
            let rem = (leftover % gaps as u32) as usize;
            (0, (0..gaps).map(|i| base + u32::from(i < rem)).collect())
        }
        Justify::SpaceAround => {
            let per = leftover / n.max(1) as u32;
            (per / 2, vec![per; gaps])
        }
    }
}

/// Visible size of an item starting at `start` before the boundary `end`.
fn clip(start: u32, size: u16, end: u32) -> u16 {
    clamp_u32(end.saturating_sub(start).min(u32::from(size)))
}

impl LayoutPass<'_> {
    fn flex_items<'n>(
        &mut self,
        node: &'n ComponentNode,
        flex: &FlexLayout,
        content: Extent,
        single_line: bool,
    ) -> Result<Vec<FlexItem<'n>>, Cycle> {
        let dir = flex.direction;
        let (_, avail_cross) = split(dir, content.width, content.height);
        let mut items = Vec::new();

        for child in node.visible_children() {
            let m = child.layout.margin;
            let (margin_main, margin_cross) = match dir {
                FlexDirection::Row => ((m.left, m.right), (m.top, m.bottom)),
                FlexDirection::Column => ((m.top, m.bottom), (m.left, m.right)),
            };
            let (_, cross_dim) = split(dir, child.props.width, child.props.height);
            let stretch = flex.align == Align::Stretch && cross_dim.is_auto();

            let fill_cross = if stretch && single_line {
                avail_cross.map(|c| c.saturating_sub(margin_cross.0.saturating_add(margin_cross.1)))
            } else {
                None
            };
            let (fill_w, fill_h) = join(dir, None, fill_cross);
            let size = self.outer_size(
                child,
                content,
                Extent {
                    width: fill_w,
                    height: fill_h,
                },
            )?;
            let (main, cross) = split(dir, size.width, size.height);
            items.push(FlexItem {
                node: child,
                main,
                cross,
                margin_main,
                margin_cross,
                stretch,
            });
        }
        Ok(items)
    }

    /// Natural size of a flex container's content: one unwrapped line.
    pub(crate) fn flex_demand(
        &mut self,
        node: &ComponentNode,
        flex: &FlexLayout,
        inner: Extent,
    ) -> Result<Size, Cycle> {
        let items = self.flex_items(node, flex, inner, !flex.wrap)?;
        let main = line_extent(&items, u32::from(flex.gap));
        let cross = items.iter().map(FlexItem::outer_cross).max().unwrap_or(0);
        let (w, h) = join(flex.direction, clamp_u32(main), clamp_u32(cross));
        Ok(Size::new(w, h))
    }

    pub(crate) fn place_flex<'n>(
        &mut self,
        node: &'n ComponentNode,
        flex: &FlexLayout,
        content: ResolvedBox,
    ) -> Vec<(&'n ComponentNode, ResolvedBox)> {
        let dir = flex.direction;
        let extent = Extent::known(content.width, content.height);
        let items = self
            .flex_items(node, flex, extent, !flex.wrap)
            .unwrap_or_default();
        if items.is_empty() {
            return Vec::new();
        }

        let (main_start, cross_start) = split(dir, u32::from(content.x), u32::from(content.y));
        let (avail_main, avail_cross) =
            split(dir, u32::from(content.width), u32::from(content.height));
        let gap = u32::from(flex.gap);

        let lines = if flex.wrap {
            self.wrap_lines(items, avail_main, gap, dir)
        } else {
            let demand = line_extent(&items, gap);
            if demand > avail_main {
                self.warn(&node.id, overflow(main_axis(dir), demand - avail_main));
            }
            vec![items]
        };

        let single_line = lines.len() == 1;
        let thickness: Vec<u32> = if single_line {
            vec![avail_cross]
        } else {
            lines
                .iter()
                .map(|line| line.iter().map(FlexItem::outer_cross).max().unwrap_or(0))
                .collect()
        };
        if !single_line {
            let total = thickness.iter().sum::<u32>() + gap * (lines.len() as u32 - 1);
            if total > avail_cross {
                self.warn(&node.id, overflow(cross_axis(dir), total - avail_cross));
            }
        }

        let main_end = main_start + avail_main;
        let cross_end = cross_start + avail_cross;
        let mut placed = Vec::new();
        let mut line_cross = cross_start;

        for (line, thick) in lines.iter().zip(thickness) {
            let leftover = avail_main.saturating_sub(line_extent(line, gap));
            let (lead, extra) = justify_offsets(flex.justify, leftover, line.len());
            let line_end = (line_cross + thick).min(cross_end);
            let mut pos = main_start + lead;

            for (i, item) in line.iter().enumerate() {
                let start = (pos + u32::from(item.margin_main.0)).min(main_end);
                let main = clip(start, item.main, main_end);

                let cross_size = if item.stretch {
                    clamp_u32(thick.saturating_sub(item.margin_cross_total()))
                } else {
                    item.cross
                };
                let outer_cross = u32::from(cross_size) + item.margin_cross_total();
                if single_line && outer_cross > thick {
                    self.warn(
                        &item.node.id,
                        overflow(cross_axis(dir), outer_cross - thick),
                    );
                }
                let offset = match flex.align {
                    Align::Start | Align::Stretch => 0,
                    Align::Center => thick.saturating_sub(outer_cross) / 2,
                    Align::End => thick.saturating_sub(outer_cross),
                };
                let cstart = (line_cross + offset + u32::from(item.margin_cross.0)).min(line_end);
                let cross = clip(cstart, cross_size, line_end);

                let (x, y) = join(dir, start, cstart);
                let (w, h) = join(dir, main, cross);
                placed.push((item.node, ResolvedBox::new(clamp_u32(x), clamp_u32(y), w, h)));

                pos += item.outer_main() + gap + extra.get(i).copied().unwrap_or(0);
            }
            line_cross += thick + gap;
        }
        placed
    }

    /// Greedy line breaking. An item wider than the whole line sits alone
    /// and is clipped with a warning.
    fn wrap_lines<'n>(
        &mut self,
        items: Vec<FlexItem<'n>>,
        avail_main: u32,
        gap: u32,
        dir: FlexDirection,
    ) -> Vec<Vec<FlexItem<'n>>> {
        let mut lines: Vec<Vec<FlexItem<'n>>> = Vec::new();
        let mut current: Vec<FlexItem<'n>> = Vec::new();
        let mut used = 0u32;

        for item in items {
            let outer = item.outer_main();
            if outer > avail_main {
                self.warn(&item.node.id, overflow(main_axis(dir), outer - avail_main));
            }
            let need = if current.is_empty() { outer } else { used + gap + outer };
            if !current.is_empty() && need > avail_main {
                lines.push(std::mem::take(&mut current));
                used = outer;
            } else {
                used = need;
            }
            current.push(item);
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use crate::layout::LayoutEngine;
    use crate::types::*;

    fn item(id: &str, w: u16, h: u16) -> ComponentNode {
        ComponentNode::new(id, ComponentType::Text)
            .with_size(Dimension::Cells(w), Dimension::Cells(h))
    }

    fn flex_root(flex: FlexLayout, children: Vec<ComponentNode>) -> ComponentNode {
        ComponentNode::new("root", ComponentType::Box)
            .with_layout(LayoutSpec::flex(flex))
            .with_children(children)
    }

    fn run(root: &ComponentNode, w: i32, h: i32) -> LayoutEngine {
        let mut engine = LayoutEngine::new();
        engine.calculate_layout(Some(root), w, h);
        engine
    }

    fn layout(engine: &LayoutEngine, id: &str) -> (u16, u16, u16, u16) {
        let b = engine.get_layout(id).unwrap();
        (b.x, b.y, b.width, b.height)
    }

    fn row(justify: Justify, align: Align) -> FlexLayout {
        FlexLayout {
            direction: FlexDirection::Row,
            justify,
            align,
            ..FlexLayout::default()
        }
    }

    #[test]
    fn test_overflow_clips_and_warns_once() {
        let root = flex_root(
            FlexLayout::default(),
            vec![item("a", 8, 1), item("b", 8, 1)],
        );
        let engine = run(&root, 10, 3);

        let (_, _, w1, _) = layout(&engine, "a");
        let (x2, _, w2, _) = layout(&engine, "b");
        assert!(w1 + w2 <= 10);
        assert_eq!((w1, x2, w2), (8, 8, 2));
        assert_eq!(
            engine.get_warnings("root"),
            &[LayoutWarning::Overflow {
                axis: Axis::Horizontal,
                amount: 6
            }]
        );
        assert!(engine.get_warnings("a").is_empty());
        assert!(engine.get_warnings("b").is_empty());
    }

    #[test]
    fn test_justify_modes() {
        let xs = |justify: Justify, width: i32| {
            let root = flex_root(
                row(justify, Align::Start),
                vec![item("a", 2, 1), item("b", 2, 1), item("c", 2, 1)],
            );
            let engine = run(&root, width, 1);
            ["a", "b", "c"].map(|id| layout(&engine, id).0)
        };
        assert_eq!(xs(Justify::Start, 20), [0, 2, 4]);
        assert_eq!(xs(Justify::Center, 20), [7, 9, 11]);
        assert_eq!(xs(Justify::End, 20), [14, 16, 18]);
        assert_eq!(xs(Justify::SpaceBetween, 20), [0, 9, 18]);
        assert_eq!(xs(Justify::SpaceBetween, 21), [0, 10, 19]);
        assert_eq!(xs(Justify::SpaceAround, 20), [2, 8, 14]);
    }

    #[test]
    fn test_space_between_single_item_starts() {
        let root = flex_root(row(Justify::SpaceBetween, Align::Start), vec![item("a", 2, 1)]);
        let engine = run(&root, 10, 1);
        assert_eq!(layout(&engine, "a").0, 0);
    }

    #[test]
    fn test_align_modes() {
        let place = |align: Align, child: ComponentNode| {
            let root = flex_root(row(Justify::Start, align), vec![child]);
            let engine = run(&root, 10, 5);
            layout(&engine, "a")
        };
        assert_eq!(place(Align::Start, item("a", 2, 1)), (0, 0, 2, 1));
        assert_eq!(place(Align::Center, item("a", 2, 1)), (0, 2, 2, 1));
        assert_eq!(place(Align::End, item("a", 2, 1)), (0, 4, 2, 1));
        // Explicit cross size is kept under stretch.
        assert_eq!(place(Align::Stretch, item("a", 2, 2)), (0, 0, 2, 2));

        let auto_height = ComponentNode::new("a", ComponentType::Text)
            .with_size(Dimension::Cells(2), Dimension::Auto);
        assert_eq!(place(Align::Stretch, auto_height), (0, 0, 2, 5));
    }

    #[test]
    fn test_cross_overflow_warns_on_child() {
        let root = flex_root(FlexLayout::default(), vec![item("tall", 2, 3)]);
        let engine = run(&root, 10, 2);
        assert_eq!(layout(&engine, "tall"), (0, 0, 2, 2));
        assert_eq!(
            engine.get_warnings("tall"),
            &[LayoutWarning::Overflow {
                axis: Axis::Vertical,
                amount: 1
            }]
        );
    }

    #[test]
    fn test_wrap_moves_items_to_new_line() {
        let flex = FlexLayout {
            wrap: true,
            gap: 1,
            ..FlexLayout::default()
        };
        let root = flex_root(flex, vec![item("a", 4, 1), item("b", 4, 1), item("c", 4, 1)]);
        let engine = run(&root, 10, 5);

        assert_eq!(layout(&engine, "a"), (0, 0, 4, 1));
        assert_eq!(layout(&engine, "b"), (5, 0, 4, 1));
        assert_eq!(layout(&engine, "c"), (0, 2, 4, 1));
        assert!(engine.get_nodes_with_warnings().is_empty());
    }

    #[test]
    fn test_column_wrap_starts_new_column() {
        let flex = FlexLayout {
            direction: FlexDirection::Column,
            wrap: true,
            gap: 1,
            ..FlexLayout::default()
        };
        let root = flex_root(
            flex,
            vec![item("a", 2, 2), item("b", 3, 2), item("c", 2, 2)],
        );
        let engine = run(&root, 10, 5);

        assert_eq!(layout(&engine, "a"), (0, 0, 2, 2));
        assert_eq!(layout(&engine, "b"), (0, 3, 3, 2));
        // The second column starts after the widest item of the first plus gap.
        assert_eq!(layout(&engine, "c"), (4, 0, 2, 2));
        assert!(engine.get_nodes_with_warnings().is_empty());
    }

    #[test]
    fn test_column_justify_and_align() {
        let flex = FlexLayout {
            direction: FlexDirection::Column,
            justify: Justify::Center,
            align: Align::End,
            ..FlexLayout::default()
        };
        let root = flex_root(flex, vec![item("a", 2, 1), item("b", 4, 1)]);
        let engine = run(&root, 10, 9);

        assert_eq!(layout(&engine, "a"), (8, 3, 2, 1));
        assert_eq!(layout(&engine, "b"), (6, 4, 4, 1));
    }

    #[test]
    fn test_wrap_oversized_item_warns_on_child() {
        let flex = FlexLayout {
            wrap: true,
            ..FlexLayout::default()
        };
        let root = flex_root(flex, vec![item("a", 2, 1), item("wide", 12, 1)]);
        let engine = run(&root, 10, 4);

        assert_eq!(layout(&engine, "wide"), (0, 1, 10, 1));
        assert_eq!(
            engine.get_warnings("wide"),
            &[LayoutWarning::Overflow {
                axis: Axis::Horizontal,
                amount: 2
            }]
        );
        assert!(engine.get_warnings("root").is_empty());
    }

    #[test]
    fn test_column_with_gap_and_margin() {
        let flex = FlexLayout {
            direction: FlexDirection::Column,
            gap: 1,
            ..FlexLayout::default()
        };
        let spaced = item("b", 3, 2).with_layout(
            LayoutSpec::default().margined(Edges {
                top: 1,
                right: 0,
                bottom: 0,
                left: 2,
            }),
        );
        let root = flex_root(flex, vec![item("a", 3, 2), spaced, item("c", 3, 1)]);
        let engine = run(&root, 10, 12);

        assert_eq!(layout(&engine, "a"), (0, 0, 3, 2));
        assert_eq!(layout(&engine, "b"), (2, 4, 3, 2));
        assert_eq!(layout(&engine, "c"), (0, 7, 3, 1));
    }

    #[test]
    fn test_auto_container_measures_content() {
        let inner = ComponentNode::new("inner", ComponentType::Box)
            .with_layout(LayoutSpec::flex(FlexLayout {
                gap: 1,
                ..FlexLayout::default()
            }))
            .with_border(crate::border::BorderStyle::Single)
            .with_children(vec![item("x", 3, 1), item("y", 4, 2)]);
        let column = FlexLayout {
            direction: FlexDirection::Column,
            ..FlexLayout::default()
        };
        let root = flex_root(column, vec![inner, item("after", 1, 1)]);
        let engine = run(&root, 40, 20);

        assert_eq!(layout(&engine, "inner"), (0, 0, 10, 4));
        assert_eq!(layout(&engine, "x"), (1, 1, 3, 1));
        assert_eq!(layout(&engine, "y"), (5, 1, 4, 2));
        assert_eq!(layout(&engine, "after"), (0, 4, 1, 1));
    }

    #[test]
    fn test_empty_container_is_frame_only() {
        let empty = ComponentNode::new("empty", ComponentType::Box)
            .with_layout(LayoutSpec::flex(FlexLayout::default()).padded(Edges::uniform(1)))
            .with_border(crate::border::BorderStyle::Rounded);
        let root = flex_root(FlexLayout::default(), vec![empty]);
        let engine = run(&root, 20, 10);
        assert_eq!(layout(&engine, "empty"), (0, 0, 4, 4));
    }
}
