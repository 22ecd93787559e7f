//! Layout Module — Integer cell layout of a component tree.
//!
//! Responsibilities:
//! - Resolve a box for every visible node from its layout intent (absolute,
//!   flexbox, grid, unmanaged)
//! - Detect overflow, negative space, constraint violations and circular
//!   size dependencies
//! - Cache results by node id for queries, debug overlays and hit testing
//!
//! All arithmetic is in whole cells. A pass never fails: malformed input is
//! normalized and layout problems become warnings on the affected node.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, debug_span, trace};

use crate::sizing::SizingTable;
use crate::types::{
    Axis, ComponentNode, Dimension, Edges, LayoutMode, LayoutWarning, ResolvedBox,
    SpaceDimension,
};

// ============================================================================
// Public Engine
// ============================================================================

/// Per-node diagnostics for the debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub bounds: ResolvedBox,
    pub content: ResolvedBox,
    pub warnings: Vec<LayoutWarning>,
}

#[derive(Debug, Default)]
struct LayoutResults {
    boxes: HashMap<String, ResolvedBox>,
    content: HashMap<String, ResolvedBox>,
    warnings: HashMap<String, Vec<LayoutWarning>>,
    /// Ids with warnings, in pre-order.
    warning_order: Vec<String>,
}

/// Stateful layout engine. Keeps the last computed layout for queries.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    sizing: SizingTable,
    results: LayoutResults,
    last_input: Option<(Option<ComponentNode>, i32, i32)>,
    perf_layout_us: u64,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sizing(sizing: SizingTable) -> Self {
        Self {
            sizing,
            ..Self::default()
        }
    }

    pub fn sizing(&self) -> &SizingTable {
        &self.sizing
    }

    /// Replace the sizing table. The next `calculate_layout` always recomputes.
    pub fn set_sizing(&mut self, sizing: SizingTable) {
        self.sizing = sizing;
        self.last_input = None;
    }

    /// Microseconds spent in the last full computation.
    pub fn perf_layout_us(&self) -> u64 {
        self.perf_layout_us
    }

    /// Compute and cache the layout of `root` inside a viewport.
    ///
    /// Negative viewport sizes clamp to 0. When the tree and viewport equal
    /// the previous call the cached result is kept.
    pub fn calculate_layout(
        &mut self,
        root: Option<&ComponentNode>,
        viewport_width: i32,
        viewport_height: i32,
    ) {
        let span = debug_span!("calculate_layout", viewport_width, viewport_height);
        let _enter = span.enter();

        if let Some((prev_root, prev_w, prev_h)) = &self.last_input {
            if prev_root.as_ref() == root && *prev_w == viewport_width && *prev_h == viewport_height
            {
                trace!("layout input unchanged, keeping cached result");
                return;
            }
        }

        let start = Instant::now();
        let width = clamp_viewport(viewport_width);
        let height = clamp_viewport(viewport_height);

        let mut pass = LayoutPass::new(&self.sizing);
        if let Some(root) = root.filter(|r| !r.hidden) {
            pass.lay_out_root(root, width, height);
            pass.collect_warning_order(root);
        }
        self.results = pass.finish();

        self.perf_layout_us = start.elapsed().as_micros() as u64;
        self.last_input = Some((root.cloned(), viewport_width, viewport_height));
        debug!(
            nodes = self.results.boxes.len(),
            warnings = self.results.warning_order.len(),
            elapsed_us = self.perf_layout_us,
            "compute_layout: {}μs",
            self.perf_layout_us
        );
    }

    pub fn get_layout(&self, id: &str) -> Option<ResolvedBox> {
        self.results.boxes.get(id).copied()
    }

    /// Content region (inside border and padding) of a laid-out node.
    pub fn get_content_box(&self, id: &str) -> Option<ResolvedBox> {
        self.results.content.get(id).copied()
    }

    pub fn get_debug_info(&self, id: &str) -> Option<DebugInfo> {
        let bounds = self.get_layout(id)?;
        Some(DebugInfo {
            bounds,
            content: self.get_content_box(id).unwrap_or(bounds),
            warnings: self.results.warnings.get(id).cloned().unwrap_or_default(),
        })
    }

    pub fn get_warnings(&self, id: &str) -> &[LayoutWarning] {
        self.results
            .warnings
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ids of nodes with at least one warning, in pre-order.
    pub fn get_nodes_with_warnings(&self) -> &[String] {
        &self.results.warning_order
    }

    /// Number of nodes with a resolved box.
    pub fn node_count(&self) -> usize {
        self.results.boxes.len()
    }

    /// `name: warning, warning` lines for the first `limit` nodes with
    /// warnings, followed by `... and N more` when truncated.
    pub fn warning_summary(&self, root: &ComponentNode, limit: usize) -> Vec<String> {
        let order = &self.results.warning_order;
        let mut lines: Vec<String> = order
            .iter()
            .take(limit)
            .map(|id| {
                let name = root.find(id).map_or(id.as_str(), ComponentNode::display_name);
                let warnings = self
                    .get_warnings(id)
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{name}: {warnings}")
            })
            .collect();
        if order.len() > limit {
            lines.push(format!("... and {} more", order.len() - limit));
        }
        lines
    }

    /// Hit-test: find the deepest visible node containing the cell.
    /// Later siblings are checked first, matching drawing order.
    pub fn hit_test<'a>(
        &self,
        root: &'a ComponentNode,
        x: u16,
        y: u16,
    ) -> Option<&'a ComponentNode> {
        if root.hidden {
            return None;
        }
        let bounds = self.get_layout(&root.id)?;
        if !bounds.contains(x, y) {
            return None;
        }
        for child in root.children.iter().rev() {
            if let Some(hit) = self.hit_test(child, x, y) {
                return Some(hit);
            }
        }
        Some(root)
    }
}

fn clamp_viewport(v: i32) -> u16 {
    v.clamp(0, i32::from(u16::MAX)) as u16
}

// ============================================================================
// Layout Pass
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub(crate) const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    fn plus(self, edges: &Edges) -> Self {
        Self {
            width: self.width.saturating_add(edges.horizontal()),
            height: self.height.saturating_add(edges.vertical()),
        }
    }
}

/// Per-axis extents; `None` means the extent is still being derived from
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Extent {
    pub width: Option<u16>,
    pub height: Option<u16>,
}

impl Extent {
    pub(crate) const UNKNOWN: Extent = Extent {
        width: None,
        height: None,
    };

    pub(crate) fn known(width: u16, height: u16) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    fn shrink(self, edges: &Edges) -> Self {
        Self {
            width: self.width.map(|w| w.saturating_sub(edges.horizontal())),
            height: self.height.map(|h| h.saturating_sub(edges.vertical())),
        }
    }
}

/// A percentage size refers to the container `at`, whose size is itself
/// being derived from its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cycle {
    pub at: String,
}

/// One `calculate_layout` computation. Results are built here and swapped
/// into the engine in one step.
pub(crate) struct LayoutPass<'a> {
    pub(crate) sizing: &'a SizingTable,
    results: LayoutResults,
    /// Containers whose size is currently being derived from their content.
    chain: Vec<String>,
    cyclic: HashSet<String>,
}

impl<'a> LayoutPass<'a> {
    fn new(sizing: &'a SizingTable) -> Self {
        Self {
            sizing,
            results: LayoutResults::default(),
            chain: Vec::new(),
            cyclic: HashSet::new(),
        }
    }

    fn finish(self) -> LayoutResults {
        self.results
    }

    pub(crate) fn warn(&mut self, id: &str, warning: LayoutWarning) {
        let list = self.results.warnings.entry(id.to_string()).or_default();
        if !list.contains(&warning) {
            trace!(node = id, warning = %warning, "layout warning");
            list.push(warning);
        }
    }

    fn collect_warning_order(&mut self, node: &ComponentNode) {
        if self.results.warnings.contains_key(&node.id) {
            self.results.warning_order.push(node.id.clone());
        }
        for child in node.visible_children() {
            self.collect_warning_order(child);
        }
    }

    // ------------------------------------------------------------------------
    // Placement (top-down)
    // ------------------------------------------------------------------------

    fn lay_out_root(&mut self, root: &ComponentNode, width: u16, height: u16) {
        let viewport = ResolvedBox::new(0, 0, width, height);
        let region = self.inset_margin(root, viewport);
        let fill = if root.component_type.is_container() {
            Extent::known(region.width, region.height)
        } else {
            Extent::UNKNOWN
        };
        let size = self
            .outer_size(root, Extent::known(width, height), fill)
            .unwrap_or_default();
        let bounds = self.clamp_to(root, size, region);
        self.lay_out(root, bounds);
    }

    /// Record `bounds` for `node`, then place and recurse into its children.
    pub(crate) fn lay_out(&mut self, node: &ComponentNode, bounds: ResolvedBox) {
        if self.cyclic.contains(&node.id) {
            self.zero_subtree(node, bounds.x, bounds.y);
            return;
        }
        self.results.boxes.insert(node.id.clone(), bounds);

        let frame = frame_of(node);
        if frame.horizontal() > bounds.width {
            self.warn(&node.id, negative(SpaceDimension::Width));
        }
        if frame.vertical() > bounds.height {
            self.warn(&node.id, negative(SpaceDimension::Height));
        }
        let content = bounds.inset(&frame);
        self.results.content.insert(node.id.clone(), content);

        let placed = match node.layout.mode {
            LayoutMode::None | LayoutMode::Absolute => self.place_absolute(node, content),
            LayoutMode::Flexbox(flex) => self.place_flex(node, &flex, content),
            LayoutMode::Grid(grid) => self.place_grid(node, &grid, content),
        };
        for (child, child_box) in placed {
            self.lay_out(child, child_box);
        }
    }

    /// Children sit at their own `x`/`y` from the content origin. Auto
    /// containers fill the rest of the content from their offset.
    fn place_absolute<'n>(
        &mut self,
        node: &'n ComponentNode,
        content: ResolvedBox,
    ) -> Vec<(&'n ComponentNode, ResolvedBox)> {
        let parent = Extent::known(content.width, content.height);
        node.visible_children()
            .map(|child| {
                let margin = child.layout.margin;
                let dx = u32::from(child.layout.x) + u32::from(margin.left);
                let dy = u32::from(child.layout.y) + u32::from(margin.top);
                let taken_w = dx + u32::from(margin.right);
                let taken_h = dy + u32::from(margin.bottom);

                let fill = if fills_region(child) {
                    if taken_w > u32::from(content.width) {
                        self.warn(&child.id, negative(SpaceDimension::Width));
                    }
                    if taken_h > u32::from(content.height) {
                        self.warn(&child.id, negative(SpaceDimension::Height));
                    }
                    Extent::known(
                        sub_cells(content.width, taken_w),
                        sub_cells(content.height, taken_h),
                    )
                } else {
                    Extent::UNKNOWN
                };
                let size = self.outer_size(child, parent, fill).unwrap_or_default();
                let child_box = ResolvedBox::new(
                    add_cells(content.x, dx),
                    add_cells(content.y, dy),
                    size.width,
                    size.height,
                );
                (child, child_box)
            })
            .collect()
    }

    /// Assign 0x0 at the given origin to a node and its visible subtree.
    fn zero_subtree(&mut self, node: &ComponentNode, x: u16, y: u16) {
        let zero = ResolvedBox::new(x, y, 0, 0);
        self.results.boxes.insert(node.id.clone(), zero);
        self.results.content.insert(node.id.clone(), zero);
        for child in node.visible_children() {
            self.zero_subtree(child, x, y);
        }
    }

    /// Shrink a region by the node's margin, warning when it does not fit.
    pub(crate) fn inset_margin(&mut self, node: &ComponentNode, region: ResolvedBox) -> ResolvedBox {
        let margin = node.layout.margin;
        if margin.horizontal() > region.width {
            self.warn(&node.id, negative(SpaceDimension::Width));
        }
        if margin.vertical() > region.height {
            self.warn(&node.id, negative(SpaceDimension::Height));
        }
        region.inset(&margin)
    }

    /// Clamp a size into a region, recording overflow with the excess.
    pub(crate) fn clamp_to(
        &mut self,
        node: &ComponentNode,
        size: Size,
        region: ResolvedBox,
    ) -> ResolvedBox {
        if size.width > region.width {
            let amount = u32::from(size.width - region.width);
            self.warn(&node.id, overflow(Axis::Horizontal, amount));
        }
        if size.height > region.height {
            let amount = u32::from(size.height - region.height);
            self.warn(&node.id, overflow(Axis::Vertical, amount));
        }
        ResolvedBox::new(
            region.x,
            region.y,
            size.width.min(region.width),
            size.height.min(region.height),
        )
    }

    // ------------------------------------------------------------------------
    // Measurement
    // ------------------------------------------------------------------------

    /// Border-box size of `node`.
    ///
    /// `parent` holds the parent's content extents for percentages. `fill`
    /// holds extents the parent imposes on auto axes (stretch, fill).
    pub(crate) fn outer_size(
        &mut self,
        node: &ComponentNode,
        parent: Extent,
        fill: Extent,
    ) -> Result<Size, Cycle> {
        if self.cyclic.contains(&node.id) {
            return Ok(Size::ZERO);
        }
        let width = self
            .size_hint(node, node.props.width, parent.width, SpaceDimension::Width)?
            .or(fill.width);
        let height = self
            .size_hint(node, node.props.height, parent.height, SpaceDimension::Height)?
            .or(fill.height);
        if let (Some(width), Some(height)) = (width, height) {
            return Ok(Size::new(width, height));
        }

        let natural = self.natural_size(node, Extent { width, height })?;
        Ok(Size::new(
            width.unwrap_or(natural.width),
            height.unwrap_or(natural.height),
        ))
    }

    /// Explicit size on one axis, if the node declares one. Negative sizes
    /// clamp to 0 with a warning.
    fn size_hint(
        &mut self,
        node: &ComponentNode,
        dim: Dimension,
        parent_extent: Option<u16>,
        axis: SpaceDimension,
    ) -> Result<Option<u16>, Cycle> {
        match dim {
            Dimension::Auto => Ok(None),
            Dimension::Cells(n) => Ok(Some(n)),
            Dimension::Negative(_) => {
                self.warn(&node.id, negative(axis));
                Ok(Some(0))
            }
            Dimension::Percent(pct) => match parent_extent {
                Some(extent) => Ok(Some(Dimension::percent_of(pct, extent))),
                None => match self.chain.last() {
                    Some(at) => Err(Cycle { at: at.clone() }),
                    None => Ok(None),
                },
            },
        }
    }

    /// Intrinsic border-box size: widget content for leaves, fit-content for
    /// containers. `known` carries axes already decided by the caller.
    fn natural_size(&mut self, node: &ComponentNode, known: Extent) -> Result<Size, Cycle> {
        if node.component_type.is_leaf() && node.children.is_empty() {
            let (w, h) = self.sizing.content_size(&node.widget());
            return Ok(Size::new(w, h).plus(&frame_of(node)));
        }
        self.fit_content(node, known)
    }

    fn fit_content(&mut self, node: &ComponentNode, known: Extent) -> Result<Size, Cycle> {
        if self.chain.iter().any(|id| *id == node.id) {
            return Err(Cycle {
                at: node.id.clone(),
            });
        }
        let frame = frame_of(node);
        let inner = known.shrink(&frame);

        self.chain.push(node.id.clone());
        let demand = match node.layout.mode {
            LayoutMode::None | LayoutMode::Absolute => self.absolute_demand(node, inner),
            LayoutMode::Flexbox(flex) => self.flex_demand(node, &flex, inner),
            LayoutMode::Grid(grid) => self.grid_demand(node, &grid, inner),
        };
        self.chain.pop();

        match demand {
            Ok(size) => Ok(size.plus(&frame)),
            Err(cycle) if cycle.at == node.id => {
                self.mark_cyclic(node);
                Ok(Size::ZERO)
            }
            Err(cycle) => Err(cycle),
        }
    }

    fn mark_cyclic(&mut self, node: &ComponentNode) {
        debug!(node = %node.id, "circular size dependency");
        self.cyclic.insert(node.id.clone());
        self.warn(&node.id, LayoutWarning::CircularDependency);
    }

    /// Extent needed to hold absolutely placed children at their offsets.
    fn absolute_demand(&mut self, node: &ComponentNode, inner: Extent) -> Result<Size, Cycle> {
        let mut width = 0u32;
        let mut height = 0u32;
        for child in node.visible_children() {
            let size = self.outer_size(child, inner, Extent::UNKNOWN)?;
            let margin = child.layout.margin;
            width = width.max(
                u32::from(child.layout.x)
                    + u32::from(margin.horizontal())
                    + u32::from(size.width),
            );
            height = height.max(
                u32::from(child.layout.y) + u32::from(margin.vertical()) + u32::from(size.height),
            );
        }
        Ok(Size::new(clamp_u32(width), clamp_u32(height)))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Whether `node` takes the space its parent offers on auto axes. Empty
/// flexbox and grid containers shrink to their frame.
pub(crate) fn fills_region(node: &ComponentNode) -> bool {
    if !node.component_type.is_container() {
        return false;
    }
    match node.layout.mode {
        LayoutMode::Flexbox(_) | LayoutMode::Grid(_) => node.visible_children().next().is_some(),
        LayoutMode::None | LayoutMode::Absolute => true,
    }
}

/// Border thickness plus padding.
pub(crate) fn frame_of(node: &ComponentNode) -> Edges {
    let border = node
        .style
        .border_config()
        .map(|config| config.insets())
        .unwrap_or(Edges::ZERO);
    border.plus(&node.layout.padding)
}

pub(crate) fn overflow(axis: Axis, amount: u32) -> LayoutWarning {
    LayoutWarning::Overflow { axis, amount }
}

pub(crate) fn negative(dimension: SpaceDimension) -> LayoutWarning {
    LayoutWarning::NegativeSpace { dimension }
}

pub(crate) fn clamp_u32(v: u32) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

pub(crate) fn add_cells(base: u16, offset: u32) -> u16 {
    clamp_u32(u32::from(base) + offset)
}

pub(crate) fn sub_cells(base: u16, taken: u32) -> u16 {
    clamp_u32(u32::from(base).saturating_sub(taken))
}
