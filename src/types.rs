//! Shared types, enums, and constants.
//!
//! The component node model, its layout intents, resolved boxes and layout
//! warnings. Everything that crosses module boundaries or the JSON wire
//! format lives here.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::border::{BorderConfig, BorderStyle};

// ============================================================================
// Component Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    Screen,
    Box,
    Grid,
    Tabs,
    Button,
    Text,
    TextInput,
    Checkbox,
    Radio,
    Select,
    List,
    Menu,
    Tree,
    ProgressBar,
    Spinner,
    Table,
    /// Any tag this crate does not know. Kept verbatim, laid out as a leaf.
    Custom(String),
}

impl ComponentType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Screen" => Self::Screen,
            "Box" => Self::Box,
            "Grid" => Self::Grid,
            "Tabs" => Self::Tabs,
            "Button" => Self::Button,
            "Text" => Self::Text,
            "TextInput" => Self::TextInput,
            "Checkbox" => Self::Checkbox,
            "Radio" => Self::Radio,
            "Select" => Self::Select,
            "List" => Self::List,
            "Menu" => Self::Menu,
            "Tree" => Self::Tree,
            "ProgressBar" => Self::ProgressBar,
            "Spinner" => Self::Spinner,
            "Table" => Self::Table,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Screen => "Screen",
            Self::Box => "Box",
            Self::Grid => "Grid",
            Self::Tabs => "Tabs",
            Self::Button => "Button",
            Self::Text => "Text",
            Self::TextInput => "TextInput",
            Self::Checkbox => "Checkbox",
            Self::Radio => "Radio",
            Self::Select => "Select",
            Self::List => "List",
            Self::Menu => "Menu",
            Self::Tree => "Tree",
            Self::ProgressBar => "ProgressBar",
            Self::Spinner => "Spinner",
            Self::Table => "Table",
            Self::Custom(tag) => tag,
        }
    }

    /// Containers may own children; every other kind is a leaf.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Screen | Self::Box | Self::Grid | Self::Tabs)
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_container()
    }
}

impl From<String> for ComponentType {
    fn from(tag: String) -> Self {
        match Self::from_tag(&tag) {
            Self::Custom(_) => Self::Custom(tag),
            known => known,
        }
    }
}

impl From<ComponentType> for String {
    fn from(kind: ComponentType) -> Self {
        match kind {
            ComponentType::Custom(tag) => tag,
            known => known.tag().to_string(),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// Numeric Normalization
// ============================================================================

/// A finite number, or a string holding one.
fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read a non-negative integer cell count. Fractions are floored, negatives
/// clamp to 0, numeric strings are accepted. Anything else is `None`.
pub(crate) fn cells_from_value(value: &Value) -> Option<u16> {
    let n = number_from_value(value)?;
    Some(n.floor().clamp(0.0, f64::from(u16::MAX)) as u16)
}

/// Format a number the way a JSON author wrote it: integers without a
/// fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ============================================================================
// Dimension (width / height sizing hint)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Dimension {
    #[default]
    Auto,
    Cells(u16),
    /// A negative cell count as written. Resolves to 0 with a
    /// negative-space warning.
    Negative(i64),
    /// Percentage of the parent's content extent.
    Percent(f64),
}

impl Dimension {
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    pub fn from_value(value: &Value) -> Self {
        if let Value::String(s) = value {
            let s = s.trim();
            if s.eq_ignore_ascii_case("auto") {
                return Self::Auto;
            }
            if let Some(pct) = s.strip_suffix('%') {
                return match pct.trim().parse::<f64>() {
                    Ok(p) if p.is_finite() => Self::Percent(p.max(0.0)),
                    _ => Self::Auto,
                };
            }
        }
        match number_from_value(value).map(f64::floor) {
            Some(n) if n < 0.0 => Self::Negative(n.max(i64::MIN as f64) as i64),
            _ => cells_from_value(value).map_or(Self::Auto, Self::Cells),
        }
    }

    /// Percentage of `extent`, floored.
    pub(crate) fn percent_of(pct: f64, extent: u16) -> u16 {
        (f64::from(extent) * pct / 100.0)
            .floor()
            .clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

impl From<Value> for Dimension {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl From<Dimension> for Value {
    fn from(dim: Dimension) -> Self {
        match dim {
            Dimension::Auto => Value::String("auto".into()),
            Dimension::Cells(n) => Value::from(n),
            Dimension::Negative(n) => Value::from(n),
            Dimension::Percent(p) => Value::String(format!("{}%", format_number(p))),
        }
    }
}

// ============================================================================
// Props
// ============================================================================

/// Widget props. Only `width`/`height` are typed here; content fields are
/// read through [`WidgetContent`], everything else passes through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Props {
    #[serde(default, skip_serializing_if = "Dimension::is_auto")]
    pub width: Dimension,
    #[serde(default, skip_serializing_if = "Dimension::is_auto")]
    pub height: Dimension,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Props {
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Missing or non-empty string. Empty strings read as missing.
    fn text_field(&self, key: &str) -> Option<String> {
        self.str_field(key)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn bool_field(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn number_field(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Widget Content (closed view over props)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetContent {
    Text {
        content: String,
    },
    Button {
        label: String,
        icon_left: Option<String>,
        icon_right: Option<String>,
        number: Option<f64>,
        separated: bool,
    },
    TextInput {
        placeholder: Option<String>,
    },
    Checkbox {
        label: String,
        checked: bool,
    },
    Radio {
        label: String,
        checked: bool,
    },
    ProgressBar {
        value: f64,
        max: f64,
    },
    Spinner {
        label: String,
    },
    /// List, Menu (`items`) and Select (`options`).
    Items {
        items: Vec<String>,
    },
    Container,
    /// Leaves without dedicated content render their type tag.
    Other {
        tag: String,
    },
}

// ============================================================================
// Layout Intent
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

impl FlexDirection {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "column" => Self::Column,
            _ => Self::Row,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

impl Justify {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "center" => Self::Center,
            "end" => Self::End,
            "space-between" => Self::SpaceBetween,
            "space-around" => Self::SpaceAround,
            _ => Self::Start,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
        }
    }
}

impl Align {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "center" => Self::Center,
            "end" => Self::End,
            "stretch" => Self::Stretch,
            _ => Self::Start,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
            Self::Stretch => "stretch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlexLayout {
    pub direction: FlexDirection,
    pub justify: Justify,
    pub align: Align,
    pub gap: u16,
    pub wrap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// 0 is accepted on input and coerced to 1 by the engine with a warning.
    pub columns: u16,
    pub rows: u16,
    pub column_gap: u16,
    pub row_gap: u16,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 2,
            rows: 2,
            column_gap: 0,
            row_gap: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Unmanaged placement. Children sit at their own `x`/`y`.
    #[default]
    None,
    Absolute,
    Flexbox(FlexLayout),
    Grid(GridLayout),
}

impl LayoutMode {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Absolute => "absolute",
            Self::Flexbox(_) => "flexbox",
            Self::Grid(_) => "grid",
        }
    }
}

/// Four-sided cell insets (padding, margin, border thickness).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Edges {
    pub const ZERO: Edges = Edges::uniform(0);

    pub const fn uniform(n: u16) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    pub fn horizontal(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }

    pub fn plus(&self, other: &Edges) -> Edges {
        Edges {
            top: self.top.saturating_add(other.top),
            right: self.right.saturating_add(other.right),
            bottom: self.bottom.saturating_add(other.bottom),
            left: self.left.saturating_add(other.left),
        }
    }

    /// A single number or a `{top,right,bottom,left}` record.
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let side = |key: &str| map.get(key).and_then(cells_from_value).unwrap_or(0);
                Self {
                    top: side("top"),
                    right: side("right"),
                    bottom: side("bottom"),
                    left: side("left"),
                }
            }
            other => Self::uniform(cells_from_value(other).unwrap_or(0)),
        }
    }

    fn to_value(self) -> Value {
        if self.top == self.right && self.right == self.bottom && self.bottom == self.left {
            Value::from(self.top)
        } else {
            serde_json::json!({
                "top": self.top,
                "right": self.right,
                "bottom": self.bottom,
                "left": self.left,
            })
        }
    }
}

/// Layout intent of one node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawLayout", into = "RawLayout")]
pub struct LayoutSpec {
    pub mode: LayoutMode,
    pub padding: Edges,
    pub margin: Edges,
    /// Offset inside an absolute or unmanaged parent.
    pub x: u16,
    pub y: u16,
    /// Keys the engine does not read.
    pub extra: Map<String, Value>,
}

impl LayoutSpec {
    pub fn absolute() -> Self {
        Self::with_mode(LayoutMode::Absolute)
    }

    pub fn flex(flex: FlexLayout) -> Self {
        Self::with_mode(LayoutMode::Flexbox(flex))
    }

    pub fn grid(grid: GridLayout) -> Self {
        Self::with_mode(LayoutMode::Grid(grid))
    }

    pub fn with_mode(mode: LayoutMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn padded(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn margined(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }
}

/// Flat wire shape of a layout intent, as the editor stores it.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawLayout {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    justify: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gap: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column_gap: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    row_gap: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    padding: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    margin: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawLayout> for LayoutSpec {
    fn from(raw: RawLayout) -> Self {
        let cells = |v: &Option<Value>, default: u16| {
            v.as_ref().and_then(cells_from_value).unwrap_or(default)
        };
        let mode = match raw.kind.as_deref() {
            Some("absolute") => LayoutMode::Absolute,
            Some("flexbox") => LayoutMode::Flexbox(FlexLayout {
                direction: raw
                    .direction
                    .as_deref()
                    .map(FlexDirection::from_tag)
                    .unwrap_or_default(),
                justify: raw
                    .justify
                    .as_deref()
                    .map(Justify::from_tag)
                    .unwrap_or_default(),
                align: raw.align.as_deref().map(Align::from_tag).unwrap_or_default(),
                gap: cells(&raw.gap, 0),
                wrap: raw.wrap.unwrap_or(false),
            }),
            Some("grid") => LayoutMode::Grid(GridLayout {
                columns: cells(&raw.columns, 2),
                rows: cells(&raw.rows, 2),
                column_gap: cells(&raw.column_gap, 0),
                row_gap: cells(&raw.row_gap, 0),
            }),
            _ => LayoutMode::None,
        };
        Self {
            mode,
            padding: raw.padding.as_ref().map(Edges::from_value).unwrap_or_default(),
            margin: raw.margin.as_ref().map(Edges::from_value).unwrap_or_default(),
            x: cells(&raw.x, 0),
            y: cells(&raw.y, 0),
            extra: raw.extra,
        }
    }
}

impl From<LayoutSpec> for RawLayout {
    fn from(spec: LayoutSpec) -> Self {
        let mut raw = RawLayout {
            kind: Some(spec.mode.tag().to_string()),
            extra: spec.extra,
            ..RawLayout::default()
        };
        match spec.mode {
            LayoutMode::Flexbox(flex) => {
                raw.direction = Some(flex.direction.tag().into());
                raw.justify = Some(flex.justify.tag().into());
                raw.align = Some(flex.align.tag().into());
                raw.gap = Some(flex.gap.into());
                raw.wrap = Some(flex.wrap);
            }
            LayoutMode::Grid(grid) => {
                raw.columns = Some(grid.columns.into());
                raw.rows = Some(grid.rows.into());
                raw.column_gap = Some(grid.column_gap.into());
                raw.row_gap = Some(grid.row_gap.into());
            }
            LayoutMode::None | LayoutMode::Absolute => {}
        }
        if spec.padding != Edges::ZERO {
            raw.padding = Some(spec.padding.to_value());
        }
        if spec.margin != Edges::ZERO {
            raw.margin = Some(spec.margin.to_value());
        }
        if spec.x != 0 {
            raw.x = Some(spec.x.into());
        }
        if spec.y != 0 {
            raw.y = Some(spec.y.into());
        }
        raw
    }
}

// ============================================================================
// Style
// ============================================================================

/// Only `border` and `borderStyle` are read; other keys pass through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSpec {
    #[serde(default)]
    pub border: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<BorderStyle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StyleSpec {
    pub fn bordered(style: BorderStyle) -> Self {
        Self {
            border: true,
            border_style: Some(style),
            extra: Map::new(),
        }
    }

    /// Border drawn around the node, if any.
    pub fn border_config(&self) -> Option<BorderConfig> {
        self.border
            .then(|| BorderConfig::new(self.border_style.unwrap_or_default()))
    }
}

// ============================================================================
// Component Node
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub layout: LayoutSpec,
    #[serde(default)]
    pub style: StyleSpec,
    #[serde(default)]
    pub events: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<ComponentNode>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub collapsed: bool,
}

impl ComponentNode {
    pub fn new(id: impl Into<String>, component_type: ComponentType) -> Self {
        let name = component_type.tag().to_string();
        Self {
            id: id.into(),
            component_type,
            name,
            props: Props::default(),
            layout: LayoutSpec::default(),
            style: StyleSpec::default(),
            events: Map::new(),
            children: Vec::new(),
            hidden: false,
            locked: false,
            collapsed: false,
        }
    }

    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_border(mut self, style: BorderStyle) -> Self {
        self.style = StyleSpec::bordered(style);
        self
    }

    pub fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.props.width = width;
        self.props.height = height;
        self
    }

    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        match key {
            "width" => self.props.width = Dimension::from_value(&value.into()),
            "height" => self.props.height = Dimension::from_value(&value.into()),
            _ => {
                self.props.fields.insert(key.to_string(), value.into());
            }
        }
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ComponentNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Children that take part in layout.
    pub fn visible_children(&self) -> impl Iterator<Item = &ComponentNode> {
        self.children.iter().filter(|c| !c.hidden)
    }

    /// Name for debug output, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Depth-first pre-order lookup.
    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ComponentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Number of nodes in this subtree, hidden ones included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Typed view of the content-bearing props.
    pub fn widget(&self) -> WidgetContent {
        let props = &self.props;
        let label = |default: &str| props.text_field("label").unwrap_or_else(|| default.into());
        match &self.component_type {
            kind if kind.is_container() => WidgetContent::Container,
            ComponentType::Text => WidgetContent::Text {
                content: props.text_field("content").unwrap_or_else(|| "Text".into()),
            },
            ComponentType::Button => {
                let icon = |enabled: &str, key: &str| {
                    props
                        .bool_field(enabled)
                        .then(|| props.text_field(key))
                        .flatten()
                };
                WidgetContent::Button {
                    label: label("Button"),
                    icon_left: icon("iconLeftEnabled", "iconLeft"),
                    icon_right: icon("iconRightEnabled", "iconRight"),
                    number: props.number_field("number"),
                    separated: props.bool_field("separated"),
                }
            }
            ComponentType::TextInput => WidgetContent::TextInput {
                placeholder: props.text_field("placeholder"),
            },
            ComponentType::Checkbox => WidgetContent::Checkbox {
                label: label("Checkbox"),
                checked: props.bool_field("checked"),
            },
            ComponentType::Radio => WidgetContent::Radio {
                label: label("Radio"),
                checked: props.bool_field("checked"),
            },
            ComponentType::ProgressBar => WidgetContent::ProgressBar {
                value: props.number_field("value").unwrap_or(0.0),
                max: props
                    .number_field("max")
                    .filter(|m| *m != 0.0)
                    .unwrap_or(100.0),
            },
            ComponentType::Spinner => WidgetContent::Spinner {
                label: label("Loading..."),
            },
            ComponentType::List | ComponentType::Menu => WidgetContent::Items {
                items: props.string_list("items"),
            },
            ComponentType::Select => {
                let options = props.string_list("options");
                WidgetContent::Items {
                    items: if options.is_empty() {
                        props.string_list("items")
                    } else {
                        options
                    },
                }
            }
            other => WidgetContent::Other {
                tag: other.tag().to_string(),
            },
        }
    }
}

// ============================================================================
// Resolved Geometry
// ============================================================================

/// Integer cell rectangle relative to the viewport origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResolvedBox {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl ResolvedBox {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        u32::from(self.x) + u32::from(self.width)
    }

    pub fn bottom(&self) -> u32 {
        u32::from(self.y) + u32::from(self.height)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && u32::from(x) < self.right() && y >= self.y && u32::from(y) < self.bottom()
    }

    /// Shrink by insets, clamping at zero size.
    pub fn inset(&self, edges: &Edges) -> ResolvedBox {
        ResolvedBox {
            x: self.x.saturating_add(edges.left),
            y: self.y.saturating_add(edges.top),
            width: self.width.saturating_sub(edges.horizontal()),
            height: self.height.saturating_sub(edges.vertical()),
        }
    }
}

// ============================================================================
// Layout Warnings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceDimension {
    Width,
    Height,
}

impl SpaceDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayoutWarning {
    Overflow { axis: Axis, amount: u32 },
    ConstraintViolation { constraint: String },
    NegativeSpace { dimension: SpaceDimension },
    CircularDependency,
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { axis, amount } => {
                write!(f, "Overflow {}-axis: {amount} cols/rows", axis.as_str())
            }
            Self::ConstraintViolation { constraint } => {
                write!(f, "Constraint violation: {constraint}")
            }
            Self::NegativeSpace { dimension } => write!(f, "Negative {}", dimension.as_str()),
            Self::CircularDependency => f.write_str("Circular dependency detected"),
        }
    }
}

// ============================================================================
// Cell & Buffer
// ============================================================================

/// One terminal cell. An empty symbol marks the trailing half of a wide glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub symbol: String,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: " ".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Buffer {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells
                .get((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x < self.width && y < self.height {
            let idx = (y as usize) * (self.width as usize) + (x as usize);
            if let Some(slot) = self.cells.get_mut(idx) {
                *slot = cell;
            }
        }
    }

    /// Rows as strings, wide-glyph continuation cells skipped.
    pub fn to_lines(&self) -> Vec<String> {
        if self.width == 0 {
            return vec![String::new(); self.height as usize];
        }
        self.cells
            .chunks(self.width as usize)
            .take(self.height as usize)
            .map(|row| row.iter().map(|c| c.symbol.as_str()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_component_type_tags() {
        assert_eq!(ComponentType::from_tag("Box"), ComponentType::Box);
        assert!(ComponentType::Grid.is_container());
        assert!(ComponentType::Button.is_leaf());

        let custom: ComponentType = serde_json::from_value(json!("Sparkline")).unwrap();
        assert_eq!(custom, ComponentType::Custom("Sparkline".into()));
        assert!(custom.is_leaf());
        assert_eq!(serde_json::to_value(&custom).unwrap(), json!("Sparkline"));
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!(Dimension::from_value(&json!(12)), Dimension::Cells(12));
        assert_eq!(Dimension::from_value(&json!(7.9)), Dimension::Cells(7));
        assert_eq!(Dimension::from_value(&json!(-3)), Dimension::Negative(-3));
        assert_eq!(Dimension::from_value(&json!("-2.5")), Dimension::Negative(-3));
        assert_eq!(Value::from(Dimension::Negative(-3)), json!(-3));
        assert_eq!(Dimension::from_value(&json!("auto")), Dimension::Auto);
        assert_eq!(Dimension::from_value(&json!("50%")), Dimension::Percent(50.0));
        assert_eq!(Dimension::from_value(&json!("15")), Dimension::Cells(15));
        assert_eq!(Dimension::from_value(&json!("wide")), Dimension::Auto);
        assert_eq!(Dimension::from_value(&json!(null)), Dimension::Auto);
        assert_eq!(Dimension::percent_of(50.0, 15), 7);
    }

    #[test]
    fn test_layout_defaults_from_json() {
        let spec: LayoutSpec = serde_json::from_value(json!({"type": "flexbox"})).unwrap();
        assert_eq!(spec.mode, LayoutMode::Flexbox(FlexLayout::default()));

        let spec: LayoutSpec = serde_json::from_value(json!({"type": "grid"})).unwrap();
        assert_eq!(spec.mode, LayoutMode::Grid(GridLayout::default()));

        let spec: LayoutSpec = serde_json::from_value(json!({"type": "carousel"})).unwrap();
        assert_eq!(spec.mode, LayoutMode::None);

        let spec: LayoutSpec = serde_json::from_value(json!({})).unwrap();
        assert_eq!(spec, LayoutSpec::default());
    }

    #[test]
    fn test_layout_edges_and_fractions() {
        let spec: LayoutSpec = serde_json::from_value(json!({
            "type": "flexbox",
            "direction": "column",
            "justify": "space-around",
            "gap": 1.7,
            "padding": 2,
            "margin": {"top": 1, "left": -4},
            "x": "3",
            "custom": true
        }))
        .unwrap();
        let LayoutMode::Flexbox(flex) = spec.mode else {
            panic!("expected flexbox");
        };
        assert_eq!(flex.direction, FlexDirection::Column);
        assert_eq!(flex.justify, Justify::SpaceAround);
        assert_eq!(flex.gap, 1);
        assert_eq!(spec.padding, Edges::uniform(2));
        assert_eq!(
            spec.margin,
            Edges {
                top: 1,
                right: 0,
                bottom: 0,
                left: 0
            }
        );
        assert_eq!(spec.x, 3);
        assert_eq!(spec.extra.get("custom"), Some(&json!(true)));

        let back = serde_json::to_value(&spec).unwrap();
        assert_eq!(back["padding"], json!(2));
        assert_eq!(back["type"], json!("flexbox"));
        assert_eq!(back["custom"], json!(true));
    }

    #[test]
    fn test_node_json_passthrough() {
        let value = json!({
            "id": "b1",
            "type": "Button",
            "name": "Save",
            "props": {"width": "50%", "label": "Save", "variant": "primary"},
            "layout": {"type": "absolute", "x": 2, "y": 1},
            "style": {"border": true, "borderStyle": "rounded", "color": "cyan"},
            "events": {"onClick": "save"},
            "children": []
        });
        let node: ComponentNode = serde_json::from_value(value).unwrap();
        assert_eq!(node.props.width, Dimension::Percent(50.0));
        assert_eq!(node.props.str_field("variant"), Some("primary"));
        assert_eq!(node.style.border_style, Some(BorderStyle::Rounded));
        assert_eq!(node.style.extra.get("color"), Some(&json!("cyan")));

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["props"]["width"], json!("50%"));
        assert_eq!(back["style"]["color"], json!("cyan"));
        assert_eq!(back["events"]["onClick"], json!("save"));
    }

    #[test]
    fn test_widget_content_views() {
        let button = ComponentNode::new("b", ComponentType::Button)
            .with_prop("label", "Go")
            .with_prop("iconLeft", "▶")
            .with_prop("iconLeftEnabled", true)
            .with_prop("iconRight", "x");
        assert_eq!(
            button.widget(),
            WidgetContent::Button {
                label: "Go".into(),
                icon_left: Some("▶".into()),
                icon_right: None,
                number: None,
                separated: false,
            }
        );

        let bar = ComponentNode::new("p", ComponentType::ProgressBar).with_prop("max", 0);
        assert_eq!(
            bar.widget(),
            WidgetContent::ProgressBar {
                value: 0.0,
                max: 100.0
            }
        );

        let select = ComponentNode::new("s", ComponentType::Select)
            .with_prop("options", json!(["a", "b"]));
        assert_eq!(
            select.widget(),
            WidgetContent::Items {
                items: vec!["a".into(), "b".into()]
            }
        );

        let table = ComponentNode::new("t", ComponentType::Table);
        assert_eq!(table.widget(), WidgetContent::Other { tag: "Table".into() });
        assert_eq!(
            ComponentNode::new("r", ComponentType::Box).widget(),
            WidgetContent::Container
        );
    }

    #[test]
    fn test_warning_wire_format_and_display() {
        let w = LayoutWarning::Overflow {
            axis: Axis::Horizontal,
            amount: 6,
        };
        assert_eq!(
            serde_json::to_value(&w).unwrap(),
            json!({"type": "overflow", "axis": "horizontal", "amount": 6})
        );
        assert_eq!(w.to_string(), "Overflow horizontal-axis: 6 cols/rows");

        let n = LayoutWarning::NegativeSpace {
            dimension: SpaceDimension::Width,
        };
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({"type": "negative-space", "dimension": "width"})
        );
        assert_eq!(n.to_string(), "Negative width");
        assert_eq!(
            serde_json::to_value(LayoutWarning::CircularDependency).unwrap(),
            json!({"type": "circular-dependency"})
        );
    }

    #[test]
    fn test_resolved_box_contains() {
        let b = ResolvedBox::new(2, 2, 6, 3);
        assert!(b.contains(2, 2));
        assert!(b.contains(7, 4));
        assert!(!b.contains(8, 4));
        assert!(!b.contains(1, 3));
        assert_eq!(b.inset(&Edges::uniform(1)), ResolvedBox::new(3, 3, 4, 1));
    }

    #[test]
    fn test_buffer_operations() {
        let mut buf = Buffer::new(4, 2);
        assert_eq!(buf.cells.len(), 8);
        buf.set(
            1,
            1,
            Cell {
                symbol: "X".into(),
            },
        );
        assert_eq!(buf.get(1, 1).map(|c| c.symbol.as_str()), Some("X"));
        assert!(buf.get(4, 0).is_none());
        assert_eq!(buf.to_lines(), vec!["    ", " X  "]);
    }
}
