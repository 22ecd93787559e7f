//! Tree Module — Component tree store operations.
//!
//! Responsibilities:
//! - Id allocation (sequential per kind, never reused while present)
//! - Add / remove / move with container and lock checks
//! - Presentation flags (hidden, locked, collapsed)
//! - Component library defaults for new nodes

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::border::BorderStyle;
use crate::types::{
    ComponentNode, ComponentType, Dimension, Edges, FlexDirection, FlexLayout, GridLayout,
    LayoutSpec, Props, StyleSpec,
};

pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("component not found: {0}")]
    NotFound(String),
    #[error("component {0} is a leaf and cannot have children")]
    NotAContainer(String),
    #[error("the root component cannot be removed or moved")]
    RootImmovable,
    #[error("component {0} is locked")]
    Locked(String),
    #[error("cannot move {0} into itself or its own subtree")]
    IntoOwnSubtree(String),
}

// ============================================================================
// Component Library
// ============================================================================

/// A component about to be inserted; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComponent {
    pub component_type: ComponentType,
    pub name: String,
    pub props: Props,
    pub layout: LayoutSpec,
    pub style: StyleSpec,
    pub events: Map<String, Value>,
}

impl NewComponent {
    /// Library defaults for a component kind.
    pub fn for_type(component_type: ComponentType) -> Self {
        let mut new = Self {
            name: component_type.tag().to_string(),
            component_type,
            props: Props::default(),
            layout: LayoutSpec::default(),
            style: StyleSpec::default(),
            events: Map::new(),
        };
        let column = FlexLayout {
            direction: FlexDirection::Column,
            ..FlexLayout::default()
        };

        match &new.component_type {
            ComponentType::Screen => {
                new.props.width = Dimension::Cells(80);
                new.props.height = Dimension::Cells(24);
                new.layout = LayoutSpec::flex(column);
            }
            ComponentType::Box => {
                new.layout = LayoutSpec::flex(column).padded(Edges::uniform(1));
                new.style = StyleSpec::bordered(BorderStyle::Single);
            }
            ComponentType::Grid => {
                new.layout = LayoutSpec::grid(GridLayout::default());
                new.style = StyleSpec::bordered(BorderStyle::Single);
            }
            ComponentType::Tabs => {
                new.props.fields.insert("tabs".into(), json!(["Tab 1", "Tab 2"]));
                new.layout = LayoutSpec::flex(column);
                new.style = StyleSpec::bordered(BorderStyle::Single);
            }
            ComponentType::Button => {
                new.props.fields.insert("label".into(), json!("Button"));
                new.style = StyleSpec::bordered(BorderStyle::Single);
                new.events.insert("onClick".into(), json!(""));
            }
            ComponentType::Text => {
                new.props.fields.insert("content".into(), json!("Text"));
            }
            ComponentType::TextInput => {
                new.props.fields.insert("placeholder".into(), json!("Enter text..."));
                new.style = StyleSpec::bordered(BorderStyle::Single);
                new.events.insert("onChange".into(), json!(""));
            }
            ComponentType::Checkbox => {
                new.props.fields.insert("label".into(), json!("Checkbox"));
                new.props.fields.insert("checked".into(), json!(false));
            }
            ComponentType::Radio => {
                new.props.fields.insert("label".into(), json!("Option"));
                new.props.fields.insert("checked".into(), json!(false));
            }
            ComponentType::Select => {
                new.props
                    .fields
                    .insert("options".into(), json!(["Option 1", "Option 2", "Option 3"]));
                new.style = StyleSpec::bordered(BorderStyle::Single);
            }
            ComponentType::List | ComponentType::Menu => {
                new.props
                    .fields
                    .insert("items".into(), json!(["Item 1", "Item 2", "Item 3"]));
                new.style = StyleSpec::bordered(BorderStyle::Single);
            }
            ComponentType::ProgressBar => {
                new.props.fields.insert("value".into(), json!(50));
                new.props.fields.insert("max".into(), json!(100));
            }
            ComponentType::Spinner => {
                new.props.fields.insert("label".into(), json!("Loading..."));
            }
            ComponentType::Tree | ComponentType::Table | ComponentType::Custom(_) => {}
        }
        new
    }

    fn into_node(self, id: String) -> ComponentNode {
        ComponentNode {
            id,
            component_type: self.component_type,
            name: self.name,
            props: self.props,
            layout: self.layout,
            style: self.style,
            events: self.events,
            children: Vec::new(),
            hidden: false,
            locked: false,
            collapsed: false,
        }
    }
}

/// Default root: an 80x24 bordered column with gap 1 and padding 2.
pub fn default_root() -> ComponentNode {
    let mut root = ComponentNode::new(ROOT_ID, ComponentType::Box)
        .with_size(Dimension::Cells(80), Dimension::Cells(24))
        .with_prop("theme", "dracula")
        .with_layout(
            LayoutSpec::flex(FlexLayout {
                direction: FlexDirection::Column,
                gap: 1,
                ..FlexLayout::default()
            })
            .padded(Edges::uniform(2)),
        )
        .with_border(BorderStyle::Single);
    root.name = "Root".to_string();
    root
}

// ============================================================================
// Component Tree
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ComponentTree {
    root: Option<ComponentNode>,
    next_id: u64,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: ComponentNode) -> Self {
        Self {
            root: Some(root),
            next_id: 0,
        }
    }

    pub fn root(&self) -> Option<&ComponentNode> {
        self.root.as_ref()
    }

    pub fn set_root(&mut self, root: Option<ComponentNode>) {
        self.root = root;
    }

    pub fn into_root(self) -> Option<ComponentNode> {
        self.root
    }

    /// Create the default root when none exists. Returns the root id.
    pub fn ensure_root(&mut self) -> String {
        let root = self.root.get_or_insert_with(|| {
            debug!("ensure_root: creating default root");
            default_root()
        });
        root.id.clone()
    }

    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        self.root.as_ref()?.find(id)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut ComponentNode, TreeError> {
        self.root
            .as_mut()
            .and_then(|root| root.find_mut(id))
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    fn is_root(&self, id: &str) -> bool {
        self.root.as_ref().is_some_and(|root| root.id == id)
    }

    /// Next `<kind>-<n>` id not present in the tree.
    fn generate_id(&mut self, kind: &ComponentType) -> String {
        let prefix = kind.tag().to_lowercase();
        loop {
            self.next_id += 1;
            let id = format!("{prefix}-{}", self.next_id);
            if self.find(&id).is_none() {
                return id;
            }
        }
    }

    /// Insert a new component as the last child of `parent_id`.
    pub fn add_component(
        &mut self,
        parent_id: &str,
        component: NewComponent,
    ) -> Result<String, TreeError> {
        let parent = self
            .find(parent_id)
            .ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
        if parent.component_type.is_leaf() {
            return Err(TreeError::NotAContainer(parent_id.to_string()));
        }

        let id = self.generate_id(&component.component_type);
        let node = component.into_node(id.clone());
        self.find_mut(parent_id)?.children.push(node);

        debug!(id = %id, parent = parent_id, "add_component");
        Ok(id)
    }

    /// Remove a component and its subtree. Returns the removed node.
    pub fn remove_component(&mut self, id: &str) -> Result<ComponentNode, TreeError> {
        if self.is_root(id) {
            return Err(TreeError::RootImmovable);
        }
        let node = self
            .find(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        if node.locked {
            return Err(TreeError::Locked(id.to_string()));
        }

        let removed = self
            .root
            .as_mut()
            .and_then(|root| detach(root, id))
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        debug!(id, "remove_component");
        Ok(removed)
    }

    /// Re-parent a component as the last child of `new_parent_id`.
    pub fn move_component(&mut self, id: &str, new_parent_id: &str) -> Result<(), TreeError> {
        if self.is_root(id) {
            return Err(TreeError::RootImmovable);
        }
        let node = self
            .find(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        if node.locked {
            return Err(TreeError::Locked(id.to_string()));
        }
        if node.contains(new_parent_id) {
            return Err(TreeError::IntoOwnSubtree(id.to_string()));
        }
        let parent = self
            .find(new_parent_id)
            .ok_or_else(|| TreeError::NotFound(new_parent_id.to_string()))?;
        if parent.component_type.is_leaf() {
            return Err(TreeError::NotAContainer(new_parent_id.to_string()));
        }

        let node = self
            .root
            .as_mut()
            .and_then(|root| detach(root, id))
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        self.find_mut(new_parent_id)?.children.push(node);

        debug!(id, parent = new_parent_id, "move_component");
        Ok(())
    }

    pub fn update_layout(&mut self, id: &str, layout: LayoutSpec) -> Result<(), TreeError> {
        self.find_mut(id)?.layout = layout;
        Ok(())
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> Result<(), TreeError> {
        self.find_mut(id)?.hidden = hidden;
        Ok(())
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<(), TreeError> {
        self.find_mut(id)?.locked = locked;
        Ok(())
    }

    /// Flip the collapsed flag. Returns the new value.
    pub fn toggle_collapsed(&mut self, id: &str) -> Result<bool, TreeError> {
        let node = self.find_mut(id)?;
        node.collapsed = !node.collapsed;
        Ok(node.collapsed)
    }
}

/// Remove the descendant `id` from under `node`.
fn detach(node: &mut ComponentNode, id: &str) -> Option<ComponentNode> {
    if let Some(pos) = node.children.iter().position(|c| c.id == id) {
        return Some(node.children.remove(pos));
    }
    node.children.iter_mut().find_map(|child| detach(child, id))
}
