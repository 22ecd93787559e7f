//! Drag Module — Explicit drag-and-drop state for the editor.
//!
//! A drag carries either a palette component type or an existing node id.
//! Dropping always ends the drag, whether or not the drop succeeded.

use tracing::debug;

use crate::tree::{ComponentTree, NewComponent, TreeError};
use crate::types::ComponentType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    NewComponent(ComponentType),
    ExistingComponent(String),
}

/// What a successful drop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Added(String),
    Moved(String),
    /// Nothing to do (no active drag, or a node dropped onto itself).
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct DragState {
    payload: Option<DragPayload>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, payload: DragPayload) {
        debug!(?payload, "drag start");
        self.payload = Some(payload);
    }

    pub fn end(&mut self) -> Option<DragPayload> {
        self.payload.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.payload.is_some()
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        self.payload.as_ref()
    }

    /// Apply the current drag to `tree` with `target_id` as the new parent.
    ///
    /// New components get a default root when the tree is empty; the target
    /// is then ignored in favour of the root.
    pub fn drop_onto(
        &mut self,
        tree: &mut ComponentTree,
        target_id: &str,
    ) -> Result<DropOutcome, TreeError> {
        let Some(payload) = self.end() else {
            return Ok(DropOutcome::Ignored);
        };
        match payload {
            DragPayload::NewComponent(kind) => {
                let parent = if tree.root().is_none() {
                    tree.ensure_root()
                } else {
                    target_id.to_string()
                };
                let id = tree.add_component(&parent, NewComponent::for_type(kind))?;
                Ok(DropOutcome::Added(id))
            }
            DragPayload::ExistingComponent(id) if id == target_id => Ok(DropOutcome::Ignored),
            DragPayload::ExistingComponent(id) => {
                tree.move_component(&id, target_id)?;
                Ok(DropOutcome::Moved(id))
            }
        }
    }
}
