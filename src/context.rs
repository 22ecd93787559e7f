//! StudioContext struct and global state accessor.
//!
//! The context owns the state behind the C ABI: the layout engine, the last
//! tree snapshot handed in by the host, and diagnostics.
//! A single global instance is managed via `tui_init()` / `tui_shutdown()`.

use std::ffi::CString;
use std::sync::{OnceLock, RwLock};

use crate::layout::LayoutEngine;
use crate::preview::render_frame;
use crate::sizing::SizingTable;
use crate::types::ComponentNode;

pub struct StudioContext {
    // Layout Module
    pub engine: LayoutEngine,
    pub root: Option<ComponentNode>,
    pub viewport: (i32, i32),

    // Diagnostics
    pub last_error: Option<CString>,
    /// Set by `tui_set_debug`.
    pub debug_mode: bool,
}

impl Default for StudioContext {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioContext {
    pub fn new() -> Self {
        Self {
            engine: LayoutEngine::new(),
            root: None,
            viewport: (0, 0),
            last_error: None,
            debug_mode: false,
        }
    }

    /// Parse a tree snapshot and lay it out. Empty input clears the root.
    pub fn load_tree(&mut self, json: &str, width: i32, height: i32) -> Result<(), String> {
        let root = if json.trim().is_empty() {
            None
        } else {
            let node: ComponentNode =
                serde_json::from_str(json).map_err(|e| format!("Invalid tree JSON: {e}"))?;
            Some(node)
        };
        self.root = root;
        self.viewport = (width, height);
        self.engine
            .calculate_layout(self.root.as_ref(), width, height);
        Ok(())
    }

    /// Replace the sizing table and re-run the last layout with it.
    pub fn load_sizing(&mut self, json: &str) -> Result<(), String> {
        let sizing: SizingTable =
            serde_json::from_str(json).map_err(|e| format!("Invalid sizing table JSON: {e}"))?;
        self.engine.set_sizing(sizing);
        let (width, height) = self.viewport;
        self.engine
            .calculate_layout(self.root.as_ref(), width, height);
        Ok(())
    }

    pub fn debug_info_json(&self, id: &str) -> Result<String, String> {
        let info = self
            .engine
            .get_debug_info(id)
            .ok_or_else(|| format!("No layout for node: {id}"))?;
        serde_json::to_string(&info).map_err(|e| e.to_string())
    }

    pub fn warnings_json(&self) -> Result<String, String> {
        serde_json::to_string(self.engine.get_nodes_with_warnings()).map_err(|e| e.to_string())
    }

    /// Preview of the last layout, one line per viewport row.
    pub fn preview_text(&self) -> String {
        let (width, height) = self.viewport;
        let clamp = |v: i32| v.clamp(0, i32::from(u16::MAX)) as u16;
        render_frame(self.root.as_ref(), &self.engine, clamp(width), clamp(height)).join("\n")
    }
}

// ============================================================================
// Global State
// ============================================================================

static CONTEXT: OnceLock<RwLock<Option<StudioContext>>> = OnceLock::new();

fn context_lock() -> &'static RwLock<Option<StudioContext>> {
    CONTEXT.get_or_init(|| RwLock::new(None))
}

fn lock_poisoned(name: &str, detail: impl std::fmt::Display) -> String {
    format!("{name} lock poisoned after panic: {detail}")
}

const NOT_INITIALIZED: &str = "Context not initialized. Call tui_init() first.";

/// Run `f` against the global context under a read lock.
pub fn with_context<T>(f: impl FnOnce(&StudioContext) -> Result<T, String>) -> Result<T, String> {
    let guard = context_lock()
        .read()
        .map_err(|e| lock_poisoned("context", e))?;
    match guard.as_ref() {
        Some(ctx) => f(ctx),
        None => Err(NOT_INITIALIZED.to_string()),
    }
}

/// Run `f` against the global context under the write lock.
pub fn with_context_mut<T>(
    f: impl FnOnce(&mut StudioContext) -> Result<T, String>,
) -> Result<T, String> {
    let mut guard = context_lock()
        .write()
        .map_err(|e| lock_poisoned("context", e))?;
    match guard.as_mut() {
        Some(ctx) => f(ctx),
        None => Err(NOT_INITIALIZED.to_string()),
    }
}

/// Initialize the global context.
pub fn init_context() -> Result<(), String> {
    let mut guard = context_lock()
        .write()
        .map_err(|e| lock_poisoned("context", e))?;
    if guard.is_some() {
        return Err("Context already initialized. Call tui_shutdown() first.".to_string());
    }
    *guard = Some(StudioContext::new());
    Ok(())
}

/// Check whether a context is currently initialized.
#[cfg(test)]
pub fn is_context_initialized() -> Result<bool, String> {
    let guard = context_lock()
        .read()
        .map_err(|e| lock_poisoned("context", e))?;
    Ok(guard.is_some())
}

/// Destroy the global context. Returns whether one existed.
pub fn destroy_context() -> Result<bool, String> {
    let mut guard = context_lock()
        .write()
        .map_err(|e| lock_poisoned("context", e))?;
    Ok(guard.take().is_some())
}

/// Store an error message in the global context (best-effort; ignores if no context).
pub fn set_last_error(msg: String) {
    if let Ok(mut guard) = context_lock().write() {
        if let Some(ctx) = guard.as_mut() {
            ctx.last_error = Some(to_c_string(msg));
        }
    }
}

/// Clear the context-bound error message.
pub fn clear_last_error() {
    if let Ok(mut guard) = context_lock().write() {
        if let Some(ctx) = guard.as_mut() {
            ctx.last_error = None;
        }
    }
}

/// Snapshot the last error into owned memory.
#[cfg(test)]
pub fn get_last_error_snapshot() -> Option<String> {
    let guard = context_lock().read().ok()?;
    guard
        .as_ref()?
        .last_error
        .as_deref()
        .map(std::ffi::CStr::to_string_lossy)
        .map(|s| s.into_owned())
}

fn to_c_string(msg: String) -> CString {
    CString::new(msg.replace('\0', " ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree_json() -> String {
        json!({
            "id": "root",
            "type": "Box",
            "layout": {"type": "absolute"},
            "children": [{
                "id": "ok",
                "type": "Button",
                "props": {"label": "OK"},
                "layout": {"x": 2, "y": 2},
                "style": {"border": true, "borderStyle": "single"}
            }]
        })
        .to_string()
    }

    #[test]
    fn test_load_tree_and_debug_info() {
        let mut ctx = StudioContext::new();
        ctx.load_tree(&tree_json(), 80, 24).unwrap();
        let info: serde_json::Value =
            serde_json::from_str(&ctx.debug_info_json("ok").unwrap()).unwrap();
        assert_eq!(info["bounds"]["x"], 2);
        assert_eq!(info["bounds"]["width"], 6);
        assert_eq!(ctx.warnings_json().unwrap(), "[]");
        assert!(ctx.debug_info_json("missing").is_err());
    }

    #[test]
    fn test_empty_tree_clears_root() {
        let mut ctx = StudioContext::new();
        ctx.load_tree(&tree_json(), 80, 24).unwrap();
        ctx.load_tree("  ", 80, 24).unwrap();
        assert!(ctx.root.is_none());
        assert_eq!(ctx.engine.node_count(), 0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let mut ctx = StudioContext::new();
        let err = ctx.load_tree("{\"id\":", 10, 10).unwrap_err();
        assert!(err.starts_with("Invalid tree JSON"));
        assert!(ctx.load_sizing("[1,2]").is_err());
    }

    #[test]
    fn test_sizing_reloads_layout() {
        let mut ctx = StudioContext::new();
        ctx.load_tree(&tree_json(), 80, 24).unwrap();
        ctx.load_sizing(r#"{"buttonLabelPadding": 3}"#).unwrap();
        assert_eq!(ctx.engine.get_layout("ok").unwrap().width, 10);
    }

    #[test]
    fn test_preview_text() {
        let mut ctx = StudioContext::new();
        ctx.load_tree(&tree_json(), 8, 5).unwrap();
        let text = ctx.preview_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "  │ OK │");
    }

    #[test]
    fn test_c_string_strips_nul() {
        let c = to_c_string("a\0b".to_string());
        assert_eq!(c.to_str().unwrap(), "a b");
    }
}
