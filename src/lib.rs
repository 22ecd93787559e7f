//! TUI Studio — Layout Core and FFI Entry Points
//!
//! The library modules hold all logic. This file declares them and exposes a
//! small C ABI over the global context. Each `extern "C"` function:
//! 1. Wraps its body in `catch_unwind`
//! 2. Validates pointers and UTF-8 at the boundary
//! 3. Delegates to the context or a module function
//! 4. Returns a status code (or the byte length of its output)
//!
//! No business logic lives in the FFI functions.

// Raw-pointer arguments are part of the C ABI contract. Marking the entry
// points `unsafe fn` would change their signatures; pointers are null-checked
// inside each body before use.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

pub mod border;
mod context;
pub mod document;
pub mod drag;
mod flex;
mod grid;
pub mod layout;
pub mod preview;
pub mod sizing;
pub mod text_utils;
pub mod tree;
pub mod types;

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Deserialize;

use context::{
    clear_last_error, destroy_context, init_context, set_last_error, with_context,
    with_context_mut,
};

pub use border::{content_area, render_box, render_divider, BorderConfig, BorderSides, BorderStyle};
pub use document::{DocumentError, TuiDocument};
pub use drag::{DragPayload, DragState, DropOutcome};
pub use layout::{DebugInfo, LayoutEngine};
pub use preview::render_frame;
pub use sizing::SizingTable;
pub use tree::{ComponentTree, NewComponent, TreeError};
pub use types::{
    ComponentNode, ComponentType, Dimension, Edges, FlexLayout, GridLayout, LayoutMode,
    LayoutSpec, LayoutWarning, ResolvedBox, StyleSpec,
};

// ============================================================================
// Safety wrapper: every FFI entry point uses this pattern
// ============================================================================

/// Wrap an FFI function body. Returns 0 on success, -1 on error, -2 on panic.
fn ffi_wrap(f: impl FnOnce() -> Result<i32, String>) -> i32 {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(code)) => code,
        Ok(Err(msg)) => {
            set_last_error(msg);
            -1
        }
        Err(_) => {
            set_last_error("internal panic".to_string());
            -2
        }
    }
}

/// Borrow `len` bytes at `ptr` as UTF-8. Null or empty input reads as "".
fn read_str<'a>(ptr: *const u8, len: u32) -> Result<&'a str, String> {
    if ptr.is_null() || len == 0 {
        return Ok("");
    }
    let slice = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8".to_string())
}

/// Copy `text` into a caller-provided buffer, null-terminating when there is
/// room. Returns the full byte length so callers can retry with a larger
/// buffer when it exceeds `buffer_len`.
fn write_out(text: &str, buffer: *mut u8, buffer_len: u32) -> Result<i32, String> {
    let bytes = text.as_bytes();
    let total = i32::try_from(bytes.len()).map_err(|_| "Output too large".to_string())?;
    if buffer.is_null() {
        return Ok(total);
    }
    let copy_len = bytes.len().min(buffer_len as usize);
    unsafe {
        if copy_len > 0 {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, copy_len);
        }
        if (buffer_len as usize) > copy_len {
            *buffer.add(copy_len) = 0;
        }
    }
    Ok(total)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[no_mangle]
pub extern "C" fn tui_init() -> i32 {
    ffi_wrap(|| {
        init_context()?;
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn tui_shutdown() -> i32 {
    ffi_wrap(|| {
        destroy_context()?;
        Ok(0)
    })
}

// ============================================================================
// Layout
// ============================================================================

/// Replace the intrinsic sizing table (JSON, camelCase keys, all optional).
#[no_mangle]
pub extern "C" fn tui_set_sizing_table(ptr: *const u8, len: u32) -> i32 {
    ffi_wrap(|| {
        let json = read_str(ptr, len)?;
        with_context_mut(|ctx| ctx.load_sizing(json))?;
        Ok(0)
    })
}

/// Lay out a tree snapshot (JSON). Empty input means "no root".
#[no_mangle]
pub extern "C" fn tui_calculate_layout(ptr: *const u8, len: u32, width: i32, height: i32) -> i32 {
    ffi_wrap(|| {
        let json = read_str(ptr, len)?;
        with_context_mut(|ctx| ctx.load_tree(json, width, height))?;
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn tui_get_layout(
    id_ptr: *const u8,
    id_len: u32,
    x: *mut i32,
    y: *mut i32,
    w: *mut i32,
    h: *mut i32,
) -> i32 {
    ffi_wrap(|| {
        let id = read_str(id_ptr, id_len)?;
        let bounds = with_context(|ctx| {
            ctx.engine
                .get_layout(id)
                .ok_or_else(|| format!("No layout for node: {id}"))
        })?;
        unsafe {
            if !x.is_null() {
                *x = i32::from(bounds.x);
            }
            if !y.is_null() {
                *y = i32::from(bounds.y);
            }
            if !w.is_null() {
                *w = i32::from(bounds.width);
            }
            if !h.is_null() {
                *h = i32::from(bounds.height);
            }
        }
        Ok(0)
    })
}

/// Bounds, content box and warnings of one node as JSON.
#[no_mangle]
pub extern "C" fn tui_get_debug_info(
    id_ptr: *const u8,
    id_len: u32,
    buffer: *mut u8,
    buffer_len: u32,
) -> i32 {
    ffi_wrap(|| {
        let id = read_str(id_ptr, id_len)?;
        let json = with_context(|ctx| ctx.debug_info_json(id))?;
        write_out(&json, buffer, buffer_len)
    })
}

/// Ids of nodes with warnings, in tree order, as a JSON array.
#[no_mangle]
pub extern "C" fn tui_get_nodes_with_warnings(buffer: *mut u8, buffer_len: u32) -> i32 {
    ffi_wrap(|| {
        let json = with_context(|ctx| ctx.warnings_json())?;
        write_out(&json, buffer, buffer_len)
    })
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Deserialize)]
struct RenderBoxRequest {
    width: u16,
    height: u16,
    #[serde(default)]
    config: BorderConfig,
    #[serde(default)]
    content: Vec<String>,
}

/// Render a bordered box from a JSON request
/// (`{ width, height, config?, content? }`) as newline-joined lines.
#[no_mangle]
pub extern "C" fn tui_render_box(
    ptr: *const u8,
    len: u32,
    buffer: *mut u8,
    buffer_len: u32,
) -> i32 {
    ffi_wrap(|| {
        let json = read_str(ptr, len)?;
        let request: RenderBoxRequest =
            serde_json::from_str(json).map_err(|e| format!("Invalid render request: {e}"))?;
        let lines = render_box(&request.content, request.width, request.height, &request.config);
        write_out(&lines.join("\n"), buffer, buffer_len)
    })
}

/// Preview of the last layout, one viewport row per line.
#[no_mangle]
pub extern "C" fn tui_render_preview(buffer: *mut u8, buffer_len: u32) -> i32 {
    ffi_wrap(|| {
        let text = with_context(|ctx| Ok(ctx.preview_text()))?;
        write_out(&text, buffer, buffer_len)
    })
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Pointer to the last error as a C string, or null. Valid until the next
/// call that sets or clears the error.
#[no_mangle]
pub extern "C" fn tui_get_last_error() -> *const std::os::raw::c_char {
    catch_unwind(AssertUnwindSafe(|| {
        with_context(|ctx| {
            Ok(ctx
                .last_error
                .as_ref()
                .map_or(std::ptr::null(), |msg| msg.as_ptr()))
        })
        .unwrap_or(std::ptr::null())
    }))
    .unwrap_or(std::ptr::null())
}

#[no_mangle]
pub extern "C" fn tui_clear_error() {
    let _ = catch_unwind(AssertUnwindSafe(clear_last_error));
}

#[no_mangle]
pub extern "C" fn tui_set_debug(enabled: u8) -> i32 {
    ffi_wrap(|| {
        with_context_mut(|ctx| {
            ctx.debug_mode = enabled != 0;
            Ok(0)
        })
    })
}

/// 0: last layout time (μs), 1: laid-out nodes, 2: nodes with warnings.
#[no_mangle]
pub extern "C" fn tui_get_perf_counter(counter_id: u32) -> u64 {
    catch_unwind(AssertUnwindSafe(|| -> u64 {
        with_context(|ctx| {
            Ok(match counter_id {
                0 => ctx.engine.perf_layout_us(),
                1 => ctx.engine.node_count() as u64,
                2 => ctx.engine.get_nodes_with_warnings().len() as u64,
                _ => 0,
            })
        })
        .unwrap_or(0)
    }))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{get_last_error_snapshot, is_context_initialized};

    fn out(f: impl Fn(*mut u8, u32) -> i32) -> String {
        let needed = f(std::ptr::null_mut(), 0);
        assert!(needed >= 0, "call failed: {:?}", get_last_error_snapshot());
        let mut buf = vec![0u8; needed as usize + 1];
        let written = f(buf.as_mut_ptr(), buf.len() as u32);
        assert_eq!(written, needed);
        buf.truncate(needed as usize);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_out_truncates_and_terminates() {
        let mut buf = [0xffu8; 4];
        assert_eq!(write_out("hello", buf.as_mut_ptr(), 4).unwrap(), 5);
        assert_eq!(&buf, b"hell");

        let mut buf = [0xffu8; 8];
        assert_eq!(write_out("hi", buf.as_mut_ptr(), 8).unwrap(), 2);
        assert_eq!(&buf[..3], b"hi\0");
    }

    #[test]
    fn test_read_str() {
        assert_eq!(read_str(std::ptr::null(), 5).unwrap(), "");
        let bytes = [0xffu8, 0xfe];
        assert!(read_str(bytes.as_ptr(), 2).is_err());
    }

    #[test]
    fn test_render_box_over_ffi() {
        let request = r#"{"width": 6, "height": 3, "config": {"style": "single"}, "content": [" OK"]}"#;
        let text = out(|buf, len| {
            tui_render_box(request.as_ptr(), request.len() as u32, buf, len)
        });
        assert_eq!(text, "┌────┐\n│ OK │\n└────┘");
    }

    // The global context is shared, so the whole lifecycle runs in one test.
    #[test]
    fn test_context_lifecycle() {
        assert_eq!(tui_init(), 0);
        assert!(is_context_initialized().unwrap());
        assert_eq!(tui_init(), -1);

        assert_eq!(tui_set_debug(1), 0);
        assert_eq!(with_context(|ctx| Ok(ctx.debug_mode)), Ok(true));
        assert_eq!(tui_set_debug(0), 0);
        assert_eq!(with_context(|ctx| Ok(ctx.debug_mode)), Ok(false));

        let tree = r#"{
            "id": "root", "type": "Box", "layout": {"type": "absolute"},
            "children": [{"id": "ok", "type": "Button", "props": {"label": "OK"},
                          "layout": {"x": 2, "y": 2}, "style": {"border": true}}]
        }"#;
        assert_eq!(tui_calculate_layout(tree.as_ptr(), tree.len() as u32, 80, 24), 0);

        let id = "ok";
        let (mut x, mut y, mut w, mut h) = (0, 0, 0, 0);
        assert_eq!(
            tui_get_layout(id.as_ptr(), id.len() as u32, &mut x, &mut y, &mut w, &mut h),
            0
        );
        assert_eq!((x, y, w, h), (2, 2, 6, 3));

        let info = out(|buf, len| tui_get_debug_info(id.as_ptr(), id.len() as u32, buf, len));
        assert!(info.contains("\"warnings\":[]"));
        assert_eq!(out(|buf, len| tui_get_nodes_with_warnings(buf, len)), "[]");
        assert_eq!(tui_get_perf_counter(1), 2);

        let preview = out(|buf, len| tui_render_preview(buf, len));
        assert_eq!(preview.lines().nth(3), Some(&*format!("  │ OK │{}", " ".repeat(72))));

        let sizing = r#"{"buttonLabelPadding": 2}"#;
        assert_eq!(tui_set_sizing_table(sizing.as_ptr(), sizing.len() as u32), 0);
        assert_eq!(
            tui_get_layout(id.as_ptr(), id.len() as u32, &mut x, &mut y, &mut w, &mut h),
            0
        );
        assert_eq!(w, 8);

        let missing = "nope";
        assert_eq!(
            tui_get_layout(missing.as_ptr(), missing.len() as u32, &mut x, &mut y, &mut w, &mut h),
            -1
        );
        let ptr = tui_get_last_error();
        assert!(!ptr.is_null());
        let msg = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(msg.to_str().unwrap(), "No layout for node: nope");
        tui_clear_error();
        assert!(tui_get_last_error().is_null());

        assert_eq!(tui_calculate_layout(std::ptr::null(), 0, 80, 24), 0);
        assert_eq!(tui_get_perf_counter(1), 0);

        assert_eq!(tui_shutdown(), 0);
        assert!(!is_context_initialized().unwrap());
        assert_eq!(tui_calculate_layout(tree.as_ptr(), tree.len() as u32, 80, 24), -1);
    }
}
