//! Pictor WASM - WebAssembly bindings for Pictor
//!
//! This crate exposes the pictor-core editor to JavaScript/TypeScript hosts.
//! The host owns rendering, networking and timers; it feeds user input and
//! fetch results in and reads the scene and delivery URL back out.
//!
//! # Module Structure
//!
//! - `editor` - The editor facade: actions, canvas events, timers, loading
//! - `schema` - Transformation schema lookup and form validation
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor } from '@pictor/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor('https://cdn.example.com/photo.jpg');
//! editor.observe_canvas_resize(800, 600, Date.now());
//! editor.dispatch({ type: 'select_tool', payload: 'crop' });
//!
//! const ticket = editor.begin_preview_load();
//! if (ticket) {
//!   const res = await fetch(ticket.url);
//!   const body = new Uint8Array(await res.arrayBuffer());
//!   const step = editor.submit_response(
//!     ticket.generation, res.status, Object.fromEntries(res.headers), body);
//!   // step.kind is 'ready', 'retry', 'failed' or 'stale'
//! }
//! draw(editor.scene());
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod schema;

pub use editor::{JsEditor, LoadStep};
pub use schema::{field_visible, transformation_schema, validate_transformation};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Version of the transformation schema the bindings were built with.
#[wasm_bindgen]
pub fn schema_version() -> u32 {
    pictor_core::schema::SCHEMA_VERSION
}
