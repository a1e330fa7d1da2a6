//! Pictor Core - visual image-transformation editor
//!
//! This crate holds the editor model behind Pictor: tool state with
//! undo/redo history, the transformation schema registry, a compiler that
//! turns committed edits into a delivery URL, and a canvas synchronizer
//! that mirrors state into a retained scene and back.
//!
//! Rendering, networking and timers belong to the host. The crate exposes
//! them as plain data ([`canvas::Primitive`]), traits
//! ([`canvas::ImageFetcher`], [`canvas::Sleeper`],
//! [`compile::TransformationEncoder`]) and explicit clock parameters.

pub mod canvas;
pub mod compile;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod schema;
pub mod state;

pub use canvas::{CanvasEvent, CanvasSynchronizer, Notification};
pub use compile::{Compiler, Operation, QueryEncoder, TransformationEncoder};
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, EditorResult, ResourceError, ValidationError};
pub use geometry::{Point, Rect, Size};
pub use state::{reduce, Action, EditorState, Snapshot, Tool};
