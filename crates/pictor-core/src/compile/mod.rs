//! Transformation compiler.
//!
//! Walks a committed [`Snapshot`](crate::state::Snapshot) in a fixed stage
//! order, builds one registry value map per active stage, then appends the
//! visible custom pipeline items. Each map is validated and formatted
//! through the schema registry, and the resulting [`Operation`] list is
//! handed to a [`TransformationEncoder`] to produce a delivery URL.

mod compiler;
mod encode;
mod operation;
mod pipeline;

pub use compiler::{compile_items, snapshot_items, stage_items, Compiler, Stage};
pub use encode::{QueryEncoder, TransformationEncoder};
pub use operation::{Operation, Param, ParamValue};
pub use pipeline::{Pipeline, TransformationItem};
