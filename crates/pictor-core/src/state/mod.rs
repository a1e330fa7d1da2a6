//! Editor state and its reducer.
//!
//! [`EditorState`] holds the active tool, the pending option records being
//! edited, the committed [`History`], and the viewport facts the canvas
//! needs. All mutation goes through [`reduce`].

mod action;
mod history;
mod options;
mod reducer;

use serde::Serialize;

use crate::geometry::{Point, Rect, Size};

pub use action::{
    Action, AdjustPatch, BackgroundPatch, CropPatch, ExtenderPatch, ImageInfo, ResizePatch,
    RetouchPatch, UpscalerPatch, ZoomChange,
};
pub use history::History;
pub use options::{
    AdjustOptions, BackgroundKind, BackgroundOptions, BlurIntensity, CropMode, CropOptions,
    Dimensions, ExtenderOptions, ResizeMode, ResizeOptions, RetouchOptions, ScaleMode, Snapshot,
    Tool, UnsharpMask, UpscalerOptions,
};
pub use reducer::reduce;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomState {
    pub value: f64,
    /// Canvas point the last change was anchored at.
    pub pivot: Option<Point>,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            value: 1.0,
            pivot: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorState {
    pub tool: Tool,
    /// Pending edits; equal to the history head when nothing is pending.
    pub options: Snapshot,
    pub history: History,
    pub canvas: Size,
    pub zoom: ZoomState,
    pub image: Option<ImageInfo>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(History::default().limit())
    }
}

impl EditorState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            tool: Tool::None,
            options: Snapshot::default(),
            history: History::new(history_limit),
            canvas: Size::default(),
            zoom: ZoomState::default(),
            image: None,
        }
    }

    /// The snapshot the delivery URL is compiled from.
    pub fn committed(&self) -> &Snapshot {
        self.history.current()
    }

    pub fn is_dirty(&self) -> bool {
        self.options != *self.history.current()
    }

    /// Bounds of the loaded image in image pixels.
    pub fn image_bounds(&self) -> Option<Rect> {
        self.image.as_ref().map(|i| Rect::from_size(i.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let s = EditorState::new(5);
        assert_eq!(s.tool, Tool::None);
        assert_eq!(s.zoom.value, 1.0);
        assert_eq!(s.history.limit(), 5);
        assert!(!s.is_dirty());
        assert!(s.image_bounds().is_none());
    }

    #[test]
    fn test_dirty_tracks_pending_edits() {
        let mut s = EditorState::default();
        s.options.adjust.grayscale = true;
        assert!(s.is_dirty());
        assert!(s.committed().is_default());
    }
}
