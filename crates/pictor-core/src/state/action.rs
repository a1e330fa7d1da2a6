//! Actions accepted by the reducer.
//!
//! Serialized adjacently tagged so hosts can send
//! `{ "type": "set_resize", "payload": { "width": 200 } }`.

use serde::{Deserialize, Serialize};

use super::options::{BackgroundKind, BlurIntensity, CropMode, ResizeMode, ScaleMode, Tool, UnsharpMask};
use crate::geometry::{Rect, Size};
use crate::schema::ValueMap;

/// Partial update of the crop record. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropPatch {
    pub mode: Option<CropMode>,
    pub rect: Option<Rect>,
    /// Drop the rectangle, selecting the full image again.
    pub clear_rect: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizePatch {
    pub mode: Option<ResizeMode>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub percentage: Option<f64>,
    pub lock_aspect: Option<bool>,
    pub scale_mode: Option<ScaleMode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustPatch {
    pub grayscale: Option<bool>,
    pub contrast: Option<bool>,
    /// `0` turns sharpening off.
    pub sharpen: Option<u32>,
    pub unsharp_mask: Option<UnsharpMask>,
    pub clear_unsharp_mask: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundPatch {
    pub kind: Option<BackgroundKind>,
    pub color: Option<String>,
    pub blur_intensity: Option<BlurIntensity>,
    pub blur_brightness: Option<i32>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscalerPatch {
    /// Factor as typed into the form; empty text clears it.
    pub upscaling_factor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtenderPatch {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lock_aspect: Option<bool>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetouchPatch {
    pub enabled: Option<bool>,
}

/// Zoom request, absolute or relative to the current level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomChange {
    pub value: f64,
    pub relative: bool,
    /// Pivot in canvas coordinates; the canvas centre when absent.
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Ignore any pivot and zoom around the canvas centre.
    pub is_absolute_zoom: bool,
}

impl ZoomChange {
    pub fn to(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn by(delta: f64, x: f64, y: f64) -> Self {
        Self {
            value: delta,
            relative: true,
            x: Some(x),
            y: Some(y),
            is_absolute_zoom: false,
        }
    }
}

/// Metadata of the image currently shown on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub url: String,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    SelectTool(Tool),
    SetCrop(CropPatch),
    SetResize(ResizePatch),
    SetAdjust(AdjustPatch),
    SetBackground(BackgroundPatch),
    SetUpscaler(UpscalerPatch),
    SetExtender(ExtenderPatch),
    SetRetouch(RetouchPatch),
    SetCanvasSize(Size),
    SetZoom(ZoomChange),
    ImageLoaded(ImageInfo),
    AddTransformation { kind: String, values: ValueMap },
    UpdateTransformation { id: String, values: ValueMap },
    RemoveTransformation { id: String },
    ToggleTransformation { id: String },
    MoveTransformation { id: String, to: usize },
    Commit,
    Discard,
    Undo,
    Redo,
    ResetHistory,
}

impl Action {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SelectTool(_) => "select_tool",
            Action::SetCrop(_) => "set_crop",
            Action::SetResize(_) => "set_resize",
            Action::SetAdjust(_) => "set_adjust",
            Action::SetBackground(_) => "set_background",
            Action::SetUpscaler(_) => "set_upscaler",
            Action::SetExtender(_) => "set_extender",
            Action::SetRetouch(_) => "set_retouch",
            Action::SetCanvasSize(_) => "set_canvas_size",
            Action::SetZoom(_) => "set_zoom",
            Action::ImageLoaded(_) => "image_loaded",
            Action::AddTransformation { .. } => "add_transformation",
            Action::UpdateTransformation { .. } => "update_transformation",
            Action::RemoveTransformation { .. } => "remove_transformation",
            Action::ToggleTransformation { .. } => "toggle_transformation",
            Action::MoveTransformation { .. } => "move_transformation",
            Action::Commit => "commit",
            Action::Discard => "discard",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::ResetHistory => "reset_history",
        }
    }
}
