//! Per-tool option records and the snapshot that groups them.
//!
//! Every record defaults to "no edit": compiling a default snapshot yields
//! no operations at all.

use serde::{Deserialize, Serialize};

use crate::compile::Pipeline;
use crate::geometry::{fit_aspect_within, Rect};

/// Editing mode; at most one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    None,
    Crop,
    Resize,
    Adjust,
    Background,
    AiUpscaler,
    AiImageExtender,
    AiRetouch,
}

impl Tool {
    /// Tools that put a manipulable box on the canvas.
    pub fn has_box(self) -> bool {
        matches!(self, Tool::Crop | Tool::Resize | Tool::AiImageExtender)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CropMode {
    #[default]
    Freeform,
    /// Fixed `width : height` ratio.
    Ratio { width: f64, height: f64 },
}

impl CropMode {
    pub fn square() -> Self {
        CropMode::Ratio {
            width: 1.0,
            height: 1.0,
        }
    }

    /// Width divided by height, if locked.
    pub fn ratio(&self) -> Option<f64> {
        match *self {
            CropMode::Freeform => None,
            CropMode::Ratio { width, height } if width > 0.0 && height > 0.0 => {
                Some(width / height)
            }
            CropMode::Ratio { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    pub mode: CropMode,
    /// Crop rectangle in image pixels; `None` means the full image.
    pub rect: Option<Rect>,
}

impl CropOptions {
    /// Rectangle the crop box should show inside `bounds`.
    ///
    /// Without an explicit rectangle the full bounds are used, ratio-locked
    /// and centred when the mode is fixed.
    pub fn effective_rect(&self, bounds: &Rect) -> Rect {
        match (self.rect, self.mode.ratio()) {
            (Some(rect), Some(ratio)) => fit_aspect_within(&rect, ratio, bounds),
            (Some(rect), None) => rect.clamp_within(bounds),
            (None, Some(ratio)) => {
                let fitted = fit_aspect_within(bounds, ratio, bounds);
                Rect::centered(bounds.center(), fitted.size())
            }
            (None, None) => *bounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    #[default]
    Absolute,
    Percentage,
}

/// How the image is laid out inside the resize box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Aspect-preserving cover, centred, clipped to the box.
    FillScreen,
    /// Aspect-preserving contain, centred.
    #[default]
    FitScreen,
    /// Independent scale per axis.
    Stretch,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    pub mode: ResizeMode,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Fraction of the source size, e.g. `0.5` for half.
    pub percentage: Option<f64>,
    pub lock_aspect: bool,
    pub scale_mode: ScaleMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnsharpMask {
    pub radius: f64,
    pub sigma: f64,
    pub amount: f64,
    pub threshold: f64,
}

impl Default for UnsharpMask {
    fn default() -> Self {
        Self {
            radius: 2.0,
            sigma: 2.0,
            amount: 0.8,
            threshold: 0.024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustOptions {
    pub grayscale: bool,
    pub contrast: bool,
    /// Sharpen amount (1-100).
    pub sharpen: Option<u32>,
    pub unsharp_mask: Option<UnsharpMask>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    #[default]
    None,
    Color,
    Blurred,
    GenerativeFill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurIntensity {
    #[default]
    Auto,
    Value(u32),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundOptions {
    pub kind: BackgroundKind,
    /// Hex colour without `#`, upper case.
    pub color: Option<String>,
    pub blur_intensity: BlurIntensity,
    pub blur_brightness: Option<i32>,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscalerOptions {
    /// Clamped to `[1, 4]`.
    pub factor: Option<f64>,
    /// Captured once, on the first factor assignment.
    pub original_dimensions: Option<Dimensions>,
    pub scaled_dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtenderOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lock_aspect: bool,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetouchOptions {
    pub enabled: bool,
}

/// Immutable copy of every tool option record at one point in history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub crop: CropOptions,
    pub resize: ResizeOptions,
    pub adjust: AdjustOptions,
    pub background: BackgroundOptions,
    pub upscaler: UpscalerOptions,
    pub extender: ExtenderOptions,
    pub retouch: RetouchOptions,
    /// User-assembled transformations applied after the tool stages.
    pub custom: Pipeline,
}

impl Snapshot {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
