//! Snapshot to operation-list compilation.

use serde::Serialize;
use tracing::debug;

use super::encode::{QueryEncoder, TransformationEncoder};
use super::{Operation, TransformationItem};
use crate::error::{EditorResult, ValidationError};
use crate::schema::{self, FieldValue, ValueMap};
use crate::state::{BackgroundKind, BlurIntensity, ResizeMode, ScaleMode, Snapshot, Tool};

/// Tool-derived stages, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Background,
    ImageExtender,
    Extract,
    Resize,
    Grayscale,
    Contrast,
    Sharpen,
    UnsharpMask,
    Upscaler,
    Retouch,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Background,
        Stage::ImageExtender,
        Stage::Extract,
        Stage::Resize,
        Stage::Grayscale,
        Stage::Contrast,
        Stage::Sharpen,
        Stage::UnsharpMask,
        Stage::Upscaler,
        Stage::Retouch,
    ];

    /// Registry key the stage compiles through.
    pub fn key(self) -> &'static str {
        match self {
            Stage::Background => "background",
            Stage::ImageExtender => "ai_image_extender",
            Stage::Extract => "extract",
            Stage::Resize => "resize",
            Stage::Grayscale => "grayscale",
            Stage::Contrast => "contrast",
            Stage::Sharpen => "sharpen",
            Stage::UnsharpMask => "unsharp_mask",
            Stage::Upscaler => "ai_upscaler",
            Stage::Retouch => "ai_retouch",
        }
    }

    /// The stage a geometry tool edits; its preview stops just before it.
    pub fn edited_by(tool: Tool) -> Option<Stage> {
        match tool {
            Tool::Crop => Some(Stage::Extract),
            Tool::Resize => Some(Stage::Resize),
            Tool::AiImageExtender => Some(Stage::ImageExtender),
            _ => None,
        }
    }
}

fn num(n: impl Into<f64>) -> FieldValue {
    FieldValue::Number(n.into())
}

fn stage_values(stage: Stage, snap: &Snapshot) -> Option<ValueMap> {
    let mut v = ValueMap::new();
    let mut set = |name: &str, value: FieldValue| {
        v.insert(name.to_string(), value);
    };

    match stage {
        Stage::Background => {
            let bg = &snap.background;
            match bg.kind {
                BackgroundKind::None => return None,
                BackgroundKind::Color => {
                    set("background_type", FieldValue::text("color"));
                    set("background_color", FieldValue::text(bg.color.clone()?));
                }
                BackgroundKind::Blurred => {
                    set("background_type", FieldValue::text("blurred"));
                    let intensity = match bg.blur_intensity {
                        BlurIntensity::Auto => FieldValue::text("auto"),
                        BlurIntensity::Value(n) => num(n),
                    };
                    set("background_blur_intensity", intensity);
                    if let Some(b) = bg.blur_brightness {
                        set("background_blur_brightness", num(b));
                    }
                }
                BackgroundKind::GenerativeFill => {
                    set("background_type", FieldValue::text("generative_fill"));
                    set("background_prompt", FieldValue::text(bg.prompt.clone()));
                }
            }
        }
        Stage::ImageExtender => {
            let ext = &snap.extender;
            if ext.width.is_none() && ext.height.is_none() {
                return None;
            }
            if let Some(w) = ext.width {
                set("width", num(w));
            }
            if let Some(h) = ext.height {
                set("height", num(h));
            }
            set("extend_prompt", FieldValue::text(ext.prompt.clone()));
        }
        Stage::Extract => {
            let rect = snap.crop.rect?.round();
            set("x", num(rect.left.max(0.0)));
            set("y", num(rect.top.max(0.0)));
            set("width", num(rect.width.max(1.0)));
            set("height", num(rect.height.max(1.0)));
        }
        Stage::Resize => {
            let r = &snap.resize;
            match r.mode {
                ResizeMode::Absolute => {
                    if r.width.is_none() && r.height.is_none() {
                        return None;
                    }
                    if let Some(w) = r.width {
                        set("width", num(w));
                    }
                    if let Some(h) = r.height {
                        set("height", num(h));
                    }
                }
                ResizeMode::Percentage => {
                    let p = r.percentage?;
                    set("width", FieldValue::text(format!("iw_mul_{p}")));
                    set("height", FieldValue::text(format!("ih_mul_{p}")));
                }
            }
            match r.scale_mode {
                ScaleMode::FitScreen => {}
                ScaleMode::FillScreen => set("crop", FieldValue::text("maintain_ratio")),
                ScaleMode::Stretch => set("crop", FieldValue::text("force")),
            }
        }
        Stage::Grayscale => {
            if !snap.adjust.grayscale {
                return None;
            }
            set("grayscale", FieldValue::Bool(true));
        }
        Stage::Contrast => {
            if !snap.adjust.contrast {
                return None;
            }
            set("contrast", FieldValue::Bool(true));
        }
        Stage::Sharpen => set("sharpen", num(snap.adjust.sharpen?)),
        Stage::UnsharpMask => {
            let m = snap.adjust.unsharp_mask?;
            set("radius", num(m.radius));
            set("sigma", num(m.sigma));
            set("amount", num(m.amount));
            set("threshold", num(m.threshold));
        }
        Stage::Upscaler => {
            let up = &snap.upscaler;
            up.factor?;
            set("upscale", FieldValue::Bool(true));
            if let Some(dims) = up.scaled_dimensions {
                set("width", num(dims.width));
                set("height", num(dims.height));
            }
        }
        Stage::Retouch => {
            if !snap.retouch.enabled {
                return None;
            }
            set("retouch", FieldValue::Bool(true));
        }
    }
    Some(v)
}

/// Items for every tool stage before `until`, in the fixed stage order.
pub fn stage_items(snap: &Snapshot, until: Option<Stage>) -> Result<Vec<TransformationItem>, ValidationError> {
    Stage::ALL
        .iter()
        .copied()
        .take_while(|stage| until.map_or(true, |limit| *stage < limit))
        .filter_map(|stage| stage_values(stage, snap).map(|values| (stage, values)))
        .map(|(stage, values)| TransformationItem::new(stage.key(), stage.key(), values))
        .collect()
}

/// All items a snapshot contributes: tool stages, then visible custom items.
pub fn snapshot_items(snap: &Snapshot) -> Result<Vec<TransformationItem>, ValidationError> {
    let mut items = stage_items(snap, None)?;
    items.extend(snap.custom.items().iter().cloned());
    Ok(items)
}

/// Validate and format visible items, dropping empty steps and
/// consecutive duplicates.
pub fn compile_items(items: &[TransformationItem]) -> Result<Vec<Operation>, ValidationError> {
    let mut ops: Vec<Operation> = Vec::with_capacity(items.len());
    for item in items.iter().filter(|item| item.visible) {
        schema::validate(&item.kind, &item.values)?;
        let op = schema::format(&item.kind, &item.values)?;
        if op.is_empty() || ops.last() == Some(&op) {
            continue;
        }
        ops.push(op);
    }
    Ok(ops)
}

/// Compiles snapshots and encodes them with a [`TransformationEncoder`].
#[derive(Debug, Clone, Default)]
pub struct Compiler<E = QueryEncoder> {
    encoder: E,
}

impl Compiler<QueryEncoder> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: TransformationEncoder> Compiler<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder }
    }

    pub fn compile(&self, snap: &Snapshot) -> EditorResult<Vec<Operation>> {
        let ops = compile_items(&snapshot_items(snap)?)?;
        debug!(count = ops.len(), "compiled snapshot");
        Ok(ops)
    }

    pub fn delivery_url(&self, snap: &Snapshot, source_url: &str) -> EditorResult<String> {
        Ok(self.encoder.encode(&self.compile(snap)?, source_url))
    }

    /// URL the canvas should show while `tool` is active.
    ///
    /// A geometry tool previews the image as it looks before its own stage,
    /// so the box is drawn over the input it edits. Other tools preview the
    /// full delivery URL.
    pub fn preview_url(&self, snap: &Snapshot, source_url: &str, tool: Tool) -> EditorResult<String> {
        match Stage::edited_by(tool) {
            Some(stage) => {
                let ops = compile_items(&stage_items(snap, Some(stage))?)?;
                Ok(self.encoder.encode(&ops, source_url))
            }
            None => self.delivery_url(snap, source_url),
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}
