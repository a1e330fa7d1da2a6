//! The pure `(state, action) -> state` transition.

use tracing::{debug, trace};

use super::action::{
    Action, AdjustPatch, BackgroundPatch, CropPatch, ExtenderPatch, ImageInfo, ResizePatch,
    UpscalerPatch, ZoomChange,
};
use super::options::{BlurIntensity, Dimensions, ResizeMode};
use super::EditorState;
use crate::error::{EditorResult, ValidationError};
use crate::geometry::{clamp_zoom, Point, Rect, Size};
use crate::schema::{self, normalize_color};

const MIN_UPSCALE: f64 = 1.0;
const MAX_UPSCALE: f64 = 4.0;
const MAX_PERCENTAGE: f64 = 4.0;

/// Apply one action.
///
/// The input state is never modified. On error no partial update is
/// visible; the caller keeps the previous state.
#[tracing::instrument(level = "debug", skip_all, fields(action = action.name()))]
pub fn reduce(state: &EditorState, action: Action) -> EditorResult<EditorState> {
    let mut next = state.clone();

    match action {
        Action::SelectTool(tool) => {
            if tool == state.tool {
                trace!("tool already active");
                return Ok(next);
            }
            // Switching tools abandons whatever was pending.
            next.options = next.history.current().clone();
            next.tool = tool;
        }
        Action::SetCrop(patch) => apply_crop(&mut next, patch)?,
        Action::SetResize(patch) => apply_resize(&mut next, patch)?,
        Action::SetAdjust(patch) => apply_adjust(&mut next, patch)?,
        Action::SetBackground(patch) => apply_background(&mut next, patch)?,
        Action::SetUpscaler(patch) => apply_upscaler(&mut next, patch)?,
        Action::SetExtender(patch) => apply_extender(&mut next, patch)?,
        Action::SetRetouch(patch) => {
            if let Some(enabled) = patch.enabled {
                next.options.retouch.enabled = enabled;
            }
        }
        Action::SetCanvasSize(size) => {
            if !size.width.is_finite() || !size.height.is_finite() {
                return Err(ValidationError::CanvasSize {
                    width: size.width,
                    height: size.height,
                }
                .into());
            }
            if size.is_degenerate() || size == state.canvas {
                trace!(?size, "ignoring canvas size");
                return Ok(next);
            }
            next.canvas = size;
        }
        Action::SetZoom(change) => apply_zoom(&mut next, change),
        Action::ImageLoaded(info) => apply_image(&mut next, info)?,
        Action::AddTransformation { kind, values } => {
            let id = next.options.custom.insert(&kind, values)?;
            debug!(%id, %kind, "added transformation");
        }
        Action::UpdateTransformation { id, values } => next.options.custom.update(&id, values)?,
        Action::RemoveTransformation { id } => {
            next.options.custom.remove(&id)?;
        }
        Action::ToggleTransformation { id } => {
            next.options.custom.toggle(&id)?;
        }
        Action::MoveTransformation { id, to } => next.options.custom.move_to(&id, to)?,
        Action::Commit => {
            let pushed = next.history.push(next.options.clone());
            debug!(pushed, head = next.history.head(), "commit");
        }
        Action::Discard => {
            next.options = next.history.current().clone();
            next.tool = Default::default();
        }
        Action::Undo => {
            if next.history.undo() {
                next.options = next.history.current().clone();
            }
        }
        Action::Redo => {
            if next.history.redo() {
                next.options = next.history.current().clone();
            }
        }
        Action::ResetHistory => {
            next.history.reset();
            next.options = next.history.current().clone();
            next.tool = Default::default();
        }
    }

    Ok(next)
}

fn positive(field: &str, value: u32) -> Result<u32, ValidationError> {
    if value == 0 {
        return Err(ValidationError::field(field, "must be greater than 0"));
    }
    Ok(value)
}

fn check_rect(rect: &Rect) -> Result<(), ValidationError> {
    let finite = [rect.left, rect.top, rect.width, rect.height]
        .iter()
        .all(|v| v.is_finite());
    if !finite || rect.width <= 0.0 || rect.height <= 0.0 {
        return Err(ValidationError::field(
            "rect",
            "must have a finite position and a positive size",
        ));
    }
    Ok(())
}

fn apply_crop(next: &mut EditorState, patch: CropPatch) -> Result<(), ValidationError> {
    let bounds = next.image_bounds();
    let crop = &mut next.options.crop;

    if let Some(rect) = patch.rect {
        check_rect(&rect)?;
        crop.rect = Some(rect);
    }
    if patch.clear_rect {
        crop.rect = None;
    }
    if let Some(mode) = patch.mode {
        if mode.ratio().is_none() && mode != Default::default() {
            return Err(ValidationError::field("mode", "ratio sides must be positive"));
        }
        crop.mode = mode;
    }

    // A locked ratio is refitted immediately so the stored box always
    // satisfies it. Without an image the rect is kept as given and refitted
    // once one loads.
    if let Some(bounds) = bounds {
        if crop.rect.is_some() || crop.mode.ratio().is_some() {
            crop.rect = Some(crop.effective_rect(&bounds));
        }
    }
    Ok(())
}

/// Other side of a locked-aspect pair, in whole pixels.
fn derived_side(value: u32, from: f64, to: f64) -> u32 {
    ((f64::from(value) * to / from).round() as u32).max(1)
}

fn apply_resize(next: &mut EditorState, patch: ResizePatch) -> Result<(), ValidationError> {
    let image = next.image.as_ref().map(|i| i.size);
    let resize = &mut next.options.resize;

    if let Some(mode) = patch.mode {
        if mode != resize.mode {
            match mode {
                ResizeMode::Percentage => {
                    resize.width = None;
                    resize.height = None;
                }
                ResizeMode::Absolute => resize.percentage = None,
            }
            resize.mode = mode;
        }
    }
    if let Some(lock) = patch.lock_aspect {
        resize.lock_aspect = lock;
    }
    if let Some(scale_mode) = patch.scale_mode {
        resize.scale_mode = scale_mode;
    }

    let width = patch.width.map(|w| positive("width", w)).transpose()?;
    let height = patch.height.map(|h| positive("height", h)).transpose()?;

    match resize.mode {
        ResizeMode::Percentage => {
            // Dimensions typed in percentage mode become a fraction of the
            // source instead of absolute pixels.
            let fraction = match (width, height, image) {
                (Some(w), _, Some(img)) => Some(f64::from(w) / img.width),
                (None, Some(h), Some(img)) => Some(f64::from(h) / img.height),
                _ => None,
            };
            if let Some(f) = fraction {
                resize.percentage = Some(((f * 100.0).round() / 100.0).clamp(0.01, MAX_PERCENTAGE));
            }
        }
        ResizeMode::Absolute => {
            if width.is_some() {
                resize.width = width;
            }
            if height.is_some() {
                resize.height = height;
            }
            if let (true, Some(img)) = (resize.lock_aspect, image) {
                match (width, height) {
                    (Some(w), None) => resize.height = Some(derived_side(w, img.width, img.height)),
                    (None, Some(h)) => resize.width = Some(derived_side(h, img.height, img.width)),
                    _ => {}
                }
            }
        }
    }

    if let Some(p) = patch.percentage {
        if !(p.is_finite() && p > 0.0 && p <= MAX_PERCENTAGE) {
            return Err(ValidationError::field(
                "percentage",
                format!("must be in (0, {MAX_PERCENTAGE}]"),
            ));
        }
        resize.percentage = Some(p);
    }
    Ok(())
}

fn apply_adjust(next: &mut EditorState, patch: AdjustPatch) -> Result<(), ValidationError> {
    let adjust = &mut next.options.adjust;
    if let Some(g) = patch.grayscale {
        adjust.grayscale = g;
    }
    if let Some(c) = patch.contrast {
        adjust.contrast = c;
    }
    match patch.sharpen {
        Some(0) => adjust.sharpen = None,
        Some(n @ 1..=100) => adjust.sharpen = Some(n),
        Some(_) => return Err(ValidationError::field("sharpen", "must be between 1 and 100")),
        None => {}
    }
    if let Some(mask) = patch.unsharp_mask {
        let values = schema::values([
            ("radius", schema::FieldValue::Number(mask.radius)),
            ("sigma", schema::FieldValue::Number(mask.sigma)),
            ("amount", schema::FieldValue::Number(mask.amount)),
            ("threshold", schema::FieldValue::Number(mask.threshold)),
        ]);
        schema::validate("unsharp_mask", &values)?;
        adjust.unsharp_mask = Some(mask);
    }
    if patch.clear_unsharp_mask {
        adjust.unsharp_mask = None;
    }
    Ok(())
}

fn apply_background(next: &mut EditorState, patch: BackgroundPatch) -> Result<(), ValidationError> {
    let bg = &mut next.options.background;
    if let Some(kind) = patch.kind {
        bg.kind = kind;
    }
    if let Some(color) = patch.color {
        if color.trim().is_empty() {
            bg.color = None;
        } else {
            schema::check_color("color", &color)?;
            bg.color = Some(normalize_color(&color));
        }
    }
    if let Some(intensity) = patch.blur_intensity {
        if let BlurIntensity::Value(n) = intensity {
            if !(1..=100).contains(&n) {
                return Err(ValidationError::field(
                    "blur_intensity",
                    "must be auto or between 1 and 100",
                ));
            }
        }
        bg.blur_intensity = intensity;
    }
    if let Some(b) = patch.blur_brightness {
        if !(-255..=255).contains(&b) {
            return Err(ValidationError::field(
                "blur_brightness",
                "must be between -255 and 255",
            ));
        }
        bg.blur_brightness = Some(b);
    }
    if let Some(prompt) = patch.prompt {
        bg.prompt = prompt;
    }
    Ok(())
}

fn apply_upscaler(next: &mut EditorState, patch: UpscalerPatch) -> Result<(), ValidationError> {
    let Some(text) = patch.upscaling_factor else {
        return Ok(());
    };
    let image = next.image.as_ref().map(|i| i.size);
    let up = &mut next.options.upscaler;

    let text = text.trim();
    if text.is_empty() {
        up.factor = None;
        up.scaled_dimensions = None;
        return Ok(());
    }
    let factor: f64 = text
        .parse()
        .ok()
        .filter(|f: &f64| f.is_finite())
        .ok_or_else(|| ValidationError::field("upscaling_factor", format!("`{text}` is not a number")))?;
    let factor = factor.clamp(MIN_UPSCALE, MAX_UPSCALE);

    if up.original_dimensions.is_none() {
        up.original_dimensions = image.map(|s| Dimensions::new(s.width.round() as u32, s.height.round() as u32));
    }
    up.factor = Some(factor);
    up.scaled_dimensions = up.original_dimensions.map(|orig| {
        Dimensions::new(
            (f64::from(orig.width) * factor).ceil() as u32,
            (f64::from(orig.height) * factor).ceil() as u32,
        )
    });
    Ok(())
}

fn apply_extender(next: &mut EditorState, patch: ExtenderPatch) -> Result<(), ValidationError> {
    let image = next.image.as_ref().map(|i| i.size);
    let ext = &mut next.options.extender;

    if let Some(lock) = patch.lock_aspect {
        ext.lock_aspect = lock;
    }
    let width = patch.width.map(|w| positive("width", w)).transpose()?;
    let height = patch.height.map(|h| positive("height", h)).transpose()?;
    if width.is_some() {
        ext.width = width;
    }
    if height.is_some() {
        ext.height = height;
    }
    if let (true, Some(img)) = (ext.lock_aspect, image) {
        match (width, height) {
            (Some(w), None) => ext.height = Some(derived_side(w, img.width, img.height)),
            (None, Some(h)) => ext.width = Some(derived_side(h, img.height, img.width)),
            _ => {}
        }
    }
    if let Some(prompt) = patch.prompt {
        ext.prompt = prompt;
    }
    Ok(())
}

fn apply_zoom(next: &mut EditorState, change: ZoomChange) {
    if !change.value.is_finite() {
        trace!("ignoring non-finite zoom");
        return;
    }
    let target = if change.relative {
        next.zoom.value + change.value
    } else {
        change.value
    };
    next.zoom.value = clamp_zoom(target);
    next.zoom.pivot = match (change.is_absolute_zoom, change.x, change.y) {
        (false, Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Point::new(x, y)),
        _ => Some(next.canvas.center()),
    };
}

fn apply_image(next: &mut EditorState, info: ImageInfo) -> Result<(), ValidationError> {
    let Size { width, height } = info.size;
    if !width.is_finite() || !height.is_finite() || info.size.is_degenerate() {
        return Err(ValidationError::field("image", "dimensions must be positive"));
    }
    let bounds = Rect::from_size(info.size);
    if next.options.crop.rect.is_some() {
        next.options.crop.rect = Some(next.options.crop.effective_rect(&bounds));
    }
    next.image = Some(info);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{MAX_ZOOM, MIN_ZOOM};
    use crate::schema::{values, FieldValue};
    use crate::state::{
        BackgroundKind, CropMode, RetouchPatch, Snapshot, Tool, UnsharpMask, UpscalerOptions,
    };

    fn loaded(width: f64, height: f64) -> EditorState {
        let state = EditorState::new(100);
        let state = reduce(&state, Action::SetCanvasSize(Size::new(800.0, 600.0))).unwrap();
        reduce(
            &state,
            Action::ImageLoaded(ImageInfo {
                url: "https://cdn.example.com/a.jpg".into(),
                size: Size::new(width, height),
            }),
        )
        .unwrap()
    }

    fn run(state: EditorState, actions: impl IntoIterator<Item = Action>) -> EditorState {
        actions
            .into_iter()
            .fold(state, |s, a| reduce(&s, a).unwrap())
    }

    fn resize(width: Option<u32>, height: Option<u32>) -> Action {
        Action::SetResize(ResizePatch {
            width,
            height,
            ..ResizePatch::default()
        })
    }

    #[test]
    fn test_select_same_tool_is_noop() {
        let s = run(EditorState::new(10), [Action::SelectTool(Tool::Resize), resize(Some(10), None)]);
        let again = reduce(&s, Action::SelectTool(Tool::Resize)).unwrap();
        assert_eq!(again, s);
    }

    #[test]
    fn test_select_other_tool_discards_pending() {
        let s = run(EditorState::new(10), [Action::SelectTool(Tool::Resize), resize(Some(10), None)]);
        assert!(s.is_dirty());
        let s = reduce(&s, Action::SelectTool(Tool::Crop)).unwrap();
        assert!(!s.is_dirty());
        assert_eq!(s.tool, Tool::Crop);
        assert_eq!(s.options.resize.width, None);
    }

    #[test]
    fn test_commit_then_undo_redo() {
        let s = run(EditorState::new(10), [resize(Some(200), Some(100)), Action::Commit]);
        assert_eq!(s.history.len(), 2);
        let undone = reduce(&s, Action::Undo).unwrap();
        assert!(undone.options.is_default());
        let redone = reduce(&undone, Action::Redo).unwrap();
        assert_eq!(redone.options, s.options);
        assert_eq!(redone.history.head(), s.history.head());
    }

    #[test]
    fn test_identical_commit_does_not_grow_history() {
        let s = run(EditorState::new(10), [resize(Some(200), None), Action::Commit, Action::Commit]);
        assert_eq!(s.history.len(), 2);
    }

    #[test]
    fn test_discard_restores_head_and_clears_tool() {
        let s = run(
            EditorState::new(10),
            [
                Action::SelectTool(Tool::AiRetouch),
                Action::SetRetouch(RetouchPatch { enabled: Some(true) }),
                Action::Discard,
            ],
        );
        assert_eq!(s.tool, Tool::None);
        assert!(!s.options.retouch.enabled);
    }

    #[test]
    fn test_reset_history() {
        let s = run(
            EditorState::new(10),
            [resize(Some(20), None), Action::Commit, Action::ResetHistory],
        );
        assert_eq!(s.history.len(), 1);
        assert!(s.options.is_default());
    }

    #[test]
    fn test_canvas_size_rules() {
        let s = EditorState::new(10);
        let err = reduce(&s, Action::SetCanvasSize(Size::new(f64::NAN, 100.0))).unwrap_err();
        assert!(err.is_validation());
        let same = reduce(&s, Action::SetCanvasSize(Size::new(0.0, 100.0))).unwrap();
        assert_eq!(same, s);
        let resized = reduce(&s, Action::SetCanvasSize(Size::new(1024.0, 768.0))).unwrap();
        assert_eq!(resized.canvas, Size::new(1024.0, 768.0));
    }

    #[test]
    fn test_zoom_pivot_and_clamp() {
        let s = loaded(400.0, 300.0);
        let zoomed = reduce(&s, Action::SetZoom(ZoomChange::by(0.5, 10.0, 20.0))).unwrap();
        assert_eq!(zoomed.zoom.value, 1.5);
        assert_eq!(zoomed.zoom.pivot, Some(Point::new(10.0, 20.0)));

        let mut centred = ZoomChange::by(100.0, 10.0, 20.0);
        centred.is_absolute_zoom = true;
        let z = reduce(&s, Action::SetZoom(centred)).unwrap();
        assert_eq!(z.zoom.value, MAX_ZOOM);
        assert_eq!(z.zoom.pivot, Some(Point::new(400.0, 300.0)));

        let low = reduce(&s, Action::SetZoom(ZoomChange::to(0.0))).unwrap();
        assert_eq!(low.zoom.value, MIN_ZOOM);

        let nan = reduce(&s, Action::SetZoom(ZoomChange::to(f64::NAN))).unwrap();
        assert_eq!(nan.zoom, s.zoom);
    }

    #[test]
    fn test_upscaler_factor_scales_original() {
        let mut s = EditorState::new(10);
        s.options.upscaler = UpscalerOptions {
            original_dimensions: Some(Dimensions::new(100, 50)),
            ..UpscalerOptions::default()
        };
        let factor = |s: &EditorState, f: &str| {
            reduce(
                s,
                Action::SetUpscaler(UpscalerPatch {
                    upscaling_factor: Some(f.into()),
                }),
            )
            .unwrap()
        };

        let two = factor(&s, "2");
        assert_eq!(two.options.upscaler.scaled_dimensions, Some(Dimensions::new(200, 100)));

        let ten = factor(&s, "10");
        assert_eq!(ten.options.upscaler.factor, Some(4.0));
        assert_eq!(ten.options.upscaler.scaled_dimensions, Some(Dimensions::new(400, 200)));

        let cleared = factor(&two, "");
        assert_eq!(cleared.options.upscaler.factor, None);
        assert_eq!(cleared.options.upscaler.scaled_dimensions, None);
        assert_eq!(cleared.options.upscaler.original_dimensions, Some(Dimensions::new(100, 50)));

        let err = reduce(
            &s,
            Action::SetUpscaler(UpscalerPatch {
                upscaling_factor: Some("lots".into()),
            }),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_upscaler_captures_image_dimensions_once() {
        let s = loaded(640.0, 480.0);
        let s = reduce(
            &s,
            Action::SetUpscaler(UpscalerPatch {
                upscaling_factor: Some("1.5".into()),
            }),
        )
        .unwrap();
        assert_eq!(s.options.upscaler.original_dimensions, Some(Dimensions::new(640, 480)));
        assert_eq!(s.options.upscaler.scaled_dimensions, Some(Dimensions::new(960, 720)));
    }

    #[test]
    fn test_resize_lock_aspect_derives_other_side() {
        let s = loaded(400.0, 200.0);
        let s = run(
            s,
            [
                Action::SetResize(ResizePatch {
                    lock_aspect: Some(true),
                    ..ResizePatch::default()
                }),
                resize(Some(100), None),
            ],
        );
        assert_eq!(s.options.resize.height, Some(50));
    }

    #[test]
    fn test_resize_percentage_mode() {
        let s = run(
            loaded(400.0, 200.0),
            [
                resize(Some(300), Some(100)),
                Action::SetResize(ResizePatch {
                    mode: Some(ResizeMode::Percentage),
                    ..ResizePatch::default()
                }),
            ],
        );
        assert_eq!(s.options.resize.width, None);
        assert_eq!(s.options.resize.height, None);

        let s = reduce(&s, resize(Some(200), None)).unwrap();
        assert_eq!(s.options.resize.percentage, Some(0.5));
        assert_eq!(s.options.resize.width, None);

        let bad = reduce(
            &s,
            Action::SetResize(ResizePatch {
                percentage: Some(9.0),
                ..ResizePatch::default()
            }),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let s = EditorState::new(10);
        assert!(reduce(&s, resize(Some(0), None)).is_err());
        assert!(reduce(
            &s,
            Action::SetExtender(ExtenderPatch {
                height: Some(0),
                ..ExtenderPatch::default()
            })
        )
        .is_err());
    }

    #[test]
    fn test_crop_ratio_refits_rect() {
        let s = loaded(400.0, 300.0);
        let s = run(
            s,
            [
                Action::SetCrop(CropPatch {
                    rect: Some(Rect::new(100.0, 100.0, 250.0, 150.0)),
                    ..CropPatch::default()
                }),
                Action::SetCrop(CropPatch {
                    mode: Some(CropMode::square()),
                    ..CropPatch::default()
                }),
            ],
        );
        let rect = s.options.crop.rect.unwrap();
        assert!((rect.width - rect.height).abs() < 1e-6);
        assert!(Rect::new(0.0, 0.0, 400.0, 300.0).contains_rect(&rect));
    }

    #[test]
    fn test_crop_rejects_bad_rect() {
        let s = loaded(400.0, 300.0);
        let bad = Action::SetCrop(CropPatch {
            rect: Some(Rect::new(0.0, 0.0, -5.0, 10.0)),
            ..CropPatch::default()
        });
        assert!(reduce(&s, bad).is_err());
    }

    #[test]
    fn test_image_loaded_clamps_pending_crop() {
        let mut s = loaded(400.0, 300.0);
        s.options.crop.rect = Some(Rect::new(300.0, 200.0, 200.0, 200.0));
        let s = reduce(
            &s,
            Action::ImageLoaded(ImageInfo {
                url: "b".into(),
                size: Size::new(400.0, 300.0),
            }),
        )
        .unwrap();
        assert_eq!(s.options.crop.rect, Some(Rect::new(200.0, 100.0, 200.0, 200.0)));

        let bad = reduce(
            &s,
            Action::ImageLoaded(ImageInfo {
                url: "c".into(),
                size: Size::new(0.0, 300.0),
            }),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_background_color_normalized_and_validated() {
        let s = EditorState::new(10);
        let s = reduce(
            &s,
            Action::SetBackground(BackgroundPatch {
                kind: Some(BackgroundKind::Color),
                color: Some("#ff8800".into()),
                ..BackgroundPatch::default()
            }),
        )
        .unwrap();
        assert_eq!(s.options.background.color.as_deref(), Some("FF8800"));

        let bad = reduce(
            &s,
            Action::SetBackground(BackgroundPatch {
                color: Some("orange".into()),
                ..BackgroundPatch::default()
            }),
        );
        assert!(bad.is_err());

        let bad = reduce(
            &s,
            Action::SetBackground(BackgroundPatch {
                blur_intensity: Some(BlurIntensity::Value(0)),
                ..BackgroundPatch::default()
            }),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_adjust_ranges() {
        let s = EditorState::new(10);
        let sharpen = |n| {
            Action::SetAdjust(AdjustPatch {
                sharpen: Some(n),
                ..AdjustPatch::default()
            })
        };
        let s = reduce(&s, sharpen(30)).unwrap();
        assert_eq!(s.options.adjust.sharpen, Some(30));
        assert!(reduce(&s, sharpen(101)).is_err());
        let s = reduce(&s, sharpen(0)).unwrap();
        assert_eq!(s.options.adjust.sharpen, None);

        let bad_mask = Action::SetAdjust(AdjustPatch {
            unsharp_mask: Some(UnsharpMask {
                amount: 50.0,
                ..UnsharpMask::default()
            }),
            ..AdjustPatch::default()
        });
        assert!(reduce(&s, bad_mask).is_err());
    }

    #[test]
    fn test_pipeline_actions_validate() {
        let s = EditorState::new(10);
        let s = reduce(
            &s,
            Action::AddTransformation {
                kind: "rotate".into(),
                values: values([("rotation", FieldValue::Number(90.0))]),
            },
        )
        .unwrap();
        assert_eq!(s.options.custom.len(), 1);

        let err = reduce(
            &s,
            Action::AddTransformation {
                kind: "rotate".into(),
                values: values([("rotation", FieldValue::Number(900.0))]),
            },
        );
        assert!(err.is_err());

        let err = reduce(&s, Action::RemoveTransformation { id: "nope".into() });
        assert!(err.is_err());

        let s = reduce(&s, Action::ToggleTransformation { id: "t1".into() }).unwrap();
        assert!(!s.options.custom.items()[0].visible);
        let s = reduce(&s, Action::RemoveTransformation { id: "t1".into() }).unwrap();
        assert!(s.options.custom.is_empty());
        assert_eq!(s.options, Snapshot::default());
    }

    #[test]
    fn test_rejected_action_leaves_input_untouched() {
        let s = loaded(400.0, 300.0);
        let before = s.clone();
        let _ = reduce(&s, resize(Some(0), None));
        assert_eq!(s, before);
    }
}
