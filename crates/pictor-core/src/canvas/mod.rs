//! Canvas synchronizer.
//!
//! Mirrors [`EditorState`] into a retained scene of [`Primitive`]s and turns
//! direct manipulation back into [`Action`]s. The host renders the scene
//! from [`CanvasSynchronizer::render_order`] and forwards pointer, wheel
//! and transform gestures as [`CanvasEvent`]s.
//!
//! Geometry written while syncing is tagged [`Origin::Program`] and never
//! reported; only gestures on listened boxes become actions.

mod arena;
mod debounce;
mod label;
mod layout;
mod loader;
mod viewport;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{EditorConfig, LabelConfig, LoadConfig};
use crate::error::ResourceError;
use crate::geometry::{fit_aspect_within, Point, Rect, Size};
use crate::state::{
    Action, BackgroundKind, CropOptions, CropPatch, EditorState, ExtenderPatch, ImageInfo,
    ResizeMode, ResizePatch, ScaleMode, Tool, ZoomChange,
};

pub use arena::{keys, Handles, Modified, Origin, Primitive, PrimitiveArena, PrimitiveKey, Shape, Space};
pub use debounce::Debouncer;
pub use label::{dimension_text, layout_label, LabelLayout};
pub use layout::{extend_target, fitted_box, place_image, resize_target, ImageDisplay, Placement};
pub use loader::{
    poll_image, probe_dimensions, FetchResponse, ImageFetcher, LoadAttempts, LoadTicket,
    Notification, NotificationLevel, PollDecision, Sleeper,
};
pub use viewport::{wheel_zoom_delta, Viewport};

#[cfg(test)]
pub(crate) use loader::testing;

const TOOL_KEYS: [PrimitiveKey; 6] = [
    keys::CROP,
    keys::RESIZE,
    keys::RESIZE_BG,
    keys::EXTEND,
    keys::LABEL_BG,
    keys::LABEL_TEXT,
];

const OVERLAY_KEYS: [PrimitiveKey; 3] = [keys::OVERLAY_DIM, keys::OVERLAY_SPINNER, keys::OVERLAY_CAPTION];

const SPINNER_SIZE: f64 = 40.0;

/// Host input, in canvas coordinates unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    /// A box was moved or resized; `rect` is in scene coordinates.
    Transform { target: String, rect: Rect },
    Wheel { delta_y: f64, x: f64, y: f64 },
    PointerDown { x: f64, y: f64, modifier: bool },
    PointerMove { x: f64, y: f64, modifier: bool },
    PointerUp,
}

pub struct CanvasSynchronizer {
    arena: PrimitiveArena,
    viewport: Viewport,
    active: Tool,
    display: Option<ImageDisplay>,
    /// Scene units per target pixel of the active resize or extend box.
    box_scale: f64,
    generation: u64,
    notifications: Vec<Notification>,
    label: LabelConfig,
    load: LoadConfig,
    wheel_zoom_factor: f64,
}

impl CanvasSynchronizer {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            arena: PrimitiveArena::new(),
            viewport: Viewport::default(),
            active: Tool::None,
            display: None,
            box_scale: 1.0,
            generation: 0,
            notifications: Vec::new(),
            label: config.label.clone(),
            load: config.load.clone(),
            wheel_zoom_factor: config.wheel_zoom_factor,
        }
    }

    pub fn arena(&self) -> &PrimitiveArena {
        &self.arena
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn active_tool(&self) -> Tool {
        self.active
    }

    pub fn display(&self) -> Option<&ImageDisplay> {
        self.display.as_ref()
    }

    pub fn render_order(&self) -> Vec<&Primitive> {
        self.arena.render_order()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Bring the scene in line with `state`.
    pub fn sync(&mut self, state: &EditorState) {
        self.viewport.resize(state.canvas);
        self.display = state
            .image
            .as_ref()
            .map(|image| ImageDisplay::fit(image.size, state.canvas));

        if state.tool != self.active {
            debug!(from = ?self.active, to = ?state.tool, "switching canvas tool");
            self.teardown();
            self.active = state.tool;
        }

        if (state.zoom.value - self.viewport.zoom).abs() > f64::EPSILON {
            let pivot = state.zoom.pivot.unwrap_or_else(|| state.canvas.center());
            self.viewport.zoom_to(state.zoom.value, pivot);
        }

        self.place_image_at_rest();
        let Some(display) = self.display else {
            return;
        };

        match self.active {
            Tool::Crop => self.sync_crop(state, &display),
            Tool::Resize => self.sync_resize(state, &display),
            Tool::AiImageExtender => self.sync_extend(state, &display),
            _ => {}
        }
    }

    /// Remove every tool primitive and return the image to rest.
    pub fn teardown(&mut self) {
        for key in TOOL_KEYS {
            self.arena.remove(key);
        }
        self.box_scale = 1.0;
        self.place_image_at_rest();
    }

    fn place_image_at_rest(&mut self) {
        let Some(display) = self.display else {
            return;
        };
        if let Some(image) = self.arena.get_mut(keys::IMAGE) {
            image.rect = Rect::new(
                display.origin.x,
                display.origin.y,
                display.natural.width,
                display.natural.height,
            );
            image.scale_x = display.scale;
            image.scale_y = display.scale;
            image.clip = None;
            image.interactive = false;
        }
    }

    fn upsert_box(&mut self, key: PrimitiveKey, rect: Rect, handles: Handles) {
        match self.arena.get_mut(key) {
            Some(existing) => existing.handles = handles,
            None => {
                self.arena
                    .insert(Primitive::new(key, Shape::Box, rect).interactive(handles));
                self.arena.attach(key);
            }
        }
        self.arena.set_rect(key, rect, Origin::Program);
    }

    fn sync_crop(&mut self, state: &EditorState, display: &ImageDisplay) {
        let bounds = Rect::from_size(display.natural);
        let crop = state.options.crop.effective_rect(&bounds);
        let rect = display.to_scene(&crop);
        let handles = if state.options.crop.mode.ratio().is_some() {
            Handles::Corners
        } else {
            Handles::All
        };
        self.upsert_box(keys::CROP, rect, handles);
        self.sync_label(&rect, crop.size());
    }

    fn sync_resize(&mut self, state: &EditorState, display: &ImageDisplay) {
        let resize = &state.options.resize;
        let target = resize_target(resize, display.natural);
        let (rect, scale) = fitted_box(target, display);
        self.box_scale = scale;

        let color = match (&state.options.background.kind, &state.options.background.color) {
            (BackgroundKind::Color, Some(hex)) => format!("#{hex}"),
            _ => "#FFFFFF".to_string(),
        };
        if let Some(bg) = self.arena.get_mut(keys::RESIZE_BG) {
            bg.shape = Shape::Fill { color, opacity: 1.0 };
        } else {
            self.arena
                .insert(Primitive::new(keys::RESIZE_BG, Shape::Fill { color, opacity: 1.0 }, rect));
        }
        self.arena.set_rect(keys::RESIZE_BG, rect, Origin::Program);

        self.fit_image_into(&rect, resize.scale_mode);
        let handles = if resize.lock_aspect {
            Handles::Corners
        } else {
            Handles::All
        };
        self.upsert_box(keys::RESIZE, rect, handles);
        self.arena.bring_to_front(keys::RESIZE);
        self.sync_label(&rect, target);
    }

    fn sync_extend(&mut self, state: &EditorState, display: &ImageDisplay) {
        let ext = &state.options.extender;
        let target = extend_target(ext, display.natural);
        let (rect, scale) = fitted_box(target, display);
        self.box_scale = scale;

        self.fit_image_into(&rect, ScaleMode::FitScreen);
        let handles = if ext.lock_aspect {
            Handles::Corners
        } else {
            Handles::All
        };
        self.upsert_box(keys::EXTEND, rect, handles);
        self.arena.bring_to_front(keys::EXTEND);
        self.sync_label(&rect, target);
    }

    fn fit_image_into(&mut self, frame: &Rect, mode: ScaleMode) {
        let Some(image) = self.arena.get_mut(keys::IMAGE) else {
            return;
        };
        let natural = Size::new(image.rect.width, image.rect.height);
        let placement = place_image(natural, frame, mode);
        image.rect = placement.rect;
        image.scale_x = placement.scale_x;
        image.scale_y = placement.scale_y;
        image.clip = placement.clip;
        self.arena.bring_to_front(keys::IMAGE);
    }

    fn sync_label(&mut self, anchor: &Rect, size: Size) {
        let text = dimension_text(size);
        let layout = layout_label(anchor, &text, self.viewport.zoom, &self.label);
        let text_rect = Rect::new(
            layout.text_origin.x,
            layout.text_origin.y,
            layout.chip.width - 2.0 * self.label.padding,
            self.label.font_size,
        );

        if !self.arena.contains(keys::LABEL_BG) {
            self.arena.insert(Primitive::new(
                keys::LABEL_BG,
                Shape::Fill {
                    color: "#000000".into(),
                    opacity: 0.7,
                },
                layout.chip,
            ));
        }
        let font_size = self.label.font_size;
        match self.arena.get_mut(keys::LABEL_TEXT) {
            Some(p) => {
                p.shape = Shape::Text {
                    content: text,
                    font_size,
                }
            }
            None => self.arena.insert(Primitive::new(
                keys::LABEL_TEXT,
                Shape::Text {
                    content: text,
                    font_size,
                },
                text_rect,
            )),
        }

        for (key, rect) in [(keys::LABEL_BG, layout.chip), (keys::LABEL_TEXT, text_rect)] {
            self.arena.set_rect(key, rect, Origin::Program);
            if let Some(p) = self.arena.get_mut(key) {
                p.scale_x = layout.scale;
                p.scale_y = layout.scale;
            }
            self.arena.bring_to_front(key);
        }
    }

    /// Translate a host event into actions.
    pub fn handle(&mut self, event: CanvasEvent, state: &EditorState) -> Vec<Action> {
        match event {
            CanvasEvent::Transform { target, rect } => {
                let Some(key) = TOOL_KEYS.iter().copied().find(|k| *k == target) else {
                    trace!(%target, "transform on unknown primitive");
                    return Vec::new();
                };
                self.arena.set_rect(key, rect, Origin::User);
                self.arena
                    .drain_events()
                    .into_iter()
                    .filter_map(|m| self.gesture_action(&m, state))
                    .collect()
            }
            CanvasEvent::Wheel { delta_y, x, y } => {
                if !delta_y.is_finite() || delta_y == 0.0 {
                    return Vec::new();
                }
                let delta = wheel_zoom_delta(delta_y, self.wheel_zoom_factor);
                vec![Action::SetZoom(ZoomChange::by(delta, x, y))]
            }
            CanvasEvent::PointerDown { x, y, modifier } => {
                if modifier {
                    self.viewport.begin_pan(Point::new(x, y));
                }
                Vec::new()
            }
            CanvasEvent::PointerMove { x, y, modifier } => {
                if modifier {
                    self.viewport.pan_to(Point::new(x, y));
                } else {
                    self.viewport.end_pan();
                }
                Vec::new()
            }
            CanvasEvent::PointerUp => {
                self.viewport.end_pan();
                Vec::new()
            }
        }
    }

    fn gesture_action(&self, modified: &Modified, state: &EditorState) -> Option<Action> {
        let display = self.display?;
        let rect = modified.rect;
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return None;
        }
        let bounds = display.bounds();

        match modified.key {
            keys::CROP => {
                let candidate = CropOptions {
                    mode: state.options.crop.mode,
                    rect: Some(display.to_image(&rect)),
                };
                let image_rect = candidate.effective_rect(&Rect::from_size(display.natural));
                Some(Action::SetCrop(CropPatch {
                    rect: Some(image_rect),
                    ..CropPatch::default()
                }))
            }
            keys::RESIZE => {
                let resize = &state.options.resize;
                let current = resize_target(resize, display.natural);
                let target = self.box_target(&rect, &bounds, resize.lock_aspect, current)?;
                let patch = match resize.mode {
                    ResizeMode::Percentage => ResizePatch {
                        width: Some(target.0),
                        ..ResizePatch::default()
                    },
                    ResizeMode::Absolute => ResizePatch {
                        width: Some(target.0),
                        height: Some(target.1),
                        ..ResizePatch::default()
                    },
                };
                Some(Action::SetResize(patch))
            }
            keys::EXTEND => {
                let ext = &state.options.extender;
                let current = extend_target(ext, display.natural);
                let (width, height) = self.box_target(&rect, &bounds, ext.lock_aspect, current)?;
                Some(Action::SetExtender(ExtenderPatch {
                    width: Some(width),
                    height: Some(height),
                    ..ExtenderPatch::default()
                }))
            }
            _ => None,
        }
    }

    /// Clamp a dragged box and convert it to whole target pixels.
    fn box_target(&self, rect: &Rect, bounds: &Rect, locked: bool, current: Size) -> Option<(u32, u32)> {
        let mut rect = rect.clamp_within(bounds);
        if locked && !current.is_degenerate() {
            rect = fit_aspect_within(&rect, current.aspect(), bounds);
        }
        if self.box_scale <= 0.0 {
            return None;
        }
        let width = (rect.width / self.box_scale).round().max(1.0) as u32;
        let height = (rect.height / self.box_scale).round().max(1.0) as u32;
        Some((width, height))
    }

    /// Start loading `url`, superseding any load in flight.
    pub fn begin_load(&mut self, url: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            url: url.into(),
        };
        debug!(generation = ticket.generation, url = %ticket.url, "begin image load");
        self.show_overlay();
        ticket
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a load result. Stale tickets are ignored.
    ///
    /// Returns the [`Action::ImageLoaded`] the editor should dispatch.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Size, ResourceError>,
    ) -> Option<Action> {
        if !self.is_current(ticket) {
            debug!(generation = ticket.generation, current = self.generation, "discarding stale load");
            return None;
        }
        self.hide_overlay();

        match result {
            Ok(size) => {
                let src = Shape::Image {
                    src: ticket.url.clone(),
                };
                match self.arena.get_mut(keys::IMAGE) {
                    Some(image) => {
                        image.shape = src;
                        image.rect = Rect::from_size(size);
                        image.scale_x = 1.0;
                        image.scale_y = 1.0;
                        image.clip = None;
                    }
                    None => {
                        self.arena
                            .insert(Primitive::new(keys::IMAGE, src, Rect::from_size(size)));
                    }
                }
                Some(Action::ImageLoaded(ImageInfo {
                    url: ticket.url.clone(),
                    size,
                }))
            }
            Err(e) => {
                self.notifications
                    .push(Notification::error(format!("Could not load image: {e}")));
                None
            }
        }
    }

    fn show_overlay(&mut self) {
        let canvas = self.viewport.canvas;
        let center = canvas.center();
        let caption = self.load.captions.first().cloned().unwrap_or_default();

        self.arena.insert(
            Primitive::new(
                keys::OVERLAY_DIM,
                Shape::Fill {
                    color: "#000000".into(),
                    opacity: 0.5,
                },
                Rect::from_size(canvas),
            )
            .screen(),
        );
        self.arena.insert(
            Primitive::new(
                keys::OVERLAY_SPINNER,
                Shape::Spinner,
                Rect::centered(center, Size::new(SPINNER_SIZE, SPINNER_SIZE)),
            )
            .screen(),
        );
        self.arena.insert(
            Primitive::new(
                keys::OVERLAY_CAPTION,
                Shape::Text {
                    content: caption,
                    font_size: self.label.font_size,
                },
                Rect::new(0.0, center.y + SPINNER_SIZE, canvas.width, self.label.font_size),
            )
            .screen(),
        );
    }

    fn hide_overlay(&mut self) {
        for key in OVERLAY_KEYS {
            self.arena.remove(key);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.arena.contains(keys::OVERLAY_DIM)
    }

    /// Animate the overlay: one spinner turn per second, captions rotating
    /// every `caption_interval_ms`.
    pub fn tick_overlay(&mut self, elapsed_ms: u64) {
        if let Some(spinner) = self.arena.get_mut(keys::OVERLAY_SPINNER) {
            spinner.angle = (elapsed_ms % 1000) as f64 * 0.36;
        }
        let captions = &self.load.captions;
        if captions.is_empty() {
            return;
        }
        let interval = self.load.caption_interval_ms.max(1);
        let idx = ((elapsed_ms / interval) % captions.len() as u64) as usize;
        let content = captions[idx].clone();
        if let Some(Primitive {
            shape: Shape::Text { content: current, .. },
            ..
        }) = self.arena.get_mut(keys::OVERLAY_CAPTION)
        {
            *current = content;
        }
    }
}
