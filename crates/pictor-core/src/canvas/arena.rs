//! Keyed store of scene primitives.
//!
//! Primitives are addressed by stable string keys so the synchronizer can
//! find "the crop box" without holding references into the scene. A
//! primitive only reports user edits once a listener is attached, and
//! programmatic writes never report at all; that is what keeps state → scene
//! updates from echoing back as scene → state actions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::Rect;

pub type PrimitiveKey = &'static str;

pub mod keys {
    use super::PrimitiveKey;

    pub const IMAGE: PrimitiveKey = "image";
    pub const CROP: PrimitiveKey = "crop";
    pub const RESIZE: PrimitiveKey = "resize";
    pub const RESIZE_BG: PrimitiveKey = "resize-bg";
    pub const EXTEND: PrimitiveKey = "extend";
    pub const LABEL_BG: PrimitiveKey = "label-bg";
    pub const LABEL_TEXT: PrimitiveKey = "label-text";
    pub const OVERLAY_DIM: PrimitiveKey = "overlay-dim";
    pub const OVERLAY_SPINNER: PrimitiveKey = "overlay-spinner";
    pub const OVERLAY_CAPTION: PrimitiveKey = "overlay-caption";
}

/// Which resize handles a box exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Handles {
    #[default]
    None,
    /// Corner handles only, for aspect-locked boxes.
    Corners,
    All,
}

/// Coordinate space a primitive is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    /// Scene coordinates, affected by zoom and pan.
    #[default]
    Scene,
    /// Canvas pixels, fixed on screen.
    Screen,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Image { src: String },
    Box,
    Fill { color: String, opacity: f64 },
    Text { content: String, font_size: f64 },
    Spinner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    pub key: PrimitiveKey,
    pub shape: Shape,
    /// Unscaled geometry; drawn size is `width * scale_x` by `height * scale_y`.
    pub rect: Rect,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
    pub clip: Option<Rect>,
    pub interactive: bool,
    pub handles: Handles,
    pub space: Space,
    pub z: u64,
}

impl Primitive {
    pub fn new(key: PrimitiveKey, shape: Shape, rect: Rect) -> Self {
        Self {
            key,
            shape,
            rect,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            clip: None,
            interactive: false,
            handles: Handles::None,
            space: Space::Scene,
            z: 0,
        }
    }

    pub fn screen(mut self) -> Self {
        self.space = Space::Screen;
        self
    }

    pub fn interactive(mut self, handles: Handles) -> Self {
        self.interactive = true;
        self.handles = handles;
        self
    }

    /// On-screen extent after scaling.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.rect.left,
            self.rect.top,
            self.rect.width * self.scale_x,
            self.rect.height * self.scale_y,
        )
    }
}

/// Where a geometry write came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Written by the synchronizer; never reported.
    Program,
    /// A direct manipulation gesture.
    User,
}

/// A user gesture changed a primitive's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Modified {
    pub key: PrimitiveKey,
    pub rect: Rect,
}

#[derive(Debug, Default)]
pub struct PrimitiveArena {
    primitives: BTreeMap<PrimitiveKey, Primitive>,
    listeners: Vec<PrimitiveKey>,
    events: Vec<Modified>,
    next_z: u64,
}

impl PrimitiveArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a primitive; it lands on top.
    pub fn insert(&mut self, mut primitive: Primitive) {
        primitive.z = self.bump_z();
        self.primitives.insert(primitive.key, primitive);
    }

    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.primitives.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Primitive> {
        self.primitives.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.primitives.contains_key(key)
    }

    /// Remove a primitive and any listener attached to it.
    pub fn remove(&mut self, key: &str) -> Option<Primitive> {
        self.detach(key);
        self.primitives.remove(key)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Write geometry. Only user writes to a listened primitive are queued.
    pub fn set_rect(&mut self, key: &str, rect: Rect, origin: Origin) -> bool {
        let Some(primitive) = self.primitives.get_mut(key) else {
            return false;
        };
        primitive.rect = rect;
        if origin == Origin::User && self.listeners.contains(&primitive.key) {
            self.events.push(Modified {
                key: primitive.key,
                rect,
            });
        }
        true
    }

    pub fn attach(&mut self, key: PrimitiveKey) {
        if !self.listeners.contains(&key) {
            self.listeners.push(key);
        }
    }

    pub fn detach(&mut self, key: &str) {
        self.listeners.retain(|k| *k != key);
    }

    pub fn is_listening(&self, key: &str) -> bool {
        self.listeners.iter().any(|k| *k == key)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn drain_events(&mut self) -> Vec<Modified> {
        std::mem::take(&mut self.events)
    }

    pub fn bring_to_front(&mut self, key: &str) {
        let z = self.bump_z();
        if let Some(p) = self.primitives.get_mut(key) {
            p.z = z;
        }
    }

    /// Primitives from bottom to top.
    pub fn render_order(&self) -> Vec<&Primitive> {
        let mut list: Vec<&Primitive> = self.primitives.values().collect();
        list.sort_by_key(|p| p.z);
        list
    }

    fn bump_z(&mut self) -> u64 {
        self.next_z += 1;
        self.next_z
    }
}
