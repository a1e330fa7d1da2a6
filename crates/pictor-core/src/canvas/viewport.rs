//! Scene-to-canvas transform: zoom, offset and panning.

use serde::Serialize;

use crate::geometry::{zoom_offset, Point, Size};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    /// Canvas position of the scene origin.
    pub offset: Point,
    pub zoom: f64,
    pub canvas: Size,
    #[serde(skip)]
    pan_from: Option<Point>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Point::default(),
            zoom: 1.0,
            canvas: Size::default(),
            pan_from: None,
        }
    }
}

impl Viewport {
    pub fn to_scene(&self, p: Point) -> Point {
        Point::new((p.x - self.offset.x) / self.zoom, (p.y - self.offset.y) / self.zoom)
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.offset.x, p.y * self.zoom + self.offset.y)
    }

    /// Zoom keeping `pivot` fixed; below 1 the scene is centred instead.
    pub fn zoom_to(&mut self, zoom: f64, pivot: Point) {
        self.offset = zoom_offset(self.offset, self.zoom, zoom, pivot, self.canvas, self.canvas);
        self.zoom = zoom;
    }

    /// Track a new canvas size. A zoomed-out scene stays centred.
    pub fn resize(&mut self, canvas: Size) {
        if canvas == self.canvas {
            return;
        }
        self.canvas = canvas;
        if self.zoom < 1.0 {
            self.offset = zoom_offset(self.offset, self.zoom, self.zoom, canvas.center(), canvas, canvas);
        }
    }

    pub fn begin_pan(&mut self, at: Point) {
        self.pan_from = Some(at);
    }

    /// Translate by the pointer delta since the last call.
    pub fn pan_to(&mut self, at: Point) -> bool {
        let Some(from) = self.pan_from else {
            return false;
        };
        self.offset = Point::new(self.offset.x + at.x - from.x, self.offset.y + at.y - from.y);
        self.pan_from = Some(at);
        true
    }

    pub fn end_pan(&mut self) {
        self.pan_from = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_from.is_some()
    }
}

/// Zoom delta for one wheel event; scrolling down zooms out.
pub fn wheel_zoom_delta(delta_y: f64, factor: f64) -> f64 {
    -delta_y * factor
}
