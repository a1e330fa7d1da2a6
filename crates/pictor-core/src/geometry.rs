//! Coordinate utilities for the interactive canvas.
//!
//! All functions here are stateless. Scene coordinates are expressed in
//! pixels of the displayed image at identity scale, with the origin at the
//! top-left corner. The viewport maps scene coordinates to canvas
//! coordinates as `canvas = scene * zoom + offset`.
//!
//! # Zoom
//!
//! Zoom is always kept inside `[MIN_ZOOM, MAX_ZOOM]`. When zooming around a
//! pivot, the scene point under the pivot stays fixed, except when the new
//! zoom is below 1 where the content is centred in the canvas instead.

use serde::{Deserialize, Serialize};

/// Smallest zoom the viewport accepts.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom the viewport accepts.
pub const MAX_ZOOM: f64 = 4.0;

/// A point in scene or canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a rectangle or image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true when either side is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn scale(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Rectangle of `size` centred on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Returns true when `other` lies entirely inside this rectangle,
    /// with a small tolerance for float rounding.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-6;
        other.left >= self.left - EPS
            && other.top >= self.top - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }

    /// Shrink this rectangle to fit `bounds`, then shift it inside.
    ///
    /// Sides are clamped first so the subsequent shift always succeeds.
    /// Negative sizes collapse to zero.
    pub fn clamp_within(&self, bounds: &Rect) -> Rect {
        let width = self.width.max(0.0).min(bounds.width);
        let height = self.height.max(0.0).min(bounds.height);
        let left = self.left.min(bounds.right() - width).max(bounds.left);
        let top = self.top.min(bounds.bottom() - height).max(bounds.top);
        Rect::new(left, top, width, height)
    }

    /// Round every component to the nearest integer.
    pub fn round(&self) -> Rect {
        Rect::new(
            self.left.round(),
            self.top.round(),
            self.width.round(),
            self.height.round(),
        )
    }
}

/// Clamp a zoom value to `[MIN_ZOOM, MAX_ZOOM]`.
///
/// Non-finite input resets to identity zoom.
pub fn clamp_zoom(value: f64) -> f64 {
    if !value.is_finite() {
        return 1.0;
    }
    value.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Compute the viewport offset after a zoom change anchored at `pivot`.
///
/// # Arguments
///
/// * `offset` - Current viewport offset (canvas coordinates of scene origin)
/// * `old_zoom` - Zoom before the change
/// * `new_zoom` - Zoom after the change (already clamped)
/// * `pivot` - Canvas coordinate that must stay fixed
/// * `canvas` - Canvas size, used for centre correction
/// * `content` - Scene content size, used for centre correction
///
/// # Returns
///
/// The new offset. When `new_zoom < 1` the content no longer fills the
/// canvas and is centred on both axes.
pub fn zoom_offset(
    offset: Point,
    old_zoom: f64,
    new_zoom: f64,
    pivot: Point,
    canvas: Size,
    content: Size,
) -> Point {
    if new_zoom < 1.0 {
        return Point::new(
            (canvas.width - content.width * new_zoom) / 2.0,
            (canvas.height - content.height * new_zoom) / 2.0,
        );
    }

    // Scene point currently under the pivot.
    let scene_x = (pivot.x - offset.x) / old_zoom;
    let scene_y = (pivot.y - offset.y) / old_zoom;

    Point::new(pivot.x - scene_x * new_zoom, pivot.y - scene_y * new_zoom)
}

/// Minimal uniform scale that makes `inner` fit inside `outer`.
///
/// Degenerate input yields 1.0.
pub fn fit_ratio(inner: Size, outer: Size) -> f64 {
    if inner.is_degenerate() || outer.is_degenerate() {
        return 1.0;
    }
    (outer.width / inner.width).min(outer.height / inner.height)
}

/// Minimal uniform scale that makes `inner` cover `outer` entirely.
pub fn cover_ratio(inner: Size, outer: Size) -> f64 {
    if inner.is_degenerate() || outer.is_degenerate() {
        return 1.0;
    }
    (outer.width / inner.width).max(outer.height / inner.height)
}

/// Offset of the top-left corner induced by rotating a rectangle about its
/// centre.
///
/// A rectangle positioned by its top-left corner must be translated by this
/// amount after rotation so its centre stays in place. Positive angles rotate
/// clockwise in screen coordinates (y down).
///
/// ```text
/// dx = w/2 - (w/2 * cos - h/2 * sin)
/// dy = h/2 - (w/2 * sin + h/2 * cos)
/// ```
pub fn rotated_offset(size: Size, angle_degrees: f64) -> Point {
    let rad = angle_degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let half_w = size.width / 2.0;
    let half_h = size.height / 2.0;

    Point::new(
        half_w - (half_w * cos - half_h * sin),
        half_h - (half_w * sin + half_h * cos),
    )
}

/// Lock `rect` to an aspect ratio (width / height) and keep it in `bounds`.
///
/// The larger side is derived from the smaller side times the ratio. If the
/// derived side overflows the bounds it is clamped and the other side is
/// reduced proportionally. Finally the rectangle is shifted inside bounds,
/// keeping its top-left corner where possible.
pub fn fit_aspect_within(rect: &Rect, ratio: f64, bounds: &Rect) -> Rect {
    if !ratio.is_finite() || ratio <= 0.0 {
        return rect.clamp_within(bounds);
    }

    let mut width = rect.width.max(0.0);
    let mut height = rect.height.max(0.0);

    if ratio >= 1.0 {
        width = height * ratio;
    } else {
        height = width / ratio;
    }

    if width > bounds.width {
        width = bounds.width;
        height = width / ratio;
    }
    if height > bounds.height {
        height = bounds.height;
        width = height * ratio;
    }

    Rect::new(rect.left, rect.top, width, height).clamp_within(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_clamp_zoom_bounds() {
        assert_eq!(clamp_zoom(0.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(100.0), MAX_ZOOM);
        assert_eq!(clamp_zoom(1.5), 1.5);
        assert_eq!(clamp_zoom(f64::NAN), 1.0);
        assert_eq!(clamp_zoom(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_zoom_offset_keeps_pivot_fixed() {
        let offset = Point::new(10.0, 20.0);
        let pivot = Point::new(200.0, 150.0);
        let new = zoom_offset(
            offset,
            1.0,
            2.0,
            pivot,
            Size::new(400.0, 300.0),
            Size::new(800.0, 600.0),
        );

        // Scene point under pivot before and after must match.
        let before = ((pivot.x - offset.x) / 1.0, (pivot.y - offset.y) / 1.0);
        let after = ((pivot.x - new.x) / 2.0, (pivot.y - new.y) / 2.0);
        assert!(approx(before.0, after.0));
        assert!(approx(before.1, after.1));
    }

    #[test]
    fn test_zoom_offset_centres_below_one() {
        let new = zoom_offset(
            Point::new(0.0, 0.0),
            1.0,
            0.5,
            Point::new(0.0, 0.0),
            Size::new(400.0, 300.0),
            Size::new(400.0, 300.0),
        );
        assert!(approx(new.x, 100.0));
        assert!(approx(new.y, 75.0));
    }

    #[test]
    fn test_fit_ratio() {
        assert!(approx(
            fit_ratio(Size::new(200.0, 100.0), Size::new(100.0, 100.0)),
            0.5
        ));
        assert!(approx(
            fit_ratio(Size::new(50.0, 50.0), Size::new(100.0, 200.0)),
            2.0
        ));
        assert_eq!(fit_ratio(Size::new(0.0, 10.0), Size::new(10.0, 10.0)), 1.0);
    }

    #[test]
    fn test_cover_ratio() {
        assert!(approx(
            cover_ratio(Size::new(200.0, 100.0), Size::new(100.0, 100.0)),
            1.0
        ));
        assert!(approx(
            cover_ratio(Size::new(100.0, 50.0), Size::new(200.0, 200.0)),
            4.0
        ));
    }

    #[test]
    fn test_rotated_offset_zero_and_half_turn() {
        let size = Size::new(100.0, 50.0);
        let zero = rotated_offset(size, 0.0);
        assert!(approx(zero.x, 0.0) && approx(zero.y, 0.0));

        // 180 degrees moves the top-left corner to the bottom-right.
        let half = rotated_offset(size, 180.0);
        assert!(approx(half.x, 100.0));
        assert!(approx(half.y, 50.0));
    }

    #[test]
    fn test_rotated_offset_quarter_turn() {
        let off = rotated_offset(Size::new(100.0, 50.0), 90.0);
        // w/2 - (-h/2) = 75, h/2 - w/2 = -25
        assert!(approx(off.x, 75.0));
        assert!(approx(off.y, -25.0));
    }

    #[test]
    fn test_clamp_within_shrinks_then_shifts() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let rect = Rect::new(80.0, -10.0, 50.0, 150.0);
        let clamped = rect.clamp_within(&bounds);
        assert_eq!(clamped, Rect::new(50.0, 0.0, 50.0, 100.0));
        assert!(bounds.contains_rect(&clamped));
    }

    #[test]
    fn test_fit_aspect_landscape_ratio() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let fitted = fit_aspect_within(&rect, 16.0 / 9.0, &bounds);
        assert!(approx(fitted.height, 100.0));
        assert!(approx(fitted.width, 100.0 * 16.0 / 9.0));
    }

    #[test]
    fn test_fit_aspect_clamped_reduces_other_side() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let rect = Rect::new(0.0, 0.0, 400.0, 300.0);
        let fitted = fit_aspect_within(&rect, 2.0, &bounds);
        // height 300 * 2 = 600 > 400, so width clamps to 400 and height to 200
        assert!(approx(fitted.width, 400.0));
        assert!(approx(fitted.height, 200.0));
        assert!(bounds.contains_rect(&fitted));
    }

    #[test]
    fn test_fit_aspect_portrait_ratio() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let rect = Rect::new(350.0, 0.0, 200.0, 100.0);
        let fitted = fit_aspect_within(&rect, 0.5, &bounds);
        // height = 200 / 0.5 = 400 > 300, clamp to 300, width = 150
        assert!(approx(fitted.width, 150.0));
        assert!(approx(fitted.height, 300.0));
        assert!(approx(fitted.left, 250.0));
    }
}
