//! Placement of the image and tool boxes in scene coordinates.
//!
//! The scene is laid out at canvas scale: the loaded image is fitted into
//! the canvas and centred, and every tool box is expressed relative to that
//! displayed rectangle. State stays in image pixels; conversion happens
//! here.

use crate::geometry::{cover_ratio, fit_ratio, Point, Rect, Size};
use crate::state::{ExtenderOptions, ResizeMode, ResizeOptions, ScaleMode};

/// How the loaded image sits in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDisplay {
    pub natural: Size,
    /// Scene units per image pixel.
    pub scale: f64,
    pub origin: Point,
}

impl ImageDisplay {
    /// Fit `natural` inside `canvas` without upscaling.
    pub fn fit(natural: Size, canvas: Size) -> Self {
        let scale = fit_ratio(natural, canvas).min(1.0);
        let shown = natural.scale(scale);
        let center = canvas.center();
        Self {
            natural,
            scale,
            origin: Point::new(center.x - shown.width / 2.0, center.y - shown.height / 2.0),
        }
    }

    /// Displayed image rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.natural.width * self.scale,
            self.natural.height * self.scale,
        )
    }

    pub fn to_scene(&self, r: &Rect) -> Rect {
        Rect::new(
            self.origin.x + r.left * self.scale,
            self.origin.y + r.top * self.scale,
            r.width * self.scale,
            r.height * self.scale,
        )
    }

    pub fn to_image(&self, r: &Rect) -> Rect {
        Rect::new(
            (r.left - self.origin.x) / self.scale,
            (r.top - self.origin.y) / self.scale,
            r.width / self.scale,
            r.height / self.scale,
        )
    }
}

/// Output size a resize record asks for, in image pixels.
pub fn resize_target(resize: &ResizeOptions, natural: Size) -> Size {
    match resize.mode {
        ResizeMode::Percentage => natural.scale(resize.percentage.unwrap_or(1.0)),
        ResizeMode::Absolute => Size::new(
            resize.width.map_or(natural.width, f64::from),
            resize.height.map_or(natural.height, f64::from),
        ),
    }
}

/// Extended canvas size, in image pixels.
pub fn extend_target(ext: &ExtenderOptions, natural: Size) -> Size {
    Size::new(
        ext.width.map_or(natural.width, f64::from),
        ext.height.map_or(natural.height, f64::from),
    )
}

/// A target-sized box shrunk to fit `bounds` and centred in it.
///
/// Returns the box and its scale in scene units per target pixel.
pub fn fitted_box(target: Size, display: &ImageDisplay) -> (Rect, f64) {
    let bounds = display.bounds();
    let shown = target.scale(display.scale);
    let shrink = fit_ratio(shown, bounds.size()).min(1.0);
    let rect = Rect::centered(bounds.center(), shown.scale(shrink));
    (rect, display.scale * shrink)
}

/// Image geometry inside a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    pub scale_x: f64,
    pub scale_y: f64,
    pub clip: Option<Rect>,
}

/// Lay `natural` out inside `frame` according to the scale mode.
pub fn place_image(natural: Size, frame: &Rect, mode: ScaleMode) -> Placement {
    let (scale_x, scale_y, clip) = match mode {
        ScaleMode::FitScreen => {
            let s = fit_ratio(natural, frame.size());
            (s, s, None)
        }
        ScaleMode::FillScreen => {
            let s = cover_ratio(natural, frame.size());
            (s, s, Some(*frame))
        }
        ScaleMode::Stretch if !natural.is_degenerate() => (
            frame.width / natural.width,
            frame.height / natural.height,
            None,
        ),
        ScaleMode::Stretch => (1.0, 1.0, None),
    };
    let center = frame.center();
    Placement {
        rect: Rect::new(
            center.x - natural.width * scale_x / 2.0,
            center.y - natural.height * scale_y / 2.0,
            natural.width,
            natural.height,
        ),
        scale_x,
        scale_y,
        clip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> ImageDisplay {
        // 1600x1200 image on an 800x600 canvas: half scale, fills it.
        ImageDisplay::fit(Size::new(1600.0, 1200.0), Size::new(800.0, 600.0))
    }

    #[test]
    fn test_fit_does_not_upscale() {
        let d = ImageDisplay::fit(Size::new(200.0, 100.0), Size::new(800.0, 600.0));
        assert_eq!(d.scale, 1.0);
        assert_eq!(d.bounds(), Rect::new(300.0, 250.0, 200.0, 100.0));
    }

    #[test]
    fn test_image_scene_round_trip() {
        let d = display();
        let r = Rect::new(100.0, 200.0, 400.0, 300.0);
        let scene = d.to_scene(&r);
        assert_eq!(scene, Rect::new(50.0, 100.0, 200.0, 150.0));
        assert_eq!(d.to_image(&scene), r);
    }

    #[test]
    fn test_fitted_box_shrinks_oversized_target() {
        let d = display();
        let (rect, scale) = fitted_box(Size::new(3200.0, 1200.0), &d);
        assert_eq!(rect.width, 800.0);
        assert_eq!(rect.height, 300.0);
        assert_eq!(scale, 0.25);
        assert_eq!(rect.center(), d.bounds().center());
    }

    #[test]
    fn test_place_image_modes() {
        let natural = Size::new(400.0, 200.0);
        let frame = Rect::new(0.0, 0.0, 200.0, 200.0);

        let fit = place_image(natural, &frame, ScaleMode::FitScreen);
        assert_eq!(fit.scale_x, 0.5);
        assert_eq!(fit.rect.top, 50.0);
        assert_eq!(fit.clip, None);

        let fill = place_image(natural, &frame, ScaleMode::FillScreen);
        assert_eq!(fill.scale_x, 1.0);
        assert_eq!(fill.rect.left, -100.0);
        assert_eq!(fill.clip, Some(frame));

        let stretch = place_image(natural, &frame, ScaleMode::Stretch);
        assert_eq!((stretch.scale_x, stretch.scale_y), (0.5, 1.0));
        assert_eq!(stretch.rect.left, 0.0);
    }

    #[test]
    fn test_targets_default_to_natural() {
        let natural = Size::new(640.0, 480.0);
        assert_eq!(resize_target(&ResizeOptions::default(), natural), natural);
        let half = ResizeOptions {
            mode: ResizeMode::Percentage,
            percentage: Some(0.5),
            ..ResizeOptions::default()
        };
        assert_eq!(resize_target(&half, natural), Size::new(320.0, 240.0));
        let wide = ExtenderOptions {
            width: Some(1280),
            ..ExtenderOptions::default()
        };
        assert_eq!(extend_target(&wide, natural), Size::new(1280.0, 480.0));
    }
}
