//! Dimension label drawn above the active box.

use crate::config::LabelConfig;
use crate::geometry::{Point, Rect, Size};

/// `W x H` with both sides rounded to whole pixels.
pub fn dimension_text(size: Size) -> String {
    format!("{} x {}", size.width.round(), size.height.round())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    /// Chip geometry before scaling.
    pub chip: Rect,
    pub text_origin: Point,
    /// Applied to both chip and text so they keep a constant screen size.
    pub scale: f64,
}

/// Centre a chip horizontally on `anchor`, just above its top edge.
pub fn layout_label(anchor: &Rect, text: &str, zoom: f64, cfg: &LabelConfig) -> LabelLayout {
    let scale = if zoom > 0.0 { 1.0 / zoom } else { 1.0 };
    let width = text.chars().count() as f64 * cfg.char_width + 2.0 * cfg.padding;
    let height = cfg.font_size + 2.0 * cfg.padding;

    let left = anchor.center().x - width * scale / 2.0;
    let top = anchor.top - (cfg.gap + height) * scale;

    LabelLayout {
        chip: Rect::new(left, top, width, height),
        text_origin: Point::new(left + cfg.padding * scale, top + cfg.padding * scale),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_text_rounds() {
        assert_eq!(dimension_text(Size::new(199.6, 100.2)), "200 x 100");
    }

    #[test]
    fn test_label_sits_above_box() {
        let cfg = LabelConfig::default();
        let anchor = Rect::new(100.0, 100.0, 200.0, 100.0);
        let l = layout_label(&anchor, "200 x 100", 1.0, &cfg);
        assert_eq!(l.scale, 1.0);
        assert!(l.chip.bottom() <= anchor.top);
        assert!((l.chip.center().x - anchor.center().x).abs() < 1e-9);
    }

    #[test]
    fn test_label_inverse_scales_with_zoom() {
        let cfg = LabelConfig::default();
        let anchor = Rect::new(0.0, 100.0, 100.0, 100.0);
        let l = layout_label(&anchor, "1 x 1", 2.0, &cfg);
        assert_eq!(l.scale, 0.5);
        // Scaled chip still ends `gap` screen pixels above the box.
        let bottom = l.chip.top + l.chip.height * l.scale;
        assert!((anchor.top - bottom - cfg.gap * l.scale).abs() < 1e-9);
    }
}
