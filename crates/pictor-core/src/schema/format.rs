//! Grouped-field formatters.
//!
//! ## Background precedence
//! 1. Explicit colour
//! 2. Blurred (auto or numeric intensity, optional brightness)
//! 3. Generative fill (plain or base64 prompt)

use base64::{engine::general_purpose, Engine as _};

use super::{FieldGroup, FieldValue, ValueMap};
use crate::compile::ParamValue;

fn text<'a>(values: &'a ValueMap, field: &str) -> Option<&'a str> {
    values
        .get(field)
        .and_then(FieldValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn number(values: &ValueMap, field: &str) -> Option<f64> {
    values
        .get(field)
        .filter(|v| !v.is_empty())
        .and_then(FieldValue::as_f64)
}

pub(crate) fn format_group(group: FieldGroup, values: &ValueMap) -> Option<ParamValue> {
    match group {
        FieldGroup::Background => format_background(values),
        FieldGroup::Focus => format_focus(values),
        FieldGroup::GenerativeFill => Some(ParamValue::Text(format_generative_fill(
            text(values, "extend_prompt").unwrap_or_default(),
        ))),
        FieldGroup::UnsharpMask => format_unsharp_mask(values),
    }
}

fn format_background(values: &ValueMap) -> Option<ParamValue> {
    let kind = text(values, "background_type");

    if let Some(color) = text(values, "background_color") {
        return Some(ParamValue::Text(normalize_color(color)));
    }

    let intensity = values
        .get("background_blur_intensity")
        .filter(|v| !v.is_empty());
    let brightness = number(values, "background_blur_brightness");
    if kind == Some("blurred") || intensity.is_some() || brightness.is_some() {
        let mut out = String::from("blurred");
        match intensity.and_then(FieldValue::as_f64) {
            Some(n) => out.push_str(&format!("_{}", n.round())),
            None if intensity.is_some() || brightness.is_some() => out.push_str("_auto"),
            None => {}
        }
        if let Some(b) = brightness {
            let b = b.round();
            if b < 0.0 {
                out.push_str(&format!("_N{}", -b));
            } else {
                out.push_str(&format!("_{b}"));
            }
        }
        return Some(ParamValue::Text(out));
    }

    let prompt = text(values, "background_prompt");
    if kind == Some("generative_fill") || prompt.is_some() {
        return Some(ParamValue::Text(format_generative_fill(
            prompt.unwrap_or_default(),
        )));
    }
    None
}

fn format_focus(values: &ValueMap) -> Option<ParamValue> {
    let anchor = text(values, "focus_anchor");
    let object = text(values, "focus_object");
    let focus = match text(values, "focus_type") {
        Some("auto") => Some("auto"),
        Some("anchor") => anchor,
        Some("object") => object,
        Some(_) => None,
        None => anchor.or(object),
    };
    focus.map(ParamValue::text)
}

fn format_unsharp_mask(values: &ValueMap) -> Option<ParamValue> {
    let radius = number(values, "radius")?;
    let sigma = number(values, "sigma")?;
    let amount = number(values, "amount")?;
    let threshold = number(values, "threshold")?;
    Some(ParamValue::Text(format!(
        "{radius}-{sigma}-{amount}-{threshold}"
    )))
}

/// Characters a prompt may contain and still be sent verbatim.
pub fn is_safe_prompt(prompt: &str) -> bool {
    prompt
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '~'))
}

/// Generative-fill value for a prompt.
///
/// Safe prompts are sent as `genfill-prompt-<prompt>`; anything else is
/// base64-encoded and URL-escaped as `genfill-prompte-<encoded>`. An empty
/// prompt yields a bare `genfill`.
pub fn format_generative_fill(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return "genfill".to_string();
    }
    if is_safe_prompt(prompt) {
        return format!("genfill-prompt-{prompt}");
    }
    let encoded = general_purpose::STANDARD.encode(prompt.as_bytes());
    format!("genfill-prompte-{}", escape_base64(&encoded))
}

/// The standard alphabet leaves `+`, `/` and `=` unsafe inside a URL.
fn escape_base64(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    for c in encoded.chars() {
        match c {
            '+' => out.push_str("%2B"),
            '/' => out.push_str("%2F"),
            '=' => out.push_str("%3D"),
            c => out.push(c),
        }
    }
    out
}

/// Strip a leading `#` and upper-case the hex digits.
pub fn normalize_color(color: &str) -> String {
    color.trim().trim_start_matches('#').to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::values;

    #[test]
    fn test_plain_prompt() {
        assert_eq!(
            format_generative_fill("sunset over hills"),
            "genfill-prompt-sunset over hills"
        );
    }

    #[test]
    fn test_unsafe_prompt_is_base64() {
        let accented = format_generative_fill("café");
        assert!(accented.starts_with("genfill-prompte-"));
        let payload = accented.trim_start_matches("genfill-prompte-");
        assert!(!payload.contains('/') && !payload.contains('+') && !payload.contains('='));

        let decoded = general_purpose::STANDARD
            .decode(payload.replace("%2B", "+").replace("%2F", "/").replace("%3D", "="))
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "café");

        assert!(format_generative_fill("sky/sea").starts_with("genfill-prompte-"));
    }

    #[test]
    fn test_empty_prompt() {
        assert_eq!(format_generative_fill("   "), "genfill");
    }

    #[test]
    fn test_background_color_wins() {
        let vals = values([
            ("background_type", FieldValue::text("blurred")),
            ("background_color", FieldValue::text("#ff0000")),
            ("background_blur_intensity", FieldValue::Number(20.0)),
            ("background_prompt", FieldValue::text("beach")),
        ]);
        assert_eq!(format_background(&vals), Some(ParamValue::text("FF0000")));
    }

    #[test]
    fn test_background_blurred_variants() {
        let plain = values([("background_type", FieldValue::text("blurred"))]);
        assert_eq!(format_background(&plain), Some(ParamValue::text("blurred")));

        let auto = values([("background_blur_intensity", FieldValue::text("auto"))]);
        assert_eq!(
            format_background(&auto),
            Some(ParamValue::text("blurred_auto"))
        );

        let numeric = values([
            ("background_blur_intensity", FieldValue::Number(25.0)),
            ("background_blur_brightness", FieldValue::Number(-15.0)),
        ]);
        assert!(crate::schema::validate("background", &numeric).is_ok());
        assert_eq!(
            format_background(&numeric),
            Some(ParamValue::text("blurred_25_N15"))
        );

        let brightness_only = values([("background_blur_brightness", FieldValue::Number(40.0))]);
        assert_eq!(
            format_background(&brightness_only),
            Some(ParamValue::text("blurred_auto_40"))
        );
    }

    #[test]
    fn test_background_blur_beats_generative_fill() {
        let vals = values([
            ("background_blur_intensity", FieldValue::Number(10.0)),
            ("background_prompt", FieldValue::text("forest")),
        ]);
        assert_eq!(
            format_background(&vals),
            Some(ParamValue::text("blurred_10"))
        );
    }

    #[test]
    fn test_background_generative_fill() {
        let vals = values([
            ("background_type", FieldValue::text("generative_fill")),
            ("background_prompt", FieldValue::text("sunset over hills")),
        ]);
        assert_eq!(
            format_background(&vals),
            Some(ParamValue::text("genfill-prompt-sunset over hills"))
        );
    }

    #[test]
    fn test_background_empty_group() {
        let vals = values([("background_type", FieldValue::text("color"))]);
        assert_eq!(format_background(&vals), None);
    }

    #[test]
    fn test_focus_resolution() {
        let auto = values([("focus_type", FieldValue::text("auto"))]);
        assert_eq!(format_focus(&auto), Some(ParamValue::text("auto")));

        let object = values([
            ("focus_type", FieldValue::text("object")),
            ("focus_object", FieldValue::text("dog")),
            ("focus_anchor", FieldValue::text("top")),
        ]);
        assert_eq!(format_focus(&object), Some(ParamValue::text("dog")));

        let anchor_missing = values([("focus_type", FieldValue::text("anchor"))]);
        assert_eq!(format_focus(&anchor_missing), None);
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color(" #a1b2c3 "), "A1B2C3");
    }
}
