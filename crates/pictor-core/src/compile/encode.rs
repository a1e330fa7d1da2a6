//! Turning operations into a delivery URL.

use super::{Operation, ParamValue};

/// Serializes an operation list onto a source URL.
///
/// The compiler only produces [`Operation`]s; the concrete URL grammar of a
/// delivery service lives behind this trait.
pub trait TransformationEncoder {
    fn encode(&self, operations: &[Operation], source_url: &str) -> String;
}

/// `?tr=` query encoder.
///
/// Steps are joined with `:`, parameters within a step with `,`, and each
/// parameter is written as `code-value`. A `true` toggle is written as its
/// bare code.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEncoder;

impl QueryEncoder {
    fn code(name: &str) -> &str {
        match name {
            "width" => "w",
            "height" => "h",
            "aspect_ratio" => "ar",
            "crop" => "c",
            "crop_mode" => "cm",
            "focus" => "fo",
            "background" => "bg",
            "grayscale" => "e-grayscale",
            "contrast" => "e-contrast",
            "sharpen" => "e-sharpen",
            "unsharp_mask" => "e-usm",
            "upscale" => "e-upscale",
            "retouch" => "e-retouch",
            "rotation" => "rt",
            "flip" => "fl",
            "blur" => "bl",
            "quality" => "q",
            "format" => "f",
            other => other,
        }
    }

    fn param(name: &str, value: &ParamValue) -> Option<String> {
        let code = Self::code(name);
        match value {
            ParamValue::Bool(true) => Some(code.to_string()),
            ParamValue::Bool(false) => None,
            ParamValue::Number(n) => Some(format!("{code}-{n}")),
            ParamValue::Text(s) => Some(format!("{code}-{}", escape(s))),
        }
    }

    fn step(op: &Operation) -> String {
        op.params
            .iter()
            .filter_map(|p| Self::param(&p.name, &p.value))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Percent-encode everything outside the unreserved set so a value cannot
/// open a new step, parameter or query component.
///
/// Existing `%XX` escapes are kept as-is; base64 prompts arrive pre-escaped.
fn escape(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    for (i, &b) in bytes.iter().enumerate() {
        let escaped = b == b'%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') || escaped {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

impl TransformationEncoder for QueryEncoder {
    fn encode(&self, operations: &[Operation], source_url: &str) -> String {
        let steps: Vec<String> = operations
            .iter()
            .map(Self::step)
            .filter(|s| !s.is_empty())
            .collect();
        if steps.is_empty() {
            return source_url.to_string();
        }
        let sep = if source_url.contains('?') { '&' } else { '?' };
        format!("{source_url}{sep}tr={}", steps.join(":"))
    }
}
