//! Transformation schema registry.
//!
//! A static catalogue of transformation kinds. Each entry owns its default
//! values, the field list an editing form renders, and the validation rules
//! applied before a value map is accepted into the pipeline.
//!
//! ## Grouped fields
//!
//! Some fields are not emitted one-to-one. Fields sharing a [`FieldGroup`]
//! are handed together to a named formatter that inspects the whole group
//! and emits a single parameter (e.g. the `background` group collapses
//! type, colour, blur and prompt into one `background` value).
//!
//! ## Visibility
//!
//! Fields can carry a predicate over sibling values. The registry only
//! evaluates it; rendering the form is up to the host.

mod expression;
mod format;
mod registry;
mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compile::{Operation, ParamValue};
use crate::error::ValidationError;

pub use expression::{ArithOp, Dimension, DimensionExpr, DimensionToken, ExprError};
pub use format::{format_generative_fill, is_safe_prompt, normalize_color};
pub use registry::REGISTRY;
pub use rules::Rule;

pub(crate) use rules::check_color;

/// Bumped whenever a key, field or rule changes meaning.
pub const SCHEMA_VERSION: u32 = 1;

/// A single form value as received from the editing form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view; numeric text counts as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Empty text and `false` toggles are skipped when compiling.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Bool(b) => !b,
            FieldValue::Number(n) => !n.is_finite(),
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }

    pub(crate) fn to_param(&self) -> ParamValue {
        match self {
            FieldValue::Bool(b) => ParamValue::Bool(*b),
            FieldValue::Number(n) => ParamValue::Number(*n),
            FieldValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => ParamValue::Number(n),
                _ => ParamValue::Text(s.trim().to_string()),
            },
        }
    }
}

pub type ValueMap = BTreeMap<String, FieldValue>;

/// Const-constructible default value for registry entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StaticValue {
    Bool(bool),
    Number(f64),
    Text(&'static str),
}

impl From<StaticValue> for FieldValue {
    fn from(value: StaticValue) -> Self {
        match value {
            StaticValue::Bool(b) => FieldValue::Bool(b),
            StaticValue::Number(n) => FieldValue::Number(n),
            StaticValue::Text(s) => FieldValue::Text(s.to_string()),
        }
    }
}

impl From<StaticValue> for ParamValue {
    fn from(value: StaticValue) -> Self {
        match value {
            StaticValue::Bool(b) => ParamValue::Bool(b),
            StaticValue::Number(n) => ParamValue::Number(n),
            StaticValue::Text(s) => ParamValue::Text(s.to_string()),
        }
    }
}

/// How a form should collect a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputKind {
    Toggle,
    Number { min: f64, max: f64, step: f64 },
    /// Positive literal or `<token>_<op>_<operand>` expression.
    Dimension,
    Text,
    /// `auto` or a number within range.
    AutoOrNumber { min: f64, max: f64 },
    Color,
    Select { options: &'static [&'static str] },
}

/// Fields resolved together by one formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Background,
    Focus,
    GenerativeFill,
    UnsharpMask,
}

impl FieldGroup {
    /// Parameter the group emits.
    pub const fn param(self) -> &'static str {
        match self {
            FieldGroup::Background | FieldGroup::GenerativeFill => "background",
            FieldGroup::Focus => "focus",
            FieldGroup::UnsharpMask => "unsharp_mask",
        }
    }
}

#[derive(Clone, Copy, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    /// Output parameter for ungrouped fields.
    pub param: &'static str,
    pub input: InputKind,
    pub group: Option<FieldGroup>,
    #[serde(skip)]
    pub visible_when: Option<fn(&ValueMap) -> bool>,
}

#[derive(Clone, Copy, Serialize)]
pub struct TransformationKind {
    pub key: &'static str,
    pub name: &'static str,
    pub defaults: &'static [(&'static str, StaticValue)],
    pub fields: &'static [FieldDescriptor],
    pub rules: &'static [Rule],
    /// Parameters appended whenever the operation is non-empty.
    pub fixed: &'static [(&'static str, StaticValue)],
}

impl TransformationKind {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fresh value map holding this kind's defaults.
    pub fn default_values(&self) -> ValueMap {
        self.defaults
            .iter()
            .map(|(name, value)| (name.to_string(), FieldValue::from(*value)))
            .collect()
    }
}

/// All registered kinds, in catalogue order.
pub fn all() -> &'static [TransformationKind] {
    REGISTRY
}

pub fn lookup(key: &str) -> Option<&'static TransformationKind> {
    REGISTRY.iter().find(|k| k.key == key)
}

fn lookup_or_err(key: &str) -> Result<&'static TransformationKind, ValidationError> {
    lookup(key).ok_or_else(|| ValidationError::UnknownTransformation(key.to_string()))
}

/// Validate a value map against a kind's field types and rules.
pub fn validate(key: &str, values: &ValueMap) -> Result<(), ValidationError> {
    let kind = lookup_or_err(key)?;

    for (name, value) in values {
        let field = kind
            .field(name)
            .ok_or_else(|| ValidationError::field(name.as_str(), "unknown field"))?;
        if !value.is_empty() {
            rules::check_input(field, value)?;
        }
    }

    for rule in kind.rules {
        rule.check(values)?;
    }
    Ok(())
}

/// Evaluate a field's visibility predicate against sibling values.
///
/// Unknown kinds or fields are reported as hidden.
pub fn is_visible(key: &str, field: &str, values: &ValueMap) -> bool {
    lookup(key)
        .and_then(|k| k.field(field))
        .map(|f| f.visible_when.map_or(true, |pred| pred(values)))
        .unwrap_or(false)
}

/// Turn a validated value map into a single operation.
///
/// Grouped fields are resolved once per group, at the position of the
/// group's first field. Empty values are skipped. Fixed parameters are
/// appended only when something else was emitted.
pub fn format(key: &str, values: &ValueMap) -> Result<Operation, ValidationError> {
    let kind = lookup_or_err(key)?;
    let mut op = Operation::new(kind.key);
    let mut seen: Vec<FieldGroup> = Vec::new();

    for field in kind.fields {
        match field.group {
            Some(group) => {
                if seen.contains(&group) {
                    continue;
                }
                seen.push(group);
                if let Some(value) = format::format_group(group, values) {
                    op.push(group.param(), value);
                }
            }
            None => {
                if let Some(value) = values.get(field.name).filter(|v| !v.is_empty()) {
                    op.push(field.param, value.to_param());
                }
            }
        }
    }

    if !op.is_empty() {
        for (name, value) in kind.fixed {
            op.push(*name, ParamValue::from(*value));
        }
    }
    Ok(op)
}

/// Helper for building value maps in code and tests.
pub fn values<I, K>(entries: I) -> ValueMap
where
    I: IntoIterator<Item = (K, FieldValue)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_unique_key() {
        let mut keys: Vec<_> = all().iter().map(|k| k.key).collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        assert_eq!(before, keys.len());
    }

    #[test]
    fn test_defaults_pass_validation() {
        for kind in all() {
            let defaults = kind.default_values();
            for name in defaults.keys() {
                assert!(kind.field(name).is_some(), "{}: {}", kind.key, name);
            }
        }
        assert!(validate("grayscale", &lookup("grayscale").unwrap().default_values()).is_ok());
    }

    #[test]
    fn test_unknown_kind_and_field() {
        assert!(matches!(
            validate("warp", &ValueMap::new()),
            Err(ValidationError::UnknownTransformation(_))
        ));
        let vals = values([("bogus", FieldValue::Bool(true))]);
        assert!(matches!(
            validate("grayscale", &vals),
            Err(ValidationError::Field { .. })
        ));
    }

    #[test]
    fn test_resize_format_width_height() {
        let vals = values([
            ("width", FieldValue::Number(200.0)),
            ("height", FieldValue::Number(100.0)),
        ]);
        validate("resize", &vals).unwrap();
        let op = format("resize", &vals).unwrap();
        assert_eq!(op.params.len(), 2);
        assert_eq!(op.get("width"), Some(&ParamValue::Number(200.0)));
        assert_eq!(op.get("height"), Some(&ParamValue::Number(100.0)));
    }

    #[test]
    fn test_resize_mutual_exclusivity() {
        let vals = values([
            ("width", FieldValue::Number(200.0)),
            ("height", FieldValue::Number(100.0)),
            ("aspect_ratio", FieldValue::text("4-3")),
        ]);
        assert!(matches!(
            validate("resize", &vals),
            Err(ValidationError::CrossField(_))
        ));
    }

    #[test]
    fn test_dimension_expression_accepted_and_kept_as_text() {
        let vals = values([("width", FieldValue::text("iw_div_2"))]);
        validate("resize", &vals).unwrap();
        let op = format("resize", &vals).unwrap();
        assert_eq!(op.get("width"), Some(&ParamValue::text("iw_div_2")));
    }

    #[test]
    fn test_invalid_dimension_rejected() {
        let vals = values([("width", FieldValue::text("iw_div"))]);
        assert!(validate("resize", &vals).is_err());
        let vals = values([("width", FieldValue::Number(-3.0))]);
        assert!(validate("resize", &vals).is_err());
    }

    #[test]
    fn test_number_range_enforced() {
        let vals = values([("sharpen", FieldValue::Number(500.0))]);
        assert!(validate("sharpen", &vals).is_err());
        let vals = values([("sharpen", FieldValue::Number(10.0))]);
        assert!(validate("sharpen", &vals).is_ok());
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let vals = values([("flip", FieldValue::text("diagonal"))]);
        assert!(validate("flip", &vals).is_err());
    }

    #[test]
    fn test_visibility_predicates() {
        let color = values([("background_type", FieldValue::text("color"))]);
        assert!(is_visible("background", "background_color", &color));
        assert!(!is_visible("background", "background_prompt", &color));

        let fill = values([("background_type", FieldValue::text("generative_fill"))]);
        assert!(is_visible("background", "background_prompt", &fill));
        assert!(!is_visible("background", "background_blur_intensity", &fill));

        assert!(is_visible("resize", "width", &ValueMap::new()));
        assert!(!is_visible("resize", "nope", &ValueMap::new()));
    }

    #[test]
    fn test_fixed_params_only_when_non_empty() {
        let op = format("extract", &ValueMap::new()).unwrap();
        assert!(op.is_empty());

        let vals = values([
            ("x", FieldValue::Number(10.0)),
            ("y", FieldValue::Number(0.0)),
            ("width", FieldValue::Number(50.0)),
            ("height", FieldValue::Number(40.0)),
        ]);
        let op = format("extract", &vals).unwrap();
        assert_eq!(op.get("crop_mode"), Some(&ParamValue::text("extract")));
    }

    #[test]
    fn test_focus_group_emits_single_param() {
        let vals = values([
            ("width", FieldValue::Number(300.0)),
            ("height", FieldValue::Number(300.0)),
            ("focus_type", FieldValue::text("anchor")),
            ("focus_anchor", FieldValue::text("top_left")),
        ]);
        validate("resize", &vals).unwrap();
        let op = format("resize", &vals).unwrap();
        assert_eq!(op.get("focus"), Some(&ParamValue::text("top_left")));
        assert_eq!(op.params.iter().filter(|p| p.name == "focus").count(), 1);
    }

    #[test]
    fn test_unsharp_mask_group() {
        let vals = values([
            ("radius", FieldValue::Number(2.0)),
            ("sigma", FieldValue::Number(2.0)),
            ("amount", FieldValue::Number(0.8)),
            ("threshold", FieldValue::Number(0.024)),
        ]);
        validate("unsharp_mask", &vals).unwrap();
        let op = format("unsharp_mask", &vals).unwrap();
        assert_eq!(op.get("unsharp_mask"), Some(&ParamValue::text("2-2-0.8-0.024")));
    }

    #[test]
    fn test_unsharp_mask_requires_all_fields() {
        let vals = values([("radius", FieldValue::Number(2.0))]);
        assert!(validate("unsharp_mask", &vals).is_err());
    }
}
