//! Composable validation rules.
//!
//! Type checks implied by a field's [`InputKind`] run first, on every
//! non-empty value. Entry-level [`Rule`]s then cover presence and
//! cross-field constraints.

use serde::Serialize;

use super::expression::Dimension;
use super::{FieldDescriptor, FieldValue, InputKind, ValueMap};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Field must be present and non-empty.
    Required { field: &'static str },
    /// At least one of the fields must be set.
    AtLeastOneOf { fields: &'static [&'static str] },
    /// No more than `max` of the fields may be set together.
    AtMostOf {
        fields: &'static [&'static str],
        max: usize,
    },
    /// `W-H` pair of positive numbers, or a dimension expression.
    AspectRatio { field: &'static str },
    /// `auto` or a number within range.
    AutoOrRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

fn is_set(values: &ValueMap, field: &str) -> bool {
    values.get(field).is_some_and(|v| !v.is_empty())
}

impl Rule {
    pub fn check(&self, values: &ValueMap) -> Result<(), ValidationError> {
        match *self {
            Rule::Required { field } => {
                if !is_set(values, field) {
                    return Err(ValidationError::field(field, "is required"));
                }
            }
            Rule::AtLeastOneOf { fields } => {
                if !fields.iter().any(|f| is_set(values, f)) {
                    return Err(ValidationError::cross_field(format!(
                        "one of {} is required",
                        fields.join(", ")
                    )));
                }
            }
            Rule::AtMostOf { fields, max } => {
                let count = fields.iter().filter(|f| is_set(values, f)).count();
                if count > max {
                    return Err(ValidationError::cross_field(format!(
                        "at most {max} of {} may be set",
                        fields.join(", ")
                    )));
                }
            }
            Rule::AspectRatio { field } => {
                if let Some(value) = values.get(field).filter(|v| !v.is_empty()) {
                    check_aspect_ratio(field, value)?;
                }
            }
            Rule::AutoOrRange { field, min, max } => {
                if let Some(value) = values.get(field).filter(|v| !v.is_empty()) {
                    if value.as_str().map(str::trim) != Some("auto") {
                        check_range(field, value, min, max)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_aspect_ratio(field: &str, value: &FieldValue) -> Result<(), ValidationError> {
    let text = value
        .as_str()
        .ok_or_else(|| ValidationError::field(field, "must be text like `16-9`"))?
        .trim();

    if let Some((w, h)) = text.split_once('-') {
        let positive = |s: &str| s.parse::<f64>().is_ok_and(|n| n.is_finite() && n > 0.0);
        if positive(w) && positive(h) {
            return Ok(());
        }
        return Err(ValidationError::field(field, format!("`{text}` is not a ratio")));
    }

    Dimension::parse(field, text).map(|_| ())
}

fn check_range(field: &str, value: &FieldValue, min: f64, max: f64) -> Result<(), ValidationError> {
    let n = value
        .as_f64()
        .ok_or_else(|| ValidationError::field(field, "must be a number"))?;
    if !(n.is_finite() && (min..=max).contains(&n)) {
        return Err(ValidationError::field(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Reject colours that are not 6 or 8 hex digits, with an optional `#`.
pub(crate) fn check_color(field: &str, text: &str) -> Result<(), ValidationError> {
    let hex = text.trim().trim_start_matches('#');
    if matches!(hex.len(), 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::field(
            field,
            format!("`{text}` is not a hex colour"),
        ))
    }
}

/// Type check implied by the field's input kind.
pub(crate) fn check_input(field: &FieldDescriptor, value: &FieldValue) -> Result<(), ValidationError> {
    let name = field.name;
    match field.input {
        InputKind::Toggle => {
            if value.as_bool().is_none() {
                return Err(ValidationError::field(name, "must be true or false"));
            }
        }
        InputKind::Number { min, max, .. } => check_range(name, value, min, max)?,
        InputKind::Dimension => match value {
            FieldValue::Number(n) => {
                Dimension::literal(name, *n)?;
            }
            FieldValue::Text(s) => {
                Dimension::parse(name, s)?;
            }
            FieldValue::Bool(_) => {
                return Err(ValidationError::field(name, "must be a dimension"));
            }
        },
        InputKind::Text => {
            if value.as_str().is_none() {
                return Err(ValidationError::field(name, "must be text"));
            }
        }
        InputKind::AutoOrNumber { min, max } => {
            if value.as_str().map(str::trim) != Some("auto") {
                check_range(name, value, min, max)?;
            }
        }
        InputKind::Color => {
            let text = value
                .as_str()
                .ok_or_else(|| ValidationError::field(name, "must be a hex colour"))?;
            check_color(name, text)?;
        }
        InputKind::Select { options } => {
            let text = value.as_str().map(str::trim).unwrap_or_default();
            if !options.contains(&text) {
                return Err(ValidationError::field(
                    name,
                    format!("must be one of {}", options.join(", ")),
                ));
            }
        }
    }
    Ok(())
}
