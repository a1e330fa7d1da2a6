//! WASM bindings for the transformation schema.
//!
//! Forms are rendered by the host from `transformation_schema()` and
//! checked here before a transformation is added to the pipeline.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const kinds = transformation_schema();
//! validate_transformation('resize', { width: 200 }); // throws on error
//! field_visible('background', 'background_prompt', { background_type: 'color' }); // false
//! ```

use pictor_core::schema::{self, ValueMap};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn parse_values(values: JsValue) -> Result<ValueMap, JsValue> {
    if values.is_undefined() || values.is_null() {
        return Ok(ValueMap::new());
    }
    serde_wasm_bindgen::from_value(values)
        .map_err(|e| JsValue::from_str(&format!("Invalid values: {}", e)))
}

/// Every registered transformation kind with its fields and defaults.
#[wasm_bindgen]
pub fn transformation_schema() -> Result<JsValue, JsValue> {
    schema::all()
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Validate form values for the transformation `key`.
///
/// # Errors
/// Returns the first validation failure as a string
#[wasm_bindgen]
pub fn validate_transformation(key: &str, values: JsValue) -> Result<(), JsValue> {
    let values = parse_values(values)?;
    schema::validate(key, &values).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether `field` of `key` should be shown given the sibling values.
#[wasm_bindgen]
pub fn field_visible(key: &str, field: &str, values: JsValue) -> Result<bool, JsValue> {
    let values = parse_values(values)?;
    Ok(schema::is_visible(key, field, &values))
}
