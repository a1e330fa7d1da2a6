//! Editor configuration.
//!
//! Every field has a default so hosts only need to override what they care
//! about:
//!
//! ```json
//! { "history_limit": 50, "load": { "max_attempts": 5 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Top-level editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of snapshots kept in history.
    pub history_limit: usize,
    /// Zoom change per unit of wheel delta.
    pub wheel_zoom_factor: f64,
    /// Quiet period before a canvas resize observation is applied.
    pub canvas_resize_debounce_ms: u64,
    /// Quiet period before a colour input value is applied.
    pub color_commit_debounce_ms: u64,
    pub load: LoadConfig,
    pub label: LabelConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            wheel_zoom_factor: 0.0004167,
            canvas_resize_debounce_ms: 150,
            color_commit_debounce_ms: 300,
            load: LoadConfig::default(),
            label: LabelConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON, filling unspecified fields with
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let config: EditorConfig = serde_json::from_str(json)
            .map_err(|e| ValidationError::field("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the editor cannot operate with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_limit == 0 {
            return Err(ValidationError::field("history_limit", "must be at least 1"));
        }
        if self.load.max_attempts == 0 {
            return Err(ValidationError::field(
                "load.max_attempts",
                "must be at least 1",
            ));
        }
        if !self.wheel_zoom_factor.is_finite() || self.wheel_zoom_factor <= 0.0 {
            return Err(ValidationError::field(
                "wheel_zoom_factor",
                "must be a positive number",
            ));
        }
        Ok(())
    }
}

/// Image polling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Attempts before giving up.
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub backoff_ms: u64,
    /// Response header whose presence marks a failed render.
    pub error_header: String,
    /// How long each overlay caption stays before rotating.
    pub caption_interval_ms: u64,
    /// Captions shown under the spinner while loading.
    pub captions: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff_ms: 2000,
            error_header: "x-error".to_string(),
            caption_interval_ms: 2500,
            captions: vec![
                "Processing image...".to_string(),
                "Applying transformations...".to_string(),
                "Almost there...".to_string(),
            ],
        }
    }
}

/// Dimension label metrics in canvas pixels (before inverse zoom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub font_size: f64,
    pub padding: f64,
    /// Distance between the chip and the top edge of the box.
    pub gap: f64,
    /// Average glyph advance used to size the chip.
    pub char_width: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            padding: 6.0,
            gap: 8.0,
            char_width: 7.0,
        }
    }
}
