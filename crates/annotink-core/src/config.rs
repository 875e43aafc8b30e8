//! Session configuration.

use crate::style::StyleSettings;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults for new text boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub placeholder: String,
    pub font_size: f64,
    pub font_family: String,
    pub box_width: f64,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            placeholder: "Text".to_string(),
            font_size: 20.0,
            font_family: "Arial".to_string(),
            box_width: 200.0,
        }
    }
}

/// Highlighter brush derived from the stroke style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Alpha applied to the stroke color.
    pub alpha: f64,
    /// Multiplier on the stroke width.
    pub width_factor: f64,
    /// Glow blur radius.
    pub glow: f64,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            width_factor: 3.0,
            glow: 10.0,
        }
    }
}

/// Everything a host can tune about an annotation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Initial toolbar style.
    pub style: StyleSettings,
    /// Tools the host exposes; others cannot be selected.
    pub enabled_tools: Vec<ToolKind>,
    /// Drags smaller than this (px) are discarded.
    pub min_drag_size: f64,
    /// Delay before recomputing a blur region's crop while it moves.
    pub crop_debounce_ms: u64,
    /// Blur filter intensity for new regions (0.0..=1.0).
    pub blur_intensity: f64,
    pub highlighter: HighlighterConfig,
    pub text: TextDefaults,
    /// Default lossy raster quality (0.0..=1.0).
    pub raster_quality: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            style: StyleSettings::default(),
            enabled_tools: ToolKind::ALL.to_vec(),
            min_drag_size: 5.0,
            crop_debounce_ms: 100,
            blur_intensity: 0.2,
            highlighter: HighlighterConfig::default(),
            text: TextDefaults::default(),
            raster_quality: 0.92,
        }
    }
}

impl SessionConfig {
    pub fn crop_debounce(&self) -> Duration {
        Duration::from_millis(self.crop_debounce_ms)
    }

    pub fn is_enabled(&self, tool: ToolKind) -> bool {
        self.enabled_tools.contains(&tool)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
