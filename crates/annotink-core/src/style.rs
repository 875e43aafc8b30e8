//! Style settings chosen in the toolbar and the dash resolver.

use crate::palette;
use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};

/// Stroke dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    /// Cycle to the next stroke style.
    pub fn next(self) -> Self {
        match self {
            StrokeStyle::Solid => StrokeStyle::Dashed,
            StrokeStyle::Dashed => StrokeStyle::Dotted,
            StrokeStyle::Dotted => StrokeStyle::Solid,
        }
    }
}

/// Dash pattern for a stroke of the given width. `None` means solid.
pub fn resolve_dash(style: StrokeStyle, width: f64) -> Option<Vec<f64>> {
    match style {
        StrokeStyle::Solid => None,
        StrokeStyle::Dashed => Some(vec![width * 2.0, width * 2.0]),
        StrokeStyle::Dotted => Some(vec![width / 2.0, width * 1.5]),
    }
}

/// Which closed shape the shape tool draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    Circle,
}

/// Whether the line tool draws a plain line or an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    #[default]
    Line,
    Arrow,
}

/// Current toolbar style. Tools copy it when they are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    pub color: SerializableColor,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
    pub shape_fill: bool,
    pub shape_kind: ShapeKind,
    pub line_kind: LineKind,
}

impl StyleSettings {
    /// Dash pattern for the current stroke style and width.
    pub fn dash(&self) -> Option<Vec<f64>> {
        resolve_dash(self.stroke_style, self.stroke_width)
    }
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            color: palette::DEFAULT_COLOR,
            stroke_width: 5.0,
            stroke_style: StrokeStyle::Solid,
            shape_fill: false,
            shape_kind: ShapeKind::Rect,
            line_kind: LineKind::Line,
        }
    }
}
