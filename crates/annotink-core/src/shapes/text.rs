//! Editable text box.

use super::{Interaction, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed-width text box anchored at its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Center of the box.
    pub center: Point,
    /// The text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    pub font_family: String,
    /// Box width; text wraps inside it.
    pub width: f64,
    /// Fill color is the glyph color.
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.16;

    /// Create a new text box.
    pub fn new(center: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: "Arial".to_string(),
            width: 200.0,
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
        }
    }

    /// True when the content holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Number of rendered lines (hard breaks only, at least one).
    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }

    /// Approximate box height.
    pub fn height(&self) -> f64 {
        self.line_count() as f64 * self.font_size * Self::LINE_HEIGHT
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.width, self.height()))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn interaction(&self) -> Interaction {
        self.interaction
    }

    fn set_interaction(&mut self, interaction: Interaction) {
        self.interaction = interaction;
    }
}
