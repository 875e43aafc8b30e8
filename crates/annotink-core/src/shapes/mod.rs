//! Drawable objects placed on top of the background image.

mod arrow;
mod circle;
mod freehand;
mod image;
mod line;
mod rectangle;
mod text;

pub use arrow::{Arrow, ArrowHead};
pub use circle::Circle;
pub use freehand::Freehand;
pub use image::{BlurFilter, CropBox, Image, ImageRegion};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Same color with alpha replaced by `alpha` (0.0..=1.0).
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Alpha as a fraction in 0.0..=1.0.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// CSS form: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                (self.alpha() * 1000.0).round() / 1000.0
            )
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke end cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Soft glow drawn around a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: SerializableColor,
    pub blur: f64,
}

/// Paint properties for an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Dash pattern (None = solid).
    #[serde(default)]
    pub dash: Option<Vec<f64>>,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Glow around the stroke.
    #[serde(default)]
    pub shadow: Option<Shadow>,
    #[serde(default)]
    pub line_cap: LineCap,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Stroke-only style.
    pub fn stroke(color: SerializableColor, width: f64) -> Self {
        Self {
            stroke_color: color,
            stroke_width: width,
            ..Self::default()
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            dash: None,
            fill_color: None,
            opacity: 1.0,
            shadow: None,
            line_cap: LineCap::default(),
        }
    }
}

/// Whether an object reacts to pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Can be picked by the select tool.
    pub selectable: bool,
    /// Receives pointer events at all.
    pub evented: bool,
}

impl Interaction {
    pub const INTERACTIVE: Self = Self {
        selectable: true,
        evented: true,
    };

    pub const INERT: Self = Self {
        selectable: false,
        evented: false,
    };
}

impl Default for Interaction {
    fn default() -> Self {
        Self::INTERACTIVE
    }
}

/// Unique identifier for objects.
pub type ShapeId = Uuid;

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Common trait for all objects.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in scene coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in scene coordinates) hits this object.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Outline used by vector output.
    fn to_path(&self) -> BezPath;

    fn style(&self) -> &ShapeStyle;

    fn style_mut(&mut self) -> &mut ShapeStyle;

    fn interaction(&self) -> Interaction;

    fn set_interaction(&mut self, interaction: Interaction);
}

/// Enum wrapper for all object types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Line(Line),
    ArrowHead(ArrowHead),
    Arrow(Arrow),
    Freehand(Freehand),
    Text(Text),
    ImageRegion(ImageRegion),
    Image(Image),
}

macro_rules! each_shape {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Rectangle($s) => $body,
            Shape::Circle($s) => $body,
            Shape::Line($s) => $body,
            Shape::ArrowHead($s) => $body,
            Shape::Arrow($s) => $body,
            Shape::Freehand($s) => $body,
            Shape::Text($s) => $body,
            Shape::ImageRegion($s) => $body,
            Shape::Image($s) => $body,
        }
    };
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        each_shape!(self, s => s.id())
    }

    pub fn bounds(&self) -> Rect {
        each_shape!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        each_shape!(self, s => s.hit_test(point, tolerance))
    }

    pub fn to_path(&self) -> BezPath {
        each_shape!(self, s => s.to_path())
    }

    pub fn style(&self) -> &ShapeStyle {
        each_shape!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        each_shape!(self, s => s.style_mut())
    }

    pub fn interaction(&self) -> Interaction {
        each_shape!(self, s => s.interaction())
    }

    pub fn set_interaction(&mut self, interaction: Interaction) {
        each_shape!(self, s => s.set_interaction(interaction))
    }

    /// Shorthand for toggling both interaction flags together.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.set_interaction(if interactive {
            Interaction::INTERACTIVE
        } else {
            Interaction::INERT
        });
    }

    /// Short lowercase name, used in logs and markup ids.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rect",
            Shape::Circle(_) => "circle",
            Shape::Line(_) => "line",
            Shape::ArrowHead(_) => "arrowhead",
            Shape::Arrow(_) => "arrow",
            Shape::Freehand(_) => "path",
            Shape::Text(_) => "text",
            Shape::ImageRegion(_) => "region",
            Shape::Image(_) => "image",
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Check if this object is a blur region.
    pub fn is_region(&self) -> bool {
        matches!(self, Shape::ImageRegion(_))
    }

    pub fn as_region(&self) -> Option<&ImageRegion> {
        match self {
            Shape::ImageRegion(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_region_mut(&mut self) -> Option<&mut ImageRegion> {
        match self {
            Shape::ImageRegion(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_freehand_mut(&mut self) -> Option<&mut Freehand> {
        match self {
            Shape::Freehand(f) => Some(f),
            _ => None,
        }
    }
}
