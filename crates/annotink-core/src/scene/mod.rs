//! Drawing surface abstraction.
//!
//! A [`Scene`] owns the background image, the ordered committed objects, a
//! provisional layer for in-progress gestures and the current selection.
//! Rendering engines implement it; [`MemoryScene`] is the in-memory
//! implementation used headlessly and in tests.

mod memory;
mod svg;

pub use memory::{MemoryScene, Rasterizer};
pub use svg::write_svg;

use crate::shapes::{LineCap, SerializableColor, Shadow, Shape, ShapeId, ShapeStyle};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Object already in scene: {0}")]
    DuplicateObject(ShapeId),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Render error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Serialization(err.to_string())
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Background image drawn beneath every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub src: String,
    /// Intrinsic width in pixels.
    pub width: f64,
    /// Intrinsic height in pixels.
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl BackgroundImage {
    /// Background scaled uniformly to fit inside `viewport`, never enlarged.
    pub fn fit(src: impl Into<String>, width: f64, height: f64, viewport: Size) -> Self {
        let scale = (viewport.width / width)
            .min(viewport.height / height)
            .min(1.0);
        Self {
            src: src.into(),
            width,
            height,
            scale_x: scale,
            scale_y: scale,
        }
    }

    /// Size on screen.
    pub fn display_size(&self) -> Size {
        Size::new(self.width * self.scale_x, self.height * self.scale_y)
    }

    pub fn to_ref(&self) -> BackgroundRef {
        BackgroundRef {
            src: self.src.clone(),
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }
}

/// What a snapshot remembers about the background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundRef {
    pub src: String,
    pub scale_x: f64,
    pub scale_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SnapshotData {
    objects: Vec<Shape>,
    background: Option<BackgroundRef>,
}

/// Immutable capture of the committed scene.
///
/// Cloning is cheap; equality compares contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    data: Arc<SnapshotData>,
}

impl Snapshot {
    pub fn new(objects: Vec<Shape>, background: Option<BackgroundRef>) -> Self {
        Self {
            data: Arc::new(SnapshotData {
                objects,
                background,
            }),
        }
    }

    pub fn objects(&self) -> &[Shape] {
        &self.data.objects
    }

    pub fn background(&self) -> Option<&BackgroundRef> {
        self.data.background.as_ref()
    }

    pub fn len(&self) -> usize {
        self.data.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.objects.is_empty()
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(&*self.data)?)
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let data: SnapshotData = serde_json::from_str(json)?;
        Ok(Self {
            data: Arc::new(data),
        })
    }
}

/// Native freehand brush configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub color: SerializableColor,
    pub width: f64,
    pub dash: Option<Vec<f64>>,
    pub shadow: Option<Shadow>,
    pub line_cap: LineCap,
}

impl BrushSettings {
    /// Style given to strokes drawn with this brush.
    pub fn to_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.color,
            stroke_width: self.width,
            dash: self.dash.clone(),
            fill_color: None,
            opacity: 1.0,
            shadow: self.shadow,
            line_cap: self.line_cap,
        }
    }
}

/// Raster encodings a scene can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Parameters for a raster capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterRequest {
    pub format: RasterFormat,
    /// Lossy quality in 0.0..=1.0 (ignored by PNG).
    pub quality: f64,
    /// Output size multiplier.
    pub multiplier: f64,
}

/// Events the host forwards from its scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    SelectionChanged(Vec<ShapeId>),
    ObjectMoving(ShapeId),
    ObjectScaling(ShapeId),
    /// A move or scale gesture finished.
    ObjectModified(ShapeId),
    /// The native brush finished a stroke.
    PathCreated(ShapeId),
    TextEditingExited(ShapeId),
}

/// A drawing surface.
///
/// Committed objects are kept in z-order (first = bottom). Ids are unique
/// across the committed list; the provisional layer is never part of
/// [`Scene::objects`] or of a snapshot.
pub trait Scene {
    fn size(&self) -> Size;

    fn set_size(&mut self, size: Size);

    /// Append an object. Returns false (and drops nothing) when the id is
    /// already present.
    fn add_object(&mut self, shape: Shape) -> bool;

    fn remove_object(&mut self, id: ShapeId) -> Option<Shape>;

    /// Committed objects in z-order.
    fn objects(&self) -> &[Shape];

    fn objects_mut(&mut self) -> &mut [Shape];

    fn object(&self, id: ShapeId) -> Option<&Shape> {
        self.objects().iter().find(|s| s.id() == id)
    }

    fn object_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects_mut().iter_mut().find(|s| s.id() == id)
    }

    /// Show an in-progress object above the committed ones.
    fn add_provisional(&mut self, shape: Shape);

    fn provisional(&self, id: ShapeId) -> Option<&Shape>;

    fn provisional_mut(&mut self, id: ShapeId) -> Option<&mut Shape>;

    /// Remove an object from the provisional layer.
    fn take_provisional(&mut self, id: ShapeId) -> Option<Shape>;

    /// Topmost evented committed object under `point`.
    fn hit_test(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.objects()
            .iter()
            .rev()
            .find(|s| s.interaction().evented && s.hit_test(point, tolerance))
            .map(|s| s.id())
    }

    /// Make `id` the sole selection.
    fn set_active_object(&mut self, id: ShapeId);

    fn selection(&self) -> &[ShapeId];

    fn discard_active_object(&mut self);

    /// Start editing a text object with its whole content selected.
    fn enter_text_editing(&mut self, id: ShapeId) -> bool;

    /// Stop editing; returns the object that was being edited.
    fn exit_text_editing(&mut self) -> Option<ShapeId>;

    fn editing_text(&self) -> Option<ShapeId>;

    /// Remove everything, background included.
    fn clear(&mut self);

    fn set_marquee_selection(&mut self, enabled: bool);

    fn marquee_selection(&self) -> bool;

    fn background(&self) -> Option<&BackgroundImage>;

    fn set_background(&mut self, background: Option<BackgroundImage>);

    /// Enable (`Some`) or disable (`None`) native freehand drawing.
    fn set_brush(&mut self, brush: Option<BrushSettings>);

    fn brush(&self) -> Option<&BrushSettings>;

    /// Capture the committed objects and, if asked, the background reference.
    fn to_snapshot(&self, include_background: bool) -> Snapshot {
        let background = if include_background {
            self.background().map(BackgroundImage::to_ref)
        } else {
            None
        };
        Snapshot::new(self.objects().to_vec(), background)
    }

    /// Replace all committed objects at once.
    ///
    /// Fails without touching the scene if the list holds duplicate ids.
    fn load_objects(&mut self, objects: Vec<Shape>) -> SceneResult<()>;

    fn request_render(&mut self);

    /// Encoded raster image of the scene.
    fn to_raster_data(&self, request: &RasterRequest) -> SceneResult<Vec<u8>>;

    /// SVG markup of the scene.
    fn to_vector_markup(&self) -> SceneResult<String>;
}

/// First duplicated id in `objects`, if any.
pub(crate) fn find_duplicate(objects: &[Shape]) -> Option<ShapeId> {
    let mut seen = std::collections::HashSet::new();
    objects.iter().map(Shape::id).find(|id| !seen.insert(*id))
}
