//! In-memory scene.

use super::{
    BackgroundImage, BrushSettings, RasterRequest, Scene, SceneError, SceneEvent, SceneResult,
    find_duplicate, svg,
};
use crate::shapes::{Freehand, Shape, ShapeId};
use kurbo::{Point, Size, Vec2};

/// Encodes a scene into raster bytes.
pub type Rasterizer = fn(&MemoryScene, &RasterRequest) -> SceneResult<Vec<u8>>;

/// Scene kept entirely in memory.
///
/// Besides the [`Scene`] operations it offers helpers that play the part of
/// a user interacting with a real engine (drawing a brush stroke, typing,
/// dragging). Those helpers return the [`SceneEvent`] the engine would emit;
/// the caller forwards it to the session.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    size: Size,
    background: Option<BackgroundImage>,
    objects: Vec<Shape>,
    provisional: Vec<Shape>,
    selection: Vec<ShapeId>,
    editing: Option<ShapeId>,
    text_selected_all: bool,
    marquee: bool,
    brush: Option<BrushSettings>,
    renders: usize,
    rasterizer: Option<Rasterizer>,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Scene with a background, sized to the background's display size.
    pub fn with_background(background: BackgroundImage) -> Self {
        let mut scene = Self::new(background.display_size());
        scene.background = Some(background);
        scene
    }

    /// Use `rasterizer` for [`Scene::to_raster_data`].
    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Objects currently in the provisional layer.
    pub fn provisional_objects(&self) -> &[Shape] {
        &self.provisional
    }

    /// Number of render requests received.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Whether the text being edited has all of its content selected.
    pub fn is_text_fully_selected(&self) -> bool {
        self.editing.is_some() && self.text_selected_all
    }

    /// Finish a brush stroke through `points`.
    ///
    /// Returns `None` when no brush is active or there are no points.
    pub fn draw_stroke(&mut self, points: Vec<Point>) -> Option<SceneEvent> {
        let brush = self.brush.as_ref()?;
        if points.is_empty() {
            return None;
        }
        let stroke = Freehand::from_points(points, brush.to_style());
        let id = stroke.id;
        self.objects.push(Shape::Freehand(stroke));
        Some(SceneEvent::PathCreated(id))
    }

    /// Replace the content of the text being edited.
    pub fn type_text(&mut self, content: &str) -> bool {
        let Some(id) = self.editing else {
            return false;
        };
        let Some(text) = self.lookup_mut(id).and_then(Shape::as_text_mut) else {
            return false;
        };
        text.content = content.to_string();
        self.text_selected_all = false;
        true
    }

    /// Leave text editing the way a click elsewhere would.
    pub fn finish_text_editing(&mut self) -> Option<SceneEvent> {
        self.exit_text_editing().map(SceneEvent::TextEditingExited)
    }

    /// Select the topmost selectable object under `point`, or clear the
    /// selection when there is none.
    pub fn click(&mut self, point: Point) -> SceneEvent {
        let hit = self
            .hit_test(point, 2.0)
            .filter(|id| self.object(*id).is_some_and(|s| s.interaction().selectable));
        self.selection = hit.into_iter().collect();
        SceneEvent::SelectionChanged(self.selection.clone())
    }

    /// Drag a committed object by `delta`.
    pub fn move_object(&mut self, id: ShapeId, delta: Vec2) -> Option<SceneEvent> {
        let shape = self.objects.iter_mut().find(|s| s.id() == id)?;
        translate(shape, delta);
        Some(SceneEvent::ObjectMoving(id))
    }

    /// Resize a committed object by multiplying its scale.
    ///
    /// Only image-backed objects carry a scale; others yield `None`.
    pub fn scale_object(&mut self, id: ShapeId, sx: f64, sy: f64) -> Option<SceneEvent> {
        match self.objects.iter_mut().find(|s| s.id() == id)? {
            Shape::ImageRegion(region) => {
                region.scale_x *= sx;
                region.scale_y *= sy;
            }
            Shape::Image(image) => {
                image.scale_x *= sx;
                image.scale_y *= sy;
            }
            _ => return None,
        }
        Some(SceneEvent::ObjectScaling(id))
    }

    /// End of a move/scale gesture.
    pub fn release_object(&self, id: ShapeId) -> Option<SceneEvent> {
        self.object(id).map(|_| SceneEvent::ObjectModified(id))
    }

    fn lookup_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects
            .iter_mut()
            .chain(self.provisional.iter_mut())
            .find(|s| s.id() == id)
    }

    fn contains(&self, id: ShapeId) -> bool {
        self.objects
            .iter()
            .chain(self.provisional.iter())
            .any(|s| s.id() == id)
    }
}

fn translate(shape: &mut Shape, delta: Vec2) {
    match shape {
        Shape::Rectangle(r) => r.position += delta,
        Shape::Circle(c) => c.center += delta,
        Shape::Line(l) => {
            l.start += delta;
            l.end += delta;
        }
        Shape::ArrowHead(h) => h.center += delta,
        Shape::Arrow(a) => {
            a.line.start += delta;
            a.line.end += delta;
            a.head.center += delta;
        }
        Shape::Freehand(f) => {
            for p in &mut f.points {
                *p += delta;
            }
        }
        Shape::Text(t) => t.center += delta,
        Shape::ImageRegion(r) => {
            r.left += delta.x;
            r.top += delta.y;
        }
        Shape::Image(i) => i.position += delta,
    }
}

impl Scene for MemoryScene {
    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn add_object(&mut self, shape: Shape) -> bool {
        if self.objects.iter().any(|s| s.id() == shape.id()) {
            log::warn!("Rejected duplicate object {}", shape.id());
            return false;
        }
        self.objects.push(shape);
        true
    }

    fn remove_object(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.objects.iter().position(|s| s.id() == id)?;
        self.selection.retain(|s| *s != id);
        if self.editing == Some(id) {
            self.editing = None;
        }
        Some(self.objects.remove(index))
    }

    fn objects(&self) -> &[Shape] {
        &self.objects
    }

    fn objects_mut(&mut self) -> &mut [Shape] {
        &mut self.objects
    }

    fn add_provisional(&mut self, shape: Shape) {
        self.provisional.retain(|s| s.id() != shape.id());
        self.provisional.push(shape);
    }

    fn provisional(&self, id: ShapeId) -> Option<&Shape> {
        self.provisional.iter().find(|s| s.id() == id)
    }

    fn provisional_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.provisional.iter_mut().find(|s| s.id() == id)
    }

    fn take_provisional(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.provisional.iter().position(|s| s.id() == id)?;
        if self.editing == Some(id) {
            self.editing = None;
        }
        Some(self.provisional.remove(index))
    }

    fn set_active_object(&mut self, id: ShapeId) {
        if self.contains(id) {
            self.selection = vec![id];
        }
    }

    fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    fn discard_active_object(&mut self) {
        self.selection.clear();
    }

    fn enter_text_editing(&mut self, id: ShapeId) -> bool {
        let is_text = self.lookup_mut(id).is_some_and(|s| s.as_text().is_some());
        if is_text {
            self.editing = Some(id);
            self.text_selected_all = true;
        }
        is_text
    }

    fn exit_text_editing(&mut self) -> Option<ShapeId> {
        self.text_selected_all = false;
        self.editing.take()
    }

    fn editing_text(&self) -> Option<ShapeId> {
        self.editing
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.provisional.clear();
        self.selection.clear();
        self.editing = None;
        self.background = None;
    }

    fn set_marquee_selection(&mut self, enabled: bool) {
        self.marquee = enabled;
    }

    fn marquee_selection(&self) -> bool {
        self.marquee
    }

    fn background(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }

    fn set_background(&mut self, background: Option<BackgroundImage>) {
        self.background = background;
    }

    fn set_brush(&mut self, brush: Option<BrushSettings>) {
        self.brush = brush;
    }

    fn brush(&self) -> Option<&BrushSettings> {
        self.brush.as_ref()
    }

    fn load_objects(&mut self, objects: Vec<Shape>) -> SceneResult<()> {
        if let Some(id) = find_duplicate(&objects) {
            return Err(SceneError::DuplicateObject(id));
        }
        self.objects = objects;
        self.selection.retain(|id| self.objects.iter().any(|s| s.id() == *id));
        Ok(())
    }

    fn request_render(&mut self) {
        self.renders += 1;
    }

    fn to_raster_data(&self, request: &RasterRequest) -> SceneResult<Vec<u8>> {
        match self.rasterizer {
            Some(rasterize) => rasterize(self, request),
            None => Err(SceneError::Unsupported(
                "raster output needs a rasterizer".to_string(),
            )),
        }
    }

    fn to_vector_markup(&self) -> SceneResult<String> {
        Ok(svg::write_svg(
            self.size,
            self.background.as_ref(),
            &self.objects,
        ))
    }
}
