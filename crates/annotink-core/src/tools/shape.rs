//! Rectangle and circle tool.

use super::drag::{self, DragState};
use super::{Tool, ToolKind, ToolResponse};
use crate::scene::Scene;
use crate::shapes::{Circle, Rectangle, Shape, ShapeId, ShapeStyle};
use crate::style::{ShapeKind, StyleSettings};
use kurbo::Point;

/// Draws the closed shape chosen in the style settings.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    kind: ShapeKind,
    style: ShapeStyle,
    min_size: f64,
    state: DragState<ShapeId>,
}

impl ShapeTool {
    pub fn new(settings: &StyleSettings, min_size: f64) -> Self {
        // Filled shapes are always drawn with a solid outline.
        let style = if settings.shape_fill {
            ShapeStyle {
                fill_color: Some(settings.color),
                ..ShapeStyle::stroke(settings.color, settings.stroke_width)
            }
        } else {
            ShapeStyle {
                dash: settings.dash(),
                ..ShapeStyle::stroke(settings.color, settings.stroke_width)
            }
        };
        Self {
            kind: settings.shape_kind,
            style,
            min_size,
            state: DragState::Idle,
        }
    }

    fn create(&self, point: Point) -> Shape {
        match self.kind {
            ShapeKind::Rect => {
                let mut rect = Rectangle::new(point, 0.0, 0.0);
                rect.style = self.style.clone();
                Shape::Rectangle(rect)
            }
            ShapeKind::Circle => {
                let mut circle = Circle::new(point, 0.0);
                circle.style = self.style.clone();
                Shape::Circle(circle)
            }
        }
    }
}

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Shape
    }

    fn pointer_down(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        if self.state.is_dragging() {
            return ToolResponse::none();
        }
        let id = drag::show_provisional(scene, self.create(point));
        self.state = DragState::Dragging {
            start: point,
            provisional: id,
        };
        ToolResponse::none()
    }

    fn pointer_move(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        let DragState::Dragging { start, provisional } = self.state else {
            return ToolResponse::none();
        };
        match scene.provisional_mut(provisional) {
            Some(Shape::Rectangle(rect)) => rect.span(start, point),
            Some(Shape::Circle(circle)) => circle.span(start, point),
            _ => return ToolResponse::none(),
        }
        scene.request_render();
        ToolResponse::none()
    }

    fn pointer_up(&mut self, scene: &mut dyn Scene) -> ToolResponse {
        let Some((_, id)) = self.state.finish() else {
            return ToolResponse::none();
        };
        let (width, height) = match scene.provisional(id) {
            Some(Shape::Rectangle(rect)) => (rect.width, rect.height),
            Some(Shape::Circle(circle)) => (circle.diameter(), circle.diameter()),
            _ => (0.0, 0.0),
        };
        if drag::box_too_small(width, height, self.min_size) {
            log::debug!("Shape too small ({width}x{height}), discarded");
            drag::discard(scene, id);
            return ToolResponse::none();
        }
        drag::commit(scene, id)
    }

    fn cancel(&mut self, scene: &mut dyn Scene) {
        if let Some((_, id)) = self.state.finish() {
            drag::discard(scene, id);
        }
    }

    fn is_busy(&self) -> bool {
        self.state.is_dragging()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::style::StrokeStyle;
    use kurbo::Size;

    fn scene() -> MemoryScene {
        MemoryScene::new(Size::new(400.0, 300.0))
    }

    fn drag(tool: &mut ShapeTool, scene: &mut MemoryScene, from: Point, to: Point) -> ToolResponse {
        tool.pointer_down(scene, from);
        tool.pointer_move(scene, to);
        tool.pointer_up(scene)
    }

    #[test]
    fn test_rect_normalized() {
        let mut scene = scene();
        let mut tool = ShapeTool::new(&StyleSettings::default(), 5.0);
        let response = drag(&mut tool, &mut scene, Point::new(100.0, 100.0), Point::new(40.0, 70.0));

        assert_eq!(response, ToolResponse::commit());
        let Shape::Rectangle(rect) = &scene.objects()[0] else {
            panic!("expected a rectangle");
        };
        assert_eq!(rect.position, Point::new(40.0, 70.0));
        assert!((rect.width - 60.0).abs() < f64::EPSILON);
        assert!((rect.height - 30.0).abs() < f64::EPSILON);
        assert_eq!(rect.style.fill_color, None);
    }

    #[test]
    fn test_thin_rect_discarded() {
        let mut scene = scene();
        let mut tool = ShapeTool::new(&StyleSettings::default(), 5.0);
        let response = drag(&mut tool, &mut scene, Point::new(10.0, 10.0), Point::new(200.0, 13.0));

        assert!(response.is_none());
        assert!(scene.objects().is_empty());
        assert!(scene.provisional_objects().is_empty());
    }

    #[test]
    fn test_circle() {
        let mut scene = scene();
        let settings = StyleSettings {
            shape_kind: ShapeKind::Circle,
            ..StyleSettings::default()
        };
        let mut tool = ShapeTool::new(&settings, 5.0);
        drag(&mut tool, &mut scene, Point::new(10.0, 10.0), Point::new(50.0, 20.0));

        let Shape::Circle(circle) = &scene.objects()[0] else {
            panic!("expected a circle");
        };
        assert!((circle.radius - 20.0).abs() < f64::EPSILON);
        assert_eq!(circle.center, Point::new(30.0, 15.0));
    }

    #[test]
    fn test_small_circle_discarded() {
        let mut scene = scene();
        let settings = StyleSettings {
            shape_kind: ShapeKind::Circle,
            ..StyleSettings::default()
        };
        let mut tool = ShapeTool::new(&settings, 5.0);
        let response = drag(&mut tool, &mut scene, Point::new(10.0, 10.0), Point::new(13.0, 14.0));
        assert!(response.is_none());
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn test_fill_drops_dash() {
        let settings = StyleSettings {
            shape_fill: true,
            stroke_style: StrokeStyle::Dotted,
            ..StyleSettings::default()
        };
        let tool = ShapeTool::new(&settings, 5.0);
        assert_eq!(tool.style.fill_color, Some(settings.color));
        assert_eq!(tool.style.dash, None);

        let settings = StyleSettings {
            stroke_style: StrokeStyle::Dotted,
            ..StyleSettings::default()
        };
        let tool = ShapeTool::new(&settings, 5.0);
        assert_eq!(tool.style.dash, Some(vec![2.5, 7.5]));
    }
}
