//! Straight line tool.

use super::drag::{self, DragState};
use super::{Tool, ToolKind, ToolResponse};
use crate::scene::Scene;
use crate::shapes::{Line, Shape, ShapeId, ShapeStyle};
use crate::style::StyleSettings;
use kurbo::Point;

/// Draws a line from the press point to the release point.
#[derive(Debug, Clone)]
pub struct LineTool {
    style: ShapeStyle,
    min_size: f64,
    state: DragState<ShapeId>,
}

impl LineTool {
    pub fn new(settings: &StyleSettings, min_size: f64) -> Self {
        Self {
            style: line_style(settings),
            min_size,
            state: DragState::Idle,
        }
    }
}

/// Stroke style shared by lines and arrow shafts.
pub(crate) fn line_style(settings: &StyleSettings) -> ShapeStyle {
    ShapeStyle {
        dash: settings.dash(),
        ..ShapeStyle::stroke(settings.color, settings.stroke_width)
    }
}

impl Tool for LineTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Line
    }

    fn pointer_down(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        if self.state.is_dragging() {
            return ToolResponse::none();
        }
        let mut line = Line::new(point, point);
        line.style = self.style.clone();
        let id = drag::show_provisional(scene, Shape::Line(line));
        self.state = DragState::Dragging {
            start: point,
            provisional: id,
        };
        ToolResponse::none()
    }

    fn pointer_move(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        if let DragState::Dragging { provisional, .. } = self.state {
            if let Some(Shape::Line(line)) = scene.provisional_mut(provisional) {
                line.end = point;
                scene.request_render();
            }
        }
        ToolResponse::none()
    }

    fn pointer_up(&mut self, scene: &mut dyn Scene) -> ToolResponse {
        let Some((start, id)) = self.state.finish() else {
            return ToolResponse::none();
        };
        let end = match scene.provisional(id) {
            Some(Shape::Line(line)) => line.end,
            _ => start,
        };
        if drag::segment_too_small(start, end, self.min_size) {
            log::debug!("Line too short, discarded");
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

    #[test]
    fn test_draw_line() {
        let mut scene = scene();
        let mut settings = StyleSettings::default();
        settings.stroke_style = StrokeStyle::Dashed;
        let mut tool = LineTool::new(&settings, 5.0);

        tool.pointer_down(&mut scene, Point::new(10.0, 10.0));
        tool.pointer_move(&mut scene, Point::new(60.0, 12.0));
        let response = tool.pointer_up(&mut scene);

        assert_eq!(response, ToolResponse::commit());
        assert_eq!(scene.objects().len(), 1);
        let Shape::Line(line) = &scene.objects()[0] else {
            panic!("expected a line");
        };
        assert_eq!(line.end, Point::new(60.0, 12.0));
        assert_eq!(line.style.dash, Some(vec![10.0, 10.0]));
        assert_eq!(scene.selection(), &[line.id]);
        assert!(!tool.is_busy());
    }

    #[test]
    fn test_short_line_discarded() {
        let mut scene = scene();
        let mut tool = LineTool::new(&StyleSettings::default(), 5.0);

        tool.pointer_down(&mut scene, Point::new(10.0, 10.0));
        tool.pointer_move(&mut scene, Point::new(14.0, 6.0));
        let response = tool.pointer_up(&mut scene);

        assert!(response.is_none());
        assert!(scene.objects().is_empty());
        assert!(scene.provisional_objects().is_empty());
    }

    #[test]
    fn test_vertical_line_kept() {
        let mut scene = scene();
        let mut tool = LineTool::new(&StyleSettings::default(), 5.0);

        tool.pointer_down(&mut scene, Point::new(10.0, 10.0));
        tool.pointer_move(&mut scene, Point::new(10.0, 40.0));
        assert_eq!(tool.pointer_up(&mut scene), ToolResponse::commit());
    }

    #[test]
    fn test_up_without_down() {
        let mut scene = scene();
        let mut tool = LineTool::new(&StyleSettings::default(), 5.0);
        assert!(tool.pointer_up(&mut scene).is_none());
        assert!(tool.pointer_move(&mut scene, Point::new(1.0, 1.0)).is_none());
    }
}
