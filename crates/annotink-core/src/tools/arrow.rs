//! Arrow tool: a line with a triangular head, committed as one object.

use super::drag::{self, DragState};
use super::line::line_style;
use super::{Tool, ToolKind, ToolResponse};
use crate::scene::Scene;
use crate::shapes::{Arrow, ArrowHead, Line, Shape, ShapeId, ShapeStyle};
use crate::style::StyleSettings;
use kurbo::Point;

/// Head size relative to the stroke width.
const HEAD_SIZE_FACTOR: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ArrowParts {
    line: ShapeId,
    head: ShapeId,
}

/// Draws an arrow from the press point to the release point.
#[derive(Debug, Clone)]
pub struct ArrowTool {
    line_style: ShapeStyle,
    head_style: ShapeStyle,
    head_size: f64,
    min_size: f64,
    state: DragState<ArrowParts>,
}

impl ArrowTool {
    pub fn new(settings: &StyleSettings, min_size: f64) -> Self {
        Self {
            line_style: line_style(settings),
            head_style: ShapeStyle {
                stroke_width: 0.0,
                fill_color: Some(settings.color),
                ..ShapeStyle::stroke(settings.color, 0.0)
            },
            head_size: settings.stroke_width * HEAD_SIZE_FACTOR,
            min_size,
            state: DragState::Idle,
        }
    }

    fn discard(scene: &mut dyn Scene, parts: ArrowParts) {
        drag::discard(scene, parts.line);
        drag::discard(scene, parts.head);
    }
}

impl Tool for ArrowTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Line
    }

    fn pointer_down(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        if self.state.is_dragging() {
            return ToolResponse::none();
        }
        let mut line = Line::new(point, point);
        line.style = self.line_style.clone();
        let mut head = ArrowHead::new(point, self.head_size);
        head.style = self.head_style.clone();

        let parts = ArrowParts {
            line: drag::show_provisional(scene, Shape::Line(line)),
            head: drag::show_provisional(scene, Shape::ArrowHead(head)),
        };
        self.state = DragState::Dragging {
            start: point,
            provisional: parts,
        };
        ToolResponse::none()
    }

    fn pointer_move(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        let DragState::Dragging { start, provisional } = self.state else {
            return ToolResponse::none();
        };
        if let Some(Shape::Line(line)) = scene.provisional_mut(provisional.line) {
            line.end = point;
        }
        if let Some(Shape::ArrowHead(head)) = scene.provisional_mut(provisional.head) {
            head.aim(start, point);
        }
        scene.request_render();
        ToolResponse::none()
    }

    fn pointer_up(&mut self, scene: &mut dyn Scene) -> ToolResponse {
        let Some((start, parts)) = self.state.finish() else {
            return ToolResponse::none();
        };
        let line = scene.take_provisional(parts.line);
        let head = scene.take_provisional(parts.head);
        scene.request_render();

        let (Some(Shape::Line(line)), Some(Shape::ArrowHead(head))) = (line, head) else {
            log::error!("Arrow parts vanished before commit");
            return ToolResponse::switch();
        };
        if drag::segment_too_small(start, line.end, self.min_size) {
            log::debug!("Arrow too short, discarded");
            return ToolResponse::none();
        }
        drag::commit_object(scene, Shape::Arrow(Arrow::merge(line, head)))
    }

    fn cancel(&mut self, scene: &mut dyn Scene) {
        if let Some((_, parts)) = self.state.finish() {
            Self::discard(scene, parts);
        }
    }

    fn is_busy(&self) -> bool {
        self.state.is_dragging()
    }
}
