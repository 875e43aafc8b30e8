//! Blur tool: obscures part of the background with a blurred copy of it.

use super::drag::{self, DragState};
use super::{Tool, ToolKind, ToolResponse};
use crate::scene::Scene;
use crate::shapes::{ImageRegion, Rectangle, SerializableColor, Shape, ShapeId, ShapeStyle};
use kurbo::Point;

/// Drags out a placeholder box, then replaces it with an [`ImageRegion`].
#[derive(Debug, Clone)]
pub struct RegionTool {
    blur_intensity: f64,
    min_size: f64,
    state: DragState<ShapeId>,
}

impl RegionTool {
    pub fn new(blur_intensity: f64, min_size: f64) -> Self {
        Self {
            blur_intensity,
            min_size,
            state: DragState::Idle,
        }
    }

    fn placeholder_style() -> ShapeStyle {
        ShapeStyle {
            fill_color: Some(SerializableColor::new(100, 100, 200, 77)),
            dash: Some(vec![5.0, 5.0]),
            ..ShapeStyle::stroke(SerializableColor::new(0, 0, 255, 128), 1.0)
        }
    }
}

impl Tool for RegionTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Blur
    }

    fn pointer_down(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        if self.state.is_dragging() {
            return ToolResponse::none();
        }
        if scene.background().is_none() {
            log::debug!("No background to blur, ignoring press");
            return ToolResponse::none();
        }
        let mut placeholder = Rectangle::new(point, 0.0, 0.0);
        placeholder.style = Self::placeholder_style();
        let id = drag::show_provisional(scene, Shape::Rectangle(placeholder));
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
        if let Some(Shape::Rectangle(rect)) = scene.provisional_mut(provisional) {
            rect.span(start, point);
            scene.request_render();
        }
        ToolResponse::none()
    }

    fn pointer_up(&mut self, scene: &mut dyn Scene) -> ToolResponse {
        let Some((_, id)) = self.state.finish() else {
            return ToolResponse::none();
        };
        let Some(Shape::Rectangle(placeholder)) = scene.take_provisional(id) else {
            return ToolResponse::none();
        };
        scene.request_render();

        if drag::box_too_small(placeholder.width, placeholder.height, self.min_size) {
            log::debug!("Blur region too small, discarded");
            return ToolResponse::none();
        }

        let Some(background) = scene.background() else {
            log::error!("Background image missing, cannot create blur region");
            return ToolResponse::switch();
        };
        let mut region = ImageRegion::new(
            placeholder.as_rect(),
            background.src.clone(),
            self.blur_intensity,
        );
        if !region.update_crop(background.scale_x, background.scale_y) {
            log::warn!("Blur region has an empty crop");
        }
        drag::commit_object(scene, Shape::ImageRegion(region))
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
