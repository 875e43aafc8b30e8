//! Shared press-drag-release handling for the drawing tools.

use super::ToolResponse;
use crate::scene::Scene;
use crate::shapes::{Interaction, Shape, ShapeId};
use kurbo::Point;

/// Progress of a drag gesture. `P` names the provisional object(s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DragState<P> {
    Idle,
    Dragging { start: Point, provisional: P },
}

impl<P: Copy> DragState<P> {
    pub(crate) fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Leave `Dragging`, returning what was being drawn.
    pub(crate) fn finish(&mut self) -> Option<(Point, P)> {
        match std::mem::replace(self, DragState::Idle) {
            DragState::Dragging { start, provisional } => Some((start, provisional)),
            DragState::Idle => None,
        }
    }
}

/// Put a freshly created object on the provisional layer.
pub(crate) fn show_provisional(scene: &mut dyn Scene, mut shape: Shape) -> ShapeId {
    let id = shape.id();
    shape.set_interaction(Interaction::INERT);
    scene.add_provisional(shape);
    scene.request_render();
    id
}

/// Remove a provisional object without committing it.
pub(crate) fn discard(scene: &mut dyn Scene, id: ShapeId) {
    if scene.take_provisional(id).is_some() {
        scene.request_render();
    }
}

/// Make `shape` a committed, selected, interactive object.
pub(crate) fn commit_object(scene: &mut dyn Scene, mut shape: Shape) -> ToolResponse {
    let id = shape.id();
    shape.set_interaction(Interaction::INTERACTIVE);
    if !scene.add_object(shape) {
        log::error!("Could not commit object {id}");
        return ToolResponse::switch();
    }
    scene.set_active_object(id);
    scene.request_render();
    ToolResponse::commit()
}

/// Move a provisional object to the committed list.
pub(crate) fn commit(scene: &mut dyn Scene, id: ShapeId) -> ToolResponse {
    match scene.take_provisional(id) {
        Some(shape) => commit_object(scene, shape),
        None => {
            log::error!("Provisional object {id} vanished before commit");
            ToolResponse::switch()
        }
    }
}

/// A segment is too small when it is short along both axes.
pub(crate) fn segment_too_small(start: Point, end: Point, min: f64) -> bool {
    (end.x - start.x).abs() < min && (end.y - start.y).abs() < min
}

/// A box is too small when either side is short.
pub(crate) fn box_too_small(width: f64, height: f64, min: f64) -> bool {
    width < min || height < min
}
