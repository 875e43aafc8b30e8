//! Drawing tools and their activation.
//!
//! Each tool is a small state machine fed pointer input. Tools mutate the
//! scene directly and report the follow-up work (history capture, switching
//! back to the select tool) through a [`ToolResponse`].

mod arrow;
mod brush;
mod drag;
mod line;
mod region;
mod shape;
mod text;

pub use arrow::ArrowTool;
pub use brush::{BrushKind, BrushTool};
pub use line::LineTool;
pub use region::RegionTool;
pub use shape::ShapeTool;
pub use text::TextTool;

use crate::config::SessionConfig;
use crate::scene::Scene;
use crate::shapes::ShapeId;
use crate::style::{LineKind, StyleSettings};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Highlighter,
    Line,
    Shape,
    Text,
    Blur,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Select,
        ToolKind::Pen,
        ToolKind::Highlighter,
        ToolKind::Line,
        ToolKind::Shape,
        ToolKind::Text,
        ToolKind::Blur,
    ];

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pen => "Pen",
            ToolKind::Highlighter => "Highlighter",
            ToolKind::Line => "Line",
            ToolKind::Shape => "Shape",
            ToolKind::Text => "Text",
            ToolKind::Blur => "Blur",
        }
    }
}

/// Follow-up work requested by a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolResponse {
    /// Push a history snapshot.
    pub save_state: bool,
    /// Return to the select tool.
    pub switch_to_select: bool,
}

impl ToolResponse {
    pub const fn none() -> Self {
        Self {
            save_state: false,
            switch_to_select: false,
        }
    }

    /// Snapshot only.
    pub const fn save() -> Self {
        Self {
            save_state: true,
            switch_to_select: false,
        }
    }

    /// Snapshot and return to select: the normal end of a drawing gesture.
    pub const fn commit() -> Self {
        Self {
            save_state: true,
            switch_to_select: true,
        }
    }

    /// Return to select without a snapshot.
    pub const fn switch() -> Self {
        Self {
            save_state: false,
            switch_to_select: true,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            save_state: self.save_state || other.save_state,
            switch_to_select: self.switch_to_select || other.switch_to_select,
        }
    }

    pub fn is_none(&self) -> bool {
        !self.save_state && !self.switch_to_select
    }
}

/// A drawing tool bound to the style captured when it was built.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Called once after the controller installs the tool.
    fn activate(&mut self, _scene: &mut dyn Scene) -> ToolResponse {
        ToolResponse::none()
    }

    fn pointer_down(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse;

    fn pointer_move(&mut self, _scene: &mut dyn Scene, _point: Point) -> ToolResponse {
        ToolResponse::none()
    }

    fn pointer_up(&mut self, _scene: &mut dyn Scene) -> ToolResponse {
        ToolResponse::none()
    }

    /// The scene stopped editing text object `id`.
    fn text_editing_exited(&mut self, _scene: &mut dyn Scene, _id: ShapeId) -> ToolResponse {
        ToolResponse::none()
    }

    /// Abandon any gesture in progress, discarding provisional objects.
    fn cancel(&mut self, scene: &mut dyn Scene);

    /// Detach from the scene. The tool is unusable afterwards.
    fn teardown(mut self: Box<Self>, scene: &mut dyn Scene) -> ToolResponse {
        self.cancel(scene);
        ToolResponse::none()
    }

    /// A gesture or edit is in progress.
    fn is_busy(&self) -> bool;
}

/// Build the tool for `kind`. `Select` has no tool object.
pub fn build_tool(
    kind: ToolKind,
    style: &StyleSettings,
    config: &SessionConfig,
) -> Option<Box<dyn Tool>> {
    let min = config.min_drag_size;
    let tool: Box<dyn Tool> = match kind {
        ToolKind::Select => return None,
        ToolKind::Pen => Box::new(BrushTool::new(BrushKind::Pen, style, config)),
        ToolKind::Highlighter => Box::new(BrushTool::new(BrushKind::Highlighter, style, config)),
        ToolKind::Line => match style.line_kind {
            LineKind::Line => Box::new(LineTool::new(style, min)),
            LineKind::Arrow => Box::new(ArrowTool::new(style, min)),
        },
        ToolKind::Shape => Box::new(ShapeTool::new(style, min)),
        ToolKind::Text => Box::new(TextTool::new(style, &config.text)),
        ToolKind::Blur => Box::new(RegionTool::new(config.blur_intensity, min)),
    };
    Some(tool)
}

/// Installs tools and resets scene interaction between them.
#[derive(Default)]
pub struct ToolController {
    kind: ToolKind,
    tool: Option<Box<dyn Tool>>,
}

impl std::fmt::Debug for ToolController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolController")
            .field("kind", &self.kind)
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    /// Tear down the current tool, reset the scene and install `kind`.
    ///
    /// The returned response carries history work only; a tool asking to
    /// switch to select while being installed or removed is ignored.
    pub fn activate(
        &mut self,
        kind: ToolKind,
        style: &StyleSettings,
        config: &SessionConfig,
        scene: &mut dyn Scene,
    ) -> ToolResponse {
        let mut response = self.teardown(scene);

        self.kind = kind;
        scene.set_brush(None);
        self.apply_interaction(scene);
        if let Some(mut tool) = build_tool(kind, style, config) {
            response = response.merge(tool.activate(scene));
            self.tool = Some(tool);
        }
        scene.request_render();
        log::debug!("Activated tool {}", kind.display_name());

        ToolResponse {
            switch_to_select: false,
            ..response
        }
    }

    /// Remove the current tool, if any.
    pub fn teardown(&mut self, scene: &mut dyn Scene) -> ToolResponse {
        match self.tool.take() {
            Some(tool) => tool.teardown(scene),
            None => ToolResponse::none(),
        }
    }

    /// Abandon the current gesture without replacing the tool.
    pub fn cancel(&mut self, scene: &mut dyn Scene) {
        if let Some(tool) = self.tool.as_mut() {
            tool.cancel(scene);
        }
    }

    /// Set marquee selection and per-object interactivity for the current
    /// tool kind.
    ///
    /// Only the select tool lets the user pick objects; every other tool
    /// draws over inert objects.
    pub fn apply_interaction(&self, scene: &mut dyn Scene) {
        let interactive = self.kind == ToolKind::Select;
        scene.set_marquee_selection(interactive);
        for shape in scene.objects_mut() {
            shape.set_interactive(interactive);
        }
        if !interactive {
            scene.discard_active_object();
        }
    }

    pub fn pointer_down(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        self.dispatch(|tool| tool.pointer_down(scene, point))
    }

    pub fn pointer_move(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        self.dispatch(|tool| tool.pointer_move(scene, point))
    }

    pub fn pointer_up(&mut self, scene: &mut dyn Scene) -> ToolResponse {
        self.dispatch(|tool| tool.pointer_up(scene))
    }

    pub fn text_editing_exited(&mut self, scene: &mut dyn Scene, id: ShapeId) -> ToolResponse {
        self.dispatch(|tool| tool.text_editing_exited(scene, id))
    }

    pub fn is_busy(&self) -> bool {
        self.tool.as_ref().is_some_and(|t| t.is_busy())
    }

    fn dispatch(&mut self, f: impl FnOnce(&mut Box<dyn Tool>) -> ToolResponse) -> ToolResponse {
        match self.tool.as_mut() {
            Some(tool) => f(tool),
            None => ToolResponse::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::shapes::{Rectangle, Shape};
    use kurbo::Size;

    fn scene_with_rect() -> MemoryScene {
        let mut scene = MemoryScene::new(Size::new(400.0, 300.0));
        scene.add_object(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        scene
    }

    #[test]
    fn test_select_makes_objects_interactive() {
        let mut scene = scene_with_rect();
        let mut controller = ToolController::new();
        let config = SessionConfig::default();

        controller.activate(ToolKind::Line, &config.style, &config, &mut scene);
        assert!(!scene.objects()[0].interaction().selectable);
        assert!(!scene.marquee_selection());

        controller.activate(ToolKind::Select, &config.style, &config, &mut scene);
        assert!(scene.objects()[0].interaction().selectable);
        assert!(scene.objects()[0].interaction().evented);
        assert!(scene.marquee_selection());
    }

    #[test]
    fn test_brush_activation_requests_snapshot() {
        let mut scene = scene_with_rect();
        let mut controller = ToolController::new();
        let config = SessionConfig::default();

        let response = controller.activate(ToolKind::Pen, &config.style, &config, &mut scene);
        assert!(response.save_state);
        assert!(!response.switch_to_select);
        assert!(scene.brush().is_some());

        controller.activate(ToolKind::Shape, &config.style, &config, &mut scene);
        assert!(scene.brush().is_none());
    }

    #[test]
    fn test_switch_mid_drag_discards_provisional() {
        let mut scene = scene_with_rect();
        let before = scene.to_snapshot(true);
        let mut controller = ToolController::new();
        let config = SessionConfig::default();

        controller.activate(ToolKind::Shape, &config.style, &config, &mut scene);
        controller.pointer_down(&mut scene, Point::new(50.0, 50.0));
        controller.pointer_move(&mut scene, Point::new(120.0, 90.0));
        assert!(controller.is_busy());
        assert_eq!(scene.provisional_objects().len(), 1);

        controller.activate(ToolKind::Line, &config.style, &config, &mut scene);
        assert!(scene.provisional_objects().is_empty());
        assert_eq!(scene.to_snapshot(true).objects().len(), before.objects().len());
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_line_kind_selects_arrow_tool() {
        let config = SessionConfig::default();
        let mut style = config.style.clone();
        style.line_kind = LineKind::Arrow;
        let tool = build_tool(ToolKind::Line, &style, &config);
        assert_eq!(tool.map(|t| t.kind()), Some(ToolKind::Line));
        assert!(build_tool(ToolKind::Select, &style, &config).is_none());
    }

    #[test]
    fn test_response_merge() {
        let merged = ToolResponse::save().merge(ToolResponse::switch());
        assert_eq!(merged, ToolResponse::commit());
        assert!(ToolResponse::none().is_none());
    }
}
