//! Text tool.

use super::drag;
use super::{Tool, ToolKind, ToolResponse};
use crate::config::TextDefaults;
use crate::scene::Scene;
use crate::shapes::{Shape, ShapeId, ShapeStyle, Text};
use crate::style::StyleSettings;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TextState {
    Idle,
    Editing(ShapeId),
}

/// Places a text box and keeps it provisional until editing ends.
///
/// Blank boxes are thrown away; anything else is committed. Either way the
/// edit ends the tool's turn.
#[derive(Debug, Clone)]
pub struct TextTool {
    style: ShapeStyle,
    defaults: TextDefaults,
    state: TextState,
}

impl TextTool {
    pub fn new(settings: &StyleSettings, defaults: &TextDefaults) -> Self {
        Self {
            style: ShapeStyle {
                fill_color: Some(settings.color),
                ..ShapeStyle::stroke(settings.color, 0.0)
            },
            defaults: defaults.clone(),
            state: TextState::Idle,
        }
    }

    fn create(&self, point: Point) -> Text {
        let mut text = Text::new(point, self.defaults.placeholder.clone());
        text.font_size = self.defaults.font_size;
        text.font_family = self.defaults.font_family.clone();
        text.width = self.defaults.box_width;
        text.style = self.style.clone();
        text
    }

    /// Resolve the box being edited: discard it when blank, commit otherwise.
    fn finish(&mut self, scene: &mut dyn Scene, id: ShapeId) -> ToolResponse {
        self.state = TextState::Idle;
        if scene.editing_text() == Some(id) {
            scene.exit_text_editing();
        }
        let Some(shape) = scene.take_provisional(id) else {
            log::error!("Text box {id} vanished while editing");
            return ToolResponse::switch();
        };
        let blank = shape.as_text().is_none_or(Text::is_blank);
        if blank {
            log::debug!("Empty text box discarded");
            scene.discard_active_object();
            scene.request_render();
            ToolResponse::commit()
        } else {
            drag::commit_object(scene, shape)
        }
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn pointer_down(&mut self, scene: &mut dyn Scene, point: Point) -> ToolResponse {
        if let TextState::Editing(id) = self.state {
            return self.finish(scene, id);
        }
        let id = drag::show_provisional(scene, Shape::Text(self.create(point)));
        scene.enter_text_editing(id);
        scene.set_active_object(id);
        self.state = TextState::Editing(id);
        ToolResponse::none()
    }

    fn text_editing_exited(&mut self, scene: &mut dyn Scene, id: ShapeId) -> ToolResponse {
        match self.state {
            TextState::Editing(editing) if editing == id => self.finish(scene, id),
            _ => ToolResponse::none(),
        }
    }

    fn cancel(&mut self, scene: &mut dyn Scene) {
        if let TextState::Editing(id) = self.state {
            self.state = TextState::Idle;
            scene.exit_text_editing();
            scene.discard_active_object();
            drag::discard(scene, id);
        }
    }

    fn teardown(mut self: Box<Self>, scene: &mut dyn Scene) -> ToolResponse {
        match self.state {
            TextState::Editing(id) => self.finish(scene, id),
            TextState::Idle => ToolResponse::none(),
        }
    }

    fn is_busy(&self) -> bool {
        matches!(self.state, TextState::Editing(_))
    }
}
