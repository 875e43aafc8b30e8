//! Freehand pen and highlighter.
//!
//! Strokes are drawn by the scene's native brush; the tool only configures
//! it. Finished strokes arrive as [`SceneEvent::PathCreated`].
//!
//! [`SceneEvent::PathCreated`]: crate::scene::SceneEvent::PathCreated

use super::{Tool, ToolKind, ToolResponse};
use crate::config::SessionConfig;
use crate::scene::{BrushSettings, Scene};
use crate::shapes::{LineCap, Shadow};
use crate::style::StyleSettings;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushKind {
    Pen,
    Highlighter,
}

#[derive(Debug, Clone)]
pub struct BrushTool {
    kind: BrushKind,
    brush: BrushSettings,
}

impl BrushTool {
    pub fn new(kind: BrushKind, settings: &StyleSettings, config: &SessionConfig) -> Self {
        let brush = match kind {
            BrushKind::Pen => BrushSettings {
                color: settings.color,
                width: settings.stroke_width,
                dash: settings.dash(),
                shadow: None,
                line_cap: LineCap::Round,
            },
            BrushKind::Highlighter => {
                let highlighter = &config.highlighter;
                let color = settings.color.with_alpha(highlighter.alpha);
                BrushSettings {
                    color,
                    width: settings.stroke_width * highlighter.width_factor,
                    dash: None,
                    shadow: Some(Shadow {
                        color,
                        blur: highlighter.glow,
                    }),
                    line_cap: LineCap::Square,
                }
            }
        };
        Self { kind, brush }
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }
}

impl Tool for BrushTool {
    fn kind(&self) -> ToolKind {
        match self.kind {
            BrushKind::Pen => ToolKind::Pen,
            BrushKind::Highlighter => ToolKind::Highlighter,
        }
    }

    /// Enables the brush and asks for a snapshot of the pre-stroke scene.
    fn activate(&mut self, scene: &mut dyn Scene) -> ToolResponse {
        scene.set_brush(Some(self.brush.clone()));
        ToolResponse::save()
    }

    fn pointer_down(&mut self, _scene: &mut dyn Scene, _point: Point) -> ToolResponse {
        ToolResponse::none()
    }

    fn cancel(&mut self, _scene: &mut dyn Scene) {}

    fn teardown(self: Box<Self>, scene: &mut dyn Scene) -> ToolResponse {
        scene.set_brush(None);
        ToolResponse::none()
    }

    fn is_busy(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::style::StrokeStyle;
    use kurbo::Size;

    #[test]
    fn test_pen_brush() {
        let settings = StyleSettings {
            stroke_style: StrokeStyle::Dashed,
            ..StyleSettings::default()
        };
        let tool = BrushTool::new(BrushKind::Pen, &settings, &SessionConfig::default());
        let brush = tool.brush();
        assert_eq!(brush.color, settings.color);
        assert!((brush.width - 5.0).abs() < f64::EPSILON);
        assert_eq!(brush.dash, Some(vec![10.0, 10.0]));
        assert_eq!(brush.shadow, None);
        assert_eq!(brush.line_cap, LineCap::Round);
    }

    #[test]
    fn test_highlighter_brush() {
        let settings = StyleSettings {
            stroke_style: StrokeStyle::Dotted,
            ..StyleSettings::default()
        };
        let tool = BrushTool::new(BrushKind::Highlighter, &settings, &SessionConfig::default());
        let brush = tool.brush();
        assert_eq!(brush.color.a, 77);
        assert_eq!((brush.color.r, brush.color.g, brush.color.b), (0xdc, 0x26, 0x26));
        assert!((brush.width - 15.0).abs() < f64::EPSILON);
        assert_eq!(brush.dash, None);
        let shadow = brush.shadow.unwrap();
        assert!((shadow.blur - 10.0).abs() < f64::EPSILON);
        assert_eq!(shadow.color, brush.color);
        assert_eq!(brush.line_cap, LineCap::Square);
    }

    #[test]
    fn test_activate_and_teardown() {
        let mut scene = MemoryScene::new(Size::new(100.0, 100.0));
        let mut tool = BrushTool::new(
            BrushKind::Pen,
            &StyleSettings::default(),
            &SessionConfig::default(),
        );
        assert_eq!(tool.activate(&mut scene), ToolResponse::save());
        assert!(scene.brush().is_some());

        Box::new(tool).teardown(&mut scene);
        assert!(scene.brush().is_none());
    }
}
