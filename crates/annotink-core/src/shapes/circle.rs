//! Circle shape.

use super::{Interaction, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle defined by center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius,
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
        }
    }

    /// Fit the circle to a drag from `start` to `current`.
    ///
    /// The diameter follows the larger drag axis and the center sits halfway
    /// along the drag vector.
    pub fn span(&mut self, start: Point, current: Point) {
        let d = current - start;
        self.radius = d.x.abs().max(d.y.abs()) / 2.0;
        self.center = start + d / 2.0;
    }

    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }

    pub fn as_circle(&self) -> kurbo::Circle {
        kurbo::Circle::new(self.center, self.radius)
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dist = (point - self.center).hypot();
        if self.style.fill_color.is_some() {
            dist <= self.radius + tolerance
        } else {
            let band = tolerance + self.style.stroke_width / 2.0;
            (dist - self.radius).abs() <= band
        }
    }

    fn to_path(&self) -> BezPath {
        self.as_circle().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn interaction(&self) -> Interaction {
        self.interaction
    }

    fn set_interaction(&mut self, interaction: Interaction) {
        self.interaction = interaction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_uses_larger_axis() {
        let mut circle = Circle::new(Point::new(10.0, 10.0), 0.0);
        circle.span(Point::new(10.0, 10.0), Point::new(50.0, 20.0));
        assert!((circle.radius - 20.0).abs() < f64::EPSILON);
        assert!((circle.center.x - 30.0).abs() < f64::EPSILON);
        assert!((circle.center.y - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_span_negative_drag() {
        let mut circle = Circle::new(Point::ZERO, 0.0);
        circle.span(Point::new(100.0, 100.0), Point::new(40.0, 90.0));
        assert!((circle.diameter() - 60.0).abs() < f64::EPSILON);
        assert!((circle.center.x - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let circle = Circle::new(Point::new(50.0, 50.0), 10.0);
        let bounds = circle.bounds();
        assert!((bounds.x0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_ring() {
        let circle = Circle::new(Point::new(0.0, 0.0), 50.0);
        assert!(circle.hit_test(Point::new(50.0, 0.0), 1.0));
        assert!(!circle.hit_test(Point::new(0.0, 0.0), 1.0));
    }
}
