//! Arrow shapes: the triangular head and the compound line + head object.

use super::{Interaction, Line, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Isosceles triangle used as an arrowhead.
///
/// `center` is the triangle's center and `rotation` is in degrees, clockwise,
/// with 0 pointing the apex straight up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowHead {
    pub(crate) id: ShapeId,
    pub center: Point,
    /// Width and height of the triangle.
    pub size: f64,
    pub rotation: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
}

impl ArrowHead {
    pub fn new(center: Point, size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            size,
            rotation: 90.0,
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
        }
    }

    /// Move the head to `tip` and turn it to follow the segment `start -> tip`.
    pub fn aim(&mut self, start: Point, tip: Point) {
        let d = tip - start;
        self.center = tip;
        self.rotation = d.y.atan2(d.x).to_degrees() + 90.0;
    }

    /// Triangle vertices: apex, base left, base right.
    pub fn vertices(&self) -> [Point; 3] {
        let half = self.size / 2.0;
        let transform = Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation.to_radians());
        [
            transform * Point::new(0.0, -half),
            transform * Point::new(-half, half),
            transform * Point::new(half, half),
        ]
    }
}

impl ShapeTrait for ArrowHead {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let [a, b, c] = self.vertices();
        Rect::from_points(a, b).union_pt(c)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        fn sign(p1: Point, p2: Point, p3: Point) -> f64 {
            (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
        }

        let [a, b, c] = self.vertices();
        let d1 = sign(point, a, b);
        let d2 = sign(point, b, c);
        let d3 = sign(point, c, a);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

        !(has_neg && has_pos) || (point - self.center).hypot() <= tolerance
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
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

/// A line and its head grouped into a single object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub line: Line,
    pub head: ArrowHead,
    #[serde(default)]
    pub interaction: Interaction,
}

impl Arrow {
    /// Merge a drawn line and head into one compound object with a fresh id.
    pub fn merge(line: Line, head: ArrowHead) -> Self {
        Self {
            id: Uuid::new_v4(),
            line,
            head,
            interaction: Interaction::default(),
        }
    }

    /// Unit direction of the shaft (x axis when degenerate).
    pub fn direction(&self) -> Vec2 {
        let d = self.line.end - self.line.start;
        let len = d.hypot();
        if len < f64::EPSILON {
            Vec2::new(1.0, 0.0)
        } else {
            d / len
        }
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.line.bounds().union(self.head.bounds())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.line.hit_test(point, tolerance) || self.head.hit_test(point, tolerance)
    }

    fn to_path(&self) -> BezPath {
        let mut path = self.line.to_path();
        path.extend(self.head.to_path());
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.line.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.line.style
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
    fn test_new_head_points_right() {
        let head = ArrowHead::new(Point::new(10.0, 10.0), 15.0);
        assert!((head.rotation - 90.0).abs() < f64::EPSILON);
        let [apex, _, _] = head.vertices();
        assert!((apex.x - 17.5).abs() < 1e-9);
        assert!((apex.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_aim_follows_segment() {
        let mut head = ArrowHead::new(Point::ZERO, 15.0);
        head.aim(Point::new(0.0, 0.0), Point::new(0.0, 50.0));
        assert!((head.rotation - 180.0).abs() < 1e-9);
        assert_eq!(head.center, Point::new(0.0, 50.0));

        head.aim(Point::new(50.0, 50.0), Point::new(0.0, 50.0));
        assert!((head.rotation - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_hit_test() {
        let head = ArrowHead::new(Point::new(0.0, 0.0), 20.0);
        assert!(head.hit_test(Point::new(0.0, 0.0), 0.0));
        assert!(!head.hit_test(Point::new(30.0, 30.0), 0.0));
    }

    #[test]
    fn test_merge_assigns_new_id() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let head = ArrowHead::new(Point::new(100.0, 0.0), 15.0);
        let (line_id, head_id) = (line.id(), head.id());

        let arrow = Arrow::merge(line, head);
        assert_ne!(arrow.id(), line_id);
        assert_ne!(arrow.id(), head_id);
        assert!(arrow.hit_test(Point::new(50.0, 0.0), 1.0));
        assert!(arrow.bounds().x1 >= 100.0);
    }

    #[test]
    fn test_direction() {
        let arrow = Arrow::merge(
            Line::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0)),
            ArrowHead::new(Point::new(0.0, 10.0), 15.0),
        );
        let dir = arrow.direction();
        assert!((dir.y - 1.0).abs() < f64::EPSILON);
    }
}
