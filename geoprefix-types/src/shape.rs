//! Shapes a prefix tree can decompose, and how a cell relates to them.

use geo::{BoundingRect, Contains, Intersects, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// A query or indexed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point(Point<f64>),
    Rect(Rect<f64>),
    Polygon(Polygon<f64>),
}

impl Shape {
    /// Smallest rectangle enclosing this shape, if it has any extent.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Shape::Point(p) => Some(Rect::new(p.0, p.0)),
            Shape::Rect(r) => Some(*r),
            Shape::Polygon(poly) => poly.bounding_rect(),
        }
    }

    pub fn as_point(&self) -> Option<&Point<f64>> {
        match self {
            Shape::Point(p) => Some(p),
            _ => None,
        }
    }
}

impl From<Point<f64>> for Shape {
    fn from(point: Point<f64>) -> Self {
        Shape::Point(point)
    }
}

impl From<Rect<f64>> for Shape {
    fn from(rect: Rect<f64>) -> Self {
        Shape::Rect(rect)
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(polygon: Polygon<f64>) -> Self {
        Shape::Polygon(polygon)
    }
}

/// Topological relation of a cell's rectangle to another shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialRelation {
    /// The cell lies entirely inside the shape.
    Within,
    /// The cell entirely covers the shape.
    Contains,
    /// The cell and the shape partially overlap.
    Intersects,
    /// No point in common.
    Disjoint,
}

impl SpatialRelation {
    /// Relation of `rect` to `shape`, boundaries inclusive.
    ///
    /// When the rectangle both covers and is covered by the shape (they are
    /// equal) the result is `Contains`.
    pub fn of_rect(rect: &Rect<f64>, shape: &Shape) -> Self {
        match shape {
            Shape::Point(p) => {
                if rect_covers(rect, &Rect::new(p.0, p.0)) {
                    SpatialRelation::Contains
                } else {
                    SpatialRelation::Disjoint
                }
            }
            Shape::Rect(other) => {
                if !rect.intersects(other) {
                    SpatialRelation::Disjoint
                } else if rect_covers(rect, other) {
                    SpatialRelation::Contains
                } else if rect_covers(other, rect) {
                    SpatialRelation::Within
                } else {
                    SpatialRelation::Intersects
                }
            }
            Shape::Polygon(poly) => {
                let cell = rect.to_polygon();
                if !cell.intersects(poly) {
                    SpatialRelation::Disjoint
                } else if cell.contains(poly) {
                    SpatialRelation::Contains
                } else if poly.contains(&cell) {
                    SpatialRelation::Within
                } else {
                    SpatialRelation::Intersects
                }
            }
        }
    }

    pub fn intersects(self) -> bool {
        self != SpatialRelation::Disjoint
    }
}

fn rect_covers(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    #[test]
    fn test_rect_relations() {
        let cell = rect(0.0, 0.0, 10.0, 10.0);

        assert_eq!(
            SpatialRelation::of_rect(&cell, &Shape::Rect(rect(20.0, 20.0, 30.0, 30.0))),
            SpatialRelation::Disjoint
        );
        assert_eq!(
            SpatialRelation::of_rect(&cell, &Shape::Rect(rect(-5.0, -5.0, 15.0, 15.0))),
            SpatialRelation::Within
        );
        assert_eq!(
            SpatialRelation::of_rect(&cell, &Shape::Rect(rect(2.0, 2.0, 3.0, 3.0))),
            SpatialRelation::Contains
        );
        assert_eq!(
            SpatialRelation::of_rect(&cell, &Shape::Rect(rect(5.0, 5.0, 15.0, 15.0))),
            SpatialRelation::Intersects
        );
    }

    #[test]
    fn test_equal_rect_is_contains() {
        let cell = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            SpatialRelation::of_rect(&cell, &Shape::Rect(cell)),
            SpatialRelation::Contains
        );
    }

    #[test]
    fn test_point_relations() {
        let cell = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            SpatialRelation::of_rect(&cell, &Shape::Point(Point::new(10.0, 5.0))),
            SpatialRelation::Contains
        );
        assert_eq!(
            SpatialRelation::of_rect(&cell, &Shape::Point(Point::new(10.5, 5.0))),
            SpatialRelation::Disjoint
        );
    }

    #[test]
    fn test_polygon_relations() {
        let triangle = polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 0.0, y: 100.0),
            (x: 0.0, y: 0.0),
        ];
        let shape = Shape::Polygon(triangle);

        assert_eq!(
            SpatialRelation::of_rect(&rect(1.0, 1.0, 2.0, 2.0), &shape),
            SpatialRelation::Within
        );
        assert_eq!(
            SpatialRelation::of_rect(&rect(90.0, 90.0, 95.0, 95.0), &shape),
            SpatialRelation::Disjoint
        );
        assert_eq!(
            SpatialRelation::of_rect(&rect(40.0, 40.0, 60.0, 60.0), &shape),
            SpatialRelation::Intersects
        );
        assert_eq!(
            SpatialRelation::of_rect(&rect(-10.0, -10.0, 200.0, 200.0), &shape),
            SpatialRelation::Contains
        );
    }

    #[test]
    fn test_bounding_rect() {
        let p = Shape::from(Point::new(3.0, 4.0));
        let bbox = p.bounding_rect().unwrap();
        assert_eq!(bbox.min(), bbox.max());
        assert!(p.as_point().is_some());
    }
}
