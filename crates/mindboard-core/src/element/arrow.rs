//! Polyline arrows and their bindings to other elements.

use super::{ArrowEndpoint, BoardElement, BoxBehavior, ElementBehavior, ElementId};
use crate::geometry::BBox;
use kurbo::{Point, Rect, Vec2};

/// Kind tag of arrow elements.
pub const ARROW_KIND: &str = "arrow";

/// Hit-tests arrows against their `points` polyline, falling back to box
/// semantics for arrows without points.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrowBehavior;

impl ElementBehavior for ArrowBehavior {
    fn is_hit(&self, element: &BoardElement, point: Point, tolerance: f64) -> bool {
        match polyline(element) {
            Some(points) => point_to_polyline_dist(point, points) <= tolerance,
            None => BoxBehavior.is_hit(element, point, tolerance),
        }
    }

    fn is_selected(&self, element: &BoardElement, area: &BBox) -> bool {
        match polyline(element) {
            Some(points) => line_segments_intersect_rect(points, area.to_rect()),
            None => BoxBehavior.is_selected(element, area),
        }
    }

    fn bounds(&self, element: &BoardElement) -> Option<BBox> {
        match polyline(element) {
            Some(points) => {
                let first = Rect::from_points(points[0], points[0]);
                let rect = points.iter().fold(first, |acc, p| acc.union_pt(*p));
                Some(BBox::from_rect(rect))
            }
            None => element.bbox(),
        }
    }

    fn translate(&self, element: &mut BoardElement, dx: f64, dy: f64) {
        BoxBehavior.translate(element, dx, dy);
    }
}

fn polyline(element: &BoardElement) -> Option<&[Point]> {
    element.points.as_deref().filter(|points| !points.is_empty())
}

/// Resolve an endpoint's binding against the elements that currently exist.
///
/// Returns `None` both for unbound endpoints and for bindings whose target
/// is gone.
pub fn resolve_binding<'a>(
    endpoint: Option<&ArrowEndpoint>,
    lookup: impl Fn(&ElementId) -> Option<&'a BoardElement>,
) -> Option<&'a BoardElement> {
    endpoint
        .and_then(|endpoint| endpoint.bind_id.as_ref())
        .and_then(lookup)
}

/// Distance from a point to a line segment (a to b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Minimum distance from a point to a polyline. A single point is treated
/// as a zero-length segment.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    if let [only] = points {
        return point.distance(*only);
    }
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Whether any vertex lies strictly inside the rectangle or any segment crosses it.
fn line_segments_intersect_rect(points: &[Point], rect: Rect) -> bool {
    let inside = |p: &Point| p.x > rect.x0 && p.x < rect.x1 && p.y > rect.y0 && p.y < rect.y1;
    if points.iter().any(inside) {
        return true;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    points.windows(2).any(|w| {
        edges
            .iter()
            .any(|(c, d)| segments_intersect(w[0], w[1], *c, *d))
    })
}

/// Whether segments a-b and c-d intersect, including collinear touches.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}
