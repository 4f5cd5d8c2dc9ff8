//! Box semantics shared by most element kinds.

use super::{BoardElement, ElementBehavior};
use crate::geometry::{BBox, is_rect_intersect};
use kurbo::Point;

/// Treats an element as the rectangle given by its x, y, width and height.
///
/// Hits are inclusive of the border; marquee selection needs a strict overlap.
/// Elements missing any of the four fields are never hit or selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxBehavior;

impl ElementBehavior for BoxBehavior {
    fn is_hit(&self, element: &BoardElement, point: Point, _tolerance: f64) -> bool {
        element.bbox().is_some_and(|bbox| bbox.contains(point))
    }

    fn is_selected(&self, element: &BoardElement, area: &BBox) -> bool {
        element.bbox().is_some_and(|bbox| is_rect_intersect(&bbox, area))
    }

    fn bounds(&self, element: &BoardElement) -> Option<BBox> {
        element.bbox()
    }

    fn translate(&self, element: &mut BoardElement, dx: f64, dy: f64) {
        if let Some(x) = element.x.as_mut() {
            *x += dx;
        }
        if let Some(y) = element.y.as_mut() {
            *y += dy;
        }
        if let Some(points) = element.points.as_mut() {
            for point in points.iter_mut() {
                point.x += dx;
                point.y += dy;
            }
        }
    }
}
