//! Kind-keyed dispatch for hit-testing, marquee selection and translation.

use super::{ARROW_KIND, ArrowBehavior, BoardElement, BoxBehavior};
use crate::geometry::BBox;
use kurbo::Point;
use std::collections::HashMap;
use std::fmt;

/// Geometry behaviour of one element kind.
pub trait ElementBehavior {
    /// Whether a world point lands on the element.
    fn is_hit(&self, element: &BoardElement, point: Point, tolerance: f64) -> bool;

    /// Whether the element should be picked up by a marquee covering `area`.
    fn is_selected(&self, element: &BoardElement, area: &BBox) -> bool;

    /// World-space bounds, if the element has any geometry.
    fn bounds(&self, element: &BoardElement) -> Option<BBox>;

    /// Move the element itself by a world-space delta. Children are handled by the registry.
    fn translate(&self, element: &mut BoardElement, dx: f64, dy: f64);
}

/// Maps element kinds to their behaviour, falling back to box semantics.
pub struct ElementRegistry {
    behaviors: HashMap<String, Box<dyn ElementBehavior>>,
    fallback: Box<dyn ElementBehavior>,
}

/// Kinds that behave like plain boxes out of the box.
pub const BOX_KINDS: [&str; 9] = [
    "mind-node",
    "geometry",
    "image",
    "video",
    "frame",
    "rich-text",
    "webview",
    "card",
    "multi-column-container",
];

impl Default for ElementRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in BOX_KINDS {
            registry.register(kind, BoxBehavior);
        }
        registry.register(ARROW_KIND, ArrowBehavior);
        registry
    }
}

impl fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&String> = self.behaviors.keys().collect();
        kinds.sort();
        f.debug_struct("ElementRegistry").field("kinds", &kinds).finish()
    }
}

impl ElementRegistry {
    /// Registry with only the box fallback.
    pub fn empty() -> Self {
        Self {
            behaviors: HashMap::new(),
            fallback: Box::new(BoxBehavior),
        }
    }

    /// Register or replace the behaviour for a kind.
    pub fn register(&mut self, kind: impl Into<String>, behavior: impl ElementBehavior + 'static) {
        self.behaviors.insert(kind.into(), Box::new(behavior));
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.behaviors.contains_key(kind)
    }

    /// Behaviour for an element's kind.
    pub fn behavior(&self, kind: &str) -> &dyn ElementBehavior {
        match self.behaviors.get(kind) {
            Some(behavior) => &**behavior,
            None => &*self.fallback,
        }
    }

    pub fn is_hit(&self, element: &BoardElement, point: Point, tolerance: f64) -> bool {
        self.behavior(&element.kind).is_hit(element, point, tolerance)
    }

    pub fn is_selected(&self, element: &BoardElement, area: &BBox) -> bool {
        self.behavior(&element.kind).is_selected(element, area)
    }

    pub fn bounds(&self, element: &BoardElement) -> Option<BBox> {
        self.behavior(&element.kind).bounds(element)
    }

    /// Union of the bounds of `elements` and all their descendants.
    pub fn union_bounds(&self, elements: &[BoardElement]) -> Option<BBox> {
        let mut result: Option<BBox> = None;
        for element in elements {
            element.for_each_descendant(&mut |node| {
                if let Some(bounds) = self.bounds(node) {
                    result = Some(match result {
                        Some(acc) => acc.union(&bounds),
                        None => bounds,
                    });
                }
            });
        }
        result
    }

    /// Translate an element together with its whole subtree.
    pub fn translate_tree(&self, element: &mut BoardElement, dx: f64, dy: f64) {
        element.for_each_descendant_mut(&mut |node| {
            self.behavior(&node.kind).translate(node, dx, dy);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverHit;

    impl ElementBehavior for NeverHit {
        fn is_hit(&self, _: &BoardElement, _: Point, _: f64) -> bool {
            false
        }
        fn is_selected(&self, _: &BoardElement, _: &BBox) -> bool {
            false
        }
        fn bounds(&self, _: &BoardElement) -> Option<BBox> {
            None
        }
        fn translate(&self, _: &mut BoardElement, _: f64, _: f64) {}
    }

    #[test]
    fn test_unknown_kind_falls_back_to_box() {
        let registry = ElementRegistry::default();
        let element = BoardElement::new("sticker").with_bounds(0.0, 0.0, 10.0, 10.0);
        assert!(!registry.is_registered("sticker"));
        assert!(registry.is_hit(&element, Point::new(5.0, 5.0), 0.0));
    }

    #[test]
    fn test_register_replaces_behavior() {
        let mut registry = ElementRegistry::default();
        registry.register("geometry", NeverHit);
        let element = BoardElement::new("geometry").with_bounds(0.0, 0.0, 10.0, 10.0);
        assert!(!registry.is_hit(&element, Point::new(5.0, 5.0), 0.0));
    }

    #[test]
    fn test_translate_tree_moves_descendants() {
        let registry = ElementRegistry::default();
        let mut frame = BoardElement::new("frame")
            .with_bounds(0.0, 0.0, 100.0, 100.0)
            .with_children(vec![BoardElement::new("geometry").with_bounds(10.0, 10.0, 5.0, 5.0)]);
        registry.translate_tree(&mut frame, 5.0, -5.0);
        assert_eq!(frame.x, Some(5.0));
        assert_eq!(frame.children[0].x, Some(15.0));
        assert_eq!(frame.children[0].y, Some(5.0));
    }

    #[test]
    fn test_union_bounds_includes_children() {
        let registry = ElementRegistry::default();
        let elements = vec![
            BoardElement::new("geometry").with_bounds(0.0, 0.0, 10.0, 10.0),
            BoardElement::new("frame")
                .with_children(vec![BoardElement::new("geometry").with_bounds(90.0, 40.0, 10.0, 10.0)]),
        ];
        let bounds = registry.union_bounds(&elements).unwrap();
        assert_eq!(bounds, BBox::new(0.0, 0.0, 100.0, 50.0));
        assert!(registry.union_bounds(&[]).is_none());
    }
}
