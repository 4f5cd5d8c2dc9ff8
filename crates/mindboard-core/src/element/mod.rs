//! Scene tree elements and per-kind behaviour.
//!
//! A [`BoardElement`] is a loosely typed node: the fields every kind shares
//! (id, kind, position, size, points, arrow endpoints, children) are typed,
//! everything else lives in a free-form property map so plugins can attach
//! their own data without touching this crate.

mod arrow;
mod common;
mod registry;

pub use arrow::{ARROW_KIND, ArrowBehavior, resolve_binding};
pub use common::BoxBehavior;
pub use registry::{ElementBehavior, ElementRegistry};

use crate::error::{BoardError, BoardResult};
use crate::geometry::BBox;
use kurbo::Point;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Shallow property patch, as carried by `set_node` operations.
pub type Properties = Map<String, Value>;

/// Unique identifier of an element. Never reused within a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One end of an arrow, optionally bound to another element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowEndpoint {
    /// Element the endpoint is attached to. Unresolvable ids count as unbound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_id: Option<ElementId>,
    /// Connection point on the bound element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_id: Option<String>,
    /// Endpoint styling such as `marker`.
    #[serde(flatten)]
    pub extra: Properties,
}

impl ArrowEndpoint {
    pub fn bound_to(id: impl Into<ElementId>) -> Self {
        Self {
            bind_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// The same endpoint detached from any element, keeping its styling.
    pub fn unbound(&self) -> Self {
        Self {
            bind_id: None,
            connect_id: None,
            extra: self.extra.clone(),
        }
    }
}

/// A node of the scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ArrowEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ArrowEndpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BoardElement>,
    /// Kind-specific properties not modelled above.
    #[serde(flatten)]
    pub extra: Properties,
}

/// Keys that describe where an element sits, used when moving elements.
const GEOMETRY_KEYS: [&str; 4] = ["x", "y", "points", "children"];

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> BoardResult<T> {
    serde_json::from_value(value).map_err(|source| BoardError::InvalidProperty {
        key: key.to_string(),
        source,
    })
}

fn encode<T: Serialize>(key: &str, value: &T) -> BoardResult<Value> {
    serde_json::to_value(value).map_err(|source| BoardError::InvalidProperty {
        key: key.to_string(),
        source,
    })
}

impl BoardElement {
    /// Create an element of the given kind with a fresh id.
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_id(ElementId::new(), kind)
    }

    pub fn with_id(id: impl Into<ElementId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            x: None,
            y: None,
            width: None,
            height: None,
            points: None,
            source: None,
            target: None,
            children: Vec::new(),
            extra: Properties::new(),
        }
    }

    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_endpoints(mut self, source: ArrowEndpoint, target: ArrowEndpoint) -> Self {
        self.source = Some(source);
        self.target = Some(target);
        self
    }

    pub fn with_children(mut self, children: Vec<BoardElement>) -> Self {
        self.children = children;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The element's box, when it has all four of x, y, width and height.
    pub fn bbox(&self) -> Option<BBox> {
        Some(BBox::new(self.x?, self.y?, self.width?, self.height?))
    }

    pub fn is_arrow(&self) -> bool {
        self.kind == ARROW_KIND
    }

    /// Current value of a property, `Value::Null` when absent.
    pub fn property(&self, key: &str) -> BoardResult<Value> {
        match key {
            "id" => encode(key, &self.id),
            "type" => Ok(Value::String(self.kind.clone())),
            "x" => encode(key, &self.x),
            "y" => encode(key, &self.y),
            "width" => encode(key, &self.width),
            "height" => encode(key, &self.height),
            "points" => encode(key, &self.points),
            "source" => encode(key, &self.source),
            "target" => encode(key, &self.target),
            "children" if self.children.is_empty() => Ok(Value::Null),
            "children" => encode(key, &self.children),
            _ => Ok(self.extra.get(key).cloned().unwrap_or(Value::Null)),
        }
    }

    /// Assign one property. `Value::Null` clears optional fields and
    /// removes free-form properties.
    pub fn set_property(&mut self, key: &str, value: Value) -> BoardResult<()> {
        match key {
            "id" => self.id = decode(key, value)?,
            "type" => self.kind = decode(key, value)?,
            "x" => self.x = decode(key, value)?,
            "y" => self.y = decode(key, value)?,
            "width" => self.width = decode(key, value)?,
            "height" => self.height = decode(key, value)?,
            "points" => self.points = decode(key, value)?,
            "source" => self.source = decode(key, value)?,
            "target" => self.target = decode(key, value)?,
            "children" => {
                self.children = if value.is_null() {
                    Vec::new()
                } else {
                    decode(key, value)?
                }
            }
            _ if value.is_null() => {
                self.extra.remove(key);
            }
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// Shallow-merge a patch. Either every key is applied or none is.
    pub fn merge(&mut self, patch: &Properties) -> BoardResult<()> {
        let mut merged = self.clone();
        for (key, value) in patch {
            merged.set_property(key, value.clone())?;
        }
        *self = merged;
        Ok(())
    }

    /// Current values for every key in `patch`, so the patch can be undone.
    pub fn capture(&self, patch: &Properties) -> BoardResult<Properties> {
        patch
            .keys()
            .map(|key| Ok((key.clone(), self.property(key)?)))
            .collect()
    }

    /// Position-related properties: x, y, points and children.
    pub fn geometry_properties(&self) -> BoardResult<Properties> {
        GEOMETRY_KEYS
            .iter()
            .map(|key| Ok((key.to_string(), self.property(key)?)))
            .collect()
    }

    /// Visit this element and all of its descendants, pre-order.
    pub fn for_each_descendant(&self, visit: &mut impl FnMut(&BoardElement)) {
        visit(self);
        for child in &self.children {
            child.for_each_descendant(visit);
        }
    }

    pub fn for_each_descendant_mut(&mut self, visit: &mut impl FnMut(&mut BoardElement)) {
        visit(self);
        for child in &mut self.children {
            child.for_each_descendant_mut(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape() {
        let element = BoardElement::with_id("a", "geometry")
            .with_bounds(0.0, 0.0, 10.0, 20.0)
            .with_property("fill", json!("#fff"));
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(
            value,
            json!({ "id": "a", "type": "geometry", "x": 0.0, "y": 0.0, "width": 10.0, "height": 20.0, "fill": "#fff" })
        );
        let back: BoardElement = serde_json::from_value(value).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn test_integer_coordinates_deserialize() {
        let element: BoardElement =
            serde_json::from_str(r#"{"id":"a","type":"mind","x":1,"y":2,"children":[{"id":"b","type":"mind"}]}"#)
                .unwrap();
        assert_eq!(element.x, Some(1.0));
        assert_eq!(element.children.len(), 1);
        assert!(element.extra.is_empty());
    }

    #[test]
    fn test_arrow_endpoints_use_camel_case() {
        let arrow = BoardElement::with_id("arrow", ARROW_KIND)
            .with_endpoints(ArrowEndpoint::bound_to("a"), ArrowEndpoint::default());
        let value = serde_json::to_value(&arrow).unwrap();
        assert_eq!(value["source"], json!({ "bindId": "a" }));
        assert_eq!(value["target"], json!({}));
    }

    #[test]
    fn test_endpoint_styling_survives_load_and_unbind() {
        let arrow: BoardElement = serde_json::from_value(json!({
            "id": "l",
            "type": ARROW_KIND,
            "source": { "bindId": "a", "connectId": "right", "marker": "arrow" },
            "target": { "marker": "none" }
        }))
        .unwrap();
        let source = arrow.source.clone().unwrap();
        assert_eq!(source.extra["marker"], json!("arrow"));
        let value = serde_json::to_value(&arrow).unwrap();
        assert_eq!(value["source"], json!({ "bindId": "a", "connectId": "right", "marker": "arrow" }));
        assert_eq!(value["target"], json!({ "marker": "none" }));
        assert_eq!(serde_json::to_value(source.unbound()).unwrap(), json!({ "marker": "arrow" }));
    }

    #[test]
    fn test_merge_and_capture_restore() {
        let mut element = BoardElement::with_id("a", "geometry").with_bounds(0.0, 0.0, 10.0, 10.0);
        let original = element.clone();
        let mut patch = Properties::new();
        patch.insert("x".into(), json!(5.0));
        patch.insert("label".into(), json!("hello"));

        let before = element.capture(&patch).unwrap();
        assert_eq!(before["label"], Value::Null);
        element.merge(&patch).unwrap();
        assert_eq!(element.x, Some(5.0));
        assert_eq!(element.extra["label"], json!("hello"));

        element.merge(&before).unwrap();
        assert_eq!(element, original);
    }

    #[test]
    fn test_merge_is_atomic() {
        let mut element = BoardElement::with_id("a", "geometry").with_bounds(0.0, 0.0, 10.0, 10.0);
        let mut patch = Properties::new();
        patch.insert("label".into(), json!("x"));
        patch.insert("width".into(), json!("wide"));
        let err = element.merge(&patch).unwrap_err();
        assert!(matches!(err, BoardError::InvalidProperty { ref key, .. } if key == "width"));
        assert!(element.extra.is_empty());
    }

    #[test]
    fn test_descendant_walk_is_pre_order() {
        let tree = BoardElement::with_id("root", "mind").with_children(vec![
            BoardElement::with_id("a", "mind").with_children(vec![BoardElement::with_id("a1", "mind")]),
            BoardElement::with_id("b", "mind"),
        ]);
        let mut seen = Vec::new();
        tree.for_each_descendant(&mut |el| seen.push(el.id.to_string()));
        assert_eq!(seen, vec!["root", "a", "a1", "b"]);
    }
}
