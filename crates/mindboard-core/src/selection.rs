//! Selection state, marquee areas and hit-testing against the board.

use crate::board::Board;
use crate::element::{BoardElement, ElementId};
use crate::error::BoardResult;
use crate::geometry::select_area_to_rect;
use crate::operation::Operation;
use crate::tree;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A marquee drag in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectArea {
    pub anchor: Point,
    pub focus: Point,
}

impl SelectArea {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }
}

/// Current selection: snapshots of the selected elements plus an optional marquee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub selected_elements: Vec<BoardElement>,
    #[serde(default)]
    pub select_area: Option<SelectArea>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.selected_elements.is_empty()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.selected_elements.iter().any(|el| &el.id == id)
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.selected_elements.iter().map(|el| el.id.clone()).collect()
    }

    /// Current values of the fields `patch` touches.
    pub fn capture(&self, patch: &SelectionPatch) -> SelectionPatch {
        SelectionPatch {
            selected_elements: patch
                .selected_elements
                .as_ref()
                .map(|_| self.selected_elements.clone()),
            select_area: patch.select_area.map(|_| self.select_area),
        }
    }

    pub fn apply_patch(&mut self, patch: &SelectionPatch) {
        if let Some(elements) = &patch.selected_elements {
            self.selected_elements = elements.clone();
        }
        if let Some(area) = patch.select_area {
            self.select_area = area;
        }
    }
}

/// Partial selection update. Absent fields are left alone; an explicit
/// `select_area: Some(None)` clears the marquee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_elements: Option<Vec<BoardElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub select_area: Option<Option<SelectArea>>,
}

impl SelectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty selection, no marquee.
    pub fn cleared() -> Self {
        Self::new().selected(Vec::new()).area(None)
    }

    pub fn selected(mut self, elements: Vec<BoardElement>) -> Self {
        self.selected_elements = Some(elements);
        self
    }

    pub fn area(mut self, area: Option<SelectArea>) -> Self {
        self.select_area = Some(area);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.selected_elements.is_none() && self.select_area.is_none()
    }
}

/// Distinguishes a missing field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

impl Board {
    /// Whether a world point lands on `element`.
    pub fn is_hit(&self, element: &BoardElement, point: Point) -> bool {
        self.registry.is_hit(element, point, self.config.hit_tolerance)
    }

    /// Every element under a world point, in pre-order. The last entry is topmost.
    pub fn get_hit_elements(&self, point: Point) -> Vec<&BoardElement> {
        let mut hits = Vec::new();
        tree::dfs(&self.children, &mut |node| {
            if self.is_hit(node, point) {
                hits.push(node);
            }
        });
        hits
    }

    pub fn top_hit_element(&self, point: Point) -> Option<&BoardElement> {
        self.get_hit_elements(point).pop()
    }

    /// Whether a marquee covering `area` picks up `element`.
    pub fn is_element_selected(&self, element: &BoardElement, area: &SelectArea) -> bool {
        self.registry.is_selected(element, &select_area_to_rect(area))
    }

    /// Every element a marquee covering `area` picks up, in pre-order.
    pub fn elements_in_area(&self, area: &SelectArea) -> Vec<&BoardElement> {
        let rect = select_area_to_rect(area);
        let mut picked = Vec::new();
        tree::dfs(&self.children, &mut |node| {
            if self.registry.is_selected(node, &rect) {
                picked.push(node);
            }
        });
        picked
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selection.contains(id)
    }

    /// Apply a selection patch. Selection changes are never recorded in history.
    pub fn update_selection(&mut self, patch: SelectionPatch) -> BoardResult<()> {
        let op = Operation::set_selection(&self.selection, patch);
        self.apply_with(vec![op], crate::board::ApplyOptions::untracked())
    }

    /// Select every element in the tree.
    pub fn select_all(&mut self) -> BoardResult<()> {
        let mut all = Vec::new();
        tree::dfs(&self.children, &mut |node| all.push(node.clone()));
        self.update_selection(SelectionPatch::new().selected(all).area(None))
    }

    pub fn clear_selection(&mut self) -> BoardResult<()> {
        self.update_selection(SelectionPatch::cleared())
    }

    /// Drop selected elements that no longer exist and refresh the rest from the tree.
    pub(crate) fn refresh_selection(&mut self) -> BoardResult<()> {
        let fresh: Vec<BoardElement> = self
            .selection
            .selected_elements
            .iter()
            .filter_map(|el| tree::find_by_id(&self.children, &el.id).cloned())
            .collect();
        if fresh == self.selection.selected_elements {
            return Ok(());
        }
        self.update_selection(SelectionPatch::new().selected(fresh))
    }
}
