//! Copy, cut and paste of element subtrees.
//!
//! Copied elements travel as a tagged JSON payload under the
//! `application/json` clipboard type. Pasting assigns fresh ids to every
//! pasted element and rewrites arrow bindings between pasted elements to the
//! new ids.

use crate::board::Board;
use crate::element::{BoardElement, ElementId};
use crate::error::{BoardResult, ClipboardError};
use crate::input::ClipboardEvent;
use crate::operation::Operation;
use crate::selection::SelectionPatch;
use crate::tree;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Marker identifying payloads written by this crate.
pub const CLIPBOARD_SOURCE: &str = "mindboard";
/// Clipboard type the payload is stored under.
pub const CLIPBOARD_MIME: &str = "application/json";

/// Serialized form of copied elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub source: String,
    pub elements: Vec<BoardElement>,
}

impl ClipboardPayload {
    pub fn new(elements: Vec<BoardElement>) -> Self {
        Self {
            source: CLIPBOARD_SOURCE.to_string(),
            elements,
        }
    }

    pub fn to_json(&self) -> Result<String, ClipboardError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a payload, rejecting anything not written by this crate.
    pub fn from_json(json: &str) -> Result<Self, ClipboardError> {
        let payload: Self = serde_json::from_str(json)?;
        if payload.source != CLIPBOARD_SOURCE {
            return Err(ClipboardError::ForeignSource(payload.source));
        }
        Ok(payload)
    }

    /// Read the payload stored in a clipboard event.
    pub fn from_clipboard(event: &ClipboardEvent) -> Result<Self, ClipboardError> {
        let json = event.get_data(CLIPBOARD_MIME).ok_or(ClipboardError::MissingPayload)?;
        Self::from_json(json)
    }
}

/// Give every element in the forest (children included) a fresh id that is
/// not in `taken`. Returns the old-to-new mapping.
pub fn regenerate_ids(elements: &mut [BoardElement], taken: &HashSet<ElementId>) -> HashMap<ElementId, ElementId> {
    let mut mapping = HashMap::new();
    let mut issued = HashSet::new();
    for element in elements.iter_mut() {
        element.for_each_descendant_mut(&mut |node| {
            let mut fresh = ElementId::new();
            while taken.contains(&fresh) || issued.contains(&fresh) {
                fresh = ElementId::new();
            }
            issued.insert(fresh.clone());
            let old = std::mem::replace(&mut node.id, fresh.clone());
            mapping.insert(old, fresh);
        });
    }
    mapping
}

/// Point arrow bindings at remapped ids. Bindings to ids outside `mapping`
/// are left as they are.
pub fn remap_bindings(elements: &mut [BoardElement], mapping: &HashMap<ElementId, ElementId>) {
    for element in elements.iter_mut() {
        element.for_each_descendant_mut(&mut |node| {
            for endpoint in [node.source.as_mut(), node.target.as_mut()].into_iter().flatten() {
                let replacement = endpoint.bind_id.as_ref().and_then(|id| mapping.get(id)).cloned();
                if let Some(new_id) = replacement {
                    endpoint.bind_id = Some(new_id);
                }
            }
        });
    }
}

fn offset_element(element: &mut BoardElement, offset: f64) {
    if let (Some(x), Some(y)) = (element.x.as_mut(), element.y.as_mut()) {
        *x += offset;
        *y += offset;
    }
    if let Some(points) = element.points.as_mut() {
        for point in points.iter_mut() {
            point.x += offset;
            point.y += offset;
        }
    }
}

impl Board {
    /// Payload for the current selection, or `None` when nothing is selected.
    ///
    /// Elements are read from the tree so the copy reflects their latest
    /// state, and top-level copies are shifted by the configured paste offset.
    pub fn copy_selection(&self) -> Option<ClipboardPayload> {
        if self.selection.is_empty() {
            return None;
        }
        let elements = tree::without_descendants(&self.children, &self.selection.selected_elements)
            .into_iter()
            .map(|selected| {
                let mut element = self.find_element(&selected.id).cloned().unwrap_or(selected);
                offset_element(&mut element, self.config.paste_offset);
                element
            })
            .collect();
        Some(ClipboardPayload::new(elements))
    }

    /// Copy the selection, then remove it. Returns the payload that was copied.
    pub fn cut_selection(&mut self) -> BoardResult<Option<ClipboardPayload>> {
        let Some(payload) = self.copy_selection() else {
            return Ok(None);
        };
        self.delete_selection()?;
        Ok(Some(payload))
    }

    /// Insert pasted elements at the end of the root, select them and center
    /// the viewport on them. Returns the inserted elements with their new ids.
    pub fn paste_elements(&mut self, mut elements: Vec<BoardElement>) -> BoardResult<Vec<BoardElement>> {
        if elements.is_empty() {
            return Ok(elements);
        }
        let mut taken = HashSet::new();
        tree::dfs(&self.children, &mut |node| {
            taken.insert(node.id.clone());
        });
        let mapping = regenerate_ids(&mut elements, &taken);
        remap_bindings(&mut elements, &mapping);

        let start = self.children.len();
        let mut operations: Vec<Operation> = elements
            .iter()
            .enumerate()
            .map(|(offset, element)| Operation::insert(vec![start + offset], element.clone()))
            .collect();
        operations.push(Operation::set_selection(
            &self.selection,
            SelectionPatch::new().selected(elements.clone()).area(None),
        ));
        self.apply_batch(operations)?;
        self.center_on_elements(&elements);
        log::info!("Pasted {} element(s)", elements.len());
        Ok(elements)
    }

    /// Parse and paste a clipboard payload.
    pub fn paste_json(&mut self, json: &str) -> BoardResult<Vec<BoardElement>> {
        let payload = ClipboardPayload::from_json(json)?;
        self.paste_elements(payload.elements)
    }
}
