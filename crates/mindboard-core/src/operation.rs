//! The five primitive mutations and their inverses.
//!
//! Every change to a board's content or selection is an [`Operation`].
//! Applying an operation returns the operation as it actually took effect
//! (removed node and overwritten properties read from the tree), so the
//! result can always be inverted exactly even if the caller's copy was stale.

use crate::element::{BoardElement, Properties};
use crate::error::{BoardError, BoardResult};
use crate::selection::{Selection, SelectionPatch};
use crate::tree::{self, NodePath};
use serde::{Deserialize, Serialize};

/// A primitive, invertible mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Operation {
    /// Insert `node` so that it ends up at `path`.
    InsertNode { path: NodePath, node: BoardElement },
    /// Remove the node at `path`. `node` is the removed subtree.
    RemoveNode { path: NodePath, node: BoardElement },
    /// Shallow-merge `new_properties` into the node at `path`.
    /// `properties` holds the values they replace.
    SetNode {
        path: NodePath,
        properties: Properties,
        new_properties: Properties,
    },
    /// Move the node at `path` to `new_path`. `new_path` is read before the
    /// removal, so moving forward among siblings lands one slot earlier.
    MoveNode { path: NodePath, new_path: NodePath },
    /// Patch the selection.
    SetSelection {
        properties: SelectionPatch,
        new_properties: SelectionPatch,
    },
}

impl Operation {
    pub fn insert(path: NodePath, node: BoardElement) -> Self {
        Self::InsertNode { path, node }
    }

    pub fn remove(path: NodePath, node: BoardElement) -> Self {
        Self::RemoveNode { path, node }
    }

    /// `set_node` against `element`, capturing the values being replaced.
    pub fn set_node(element: &BoardElement, path: NodePath, new_properties: Properties) -> BoardResult<Self> {
        Ok(Self::SetNode {
            path,
            properties: element.capture(&new_properties)?,
            new_properties,
        })
    }

    pub fn move_node(path: NodePath, new_path: NodePath) -> Self {
        Self::MoveNode { path, new_path }
    }

    pub fn set_selection(current: &Selection, new_properties: SelectionPatch) -> Self {
        Self::SetSelection {
            properties: current.capture(&new_properties),
            new_properties,
        }
    }

    /// Whether the operation only touches the selection.
    pub fn is_selection(&self) -> bool {
        matches!(self, Self::SetSelection { .. })
    }

    /// The operation that undoes this one.
    pub fn invert(&self) -> Operation {
        match self {
            Self::InsertNode { path, node } => Self::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },
            Self::RemoveNode { path, node } => Self::InsertNode {
                path: path.clone(),
                node: node.clone(),
            },
            Self::SetNode {
                path,
                properties,
                new_properties,
            } => Self::SetNode {
                path: path.clone(),
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
            Self::MoveNode { path, new_path } => {
                let landed = adjust_for_removal(new_path, path);
                let mut back = path.clone();
                if let Some(k) = landed.len().checked_sub(1) {
                    if back.len() > k && back[..k] == landed[..k] && back[k] >= landed[k] {
                        back[k] += 1;
                    }
                }
                Self::MoveNode {
                    path: landed,
                    new_path: back,
                }
            }
            Self::SetSelection {
                properties,
                new_properties,
            } => Self::SetSelection {
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
        }
    }

    /// Apply to a tree and selection, returning the operation as applied.
    ///
    /// On error nothing has been changed.
    pub(crate) fn apply(
        self,
        children: &mut Vec<BoardElement>,
        selection: &mut Selection,
    ) -> BoardResult<Operation> {
        match self {
            Self::InsertNode { path, node } => {
                insert_at(children, &path, node.clone())?;
                Ok(Self::InsertNode { path, node })
            }
            Self::RemoveNode { path, node } => {
                let removed = remove_at(children, &path)?;
                if removed.id != node.id {
                    log::warn!(
                        "remove_node at {:?} expected {} but removed {}",
                        path,
                        node.id,
                        removed.id
                    );
                }
                Ok(Self::RemoveNode { path, node: removed })
            }
            Self::SetNode {
                path,
                new_properties,
                ..
            } => {
                let target = tree::node_at_mut(children, &path)
                    .ok_or_else(|| BoardError::InvalidPath(path.clone()))?;
                let properties = target.capture(&new_properties)?;
                target.merge(&new_properties)?;
                Ok(Self::SetNode {
                    path,
                    properties,
                    new_properties,
                })
            }
            Self::MoveNode { path, new_path } => {
                move_node(children, &path, &new_path)?;
                Ok(Self::MoveNode { path, new_path })
            }
            Self::SetSelection { new_properties, .. } => {
                let properties = selection.capture(&new_properties);
                selection.apply_patch(&new_properties);
                Ok(Self::SetSelection {
                    properties,
                    new_properties,
                })
            }
        }
    }
}

/// Where `target` ends up once the node at `removed` is taken out of the tree.
///
/// Only a later sibling of `removed` (or a descendant of one) shifts.
pub fn adjust_for_removal(target: &[usize], removed: &[usize]) -> NodePath {
    let mut adjusted = target.to_vec();
    if let Some(k) = removed.len().checked_sub(1) {
        if adjusted.len() > k && adjusted[..k] == removed[..k] && adjusted[k] > removed[k] {
            adjusted[k] -= 1;
        }
    }
    adjusted
}

fn split_path(path: &[usize]) -> BoardResult<(&[usize], usize)> {
    match path.split_last() {
        Some((index, parent)) => Ok((parent, *index)),
        None => Err(BoardError::InvalidPath(path.to_vec())),
    }
}

fn insert_at(children: &mut Vec<BoardElement>, path: &[usize], node: BoardElement) -> BoardResult<()> {
    let (parent, index) = split_path(path)?;
    let siblings = tree::children_at_mut(children, parent)
        .filter(|siblings| index <= siblings.len())
        .ok_or_else(|| BoardError::InvalidPath(path.to_vec()))?;
    siblings.insert(index, node);
    Ok(())
}

fn remove_at(children: &mut Vec<BoardElement>, path: &[usize]) -> BoardResult<BoardElement> {
    let (parent, index) = split_path(path)?;
    let siblings = tree::children_at_mut(children, parent)
        .filter(|siblings| index < siblings.len())
        .ok_or_else(|| BoardError::InvalidPath(path.to_vec()))?;
    Ok(siblings.remove(index))
}

fn move_node(children: &mut Vec<BoardElement>, path: &[usize], new_path: &[usize]) -> BoardResult<()> {
    if new_path.is_empty() {
        return Err(BoardError::InvalidPath(new_path.to_vec()));
    }
    if path == new_path {
        return match tree::node_at(children, path) {
            Some(_) => Ok(()),
            None => Err(BoardError::InvalidPath(path.to_vec())),
        };
    }
    if tree::is_ancestor_path(path, new_path) {
        return Err(BoardError::MoveIntoDescendant {
            from: path.to_vec(),
            to: new_path.to_vec(),
        });
    }
    let node = remove_at(children, path)?;
    let landed = adjust_for_removal(new_path, path);
    if let Err(err) = insert_at(children, &landed, node.clone()) {
        insert_at(children, path, node)?;
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(id: &str) -> BoardElement {
        BoardElement::with_id(id, "mind-node")
    }

    fn apply_all(children: &mut Vec<BoardElement>, selection: &mut Selection, ops: &[Operation]) -> Vec<Operation> {
        ops.iter()
            .map(|op| op.clone().apply(children, selection).unwrap())
            .collect()
    }

    fn ids(children: &[BoardElement]) -> Vec<String> {
        children.iter().map(|el| el.id.to_string()).collect()
    }

    #[test]
    fn test_wire_format() {
        let op = Operation::move_node(vec![0, 1], vec![2]);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({ "type": "move_node", "path": [0, 1], "newPath": [2] })
        );
        let parsed: Operation = serde_json::from_value(json!({
            "type": "set_node",
            "path": [0],
            "properties": { "x": 1 },
            "newProperties": { "x": 2 }
        }))
        .unwrap();
        assert!(matches!(parsed, Operation::SetNode { .. }));
    }

    #[test]
    fn test_insert_beyond_end_is_rejected() {
        let mut children = vec![leaf("a")];
        let mut selection = Selection::default();
        let err = Operation::insert(vec![3], leaf("b"))
            .apply(&mut children, &mut selection)
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidPath(_)));
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_insert_and_remove_invert() {
        let mut children = vec![leaf("a"), leaf("b").with_children(vec![leaf("b0")])];
        let original = children.clone();
        let mut selection = Selection::default();
        let applied = apply_all(
            &mut children,
            &mut selection,
            &[Operation::insert(vec![1, 1], leaf("b1")), Operation::remove(vec![0], leaf("a"))],
        );
        assert_eq!(ids(&children), vec!["b"]);
        assert_eq!(ids(&children[0].children), vec!["b0", "b1"]);
        let inverse: Vec<Operation> = applied.iter().rev().map(Operation::invert).collect();
        apply_all(&mut children, &mut selection, &inverse);
        assert_eq!(children, original);
    }

    #[test]
    fn test_remove_records_actual_subtree() {
        let mut children = vec![leaf("a").with_children(vec![leaf("a0")])];
        let mut selection = Selection::default();
        let applied = Operation::remove(vec![0], leaf("a"))
            .apply(&mut children, &mut selection)
            .unwrap();
        match applied {
            Operation::RemoveNode { node, .. } => assert_eq!(node.children.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_set_node_inverse_restores() {
        let mut children = vec![leaf("a").with_bounds(0.0, 0.0, 10.0, 10.0)];
        let original = children.clone();
        let mut selection = Selection::default();
        let mut patch = Properties::new();
        patch.insert("x".into(), json!(42.0));
        patch.insert("color".into(), json!("red"));
        let op = Operation::set_node(&children[0], vec![0], patch).unwrap();
        let applied = op.apply(&mut children, &mut selection).unwrap();
        assert_eq!(children[0].x, Some(42.0));
        applied.invert().apply(&mut children, &mut selection).unwrap();
        assert_eq!(children, original);
    }

    #[test]
    fn test_move_forward_among_siblings() {
        let mut children = vec![leaf("a"), leaf("b"), leaf("c"), leaf("d")];
        let mut selection = Selection::default();
        let applied = Operation::move_node(vec![0], vec![2])
            .apply(&mut children, &mut selection)
            .unwrap();
        assert_eq!(ids(&children), vec!["b", "a", "c", "d"]);
        applied.invert().apply(&mut children, &mut selection).unwrap();
        assert_eq!(ids(&children), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_move_backward_among_siblings() {
        let mut children = vec![leaf("a"), leaf("b"), leaf("c"), leaf("d")];
        let mut selection = Selection::default();
        let applied = Operation::move_node(vec![3], vec![1])
            .apply(&mut children, &mut selection)
            .unwrap();
        assert_eq!(ids(&children), vec!["a", "d", "b", "c"]);
        applied.invert().apply(&mut children, &mut selection).unwrap();
        assert_eq!(ids(&children), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_move_into_later_sibling_subtree() {
        let mut children = vec![leaf("a"), leaf("b").with_children(vec![leaf("b0")])];
        let original = children.clone();
        let mut selection = Selection::default();
        let applied = Operation::move_node(vec![0], vec![1, 1])
            .apply(&mut children, &mut selection)
            .unwrap();
        assert_eq!(ids(&children), vec!["b"]);
        assert_eq!(ids(&children[0].children), vec!["b0", "a"]);
        applied.invert().apply(&mut children, &mut selection).unwrap();
        assert_eq!(children, original);
    }

    #[test]
    fn test_move_out_to_earlier_position() {
        let mut children = vec![leaf("a"), leaf("b").with_children(vec![leaf("b0"), leaf("b1")])];
        let original = children.clone();
        let mut selection = Selection::default();
        let applied = Operation::move_node(vec![1, 1], vec![0])
            .apply(&mut children, &mut selection)
            .unwrap();
        assert_eq!(ids(&children), vec!["b1", "a", "b"]);
        applied.invert().apply(&mut children, &mut selection).unwrap();
        assert_eq!(children, original);
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let mut children = vec![leaf("a").with_children(vec![leaf("a0")])];
        let mut selection = Selection::default();
        let err = Operation::move_node(vec![0], vec![0, 0, 0])
            .apply(&mut children, &mut selection)
            .unwrap_err();
        assert!(matches!(err, BoardError::MoveIntoDescendant { .. }));
        assert_eq!(children[0].children.len(), 1);
    }

    #[test]
    fn test_failed_move_leaves_tree_untouched() {
        let mut children = vec![leaf("a"), leaf("b")];
        let original = children.clone();
        let mut selection = Selection::default();
        assert!(
            Operation::move_node(vec![0], vec![1, 5])
                .apply(&mut children, &mut selection)
                .is_err()
        );
        assert_eq!(children, original);
    }

    #[test]
    fn test_set_selection_inverse() {
        let mut children = Vec::new();
        let mut selection = Selection {
            selected_elements: vec![leaf("a")],
            select_area: None,
        };
        let op = Operation::set_selection(&selection, SelectionPatch::cleared());
        let applied = op.apply(&mut children, &mut selection).unwrap();
        assert!(selection.is_empty());
        applied.invert().apply(&mut children, &mut selection).unwrap();
        assert_eq!(selection.ids().len(), 1);
    }

    #[test]
    fn test_adjust_for_removal() {
        assert_eq!(adjust_for_removal(&[2], &[0]), vec![1]);
        assert_eq!(adjust_for_removal(&[0], &[2]), vec![0]);
        assert_eq!(adjust_for_removal(&[1, 3], &[0]), vec![0, 3]);
        assert_eq!(adjust_for_removal(&[1, 3], &[1, 0]), vec![1, 2]);
        assert_eq!(adjust_for_removal(&[2, 3], &[1, 0]), vec![2, 3]);
    }
}
