//! Addressing nodes of the scene tree by index path.
//!
//! A path is the list of child indices from the root forest down to a node:
//! `[2]` is the third root element, `[2, 0]` its first child. Paths are
//! recomputed from ids whenever they're needed, since any insert or removal
//! shifts the indices of later siblings.

use crate::element::{BoardElement, ElementId};
use crate::error::{BoardError, BoardResult};

/// Index path from the root forest to a node.
pub type NodePath = Vec<usize>;

/// Path of the element with `id`, if it is in the tree.
pub fn path_of(children: &[BoardElement], id: &ElementId) -> Option<NodePath> {
    for (index, child) in children.iter().enumerate() {
        if &child.id == id {
            return Some(vec![index]);
        }
        if let Some(mut rest) = path_of(&child.children, id) {
            rest.insert(0, index);
            return Some(rest);
        }
    }
    None
}

/// Node at `path`. The empty path addresses no node.
pub fn node_at<'a>(children: &'a [BoardElement], path: &[usize]) -> Option<&'a BoardElement> {
    let (first, rest) = path.split_first()?;
    let node = children.get(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at(&node.children, rest)
    }
}

pub fn node_at_mut<'a>(children: &'a mut [BoardElement], path: &[usize]) -> Option<&'a mut BoardElement> {
    let (first, rest) = path.split_first()?;
    let node = children.get_mut(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at_mut(&mut node.children, rest)
    }
}

/// Child list of the node at `parent`. The empty path yields the root forest.
pub fn children_at_mut<'a>(
    children: &'a mut Vec<BoardElement>,
    parent: &[usize],
) -> Option<&'a mut Vec<BoardElement>> {
    match parent.split_first() {
        None => Some(children),
        Some((first, rest)) => children_at_mut(&mut children.get_mut(*first)?.children, rest),
    }
}

/// Depth-first pre-order walk over the whole forest.
pub fn dfs<'a>(children: &'a [BoardElement], visit: &mut impl FnMut(&'a BoardElement)) {
    for child in children {
        visit(child);
        dfs(&child.children, visit);
    }
}

/// Pre-order walk that stops at the first node for which `predicate` holds.
pub fn find<'a>(
    children: &'a [BoardElement],
    predicate: &mut impl FnMut(&BoardElement) -> bool,
) -> Option<&'a BoardElement> {
    for child in children {
        if predicate(child) {
            return Some(child);
        }
        if let Some(found) = find(&child.children, predicate) {
            return Some(found);
        }
    }
    None
}

pub fn find_by_id<'a>(children: &'a [BoardElement], id: &ElementId) -> Option<&'a BoardElement> {
    find(children, &mut |node| &node.id == id)
}

/// Parent of the element with `id`, with the parent's path.
pub fn parent_of<'a>(
    children: &'a [BoardElement],
    id: &ElementId,
) -> BoardResult<(&'a BoardElement, NodePath)> {
    let path = path_of(children, id).ok_or_else(|| BoardError::ElementNotFound(id.clone()))?;
    if path.len() < 2 {
        return Err(BoardError::NoParent(id.clone()));
    }
    let parent_path = path[..path.len() - 1].to_vec();
    let parent = node_at(children, &parent_path).ok_or_else(|| BoardError::InvalidPath(parent_path.clone()))?;
    Ok((parent, parent_path))
}

/// Ancestors of the element with `id`, outermost first.
pub fn ancestors<'a>(children: &'a [BoardElement], id: &ElementId) -> Vec<&'a BoardElement> {
    let Some(path) = path_of(children, id) else {
        return Vec::new();
    };
    (1..path.len())
        .filter_map(|depth| node_at(children, &path[..depth]))
        .collect()
}

/// Whether `ancestor` is a strict prefix of `path`.
pub fn is_ancestor_path(ancestor: &[usize], path: &[usize]) -> bool {
    ancestor.len() < path.len() && path.starts_with(ancestor)
}

/// Drop every element that has an ancestor also present in `elements`.
///
/// Elements are looked up in `children` by id; elements not in the tree are
/// kept as they are.
pub fn without_descendants(children: &[BoardElement], elements: &[BoardElement]) -> Vec<BoardElement> {
    let paths: Vec<Option<NodePath>> = elements.iter().map(|el| path_of(children, &el.id)).collect();
    elements
        .iter()
        .zip(&paths)
        .filter(|(_, path)| match path {
            Some(path) => !paths
                .iter()
                .flatten()
                .any(|other| is_ancestor_path(other, path)),
            None => true,
        })
        .map(|(element, _)| element.clone())
        .collect()
}
