//! The board: scene tree, selection and viewport behind one mutation funnel.
//!
//! Content and selection only change through [`Board::apply`] and friends.
//! Each call (or each outermost batch) applies its operations in order,
//! records them for undo, and notifies subscribers exactly once. A batch that
//! fails part-way is rolled back and leaves the board untouched.

use crate::config::BoardConfig;
use crate::element::{ArrowEndpoint, BoardElement, ElementId, ElementRegistry, Properties, resolve_binding};
use crate::error::{BoardError, BoardResult};
use crate::events::{Emitter, Subscription};
use crate::geometry::{BBox, HandlePosition, get_resized_bbox, transform_path};
use crate::history::History;
use crate::input::Instant;
use crate::operation::Operation;
use crate::persistence::{BoardSnapshot, ChangeDebouncer, DataChangedSink};
use crate::plugins::BoardPlugin;
use crate::selection::{Selection, SelectionPatch};
use crate::tree::{self, NodePath};
use crate::viewport::{ContainerRect, ViewPort};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Interaction mode. Some plugins stand down while an element is being created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateMode {
    #[default]
    Idle,
    /// Creating an element of the given kind.
    Creating(String),
}

impl CreateMode {
    pub fn is_creating(&self) -> bool {
        matches!(self, Self::Creating(_))
    }
}

/// How an apply call is recorded and reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyOptions {
    /// Record content operations for undo.
    pub record_history: bool,
    /// Notify change subscribers.
    pub notify: bool,
    /// Time of the change; defaults to now.
    pub at: Option<Instant>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            record_history: true,
            notify: true,
            at: None,
        }
    }
}

impl ApplyOptions {
    /// Applied and reported, but kept out of history.
    pub fn untracked() -> Self {
        Self {
            record_history: false,
            ..Self::default()
        }
    }

    /// Recorded, but subscribers are not told.
    pub fn silent() -> Self {
        Self {
            notify: false,
            ..Self::default()
        }
    }

    pub fn at(mut self, at: Instant) -> Self {
        self.at = Some(at);
        self
    }
}

/// What one apply call or batch changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardChange {
    /// Operations as applied, in order.
    pub operations: Vec<Operation>,
    pub content_changed: bool,
    pub selection_changed: bool,
    pub view_port_changed: bool,
}

impl BoardChange {
    fn from_operations(operations: Vec<Operation>) -> Self {
        let selection_changed = operations.iter().any(Operation::is_selection);
        let content_changed = operations.iter().any(|op| !op.is_selection());
        Self {
            operations,
            content_changed,
            selection_changed,
            view_port_changed: false,
        }
    }

    pub(crate) fn view_port() -> Self {
        Self {
            view_port_changed: true,
            ..Self::default()
        }
    }

    /// Subtrees removed by this change.
    pub fn removed(&self) -> impl Iterator<Item = &BoardElement> {
        self.operations.iter().filter_map(|op| match op {
            Operation::RemoveNode { node, .. } => Some(node),
            _ => None,
        })
    }

    /// Subtrees inserted by this change.
    pub fn inserted(&self) -> impl Iterator<Item = &BoardElement> {
        self.operations.iter().filter_map(|op| match op {
            Operation::InsertNode { node, .. } => Some(node),
            _ => None,
        })
    }
}

/// Operations applied inside an open batch, with whether each is recorded.
#[derive(Debug, Default)]
struct PendingBatch {
    depth: usize,
    applied: Vec<(Operation, bool)>,
    notify: bool,
    at: Option<Instant>,
}

/// A whiteboard document and its interaction state.
pub struct Board {
    pub(crate) children: Vec<BoardElement>,
    pub(crate) selection: Selection,
    pub(crate) view_port: ViewPort,
    pub(crate) container: ContainerRect,
    pub(crate) config: BoardConfig,
    pub(crate) registry: ElementRegistry,
    pub(crate) plugins: Vec<Box<dyn BoardPlugin>>,
    pub(crate) data_sink: Option<Box<dyn DataChangedSink>>,
    pub(crate) debouncer: ChangeDebouncer,
    create_mode: CreateMode,
    history: History,
    changes: Emitter<BoardChange>,
    batch: Option<PendingBatch>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("Board")
            .field("children", &self.children.len())
            .field("selected", &self.selection.selected_elements.len())
            .field("view_port", &self.view_port)
            .field("create_mode", &self.create_mode)
            .field("plugins", &plugins)
            .finish()
    }
}

impl Board {
    /// Create an empty board with the default config.
    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            children: Vec::new(),
            selection: Selection::default(),
            view_port: ViewPort::default(),
            container: ContainerRect::default(),
            registry: ElementRegistry::default(),
            plugins: Vec::new(),
            data_sink: None,
            debouncer: ChangeDebouncer::new(config.data_changed_debounce),
            create_mode: CreateMode::Idle,
            history: History::new(config.history_merge_window, config.max_history),
            changes: Emitter::new(),
            batch: None,
            config,
        }
    }

    /// Restore a board from persisted state. The viewport size is
    /// recomputed from the container at the restored zoom.
    pub fn from_snapshot(snapshot: BoardSnapshot, config: BoardConfig) -> Self {
        let mut board = Self::with_config(config);
        board.children = snapshot.children;
        board.selection = snapshot.selection;
        board.view_port = snapshot.view_port;
        board.view_port.zoom = board.config.clamp_zoom(board.view_port.zoom);
        board.sync_view_port_size();
        board
    }

    pub fn children(&self) -> &[BoardElement] {
        &self.children
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view_port(&self) -> &ViewPort {
        &self.view_port
    }

    pub fn container(&self) -> &ContainerRect {
        &self.container
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Register element behaviours for custom kinds.
    pub fn registry_mut(&mut self) -> &mut ElementRegistry {
        &mut self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn create_mode(&self) -> &CreateMode {
        &self.create_mode
    }

    pub fn set_create_mode(&mut self, mode: CreateMode) {
        self.create_mode = mode;
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self, handler: impl FnMut(&BoardChange) + 'static) -> Subscription {
        self.changes.subscribe(handler)
    }

    pub(crate) fn notify(&self, change: BoardChange) {
        self.changes.emit(&change);
    }

    // Tree queries

    /// Current path of the element with `id`.
    pub fn path_of(&self, id: &ElementId) -> Option<NodePath> {
        tree::path_of(&self.children, id)
    }

    /// Current path of `element`, matched by id.
    pub fn get_path_by_element(&self, element: &BoardElement) -> Option<NodePath> {
        self.path_of(&element.id)
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&BoardElement> {
        tree::node_at(&self.children, path)
    }

    pub fn find_element(&self, id: &ElementId) -> Option<&BoardElement> {
        tree::find_by_id(&self.children, id)
    }

    /// Parent element and its path. Root-level elements have no parent.
    pub fn parent_of(&self, id: &ElementId) -> BoardResult<(&BoardElement, NodePath)> {
        tree::parent_of(&self.children, id)
    }

    pub fn ancestors(&self, id: &ElementId) -> Vec<&BoardElement> {
        tree::ancestors(&self.children, id)
    }

    /// Pre-order walk over every element.
    pub fn dfs<'a>(&'a self, visit: &mut impl FnMut(&'a BoardElement)) {
        tree::dfs(&self.children, visit)
    }

    /// The element an arrow endpoint is bound to, if it still exists.
    pub fn bound_element(&self, endpoint: Option<&ArrowEndpoint>) -> Option<&BoardElement> {
        resolve_binding(endpoint, |id| self.find_element(id))
    }

    // Mutation

    /// Apply one operation.
    pub fn apply(&mut self, operation: Operation) -> BoardResult<()> {
        self.apply_with(vec![operation], ApplyOptions::default())
    }

    /// Apply operations in order, each seeing the effects of the previous ones.
    pub fn apply_batch(&mut self, operations: Vec<Operation>) -> BoardResult<()> {
        self.apply_with(operations, ApplyOptions::default())
    }

    /// Apply operations with explicit history and notification options.
    ///
    /// Inside an open batch the operations take effect immediately but are
    /// reported when the outermost batch commits.
    pub fn apply_with(&mut self, operations: Vec<Operation>, options: ApplyOptions) -> BoardResult<()> {
        if operations.is_empty() {
            return Ok(());
        }
        log::debug!("Applying {} operation(s)", operations.len());
        let applied: Vec<(Operation, bool)> = self
            .apply_operations(operations)?
            .into_iter()
            .map(|op| (op, options.record_history))
            .collect();
        match self.batch.as_mut() {
            Some(batch) => {
                batch.applied.extend(applied);
                batch.notify |= options.notify;
                if options.at.is_some() {
                    batch.at = options.at;
                }
            }
            None => self.finish(applied, options.notify, options.at),
        }
        Ok(())
    }

    fn apply_operations(&mut self, operations: Vec<Operation>) -> BoardResult<Vec<Operation>> {
        let mut applied = Vec::with_capacity(operations.len());
        for operation in operations {
            match operation.apply(&mut self.children, &mut self.selection) {
                Ok(done) => applied.push(done),
                Err(err) => {
                    log::error!("Rejecting operation batch: {}", err);
                    self.rollback(&applied);
                    return Err(err);
                }
            }
        }
        Ok(applied)
    }

    fn rollback(&mut self, applied: &[Operation]) {
        for operation in applied.iter().rev() {
            if let Err(err) = operation.invert().apply(&mut self.children, &mut self.selection) {
                log::error!("Rollback failed: {}", err);
            }
        }
    }

    fn finish(&mut self, applied: Vec<(Operation, bool)>, notify: bool, at: Option<Instant>) {
        if applied.is_empty() {
            return;
        }
        let now = at.unwrap_or_else(Instant::now);
        let recorded: Vec<Operation> = applied
            .iter()
            .filter(|(op, record)| *record && !op.is_selection())
            .map(|(op, _)| op.clone())
            .collect();
        self.history.record(recorded, now);
        let change = BoardChange::from_operations(applied.into_iter().map(|(op, _)| op).collect());
        if change.content_changed {
            self.debouncer.mark_dirty(now);
        }
        if notify {
            self.notify(change);
        }
    }

    /// Open a batch. Batches nest; only the outermost commit reports.
    pub fn begin_batch(&mut self) {
        self.batch.get_or_insert_with(PendingBatch::default).depth += 1;
    }

    /// Close the innermost open batch.
    pub fn commit(&mut self) {
        let Some(batch) = self.batch.as_mut() else {
            log::warn!("commit() without an open batch");
            return;
        };
        batch.depth -= 1;
        if batch.depth > 0 {
            return;
        }
        if let Some(batch) = self.batch.take() {
            self.finish(batch.applied, batch.notify, batch.at);
        }
    }

    /// Undo everything applied in the open batch (at every nesting level) and close it.
    pub fn abort_batch(&mut self) {
        let Some(batch) = self.batch.take() else {
            return;
        };
        let applied: Vec<Operation> = batch.applied.into_iter().map(|(op, _)| op).collect();
        self.rollback(&applied);
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Run `f` inside a batch. If it fails, everything it applied is rolled back.
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Board) -> BoardResult<R>) -> BoardResult<R> {
        self.begin_batch();
        let mark = self.batch.as_ref().map_or(0, |batch| batch.applied.len());
        match f(self) {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(err) => {
                let undone: Vec<Operation> = match self.batch.as_mut() {
                    Some(batch) => batch.applied.split_off(mark).into_iter().map(|(op, _)| op).collect(),
                    None => Vec::new(),
                };
                self.rollback(&undone);
                self.commit();
                Err(err)
            }
        }
    }

    // History

    pub(crate) fn record_history(&mut self, operations: Vec<Operation>, at: Instant) {
        self.history.record(operations, at);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Revert the newest history entry. Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop_undo() else {
            return false;
        };
        let inverse: Vec<Operation> = entry.iter().rev().map(Operation::invert).collect();
        let result = self.transact(|board| {
            board.apply_with(inverse, ApplyOptions::untracked())?;
            board.refresh_selection()
        });
        match result {
            Ok(()) => {
                self.history.push_redo(entry);
                true
            }
            Err(err) => {
                log::error!("Undo failed: {}", err);
                self.history.push_undo(entry);
                false
            }
        }
    }

    /// Re-apply the newest undone entry. Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.pop_redo() else {
            return false;
        };
        let result = self.transact(|board| {
            board.apply_with(entry.clone(), ApplyOptions::untracked())?;
            board.refresh_selection()
        });
        match result {
            Ok(()) => {
                self.history.push_undo(entry);
                true
            }
            Err(err) => {
                log::error!("Redo failed: {}", err);
                self.history.push_redo(entry);
                false
            }
        }
    }

    // Higher-level edits

    /// Remove elements (and their subtrees) from the tree, clear arrow
    /// bindings that pointed at them, and clear the selection. Elements whose
    /// ancestor is also being removed are skipped. Returns how many subtrees
    /// were removed.
    pub fn remove_elements(&mut self, elements: &[BoardElement]) -> BoardResult<usize> {
        let targets = tree::without_descendants(&self.children, elements);
        self.transact(|board| {
            let mut removed_ids = HashSet::new();
            let mut count = 0;
            for target in &targets {
                // Paths shift as siblings go, so look each one up right before removing it.
                let Some(path) = board.path_of(&target.id) else {
                    log::debug!("Skipping removal of missing element {}", target.id);
                    continue;
                };
                let Some(node) = board.element_at(&path).cloned() else {
                    continue;
                };
                node.for_each_descendant(&mut |el| {
                    removed_ids.insert(el.id.clone());
                });
                board.apply(Operation::remove(path, node))?;
                count += 1;
            }
            board.unbind_arrows(&removed_ids)?;
            board.update_selection(SelectionPatch::cleared())?;
            Ok(count)
        })
    }

    /// Remove everything currently selected.
    pub fn delete_selection(&mut self) -> BoardResult<usize> {
        let selected = self.selection.selected_elements.clone();
        self.remove_elements(&selected)
    }

    /// Clear `bindId`s that point at removed elements.
    fn unbind_arrows(&mut self, removed: &HashSet<ElementId>) -> BoardResult<()> {
        let mut unbound: Vec<(ElementId, Vec<(&'static str, ArrowEndpoint)>)> = Vec::new();
        tree::dfs(&self.children, &mut |node| {
            let mut endpoints = Vec::new();
            for (key, endpoint) in [("source", &node.source), ("target", &node.target)] {
                if let Some(endpoint) = endpoint {
                    if endpoint.bind_id.as_ref().is_some_and(|id| removed.contains(id)) {
                        endpoints.push((key, endpoint.unbound()));
                    }
                }
            }
            if !endpoints.is_empty() {
                unbound.push((node.id.clone(), endpoints));
            }
        });
        for (id, endpoints) in unbound {
            let mut patch = Properties::new();
            for (key, endpoint) in endpoints {
                let value = serde_json::to_value(&endpoint).map_err(|source| BoardError::InvalidProperty {
                    key: key.to_string(),
                    source,
                })?;
                patch.insert(key.to_string(), value);
            }
            let Some(path) = self.path_of(&id) else {
                continue;
            };
            log::debug!("Unbinding {} from removed elements", id);
            self.apply(Operation::SetNode {
                path,
                properties: Properties::new(),
                new_properties: patch,
            })?;
        }
        Ok(())
    }

    /// Resize an element by dragging one of its handles.
    ///
    /// `original` is the element's box when the drag started, so repeated
    /// calls during one drag don't compound. An SVG path in the element's
    /// `d` property is rescaled to match.
    pub fn resize_element(
        &mut self,
        id: &ElementId,
        original: BBox,
        handle: HandlePosition,
        anchor: Point,
        focus: Point,
        preserve_ratio: bool,
    ) -> BoardResult<BBox> {
        let path = self.path_of(id).ok_or_else(|| BoardError::ElementNotFound(id.clone()))?;
        let element = self
            .element_at(&path)
            .ok_or_else(|| BoardError::InvalidPath(path.clone()))?;
        let resized = get_resized_bbox(&original, handle, anchor, focus, preserve_ratio);

        let mut patch = Properties::new();
        patch.insert("x".into(), Value::from(resized.x));
        patch.insert("y".into(), Value::from(resized.y));
        patch.insert("width".into(), Value::from(resized.width));
        patch.insert("height".into(), Value::from(resized.height));
        if let (Some(Value::String(d)), Some(width), Some(height)) =
            (element.extra.get("d"), element.width, element.height)
        {
            if width > 0.0 && height > 0.0 {
                let scaled = transform_path(d, resized.width / width, resized.height / height);
                patch.insert("d".into(), Value::String(scaled));
            }
        }
        let operation = Operation::set_node(element, path, patch)?;
        self.apply(operation)?;
        Ok(resized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ARROW_KIND, ArrowEndpoint};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn mind(id: &str) -> BoardElement {
        BoardElement::with_id(id, "mind-node").with_bounds(0.0, 0.0, 100.0, 30.0)
    }

    fn counting(board: &Board) -> (Rc<RefCell<Vec<BoardChange>>>, Subscription) {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        let subscription = board.subscribe(move |change| sink.borrow_mut().push(change.clone()));
        (changes, subscription)
    }

    #[test]
    fn test_insert_into_empty_board() {
        let mut board = Board::new();
        board.apply(Operation::insert(vec![0], mind("n1"))).unwrap();
        assert_eq!(board.children().len(), 1);
        assert_eq!(board.children()[0].id.as_str(), "n1");
    }

    #[test]
    fn test_batch_notifies_once() {
        let mut board = Board::new();
        let (changes, _subscription) = counting(&board);
        board
            .apply_batch(vec![
                Operation::insert(vec![0], mind("a")),
                Operation::insert(vec![1], mind("b")),
                Operation::set_selection(&Selection::default(), SelectionPatch::new().selected(vec![mind("a")])),
            ])
            .unwrap();
        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].operations.len(), 3);
        assert!(changes[0].content_changed);
        assert!(changes[0].selection_changed);
    }

    #[test]
    fn test_batch_ops_see_previous_effects() {
        let mut board = Board::new();
        board
            .apply_batch(vec![Operation::insert(vec![0], mind("x")), Operation::insert(vec![1], mind("y"))])
            .unwrap();
        board
            .apply_batch(vec![
                Operation::insert(vec![2], mind("a")),
                Operation::remove(vec![2], mind("a")),
            ])
            .unwrap();
        let ids: Vec<&str> = board.children().iter().map(|el| el.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn test_failed_batch_rolls_back_without_notifying() {
        let mut board = Board::new();
        board.apply(Operation::insert(vec![0], mind("a"))).unwrap();
        let before = board.snapshot();
        let (changes, _subscription) = counting(&board);
        let err = board
            .apply_batch(vec![
                Operation::insert(vec![1], mind("b")),
                Operation::remove(vec![0], mind("a")),
                Operation::remove(vec![7], mind("zz")),
            ])
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidPath(_)));
        assert_eq!(board.snapshot(), before);
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_explicit_batch_defers_notification() {
        let mut board = Board::new();
        let (changes, _subscription) = counting(&board);
        board.begin_batch();
        board.apply(Operation::insert(vec![0], mind("a"))).unwrap();
        board.begin_batch();
        board.apply(Operation::insert(vec![1], mind("b"))).unwrap();
        board.commit();
        assert!(changes.borrow().is_empty());
        board.commit();
        assert_eq!(changes.borrow().len(), 1);
        assert_eq!(changes.borrow()[0].operations.len(), 2);
        assert_eq!(board.history().undo_len(), 1);
    }

    #[test]
    fn test_transact_rolls_back_on_error() {
        let mut board = Board::new();
        board.apply(Operation::insert(vec![0], mind("a"))).unwrap();
        let before = board.snapshot();
        let result: BoardResult<()> = board.transact(|board| {
            board.apply(Operation::insert(vec![1], mind("b")))?;
            Err(BoardError::ElementNotFound("nope".into()))
        });
        assert!(result.is_err());
        assert_eq!(board.snapshot(), before);
        assert!(!board.in_batch());
    }

    #[test]
    fn test_silent_apply_skips_notification() {
        let mut board = Board::new();
        let (changes, _subscription) = counting(&board);
        board
            .apply_with(vec![Operation::insert(vec![0], mind("a"))], ApplyOptions::silent())
            .unwrap();
        assert!(changes.borrow().is_empty());
        assert!(board.can_undo());
    }

    #[test]
    fn test_undo_redo() {
        let mut board = Board::new();
        let start = Instant::now();
        board
            .apply_with(vec![Operation::insert(vec![0], mind("a"))], ApplyOptions::default().at(start))
            .unwrap();
        let mut patch = Properties::new();
        patch.insert("x".into(), json!(50.0));
        let op = Operation::set_node(&board.children()[0], vec![0], patch).unwrap();
        board
            .apply_with(vec![op], ApplyOptions::default().at(start + Duration::from_secs(5)))
            .unwrap();
        assert_eq!(board.history().undo_len(), 2);

        assert!(board.undo());
        assert_eq!(board.children()[0].x, Some(0.0));
        assert!(board.undo());
        assert!(board.children().is_empty());
        assert!(!board.undo());

        assert!(board.redo());
        assert!(board.redo());
        assert_eq!(board.children()[0].x, Some(50.0));
        assert!(!board.redo());
    }

    #[test]
    fn test_undo_drops_selection_of_removed_elements() {
        let mut board = Board::new();
        board.apply(Operation::insert(vec![0], mind("a"))).unwrap();
        board.select_all().unwrap();
        assert!(board.undo());
        assert!(board.children().is_empty());
        assert!(board.selection().is_empty());
    }

    #[test]
    fn test_selection_only_batches_are_not_recorded() {
        let mut board = Board::new();
        board.apply(Operation::insert(vec![0], mind("a"))).unwrap();
        board.history.clear();
        board
            .apply(Operation::set_selection(
                board.selection(),
                SelectionPatch::new().selected(vec![mind("a")]),
            ))
            .unwrap();
        assert!(!board.can_undo());
    }

    #[test]
    fn test_delete_two_selected_elements() {
        let mut board = Board::new();
        board
            .apply_batch(vec![
                Operation::insert(vec![0], mind("a")),
                Operation::insert(vec![1], mind("b")),
                Operation::insert(vec![2], mind("c")),
            ])
            .unwrap();
        let selected = vec![board.children()[0].clone(), board.children()[2].clone()];
        board.update_selection(SelectionPatch::new().selected(selected)).unwrap();
        let (changes, _subscription) = counting(&board);

        assert_eq!(board.delete_selection().unwrap(), 2);
        let ids: Vec<&str> = board.children().iter().map(|el| el.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert!(board.selection().is_empty());
        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].removed().count(), 2);
    }

    #[test]
    fn test_delete_parent_and_child_together() {
        let mut board = Board::new();
        let parent = mind("p").with_children(vec![mind("c")]);
        board.apply(Operation::insert(vec![0], parent)).unwrap();
        let child = board.find_element(&"c".into()).unwrap().clone();
        let parent = board.find_element(&"p".into()).unwrap().clone();
        board.history.break_merge();
        assert_eq!(board.remove_elements(&[child, parent]).unwrap(), 1);
        assert!(board.children().is_empty());
        assert!(board.undo());
        assert_eq!(board.children()[0].children.len(), 1);
    }

    #[test]
    fn test_delete_clears_dangling_bindings() {
        let mut board = Board::new();
        let mut source = ArrowEndpoint::bound_to("a");
        source.connect_id = Some("right".into());
        source.extra.insert("marker".into(), json!("arrow"));
        let arrow = BoardElement::with_id("arrow", ARROW_KIND)
            .with_points(vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0)])
            .with_endpoints(source.clone(), ArrowEndpoint::bound_to("b"));
        board
            .apply_batch(vec![
                Operation::insert(vec![0], mind("a")),
                Operation::insert(vec![1], mind("b")),
                Operation::insert(vec![2], arrow),
            ])
            .unwrap();
        let a = board.children()[0].clone();
        board.history.break_merge();
        board.remove_elements(&[a]).unwrap();
        let arrow = board.find_element(&"arrow".into()).unwrap();
        let unbound = arrow.source.clone().unwrap();
        assert_eq!(unbound.bind_id, None);
        assert_eq!(unbound.connect_id, None);
        assert_eq!(unbound.extra.get("marker"), Some(&json!("arrow")));
        assert_eq!(arrow.target, Some(ArrowEndpoint::bound_to("b")));
        assert!(board.bound_element(arrow.source.as_ref()).is_none());
        assert_eq!(board.bound_element(arrow.target.as_ref()).map(|el| el.id.as_str()), Some("b"));

        assert!(board.undo());
        let arrow = board.find_element(&"arrow".into()).unwrap();
        assert_eq!(arrow.source, Some(source));
        assert_eq!(board.children().len(), 3);
    }

    #[test]
    fn test_resize_element() {
        let mut board = Board::new();
        let shape = BoardElement::with_id("g", "geometry")
            .with_bounds(0.0, 0.0, 100.0, 100.0)
            .with_property("d", json!("M0 0 L100 100"));
        board.apply(Operation::insert(vec![0], shape)).unwrap();
        let original = board.children()[0].bbox().unwrap();
        let resized = board
            .resize_element(
                &"g".into(),
                original,
                HandlePosition::East,
                Point::new(0.0, 0.0),
                Point::new(-150.0, 0.0),
                false,
            )
            .unwrap();
        assert_eq!(resized, BBox::new(-50.0, 0.0, 50.0, 100.0));
        let element = &board.children()[0];
        assert_eq!(element.x, Some(-50.0));
        assert_eq!(element.width, Some(50.0));
        assert_eq!(element.extra["d"], json!("M 0 0 L 50 100"));
    }

    #[test]
    fn test_parent_lookup() {
        let mut board = Board::new();
        board
            .apply(Operation::insert(vec![0], mind("p").with_children(vec![mind("c")])))
            .unwrap();
        let (parent, path) = board.parent_of(&"c".into()).unwrap();
        assert_eq!(parent.id.as_str(), "p");
        assert_eq!(path, vec![0]);
        assert!(matches!(board.parent_of(&"p".into()), Err(BoardError::NoParent(_))));
    }

    #[test]
    fn test_from_snapshot() {
        let snapshot = BoardSnapshot {
            children: vec![mind("a")],
            selection: Selection::default(),
            view_port: ViewPort {
                min_x: 10.0,
                min_y: 20.0,
                width: 0.0,
                height: 0.0,
                zoom: 2.0,
            },
        };
        let board = Board::from_snapshot(snapshot, BoardConfig::default());
        assert_eq!(board.children().len(), 1);
        assert!((board.view_port().width - 400.0).abs() < f64::EPSILON);
        assert!(!board.can_undo());
    }
}
