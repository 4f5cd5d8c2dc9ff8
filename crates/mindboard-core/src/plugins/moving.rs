//! Drag-to-move for selected or hit elements.

use super::{BoardPlugin, Flow};
use crate::board::{ApplyOptions, Board};
use crate::element::BoardElement;
use crate::error::BoardResult;
use crate::input::{KeyEvent, MouseButton, PointerEvent};
use crate::operation::Operation;
use crate::selection::SelectionPatch;
use crate::tree;
use kurbo::Point;

const KEY_MOVE_STEP: f64 = 5.0;
const KEY_MOVE_FINE_STEP: f64 = 1.0;

/// Moves elements by dragging them.
///
/// Intermediate positions are applied without recording history. On release
/// a single entry from the original to the final geometry is recorded, so
/// one drag undoes in one step. Arrow keys nudge the selection.
#[derive(Debug, Default)]
pub struct MovePlugin {
    start: Option<Point>,
    /// Moving elements as they were when the press started.
    originals: Vec<BoardElement>,
    moved: bool,
}

impl MovePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.start = None;
        self.originals.clear();
        self.moved = false;
    }

    fn translated_operations(&self, board: &Board, dx: f64, dy: f64) -> BoardResult<Vec<Operation>> {
        translate_operations(board, &self.originals, dx, dy)
    }
}

/// `SetNode` operations moving each of `originals` (and its subtree) by `dx, dy`.
fn translate_operations(board: &Board, originals: &[BoardElement], dx: f64, dy: f64) -> BoardResult<Vec<Operation>> {
    let mut operations = Vec::with_capacity(originals.len());
    for original in originals {
        let Some(path) = board.path_of(&original.id) else {
            log::warn!("Moving element {} is gone", original.id);
            continue;
        };
        let Some(current) = board.element_at(&path) else {
            continue;
        };
        let mut target = original.clone();
        board.registry().translate_tree(&mut target, dx, dy);
        operations.push(Operation::set_node(current, path, target.geometry_properties()?)?);
    }
    Ok(operations)
}

impl BoardPlugin for MovePlugin {
    fn name(&self) -> &str {
        "move"
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        self.reset();
        // ctrl/meta clicks toggle selection instead.
        if board.create_mode().is_creating() || event.button != MouseButton::Left || event.modifiers.command() {
            return Flow::Continue;
        }
        let start = board.screen_to_view_port(event.position);
        let hits = board.get_hit_elements(start);
        let Some(top) = hits.last() else {
            return Flow::Continue;
        };
        let targets: Vec<BoardElement> = if hits.iter().any(|el| board.is_selected(&el.id)) {
            board
                .selection()
                .selected_elements
                .iter()
                .filter_map(|el| board.find_element(&el.id).cloned())
                .collect()
        } else {
            vec![(*top).clone()]
        };
        self.originals = tree::without_descendants(board.children(), &targets);
        self.start = Some(start);
        if let Err(err) = board.clear_selection() {
            log::error!("Clearing selection before move failed: {}", err);
        }
        Flow::Continue
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        let Some(start) = self.start else {
            return Flow::Continue;
        };
        let end = board.screen_to_view_port(event.position);
        let (dx, dy) = (end.x - start.x, end.y - start.y);
        if !self.moved {
            let threshold = board.config().drag_threshold;
            if dx.hypot(dy) <= threshold {
                return Flow::Continue;
            }
            self.moved = true;
        }
        let applied = self
            .translated_operations(board, dx, dy)
            .and_then(|operations| board.apply_with(operations, ApplyOptions::untracked()));
        if let Err(err) = applied {
            log::error!("Moving elements failed: {}", err);
        }
        Flow::Continue
    }

    fn on_global_pointer_up(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        if !self.moved {
            self.reset();
            return Flow::Continue;
        }
        let mut moved = Vec::with_capacity(self.originals.len());
        let mut operations = Vec::with_capacity(self.originals.len());
        for original in &self.originals {
            let Some(path) = board.path_of(&original.id) else {
                continue;
            };
            let Some(current) = board.element_at(&path) else {
                continue;
            };
            match (original.geometry_properties(), current.geometry_properties()) {
                (Ok(properties), Ok(new_properties)) => operations.push(Operation::SetNode {
                    path,
                    properties,
                    new_properties,
                }),
                (Err(err), _) | (_, Err(err)) => {
                    log::error!("Recording move of {} failed: {}", original.id, err);
                    continue;
                }
            }
            moved.push(current.clone());
        }
        log::debug!("Moved {} element(s)", moved.len());
        board.record_history(operations, event.timestamp);
        if let Err(err) = board.update_selection(SelectionPatch::new().selected(moved)) {
            log::error!("Selecting moved elements failed: {}", err);
        }
        self.reset();
        Flow::Continue
    }

    fn on_key_down(&mut self, event: &mut KeyEvent, board: &mut Board) -> Flow {
        if board.selection().is_empty() || event.modifiers.command() || event.modifiers.shift {
            return Flow::Continue;
        }
        let step = if event.modifiers.alt { KEY_MOVE_FINE_STEP } else { KEY_MOVE_STEP };
        let (dx, dy) = match event.key.as_str() {
            "ArrowLeft" => (-step, 0.0),
            "ArrowRight" => (step, 0.0),
            "ArrowUp" => (0.0, -step),
            "ArrowDown" => (0.0, step),
            _ => return Flow::Continue,
        };
        event.prevent_default();
        let selected: Vec<BoardElement> = board
            .selection()
            .selected_elements
            .iter()
            .filter_map(|el| board.find_element(&el.id).cloned())
            .collect();
        let targets = tree::without_descendants(board.children(), &selected);
        let applied = translate_operations(board, &targets, dx, dy)
            .and_then(|operations| board.apply_with(operations, ApplyOptions::default().at(event.timestamp)));
        if let Err(err) = applied {
            log::error!("Nudging selection failed: {}", err);
            return Flow::Stop;
        }
        let moved: Vec<BoardElement> = selected
            .iter()
            .filter_map(|el| board.find_element(&el.id).cloned())
            .collect();
        if let Err(err) = board.update_selection(SelectionPatch::new().selected(moved)) {
            log::error!("Selecting moved elements failed: {}", err);
        }
        Flow::Stop
    }
}
