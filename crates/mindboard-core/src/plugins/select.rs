//! Click and marquee selection, select-all and delete.

use super::{BoardPlugin, Flow};
use crate::board::Board;
use crate::element::BoardElement;
use crate::input::{KeyEvent, MouseButton, PointerEvent};
use crate::selection::{SelectArea, SelectionPatch};
use kurbo::Point;

/// Selects elements by clicking or dragging a marquee.
///
/// A press records the start point and the elements under it. Moving past
/// the drag threshold turns a press on empty space into a marquee that
/// reselects on every move. The global release commits: a click without a
/// drag selects the topmost hit element (ctrl/meta toggles it instead),
/// anything else keeps the marquee result.
#[derive(Debug, Default)]
pub struct SelectPlugin {
    start: Option<Point>,
    hits: Vec<BoardElement>,
    dragged: bool,
}

impl SelectPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.start = None;
        self.hits.clear();
        self.dragged = false;
    }
}

impl BoardPlugin for SelectPlugin {
    fn name(&self) -> &str {
        "select"
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        self.reset();
        if board.create_mode().is_creating() || event.button == MouseButton::Right {
            return Flow::Continue;
        }
        let start = board.screen_to_view_port(event.position);
        self.hits = board.get_hit_elements(start).into_iter().cloned().collect();
        self.start = Some(start);
        Flow::Continue
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        let Some(start) = self.start else {
            return Flow::Continue;
        };
        let end = board.screen_to_view_port(event.position);
        if !self.dragged {
            let threshold = board.config().drag_threshold;
            if (end - start).hypot() <= threshold {
                return Flow::Continue;
            }
            self.dragged = true;
        }
        if !self.hits.is_empty() {
            // Dragging an element; that's the move plugin's job.
            return Flow::Continue;
        }
        let area = SelectArea::new(start, end);
        let selected: Vec<BoardElement> = board.elements_in_area(&area).into_iter().cloned().collect();
        if let Err(err) = board.update_selection(SelectionPatch::new().selected(selected).area(Some(area))) {
            log::error!("Marquee selection failed: {}", err);
        }
        Flow::Continue
    }

    fn on_global_pointer_up(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        if self.start.is_none() {
            return Flow::Continue;
        }
        let mut selected = board.selection().selected_elements.clone();
        if !self.dragged {
            match self.hits.last() {
                Some(clicked) if event.modifiers.command() => {
                    match selected.iter().position(|el| el.id == clicked.id) {
                        Some(index) => {
                            selected.remove(index);
                        }
                        None => selected.push(clicked.clone()),
                    }
                }
                Some(clicked) => selected = vec![clicked.clone()],
                None => selected.clear(),
            }
        }
        if let Err(err) = board.update_selection(SelectionPatch::new().selected(selected).area(None)) {
            log::error!("Committing selection failed: {}", err);
        }
        self.reset();
        Flow::Continue
    }

    fn on_key_down(&mut self, event: &mut KeyEvent, board: &mut Board) -> Flow {
        if event.is_hotkey("mod+a") {
            event.prevent_default();
            if let Err(err) = board.select_all() {
                log::error!("Select all failed: {}", err);
            }
            return Flow::Continue;
        }
        if (event.is_hotkey("delete") || event.is_hotkey("backspace")) && !board.selection().is_empty() {
            event.prevent_default();
            match board.delete_selection() {
                Ok(count) => log::debug!("Deleted {} element(s)", count),
                Err(err) => log::error!("Delete failed: {}", err),
            }
        }
        Flow::Continue
    }
}
