//! Undo and redo hotkeys.

use super::{BoardPlugin, Flow};
use crate::board::Board;
use crate::input::KeyEvent;

/// `mod+z` undoes; `mod+shift+z` and `mod+y` redo.
#[derive(Debug, Default)]
pub struct HistoryPlugin;

impl HistoryPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl BoardPlugin for HistoryPlugin {
    fn name(&self) -> &str {
        "history"
    }

    fn on_key_down(&mut self, event: &mut KeyEvent, board: &mut Board) -> Flow {
        if event.is_hotkey("mod+z") {
            event.prevent_default();
            if !board.undo() {
                log::debug!("Nothing to undo");
            }
        } else if event.is_hotkey("mod+shift+z") || event.is_hotkey("mod+y") {
            event.prevent_default();
            if !board.redo() {
                log::debug!("Nothing to redo");
            }
        }
        Flow::Continue
    }
}
