//! Plugin dispatch.
//!
//! A board owns an ordered list of plugins. Every input event is offered to
//! each plugin in registration order until one returns [`Flow::Stop`].
//! Plugins receive the board by exclusive reference for the duration of one
//! handler call and never keep it.

mod clipboard;
mod history;
mod moving;
mod select;
mod viewport;

pub use clipboard::ClipboardPlugin;
pub use history::HistoryPlugin;
pub use moving::MovePlugin;
pub use select::SelectPlugin;
pub use viewport::ViewPortPlugin;

use crate::board::Board;
use crate::input::{ClipboardEvent, ContextMenuEvent, KeyEvent, PointerEvent, WheelEvent};

/// Whether dispatch continues to later plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    /// The event was consumed; later plugins don't see it.
    Stop,
}

/// Handles board input. Every handler is optional and continues by default.
pub trait BoardPlugin {
    /// Unique name. Registering a plugin with a taken name replaces the old one.
    fn name(&self) -> &str;

    fn on_pointer_down(&mut self, _event: &PointerEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    fn on_pointer_move(&mut self, _event: &PointerEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    /// Pointer release anywhere in the host, not just over the board.
    fn on_global_pointer_up(&mut self, _event: &PointerEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    fn on_key_down(&mut self, _event: &mut KeyEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    fn on_wheel(&mut self, _event: &mut WheelEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    fn on_context_menu(&mut self, _event: &mut ContextMenuEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    fn on_copy(&mut self, _event: &mut ClipboardEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    fn on_cut(&mut self, _event: &mut ClipboardEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }

    fn on_paste(&mut self, _event: &mut ClipboardEvent, _board: &mut Board) -> Flow {
        Flow::Continue
    }
}

/// Call `handler` on each item in order, stopping at the first [`Flow::Stop`].
pub fn execute_sequence<T: ?Sized>(items: &mut [Box<T>], mut handler: impl FnMut(&mut T) -> Flow) -> Flow {
    for item in items.iter_mut() {
        if handler(item.as_mut()) == Flow::Stop {
            return Flow::Stop;
        }
    }
    Flow::Continue
}

impl Board {
    /// Register a plugin after the existing ones, replacing any with the same name.
    pub fn add_plugin(&mut self, plugin: impl BoardPlugin + 'static) {
        self.insert_plugin(Box::new(plugin));
    }

    fn insert_plugin(&mut self, plugin: Box<dyn BoardPlugin>) {
        match self.plugins.iter().position(|p| p.name() == plugin.name()) {
            Some(index) => {
                log::debug!("Replacing plugin {}", plugin.name());
                self.plugins[index] = plugin;
            }
            None => self.plugins.push(plugin),
        }
    }

    /// Remove a plugin by name. Returns whether one was registered.
    pub fn remove_plugin(&mut self, name: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name() != name);
        self.plugins.len() != before
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Register the standard interaction plugins: viewport, select, move,
    /// clipboard and history, in that order.
    pub fn install_default_plugins(&mut self) {
        self.add_plugin(ViewPortPlugin::new());
        self.add_plugin(SelectPlugin::new());
        self.add_plugin(MovePlugin::new());
        self.add_plugin(ClipboardPlugin::new());
        self.add_plugin(HistoryPlugin::new());
    }

    /// Offer an event to every plugin in order.
    ///
    /// The plugin list is taken out of the board while handlers run, so
    /// plugins registered from inside a handler are appended afterwards.
    fn dispatch(&mut self, mut handler: impl FnMut(&mut dyn BoardPlugin, &mut Board) -> Flow) -> Flow {
        let mut plugins = std::mem::take(&mut self.plugins);
        let flow = execute_sequence(&mut plugins, |plugin| handler(plugin, self));
        let added = std::mem::replace(&mut self.plugins, plugins);
        for plugin in added {
            self.insert_plugin(plugin);
        }
        flow
    }

    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_pointer_down(event, board))
    }

    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_pointer_move(event, board))
    }

    pub fn on_global_pointer_up(&mut self, event: &PointerEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_global_pointer_up(event, board))
    }

    pub fn on_key_down(&mut self, event: &mut KeyEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_key_down(&mut *event, board))
    }

    pub fn on_wheel(&mut self, event: &mut WheelEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_wheel(&mut *event, board))
    }

    pub fn on_context_menu(&mut self, event: &mut ContextMenuEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_context_menu(&mut *event, board))
    }

    pub fn on_copy(&mut self, event: &mut ClipboardEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_copy(&mut *event, board))
    }

    pub fn on_cut(&mut self, event: &mut ClipboardEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_cut(&mut *event, board))
    }

    pub fn on_paste(&mut self, event: &mut ClipboardEvent) -> Flow {
        self.dispatch(|plugin, board| plugin.on_paste(&mut *event, board))
    }
}
