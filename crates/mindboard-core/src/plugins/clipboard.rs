//! Copy, cut and paste through host clipboard events.

use super::{BoardPlugin, Flow};
use crate::board::Board;
use crate::clipboard::{CLIPBOARD_MIME, ClipboardPayload};
use crate::error::ClipboardError;
use crate::input::ClipboardEvent;

/// Writes the selection to the clipboard and pastes payloads from it.
///
/// Paste events without a payload from this crate are left to later
/// plugins and to the host.
#[derive(Debug, Default)]
pub struct ClipboardPlugin;

impl ClipboardPlugin {
    pub fn new() -> Self {
        Self
    }
}

fn write_payload(event: &mut ClipboardEvent, payload: &ClipboardPayload) {
    match payload.to_json() {
        Ok(json) => {
            event.set_data(CLIPBOARD_MIME, json);
            event.prevent_default();
        }
        Err(err) => log::error!("Serializing clipboard payload failed: {}", err),
    }
}

impl BoardPlugin for ClipboardPlugin {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn on_copy(&mut self, event: &mut ClipboardEvent, board: &mut Board) -> Flow {
        if let Some(payload) = board.copy_selection() {
            write_payload(event, &payload);
        }
        Flow::Continue
    }

    fn on_cut(&mut self, event: &mut ClipboardEvent, board: &mut Board) -> Flow {
        match board.cut_selection() {
            Ok(Some(payload)) => write_payload(event, &payload),
            Ok(None) => {}
            Err(err) => log::error!("Cut failed: {}", err),
        }
        Flow::Continue
    }

    fn on_paste(&mut self, event: &mut ClipboardEvent, board: &mut Board) -> Flow {
        let payload = match ClipboardPayload::from_clipboard(event) {
            Ok(payload) => payload,
            Err(ClipboardError::MissingPayload) => return Flow::Continue,
            Err(err) => {
                log::warn!("Ignoring clipboard contents: {}", err);
                return Flow::Continue;
            }
        };
        event.prevent_default();
        match board.paste_elements(payload.elements) {
            Ok(pasted) => log::debug!("Paste inserted {} element(s)", pasted.len()),
            Err(err) => log::error!("Paste failed: {}", err),
        }
        Flow::Stop
    }
}
