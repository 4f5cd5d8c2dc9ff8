//! Pan and zoom from mouse, wheel and keyboard.

use super::{BoardPlugin, Flow};
use crate::board::Board;
use crate::input::{ContextMenuEvent, Instant, KeyEvent, MouseButton, PointerEvent, WheelEvent};
use kurbo::{Point, Vec2};

/// Wheel deltas below this are treated as touchpad input.
const TOUCHPAD_DELTA: f64 = 10.0;
const TOUCHPAD_SCALE: f64 = 10.0;
const MOUSE_SCALE_X: f64 = 3.0;
const MOUSE_SCALE_Y: f64 = 2.0;
/// World units per arrow-key press; alt uses the fine step.
const KEY_PAN_STEP: f64 = 5.0;
const KEY_PAN_FINE_STEP: f64 = 1.0;

/// Right-drag and wheel panning, ctrl+wheel and keyboard zoom.
#[derive(Debug, Default)]
pub struct ViewPortPlugin {
    /// Screen point where the right-drag started and the origin at that time.
    pan_origin: Option<(Point, Point)>,
    last_pan: Option<Instant>,
    last_wheel: Option<Instant>,
}

impl ViewPortPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

fn throttled(last: &mut Option<Instant>, now: Instant, interval: std::time::Duration) -> bool {
    if let Some(previous) = *last {
        if now.duration_since(previous) < interval {
            return true;
        }
    }
    *last = Some(now);
    false
}

fn scale_wheel_delta(delta: f64, mouse_scale: f64) -> f64 {
    if delta.abs() < TOUCHPAD_DELTA {
        delta * TOUCHPAD_SCALE
    } else {
        delta * mouse_scale
    }
}

impl BoardPlugin for ViewPortPlugin {
    fn name(&self) -> &str {
        "viewport"
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        self.pan_origin = None;
        if event.button == MouseButton::Right {
            let view_port = board.view_port();
            self.pan_origin = Some((event.position, Point::new(view_port.min_x, view_port.min_y)));
            self.last_pan = None;
        }
        Flow::Continue
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, board: &mut Board) -> Flow {
        let Some((start, origin)) = self.pan_origin else {
            return Flow::Continue;
        };
        if throttled(&mut self.last_pan, event.timestamp, board.config().pan_throttle) {
            return Flow::Continue;
        }
        let zoom = board.view_port().zoom;
        let delta = start - event.position;
        board.move_view_port(origin.x + delta.x / zoom, origin.y + delta.y / zoom);
        Flow::Continue
    }

    fn on_global_pointer_up(&mut self, _event: &PointerEvent, _board: &mut Board) -> Flow {
        self.pan_origin = None;
        Flow::Continue
    }

    fn on_context_menu(&mut self, event: &mut ContextMenuEvent, _board: &mut Board) -> Flow {
        event.prevent_default();
        Flow::Continue
    }

    fn on_wheel(&mut self, event: &mut WheelEvent, board: &mut Board) -> Flow {
        if board.create_mode().is_creating() || !board.container().contains(event.position) {
            return Flow::Continue;
        }
        event.prevent_default();
        // Horizontal-only ctrl+wheel has no zoom direction.
        if event.modifiers.ctrl && event.delta.y == 0.0 {
            return Flow::Continue;
        }
        if throttled(&mut self.last_wheel, event.timestamp, board.config().wheel_throttle) {
            return Flow::Continue;
        }
        if event.modifiers.ctrl {
            let anchor = board.container().relative(event.position);
            let step = board.config().zoom_step;
            let factor = if event.delta.y < 0.0 { step } else { 1.0 / step };
            board.zoom_by(factor, Some(anchor));
        } else {
            let delta = Vec2::new(
                scale_wheel_delta(event.delta.x, MOUSE_SCALE_X),
                scale_wheel_delta(event.delta.y, MOUSE_SCALE_Y),
            );
            board.pan_by_screen(delta);
        }
        Flow::Continue
    }

    fn on_key_down(&mut self, event: &mut KeyEvent, board: &mut Board) -> Flow {
        let step = board.config().zoom_step;
        if event.is_hotkey("mod+=") || event.is_hotkey("mod++") {
            event.prevent_default();
            board.zoom_by(step, None);
            return Flow::Continue;
        }
        if event.is_hotkey("mod+-") {
            event.prevent_default();
            board.zoom_by(1.0 / step, None);
            return Flow::Continue;
        }
        if event.is_hotkey("mod+o") {
            event.prevent_default();
            let padding = board.config().fit_padding;
            if board.selection().is_empty() {
                board.fit_all_elements(padding, None);
            } else {
                let selected = board.selection().selected_elements.clone();
                board.fit_all_elements(padding, Some(&selected));
            }
            return Flow::Continue;
        }
        if !board.selection().is_empty() || event.modifiers.command() || event.modifiers.shift {
            return Flow::Continue;
        }
        let distance = if event.modifiers.alt { KEY_PAN_FINE_STEP } else { KEY_PAN_STEP };
        let (dx, dy) = match event.key.as_str() {
            "ArrowLeft" => (-distance, 0.0),
            "ArrowRight" => (distance, 0.0),
            "ArrowUp" => (0.0, -distance),
            "ArrowDown" => (0.0, distance),
            _ => return Flow::Continue,
        };
        event.prevent_default();
        let view_port = *board.view_port();
        board.move_view_port(view_port.min_x + dx, view_port.min_y + dy);
        Flow::Continue
    }
}
