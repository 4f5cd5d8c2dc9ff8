//! MindBoard Core Library
//!
//! Platform-agnostic engine for the MindBoard whiteboard: the element tree,
//! path-addressed operations with undo, selection and hit-testing, the
//! viewport transform, plugin-based input handling and clipboard support.
//! Rendering is left to the host.

pub mod board;
pub mod clipboard;
pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;
pub mod input;
pub mod operation;
pub mod persistence;
pub mod plugins;
pub mod selection;
pub mod tree;
pub mod viewport;

pub use board::{ApplyOptions, Board, BoardChange, CreateMode};
pub use clipboard::{CLIPBOARD_MIME, CLIPBOARD_SOURCE, ClipboardPayload};
pub use config::BoardConfig;
pub use element::{ARROW_KIND, ArrowEndpoint, BoardElement, ElementBehavior, ElementId, ElementRegistry, Properties};
pub use error::{BoardError, BoardResult, ClipboardError};
pub use events::{Emitter, GlobalPointerBus, Subscription, attach_global_pointer_up};
pub use geometry::{BBox, HandlePosition, get_resized_bbox, is_rect_intersect, transform_path};
pub use history::History;
pub use input::{ClipboardEvent, ContextMenuEvent, KeyEvent, Modifiers, MouseButton, PointerEvent, WheelEvent};
pub use operation::Operation;
pub use persistence::{BoardSnapshot, DataChangedSink};
pub use plugins::{BoardPlugin, Flow};
pub use selection::{SelectArea, Selection, SelectionPatch};
pub use tree::NodePath;
pub use viewport::{ContainerRect, ViewPort};

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn interactive_board() -> Board {
        init_logging();
        let mut board = Board::new();
        board.install_default_plugins();
        board
    }

    fn click(board: &mut Board, x: f64, y: f64, modifiers: Modifiers) {
        let event = PointerEvent::new(Point::new(x, y), MouseButton::Left).with_modifiers(modifiers);
        board.on_pointer_down(&event);
        board.on_global_pointer_up(&event);
    }

    #[test]
    fn test_default_plugin_order() {
        let board = interactive_board();
        assert_eq!(board.plugin_names(), vec!["viewport", "select", "move", "clipboard", "history"]);
    }

    #[test]
    fn test_click_select_then_delete_key() {
        let mut board = interactive_board();
        board
            .apply_with(
                vec![
                    Operation::insert(vec![0], BoardElement::with_id("a", "geometry").with_bounds(0.0, 0.0, 100.0, 100.0)),
                    Operation::insert(vec![1], BoardElement::with_id("b", "geometry").with_bounds(200.0, 0.0, 100.0, 100.0)),
                ],
                ApplyOptions::untracked(),
            )
            .unwrap();

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        let _subscription = board.subscribe(move |change: &BoardChange| sink.borrow_mut().push(change.clone()));

        click(&mut board, 50.0, 50.0, Modifiers::default());
        let ctrl = Modifiers { ctrl: true, ..Default::default() };
        click(&mut board, 250.0, 50.0, ctrl);
        assert_eq!(board.selection().ids(), vec![ElementId::from("a"), ElementId::from("b")]);

        changes.borrow_mut().clear();
        let mut delete = KeyEvent::new("Delete");
        board.on_key_down(&mut delete);
        assert!(delete.default_prevented);
        assert!(board.children().is_empty());
        assert!(board.selection().is_empty());

        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        let removed: Vec<&str> = changes[0].removed().map(|el| el.id.as_str()).collect();
        assert_eq!(removed.len(), 2);
        assert!(removed.contains(&"a") && removed.contains(&"b"));

        drop(changes);
        let mut undo = KeyEvent::new("z").with_modifiers(ctrl);
        board.on_key_down(&mut undo);
        assert_eq!(board.children().len(), 2);
    }

    #[test]
    fn test_topmost_element_wins_click() {
        let mut board = interactive_board();
        board
            .apply_batch(vec![
                Operation::insert(vec![0], BoardElement::with_id("a", "geometry").with_bounds(0.0, 0.0, 100.0, 100.0)),
                Operation::insert(vec![1], BoardElement::with_id("b", "geometry").with_bounds(0.0, 0.0, 100.0, 100.0)),
            ])
            .unwrap();
        click(&mut board, 50.0, 50.0, Modifiers::default());
        assert_eq!(board.selection().ids(), vec![ElementId::from("b")]);
    }

    #[test]
    fn test_copy_paste_through_plugins() {
        let mut board = interactive_board();
        let node = BoardElement::with_id("n", "mind-node").with_bounds(0.0, 0.0, 100.0, 30.0);
        let arrow = BoardElement::with_id("l", ARROW_KIND)
            .with_points(vec![Point::new(100.0, 15.0), Point::new(200.0, 15.0)])
            .with_endpoints(ArrowEndpoint::bound_to("n"), ArrowEndpoint::default());
        board
            .apply_batch(vec![Operation::insert(vec![0], node), Operation::insert(vec![1], arrow)])
            .unwrap();

        let ctrl = Modifiers { ctrl: true, ..Default::default() };
        board.on_key_down(&mut KeyEvent::new("a").with_modifiers(ctrl));
        assert_eq!(board.selection().selected_elements.len(), 2);

        let mut copy = ClipboardEvent::new();
        board.on_copy(&mut copy);
        let mut paste = copy.clone();
        assert_eq!(board.on_paste(&mut paste), Flow::Stop);

        assert_eq!(board.children().len(), 4);
        let pasted_node = &board.children()[2];
        let pasted_arrow = &board.children()[3];
        assert_ne!(pasted_node.id.as_str(), "n");
        let bound = pasted_arrow.source.as_ref().and_then(|source| source.bind_id.clone());
        assert_eq!(bound, Some(pasted_node.id.clone()));
    }

    #[test]
    fn test_wheel_zoom_keeps_cursor_point() {
        let mut board = interactive_board();
        board.set_container(ContainerRect::new(100.0, 50.0, 800.0, 600.0));
        let cursor = Point::new(400.0, 300.0);
        let before = board.screen_to_view_port(cursor);
        let mut wheel = WheelEvent::new(cursor, kurbo::Vec2::new(0.0, -120.0))
            .with_modifiers(Modifiers { ctrl: true, ..Default::default() });
        board.on_wheel(&mut wheel);
        assert!(board.view_port().zoom > 1.0);
        let after = board.screen_to_view_port(cursor);
        assert!((after - before).hypot() < 1e-9);
    }
}
