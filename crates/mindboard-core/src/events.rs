//! Single-threaded event emitters with scoped subscriptions.
//!
//! A [`Subscription`] unregisters its handler when dropped. Handlers may
//! subscribe or unsubscribe while an event is being emitted; new handlers
//! start receiving events from the next emit.

use crate::board::Board;
use crate::input::PointerEvent;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Handler<E> = Box<dyn FnMut(&E)>;

struct Slots<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
    emitting: bool,
    removed_while_emitting: Vec<u64>,
}

impl<E> Slots<E> {
    fn remove(&mut self, id: u64) {
        let before = self.handlers.len();
        self.handlers.retain(|(slot, _)| *slot != id);
        if self.handlers.len() == before && self.emitting {
            self.removed_while_emitting.push(id);
        }
    }
}

/// Broadcasts events of type `E` to subscribed handlers, in subscription order.
pub struct Emitter<E> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.slots.try_borrow().map(|slots| slots.handlers.len()).ok();
        f.debug_struct("Emitter").field("handlers", &handlers).finish()
    }
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
                emitting: false,
                removed_while_emitting: Vec::new(),
            })),
        }
    }

    /// Register a handler. It stays registered until the returned guard is dropped.
    pub fn subscribe(&self, handler: impl FnMut(&E) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.handlers.push((id, Box::new(handler)));
            id
        };
        let weak: Weak<RefCell<Slots<E>>> = Rc::downgrade(&self.slots);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Deliver `event` to every handler registered before this call.
    pub fn emit(&self, event: &E) {
        let mut handlers = {
            let mut slots = self.slots.borrow_mut();
            if slots.emitting {
                log::warn!("Nested emit dropped");
                return;
            }
            slots.emitting = true;
            std::mem::take(&mut slots.handlers)
        };
        for (_, handler) in handlers.iter_mut() {
            handler(event);
        }
        let mut slots = self.slots.borrow_mut();
        let added = std::mem::replace(&mut slots.handlers, handlers);
        slots.handlers.extend(added);
        let removed = std::mem::take(&mut slots.removed_while_emitting);
        slots.handlers.retain(|(id, _)| !removed.contains(id));
        slots.emitting = false;
    }

    pub fn handler_count(&self) -> usize {
        self.slots.borrow().handlers.len()
    }
}

/// Unregisters a handler when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the handler registered for the emitter's whole lifetime.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Host-wide pointer events that are not tied to one board's container,
/// such as a pointer release outside the board.
#[derive(Debug, Default)]
pub struct GlobalPointerBus {
    pointer_up: Emitter<PointerEvent>,
}

impl GlobalPointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_pointer_up(&self, event: &PointerEvent) {
        self.pointer_up.emit(event);
    }

    pub fn on_pointer_up(&self, handler: impl FnMut(&PointerEvent) + 'static) -> Subscription {
        self.pointer_up.subscribe(handler)
    }
}

/// Route global pointer-up events into `board`'s plugins for as long as the
/// returned subscription lives.
///
/// The board is held weakly. Events arriving while the board is already
/// borrowed (a plugin re-entering the bus) are dropped with a warning.
pub fn attach_global_pointer_up(board: &Rc<RefCell<Board>>, bus: &GlobalPointerBus) -> Subscription {
    let weak = Rc::downgrade(board);
    bus.on_pointer_up(move |event| {
        let Some(board) = weak.upgrade() else {
            return;
        };
        match board.try_borrow_mut() {
            Ok(mut board) => {
                board.on_global_pointer_up(event);
            }
            Err(_) => log::warn!("Board busy, dropping global pointer-up"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use crate::plugins::{BoardPlugin, Flow};
    use kurbo::Point;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_handlers_in_order() {
        let emitter: Emitter<u32> = Emitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let log = log.clone();
            emitter.subscribe(move |value| log.borrow_mut().push(("first", *value)))
        };
        let second = {
            let log = log.clone();
            emitter.subscribe(move |value| log.borrow_mut().push(("second", *value)))
        };
        emitter.emit(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
        drop(first);
        emitter.emit(&8);
        assert_eq!(log.borrow().last(), Some(&("second", 8)));
        assert_eq!(emitter.handler_count(), 1);
        drop(second);
        assert_eq!(emitter.handler_count(), 0);
    }

    #[test]
    fn test_unsubscribe_during_emit() {
        let emitter: Emitter<()> = Emitter::new();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let subscription = {
            let calls = calls.clone();
            let slot = slot.clone();
            emitter.subscribe(move |_| {
                calls.set(calls.get() + 1);
                slot.borrow_mut().take();
            })
        };
        *slot.borrow_mut() = Some(subscription);
        emitter.emit(&());
        emitter.emit(&());
        assert_eq!(calls.get(), 1);
        assert_eq!(emitter.handler_count(), 0);
    }

    #[test]
    fn test_detach_keeps_handler() {
        let emitter: Emitter<()> = Emitter::new();
        let calls = Rc::new(Cell::new(0));
        {
            let calls = calls.clone();
            emitter.subscribe(move |_| calls.set(calls.get() + 1)).detach();
        }
        emitter.emit(&());
        assert_eq!(calls.get(), 1);
    }

    struct CountUps(Rc<Cell<usize>>);

    impl BoardPlugin for CountUps {
        fn name(&self) -> &str {
            "count-ups"
        }

        fn on_global_pointer_up(&mut self, _event: &PointerEvent, _board: &mut Board) -> Flow {
            self.0.set(self.0.get() + 1);
            Flow::Continue
        }
    }

    #[test]
    fn test_global_pointer_up_reaches_board() {
        let ups = Rc::new(Cell::new(0));
        let board = Rc::new(RefCell::new(Board::new()));
        board.borrow_mut().add_plugin(CountUps(ups.clone()));
        let bus = GlobalPointerBus::new();
        let subscription = attach_global_pointer_up(&board, &bus);
        let event = PointerEvent::new(Point::ZERO, MouseButton::Left);

        bus.emit_pointer_up(&event);
        assert_eq!(ups.get(), 1);

        let held = board.borrow_mut();
        bus.emit_pointer_up(&event);
        drop(held);
        assert_eq!(ups.get(), 1);

        drop(subscription);
        bus.emit_pointer_up(&event);
        assert_eq!(ups.get(), 1);
    }

    #[test]
    fn test_dropped_board_is_ignored() {
        let board = Rc::new(RefCell::new(Board::new()));
        let bus = GlobalPointerBus::new();
        let _subscription = attach_global_pointer_up(&board, &bus);
        drop(board);
        bus.emit_pointer_up(&PointerEvent::new(Point::ZERO, MouseButton::Left));
    }
}
