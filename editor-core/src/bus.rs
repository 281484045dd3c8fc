//! Publish/subscribe fabric between the editing core and UI panels.
//!
//! Publishing is synchronous and runs handlers in subscription order. A
//! failing handler (error or panic) is logged and skipped; the remaining
//! handlers and the publisher carry on. Publishers publish after the state
//! change the event describes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use serde::Serialize;

use crate::{EditorError, ElementId};

/// Event names in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Selection changed or was re-affirmed.
    ElementSelected,
    /// An element lost the selection.
    ElementDeselected,
    /// An element was removed from the canvas.
    ElementDeleted,
    /// An element's committed data changed.
    ElementUpdated,
    /// Undo/redo replaced the canvas contents.
    HistoryRestored,
}

impl EventKind {
    /// Wire name of the event.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ElementSelected => "elementSelected",
            Self::ElementDeselected => "elementDeselected",
            Self::ElementDeleted => "elementDeleted",
            Self::ElementUpdated => "elementUpdated",
            Self::HistoryRestored => "history:restored",
        }
    }

    /// Look up a kind by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::ElementSelected,
            Self::ElementDeselected,
            Self::ElementDeleted,
            Self::ElementUpdated,
            Self::HistoryRestored,
        ]
        .into_iter()
        .find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum EditorEvent {
    /// Selection changed; `current` is `None` on deselection.
    #[serde(rename = "elementSelected")]
    ElementSelected {
        /// Newly selected element.
        current: Option<ElementId>,
        /// Previously selected element.
        previous: Option<ElementId>,
    },
    /// An element lost the selection.
    #[serde(rename = "elementDeselected")]
    ElementDeselected {
        /// The element that was deselected.
        #[serde(rename = "elementId")]
        element_id: ElementId,
    },
    /// An element was removed.
    #[serde(rename = "elementDeleted")]
    ElementDeleted {
        /// The removed element.
        #[serde(rename = "elementId")]
        element_id: ElementId,
    },
    /// An element's committed data changed.
    #[serde(rename = "elementUpdated")]
    ElementUpdated {
        /// The changed element.
        #[serde(rename = "elementId")]
        element_id: ElementId,
    },
    /// Undo/redo restored a snapshot.
    #[serde(rename = "history:restored")]
    HistoryRestored,
}

impl EditorEvent {
    /// The catalog entry this event belongs to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ElementSelected { .. } => EventKind::ElementSelected,
            Self::ElementDeselected { .. } => EventKind::ElementDeselected,
            Self::ElementDeleted { .. } => EventKind::ElementDeleted,
            Self::ElementUpdated { .. } => EventKind::ElementUpdated,
            Self::HistoryRestored => EventKind::HistoryRestored,
        }
    }
}

/// What a handler returns; errors are logged by the bus.
pub type HandlerResult = Result<(), Box<dyn std::error::Error>>;

/// A subscribed handler. Identity is the `Rc` allocation, so subscribing
/// the same `Rc` twice is a no-op.
pub type Handler = Rc<dyn Fn(&EditorEvent) -> HandlerResult>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&EditorEvent) -> HandlerResult + 'static,
{
    Rc::new(f)
}

/// Result of one publish call.
#[derive(Debug, Default)]
pub struct PublishOutcome {
    /// Handlers that ran to completion.
    pub delivered: usize,
    /// Failures, one per failing handler.
    pub failures: Vec<EditorError>,
}

/// Synchronous publish/subscribe registry.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<BTreeMap<EventKind, Vec<Handler>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self
            .handlers
            .borrow()
            .iter()
            .map(|(kind, list)| (kind.name(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Returns `false` if this exact handler was
    /// already subscribed to `kind`.
    pub fn subscribe(&self, kind: EventKind, handler: &Handler) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let list = handlers.entry(kind).or_default();
        if list.iter().any(|h| Rc::ptr_eq(h, handler)) {
            return false;
        }
        list.push(Rc::clone(handler));
        tracing::debug!("Listener subscribed to [{kind}]");
        true
    }

    /// Remove a handler. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, kind: EventKind, handler: &Handler) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let Some(list) = handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|h| !Rc::ptr_eq(h, handler));
        let removed = list.len() != before;
        if removed {
            tracing::debug!("Listener unsubscribed from [{kind}]");
        }
        removed
    }

    /// Number of handlers subscribed to `kind`.
    #[must_use]
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.borrow().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to every current handler of its kind.
    ///
    /// The handler list is captured before delivery, so handlers may
    /// subscribe or unsubscribe while running; changes apply to the next
    /// publish.
    pub fn publish(&self, event: &EditorEvent) -> PublishOutcome {
        let kind = event.kind();
        let listeners: Vec<Handler> = self
            .handlers
            .borrow()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut outcome = PublishOutcome::default();
        if listeners.is_empty() {
            tracing::trace!("No listeners for event [{kind}]");
            return outcome;
        }
        tracing::debug!("Publishing event [{kind}]: {event:?}");

        for listener in listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
            let message = match result {
                Ok(Ok(())) => {
                    outcome.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            tracing::warn!("Error in listener for event [{kind}]: {message}");
            outcome.failures.push(EditorError::Handler {
                event: kind.name().to_string(),
                message,
            });
        }
        outcome
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn updated(id: &str) -> EditorEvent {
        EditorEvent::ElementUpdated {
            element_id: ElementId::new(id),
        }
    }

    #[test]
    fn same_handler_subscribes_once() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let h = handler(move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        assert!(bus.subscribe(EventKind::ElementUpdated, &h));
        assert!(!bus.subscribe(EventKind::ElementUpdated, &h));
        bus.publish(&updated("a"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe(
                EventKind::ElementDeleted,
                &handler(move |_| {
                    order.borrow_mut().push(n);
                    Ok(())
                }),
            );
        }
        bus.publish(&EditorEvent::ElementDeleted {
            element_id: ElementId::new("x"),
        });
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn failing_handlers_are_isolated() {
        let bus = EventBus::new();
        let reached = Rc::new(Cell::new(false));
        bus.subscribe(EventKind::ElementUpdated, &handler(|_| Err("boom".into())));
        bus.subscribe(
            EventKind::ElementUpdated,
            &handler(|_| panic!("handler exploded")),
        );
        let flag = Rc::clone(&reached);
        bus.subscribe(
            EventKind::ElementUpdated,
            &handler(move |_| {
                flag.set(true);
                Ok(())
            }),
        );

        let outcome = bus.publish(&updated("a"));
        assert!(reached.get());
        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(
            &outcome.failures[1],
            EditorError::Handler { message, .. } if message.contains("exploded")
        ));
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let bus = EventBus::new();
        let h = handler(|_| Ok(()));
        bus.subscribe(EventKind::HistoryRestored, &h);
        assert!(bus.unsubscribe(EventKind::HistoryRestored, &h));
        assert!(!bus.unsubscribe(EventKind::HistoryRestored, &h));
        assert_eq!(bus.handler_count(EventKind::HistoryRestored), 0);
    }

    #[test]
    fn events_only_reach_their_kind() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        bus.subscribe(
            EventKind::ElementSelected,
            &handler(move |_| {
                seen.set(seen.get() + 1);
                Ok(())
            }),
        );
        bus.publish(&updated("a"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn handler_may_unsubscribe_itself_during_publish() {
        let bus = Rc::new(EventBus::new());
        let slot: Rc<RefCell<Option<Handler>>> = Rc::new(RefCell::new(None));
        let bus_ref = Rc::clone(&bus);
        let slot_ref = Rc::clone(&slot);
        let h = handler(move |_| {
            if let Some(me) = slot_ref.borrow().as_ref() {
                bus_ref.unsubscribe(EventKind::ElementUpdated, me);
            }
            Ok(())
        });
        *slot.borrow_mut() = Some(Rc::clone(&h));
        bus.subscribe(EventKind::ElementUpdated, &h);

        let outcome = bus.publish(&updated("a"));
        assert_eq!(outcome.delivered, 1);
        assert_eq!(bus.handler_count(EventKind::ElementUpdated), 0);
        // Break the Rc cycle between the handler and its slot.
        slot.borrow_mut().take();
    }

    #[test]
    fn event_names_and_payloads_serialize() {
        let event = EditorEvent::ElementSelected {
            current: Some(ElementId::new("a")),
            previous: None,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event"], "elementSelected");
        assert_eq!(value["current"], "a");
        assert!(value["previous"].is_null());
        assert_eq!(
            EventKind::from_name("history:restored"),
            Some(EventKind::HistoryRestored)
        );
    }
}
