//! Producer-side event mechanism.
//!
//! This module provides the pieces an event producer needs to expose events
//! that can be wired from configuration:
//!
//! - [`EventHandler`] - the canonical, type-erased handler shape `(sender, args)`
//! - [`ArgShape`] - the argument type an event raises or a handler accepts
//! - [`EventSource`] - an ordered list of subscribed handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use hookwire_core::EventSource;
//!
//! pub struct Thermometer {
//!     pub changed: EventSource<f64>,
//! }
//!
//! // Static events can live in a `static` item.
//! pub static CALIBRATED: EventSource<()> = EventSource::new();
//!
//! impl Thermometer {
//!     pub fn set(&self, value: f64) {
//!         self.changed.raise(Some(self as &dyn std::any::Any), &value);
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

/// The canonical handler shape every consumer is adapted to.
///
/// Parameters: `(sender, args)`; `sender` is `None` for static events.
pub type EventHandler = Arc<dyn Fn(Option<&dyn Any>, &dyn Any) + Send + Sync>;

// ============================================================================
// Argument Shapes
// ============================================================================

/// The argument type of an event or handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// Exactly one argument type.
    Exact {
        /// Identity of the argument type.
        type_id: TypeId,
        /// Rust name of the argument type, for diagnostics.
        type_name: &'static str,
    },
    /// Any argument type (handlers only).
    Any,
}

impl ArgShape {
    /// The shape of an argument of type `A`.
    pub fn of<A: Any>() -> Self {
        Self::Exact {
            type_id: TypeId::of::<A>(),
            type_name: std::any::type_name::<A>(),
        }
    }

    /// Returns `true` if a handler of this shape can receive arguments of `raised`.
    pub fn accepts(&self, raised: &ArgShape) -> bool {
        match (self, raised) {
            (Self::Any, _) => true,
            (Self::Exact { type_id: a, .. }, Self::Exact { type_id: b, .. }) => a == b,
            (Self::Exact { .. }, Self::Any) => false,
        }
    }
}

impl fmt::Display for ArgShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { type_name, .. } => f.write_str(type_name),
            Self::Any => f.write_str("any"),
        }
    }
}

// ============================================================================
// Event Source
// ============================================================================

/// An event that external handlers can be attached to.
///
/// Handlers run in subscription order. The same handler may be added more
/// than once; [`remove`](Self::remove) drops the most recent registration.
pub struct EventSource<A> {
    handlers: Mutex<Vec<EventHandler>>,
    _args: PhantomData<fn(&A)>,
}

impl<A: Any> EventSource<A> {
    /// Creates an event with no handlers.
    pub const fn new() -> Self {
        Self {
            handlers: parking_lot::const_mutex(Vec::new()),
            _args: PhantomData,
        }
    }

    /// The argument shape this event raises.
    pub fn shape() -> ArgShape {
        ArgShape::of::<A>()
    }

    /// Subscribes a handler.
    pub fn add(&self, handler: EventHandler) {
        self.handlers.lock().push(handler);
    }

    /// Unsubscribes the most recent registration of `handler`.
    ///
    /// Returns `false` if the handler was not subscribed.
    pub fn remove(&self, handler: &EventHandler) -> bool {
        let mut handlers = self.handlers.lock();
        match handlers.iter().rposition(|h| Arc::ptr_eq(h, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the number of subscribed handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Invokes every subscribed handler and returns how many ran.
    ///
    /// The handler list is snapshotted first, so handlers may subscribe or
    /// unsubscribe while the event is being raised.
    pub fn raise(&self, sender: Option<&dyn Any>, args: &A) -> usize {
        let handlers = self.handlers.lock().clone();
        for handler in &handlers {
            handler(sender, args);
        }
        handlers.len()
    }
}

impl<A: Any> Default for EventSource<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventSource<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("args", &std::any::type_name::<A>())
            .field("handlers", &self.handlers.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: &Arc<AtomicUsize>) -> EventHandler {
        let counter = Arc::clone(counter);
        Arc::new(move |_sender: Option<&dyn Any>, args: &dyn Any| {
            if let Some(value) = args.downcast_ref::<i32>() {
                counter.fetch_add(*value as usize, Ordering::SeqCst);
            }
        })
    }

    #[test]
    fn test_raise_reaches_every_handler() {
        let source = EventSource::<i32>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        source.add(counting_handler(&counter));
        source.add(counting_handler(&counter));

        assert_eq!(source.raise(None, &2), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_remove_drops_only_one_registration() {
        let source = EventSource::<i32>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&counter);
        source.add(Arc::clone(&handler));
        source.add(Arc::clone(&handler));

        assert!(source.remove(&handler));
        assert_eq!(source.handler_count(), 1);
        assert!(source.remove(&handler));
        assert!(!source.remove(&handler));
        assert_eq!(source.raise(None, &1), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_while_raised() {
        static SOURCE: EventSource<i32> = EventSource::new();
        let slot: Arc<Mutex<Option<EventHandler>>> = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&slot);
        let handler: EventHandler = Arc::new(move |_: Option<&dyn Any>, _: &dyn Any| {
            if let Some(me) = inner.lock().take() {
                SOURCE.remove(&me);
            }
        });
        *slot.lock() = Some(Arc::clone(&handler));
        SOURCE.add(handler);

        assert_eq!(SOURCE.raise(None, &0), 1);
        assert_eq!(SOURCE.handler_count(), 0);
    }

    #[test]
    fn test_arg_shape_assignability() {
        let int = ArgShape::of::<i32>();
        assert!(int.accepts(&ArgShape::of::<i32>()));
        assert!(!int.accepts(&ArgShape::of::<u32>()));
        assert!(ArgShape::Any.accepts(&int));
        assert!(!int.accepts(&ArgShape::Any));
        assert_eq!(int.to_string(), "i32");
    }
}
