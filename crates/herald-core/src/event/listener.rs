use std::fmt;
use std::sync::Arc;

use crate::event::error::EventSystemError;
use crate::event::{Event, EventType};

/// Failure raised by a listener. Boxed so listeners can return any error.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of a single listener invocation
pub type ListenerResult = std::result::Result<(), ListenerError>;

type ListenerFn = dyn Fn(&mut dyn Event) -> ListenerResult + Send + Sync;

/// A registered callback. Cloning is cheap and shares the closure, which
/// lets resolution hand out snapshots without holding registry locks.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<ListenerFn>,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").finish_non_exhaustive()
    }
}

impl Listener {
    /// Listener over the type-erased event that cannot fail
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Event) + Send + Sync + 'static,
    {
        Self::fallible(move |event| {
            f(event);
            Ok(())
        })
    }

    /// Listener over the type-erased event whose errors abort the dispatch
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Event) -> ListenerResult + Send + Sync + 'static,
    {
        Self { callback: Arc::new(f) }
    }

    /// Listener for events of type `E`.
    ///
    /// The event is borrowed as `E` directly, or as the embedded ancestor
    /// value when `E` is an ancestor of the dispatched event. Events that
    /// are neither are ignored. An event that names `E` among its ancestors
    /// but cannot hand out the embedded value fails the listener with
    /// [`EventSystemError::AncestorUnreachable`].
    pub fn typed<E, F>(f: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        Self::typed_fallible(move |event: &mut E| {
            f(event);
            Ok(())
        })
    }

    /// Typed listener whose errors abort the dispatch
    pub fn typed_fallible<E, F>(f: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) -> ListenerResult + Send + Sync + 'static,
    {
        Self::fallible(move |event| match event.downcast_mut::<E>() {
            Some(event) => f(event),
            None => {
                let target = EventType::of::<E>();
                if event.ancestors().contains(&target) {
                    // Declared ancestor without an embedded value to hand over.
                    log::warn!(
                        "{} lists {} as an ancestor but does not expose it through ancestor_mut",
                        event.event_type(),
                        target
                    );
                    return Err(Box::new(EventSystemError::AncestorUnreachable {
                        event_name: event.event_type().name().to_string(),
                        ancestor: target.name().to_string(),
                    }));
                }
                log::trace!("Typed listener for {} skipped an unrelated event", target);
                Ok(())
            }
        })
    }

    /// Run the listener against `event`
    pub fn invoke(&self, event: &mut dyn Event) -> ListenerResult {
        (self.callback)(event)
    }

    /// True if both handles share the same closure
    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}
