//! # Herald Core Event System
//!
//! In-process publish/notify. Listeners are registered against an
//! [`EventType`] with a [`Priority`] in a [`ListenerRegistry`]; an
//! [`EventDispatcher`] resolves the listeners that apply to a concrete
//! event and invokes them in order, honouring [`Stoppable`] events.
//!
//! Resolution is tiered: listeners registered under the event's exact type
//! come first, then those of each ancestor type (closest first), then those
//! of each capability tag. Each tier is sorted by ascending priority with
//! insertion order kept among ties; tiers are concatenated, never merged.
pub mod dispatcher;
pub mod error;
pub mod listener;
pub mod registry;
pub mod types;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Ordering key for listeners. Lower values run earlier.
pub type Priority = i32;

/// Priority used when a listener is registered without one.
pub const DEFAULT_PRIORITY: Priority = 10;

/// Nominal identity of an event category: a concrete event type, an
/// ancestor type, or a capability tag such as `dyn Stoppable`.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Identity of `T`. Trait-object types make capability tags.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Core event trait
///
/// Only `as_any` and `as_any_mut` must be written by hand. Events that take
/// part in polymorphic dispatch override `ancestors` (and `ancestor_mut`,
/// so typed listeners of an ancestor can reach the embedded value), and
/// stoppable events override `as_stoppable`/`as_stoppable_mut`.
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Identity of the concrete event type
    fn event_type(&self) -> EventType {
        EventType::of::<Self>()
    }

    /// Ancestor types, closest first, up to the root
    fn ancestors(&self) -> Vec<EventType> {
        Vec::new()
    }

    /// Capability tags implemented by this event.
    ///
    /// Overrides should keep the `dyn Stoppable` tag for stoppable events.
    fn capabilities(&self) -> Vec<EventType> {
        if self.as_stoppable().is_some() {
            vec![types::stoppable_tag()]
        } else {
            Vec::new()
        }
    }

    /// View of the propagation flag, if this event supports stopping
    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        None
    }

    /// Mutable view of the propagation flag
    fn as_stoppable_mut(&mut self) -> Option<&mut dyn Stoppable> {
        None
    }

    /// The embedded value standing for ancestor `ty`, if any
    fn ancestor_mut(&mut self, _ty: EventType) -> Option<&mut dyn Any> {
        None
    }

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Cast to mutable Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Event + '_ {
    /// True if the event is stoppable and a listener has stopped it.
    pub fn is_propagation_stopped(&self) -> bool {
        self.as_stoppable()
            .is_some_and(|stoppable| stoppable.is_propagation_stopped())
    }

    /// Borrow the event as `E`, either directly or through the embedded
    /// ancestor value.
    pub fn downcast_mut<E: Event>(&mut self) -> Option<&mut E> {
        let target = EventType::of::<E>();
        if self.event_type() == target {
            return self.as_any_mut().downcast_mut::<E>();
        }
        self.ancestor_mut(target)
            .and_then(|ancestor| ancestor.downcast_mut::<E>())
    }
}

/// Re-export important types
pub use dispatcher::{DispatchReport, EventDispatcher};
pub use error::EventSystemError;
pub use listener::{Listener, ListenerError, ListenerResult};
pub use registry::{ListenerProvider, ListenerRegistry, SharedListenerRegistry};
pub use types::{PropagationState, Stoppable, stoppable_tag};

// Test module declaration
#[cfg(test)]
mod tests;
