//! # Herald Core
//!
//! Synchronous, in-process event dispatch with priority-ordered listeners
//! and polymorphic (ancestor and capability) resolution.
//!
//! ```
//! use std::any::Any;
//! use herald_core::event::{Event, EventDispatcher, SharedListenerRegistry};
//!
//! #[derive(Debug, Default)]
//! struct Saved {
//!     log: Vec<&'static str>,
//! }
//!
//! impl Event for Saved {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! let registry = SharedListenerRegistry::new();
//! registry
//!     .listen_with_priority::<Saved, _>(|e| e.log.push("late"), 20)
//!     .listen_with_priority::<Saved, _>(|e| e.log.push("early"), 5);
//!
//! let dispatcher = EventDispatcher::new(registry);
//! let mut event = Saved::default();
//! let event = dispatcher.dispatch(&mut event).unwrap();
//! assert_eq!(event.log, ["early", "late"]);
//! ```
pub mod config;
pub mod event;

// Re-export key public types for easier use
pub use config::{ConfigError, ConfigFormat, EventConfig};
pub use event::{
    DEFAULT_PRIORITY, DispatchReport, Event, EventDispatcher, EventSystemError, EventType,
    Listener, ListenerProvider, ListenerRegistry, Priority, PropagationState,
    SharedListenerRegistry, Stoppable,
};

#[cfg(test)]
mod tests;
