use crate::event::EventType;
#[cfg(test)]
use crate::event::Event;

/// Capability of events whose propagation can be stopped mid-dispatch.
///
/// The dispatcher checks the flag before every listener, so stopping only
/// takes effect at listener boundaries.
pub trait Stoppable {
    /// Whether a listener has asked to skip the remaining listeners
    fn is_propagation_stopped(&self) -> bool;

    /// Skip every listener that has not run yet
    fn stop_propagation(&mut self);
}

/// Propagation flag to embed in stoppable events.
///
/// ```
/// use std::any::Any;
/// use herald_core::event::{Event, PropagationState, Stoppable};
///
/// #[derive(Debug, Default)]
/// struct Shutdown {
///     propagation: PropagationState,
/// }
///
/// impl Event for Shutdown {
///     fn as_stoppable(&self) -> Option<&dyn Stoppable> {
///         Some(&self.propagation)
///     }
///
///     fn as_stoppable_mut(&mut self) -> Option<&mut dyn Stoppable> {
///         Some(&mut self.propagation)
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationState {
    stopped: bool,
}

impl PropagationState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stoppable for PropagationState {
    fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }

    fn stop_propagation(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestEvent {
    pub emitted: Vec<String>,
}

#[cfg(test)]
impl TestEvent {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl Event for TestEvent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Stoppable test event, mirroring the embedded-flag pattern.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StoppableTestEvent {
    pub emitted: Vec<i32>,
    propagation: PropagationState,
}

#[cfg(test)]
impl StoppableTestEvent {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl Event for StoppableTestEvent {
    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(&self.propagation)
    }

    fn as_stoppable_mut(&mut self) -> Option<&mut dyn Stoppable> {
        Some(&mut self.propagation)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Identity of the stoppable capability tag.
pub fn stoppable_tag() -> EventType {
    EventType::of::<dyn Stoppable>()
}
