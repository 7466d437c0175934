use std::fmt;

use crate::config::EventConfig;
use crate::event::error::{EventSystemError, Result};
use crate::event::registry::{ListenerProvider, SharedListenerRegistry};
use crate::event::Event;

/// What happened during one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners returned by the provider
    pub resolved: usize,
    /// Listeners actually invoked
    pub invoked: usize,
    /// Whether the event's propagation flag cut the dispatch short
    pub stopped: bool,
}

/// Synchronous dispatcher over an injected [`ListenerProvider`].
///
/// Listeners run on the calling thread, one after another, in the order
/// the provider returns them. The dispatcher keeps no state between calls.
pub struct EventDispatcher<P = SharedListenerRegistry> {
    provider: P,
    trace_dispatch: bool,
}

impl<P> fmt::Debug for EventDispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("provider", &std::any::type_name::<P>())
            .field("trace_dispatch", &self.trace_dispatch)
            .finish()
    }
}

impl<P: ListenerProvider> EventDispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            trace_dispatch: false,
        }
    }

    pub fn with_config(provider: P, config: &EventConfig) -> Self {
        Self {
            provider,
            trace_dispatch: config.trace_dispatch,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Dispatch `event` to every applicable listener and hand the same
    /// event back, carrying whatever the listeners changed.
    ///
    /// A listener error stops the dispatch; listeners after it do not run.
    pub fn dispatch<'e, E: Event>(&self, event: &'e mut E) -> Result<&'e mut E> {
        self.dispatch_dyn(&mut *event)?;
        Ok(event)
    }

    /// Type-erased dispatch.
    ///
    /// Before each listener, including the first, a stoppable event whose
    /// propagation was stopped ends the dispatch.
    pub fn dispatch_dyn(&self, event: &mut dyn Event) -> Result<DispatchReport> {
        let listeners = self.provider.get_listeners_for_event(&*event);
        let mut report = DispatchReport {
            resolved: listeners.len(),
            ..DispatchReport::default()
        };
        if listeners.is_empty() {
            log::trace!("No listeners for {}", event.event_type());
            return Ok(report);
        }

        for (position, listener) in listeners.iter().enumerate() {
            if event.is_propagation_stopped() {
                log::debug!(
                    "Propagation of {} stopped after {} of {} listener(s)",
                    event.event_type(),
                    position,
                    report.resolved
                );
                report.stopped = true;
                break;
            }

            if self.trace_dispatch {
                log::trace!("Invoking listener #{} for {}", position, event.event_type());
            }
            listener.invoke(&mut *event).map_err(|source| {
                log::warn!("Listener #{} failed for {}: {}", position, event.event_type(), source);
                EventSystemError::ListenerFailed {
                    event_name: event.event_type().name().to_string(),
                    position,
                    source,
                }
            })?;
            report.invoked += 1;
        }

        Ok(report)
    }
}

impl Default for EventDispatcher<SharedListenerRegistry> {
    fn default() -> Self {
        Self::new(SharedListenerRegistry::new())
    }
}
