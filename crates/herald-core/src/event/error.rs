//! # Herald Core Event System Errors
//!
//! Registration and resolution never fail. The only failure the event
//! system reports is a listener returning an error, which ends the
//! dispatch on the spot. Typed listeners raise [`EventSystemError::AncestorUnreachable`]
//! themselves when an event declares their type as an ancestor but does
//! not expose the embedded value.
use thiserror::Error;

use crate::event::ListenerError;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Listener #{position} failed while handling event '{event_name}': {source}")]
    ListenerFailed {
        event_name: String,
        /// Zero-based index of the listener in the resolved sequence
        position: usize,
        #[source]
        source: ListenerError,
    },

    #[error("Event '{event_name}' declares ancestor '{ancestor}' but does not expose it")]
    AncestorUnreachable {
        event_name: String,
        ancestor: String,
    },
}

/// Shorthand for Result with the event system error
pub type Result<T> = std::result::Result<T, EventSystemError>;
