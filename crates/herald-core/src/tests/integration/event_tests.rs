#![cfg(test)]

use std::any::Any;
use std::fs;
use std::sync::{Arc, Mutex};

use tempfile::tempdir;

use crate::config::EventConfig;
use crate::event::{
    Event, EventDispatcher, EventType, Listener, PropagationState, SharedListenerRegistry, Stoppable,
};

// --- Events used by the scenarios ---

#[derive(Debug, Default)]
struct OrderPlaced {
    log: Vec<&'static str>,
}

impl Event for OrderPlaced {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Default)]
struct Checkout {
    steps: Vec<i32>,
    propagation: PropagationState,
}

impl Event for Checkout {
    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(&self.propagation)
    }

    fn as_stoppable_mut(&mut self) -> Option<&mut dyn Stoppable> {
        Some(&mut self.propagation)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Root of a two-level chain
#[derive(Debug, Default)]
struct DomainEvent {
    audit: Vec<String>,
}

impl Event for DomainEvent {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Default)]
struct UserRegistered {
    domain: DomainEvent,
    email: String,
}

impl Event for UserRegistered {
    fn ancestors(&self) -> Vec<EventType> {
        vec![EventType::of::<DomainEvent>()]
    }

    fn ancestor_mut(&mut self, ty: EventType) -> Option<&mut dyn Any> {
        (ty == EventType::of::<DomainEvent>()).then_some(&mut self.domain as &mut dyn Any)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// --- Scenarios ---

#[test]
fn test_priority_scenario_high_medium_low() {
    let registry = SharedListenerRegistry::new();
    registry
        .listen_with_priority::<OrderPlaced, _>(|e| e.log.push("low"), 20)
        .listen_with_priority::<OrderPlaced, _>(|e| e.log.push("high"), 5)
        .listen_with_priority::<OrderPlaced, _>(|e| e.log.push("medium"), 10);
    let dispatcher = EventDispatcher::new(registry);

    let mut event = OrderPlaced::default();
    let event = dispatcher.dispatch(&mut event).expect("dispatch succeeds");
    assert_eq!(event.log, vec!["high", "medium", "low"]);
}

#[test]
fn test_stop_propagation_scenario() {
    let registry = SharedListenerRegistry::new();
    registry
        .listen_with_priority::<Checkout, _>(
            |e| {
                e.propagation.stop_propagation();
                e.steps.push(1);
            },
            1,
        )
        .listen_with_priority::<Checkout, _>(|e| e.steps.push(2), 2);
    let dispatcher = EventDispatcher::new(registry);

    let mut event = Checkout::default();
    dispatcher.dispatch(&mut event).expect("dispatch succeeds");
    assert_eq!(event.steps, vec![1]);
}

#[test]
fn test_no_listeners_scenario() {
    let dispatcher: EventDispatcher = EventDispatcher::default();
    let mut event = OrderPlaced::default();
    let original: *const OrderPlaced = &event;

    let returned = dispatcher.dispatch(&mut event).expect("dispatch succeeds");
    assert!(std::ptr::eq(original, &*returned));
    assert!(returned.log.is_empty());
}

#[test]
fn test_ancestor_listener_after_exact_listeners() {
    let registry = SharedListenerRegistry::new();
    registry
        .listen_with_priority::<DomainEvent, _>(|domain| domain.audit.push("audited".to_string()), -1000)
        .listen_with_priority::<UserRegistered, _>(
            |user| {
                // The ancestor tier has not run yet, whatever its priority.
                assert!(user.domain.audit.is_empty());
                user.email = user.email.to_lowercase();
            },
            1000,
        );
    let dispatcher = EventDispatcher::new(registry);

    let mut event = UserRegistered { email: "Ada@Example.COM".to_string(), ..Default::default() };
    dispatcher.dispatch(&mut event).expect("dispatch succeeds");

    assert_eq!(event.email, "ada@example.com");
    assert_eq!(event.domain.audit, vec!["audited"]);
}

#[test]
fn test_has_listeners_lifecycle() {
    let registry = SharedListenerRegistry::new();
    let ty = EventType::of::<OrderPlaced>();

    assert!(!registry.has_listeners(ty));
    registry.add_listener(ty, Listener::new(|_| {}));
    assert!(registry.has_listeners(ty));
    registry.clear_listeners(ty);
    assert!(!registry.has_listeners(ty));

    let dispatcher = EventDispatcher::new(registry);
    let report = dispatcher.dispatch_dyn(&mut OrderPlaced::default()).expect("dispatch succeeds");
    assert_eq!(report.resolved, 0);
}

#[test]
fn test_dispatch_across_threads() {
    let registry = SharedListenerRegistry::new();
    let seen = Arc::new(Mutex::new(0usize));
    let seen_clone = Arc::clone(&seen);
    registry.listen::<OrderPlaced, _>(move |_| *seen_clone.lock().unwrap() += 1);
    let dispatcher = Arc::new(EventDispatcher::new(registry));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            std::thread::spawn(move || {
                for _ in 0..10 {
                    dispatcher.dispatch(&mut OrderPlaced::default()).expect("dispatch succeeds");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("dispatch thread");
    }

    assert_eq!(*seen.lock().unwrap(), 40);
}

#[test]
fn test_registry_from_config_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("events.json");
    fs::write(&path, r#"{ "default_priority": 0, "trace_dispatch": true }"#).expect("write config");
    let config = EventConfig::load(&path).expect("config loads");

    let registry = SharedListenerRegistry::from_config(&config);
    let ty = EventType::of::<OrderPlaced>();
    registry
        .add_listener_with_priority(
            ty,
            Listener::typed(|e: &mut OrderPlaced| e.log.push("explicit@5")),
            5,
        )
        .add_listener(ty, Listener::typed(|e: &mut OrderPlaced| e.log.push("default@0")));
    let dispatcher = EventDispatcher::with_config(registry, &config);

    let mut event = OrderPlaced::default();
    dispatcher.dispatch(&mut event).expect("dispatch succeeds");
    assert_eq!(event.log, vec!["default@0", "explicit@5"]);
}
