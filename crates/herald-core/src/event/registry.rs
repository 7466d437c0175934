use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::EventConfig;
use crate::event::{DEFAULT_PRIORITY, Event, EventType, Listener, ListenerResult, Priority};

/// Source of the ordered listeners that apply to an event.
///
/// The dispatcher only depends on this trait, so any registry (or a
/// hand-written provider) can be injected into it.
pub trait ListenerProvider {
    /// Listeners for `event`, in invocation order
    fn get_listeners_for_event(&self, event: &dyn Event) -> Vec<Listener>;
}

impl<P: ListenerProvider + ?Sized> ListenerProvider for &P {
    fn get_listeners_for_event(&self, event: &dyn Event) -> Vec<Listener> {
        (**self).get_listeners_for_event(event)
    }
}

impl<P: ListenerProvider + ?Sized> ListenerProvider for Arc<P> {
    fn get_listeners_for_event(&self, event: &dyn Event) -> Vec<Listener> {
        (**self).get_listeners_for_event(event)
    }
}

type PriorityBuckets = BTreeMap<Priority, Vec<Listener>>;

//--------------------------------------------------
// ListenerRegistry
//--------------------------------------------------

/// Listeners keyed by event type, then priority.
///
/// Within one event type listeners run by ascending priority and, for equal
/// priorities, in registration order.
pub struct ListenerRegistry {
    listeners: HashMap<EventType, PriorityBuckets>,
    default_priority: Priority,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listener_count: usize = self
            .listeners
            .values()
            .flat_map(|buckets| buckets.values())
            .map(Vec::len)
            .sum();
        f.debug_struct("ListenerRegistry")
            .field("event_types", &self.listeners.len())
            .field("listeners", &listener_count)
            .field("default_priority", &self.default_priority)
            .finish()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::with_default_priority(DEFAULT_PRIORITY)
    }

    /// Registry whose `add_listener` uses `priority` instead of the
    /// built-in default
    pub fn with_default_priority(priority: Priority) -> Self {
        Self {
            listeners: HashMap::new(),
            default_priority: priority,
        }
    }

    pub fn from_config(config: &EventConfig) -> Self {
        Self::with_default_priority(config.default_priority)
    }

    pub fn default_priority(&self) -> Priority {
        self.default_priority
    }

    /// Register `listener` under `event_type` at the default priority
    pub fn add_listener(&mut self, event_type: EventType, listener: Listener) -> &mut Self {
        let priority = self.default_priority;
        self.add_listener_with_priority(event_type, listener, priority)
    }

    /// Register `listener` under `event_type` at `priority`.
    ///
    /// No deduplication: a listener added twice runs twice.
    pub fn add_listener_with_priority(
        &mut self,
        event_type: EventType,
        listener: Listener,
        priority: Priority,
    ) -> &mut Self {
        log::debug!("Registering listener for {} at priority {}", event_type, priority);
        self.listeners
            .entry(event_type)
            .or_default()
            .entry(priority)
            .or_default()
            .push(listener);
        self
    }

    /// Register a typed listener for `E` at the default priority
    pub fn listen<E, F>(&mut self, f: F) -> &mut Self
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.add_listener(EventType::of::<E>(), Listener::typed(f))
    }

    /// Register a typed listener for `E` at `priority`
    pub fn listen_with_priority<E, F>(&mut self, f: F, priority: Priority) -> &mut Self
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.add_listener_with_priority(EventType::of::<E>(), Listener::typed(f), priority)
    }

    /// Register a fallible typed listener for `E` at `priority`
    pub fn try_listen<E, F>(&mut self, f: F, priority: Priority) -> &mut Self
    where
        E: Event,
        F: Fn(&mut E) -> ListenerResult + Send + Sync + 'static,
    {
        self.add_listener_with_priority(EventType::of::<E>(), Listener::typed_fallible(f), priority)
    }

    /// True if at least one listener is registered directly under
    /// `event_type`. Ancestors and capability tags are not consulted.
    pub fn has_listeners(&self, event_type: EventType) -> bool {
        self.listener_count(event_type) > 0
    }

    /// Number of listeners registered directly under `event_type`
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners
            .get(&event_type)
            .map_or(0, |buckets| buckets.values().map(Vec::len).sum())
    }

    /// Remove every listener registered directly under `event_type`
    pub fn clear_listeners(&mut self, event_type: EventType) -> &mut Self {
        if self.listeners.remove(&event_type).is_some() {
            log::debug!("Cleared listeners for {}", event_type);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Resolve the listeners for `event`: exact type, then each ancestor
    /// (closest first), then each capability tag. Every tier is ordered on
    /// its own; tiers are concatenated, not merged by priority.
    pub fn get_listeners_for_event(&self, event: &dyn Event) -> Vec<Listener> {
        let exact = event.event_type();
        let mut resolved = Vec::new();

        self.collect_into(exact, &mut resolved);
        for ancestor in event.ancestors() {
            self.collect_into(ancestor, &mut resolved);
        }
        for capability in event.capabilities() {
            self.collect_into(capability, &mut resolved);
        }

        log::trace!("Resolved {} listener(s) for {}", resolved.len(), exact);
        resolved
    }

    fn collect_into(&self, event_type: EventType, out: &mut Vec<Listener>) {
        if let Some(buckets) = self.listeners.get(&event_type) {
            // BTreeMap iterates in ascending priority.
            out.extend(buckets.values().flatten().cloned());
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerProvider for ListenerRegistry {
    fn get_listeners_for_event(&self, event: &dyn Event) -> Vec<Listener> {
        ListenerRegistry::get_listeners_for_event(self, event)
    }
}

//--------------------------------------------------
// SharedListenerRegistry
//--------------------------------------------------

/// Thread-safe registry handle.
///
/// Registration takes the write lock. Resolution takes the read lock and
/// returns a snapshot, so listeners run without any lock held and may
/// themselves register listeners.
#[derive(Clone, Default)]
pub struct SharedListenerRegistry {
    registry: Arc<RwLock<ListenerRegistry>>,
}

impl fmt::Debug for SharedListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedListenerRegistry")
            .field("registry", &*self.read())
            .finish()
    }
}

impl SharedListenerRegistry {
    pub fn new() -> Self {
        Self::from_registry(ListenerRegistry::new())
    }

    pub fn from_registry(registry: ListenerRegistry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn from_config(config: &EventConfig) -> Self {
        Self::from_registry(ListenerRegistry::from_config(config))
    }

    pub fn add_listener(&self, event_type: EventType, listener: Listener) -> &Self {
        self.write().add_listener(event_type, listener);
        self
    }

    pub fn add_listener_with_priority(
        &self,
        event_type: EventType,
        listener: Listener,
        priority: Priority,
    ) -> &Self {
        self.write().add_listener_with_priority(event_type, listener, priority);
        self
    }

    pub fn listen<E, F>(&self, f: F) -> &Self
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.write().listen::<E, F>(f);
        self
    }

    pub fn listen_with_priority<E, F>(&self, f: F, priority: Priority) -> &Self
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.write().listen_with_priority::<E, F>(f, priority);
        self
    }

    pub fn try_listen<E, F>(&self, f: F, priority: Priority) -> &Self
    where
        E: Event,
        F: Fn(&mut E) -> ListenerResult + Send + Sync + 'static,
    {
        self.write().try_listen::<E, F>(f, priority);
        self
    }

    pub fn has_listeners(&self, event_type: EventType) -> bool {
        self.read().has_listeners(event_type)
    }

    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.read().listener_count(event_type)
    }

    pub fn clear_listeners(&self, event_type: EventType) -> &Self {
        self.write().clear_listeners(event_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the listeners for `event`
    pub fn get_listeners_for_event(&self, event: &dyn Event) -> Vec<Listener> {
        self.read().get_listeners_for_event(event)
    }

    // Every registry operation leaves the maps consistent, so a panic on
    // another thread cannot leave torn state behind and the guard is reused.
    fn read(&self) -> RwLockReadGuard<'_, ListenerRegistry> {
        self.registry.read().unwrap_or_else(|poisoned| {
            self.recover_from_poison();
            PoisonError::into_inner(poisoned)
        })
    }

    fn recover_from_poison(&self) {
        log::warn!("Listener registry lock was poisoned; recovering");
        self.registry.clear_poison();
    }

    fn write(&self) -> RwLockWriteGuard<'_, ListenerRegistry> {
        self.registry.write().unwrap_or_else(|poisoned| {
            self.recover_from_poison();
            PoisonError::into_inner(poisoned)
        })
    }
}

impl ListenerProvider for SharedListenerRegistry {
    fn get_listeners_for_event(&self, event: &dyn Event) -> Vec<Listener> {
        SharedListenerRegistry::get_listeners_for_event(self, event)
    }
}
