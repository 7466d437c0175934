
#[cfg(test)]
mod tests {
    use crate::event::{DEFAULT_PRIORITY, EventType, Stoppable};
    use crate::event::types::{TestEvent, stoppable_tag};

    #[test]
    fn test_default_priority() {
        assert_eq!(DEFAULT_PRIORITY, 10);
    }

    #[test]
    fn test_event_type_identity() {
        assert_eq!(EventType::of::<TestEvent>(), EventType::of::<TestEvent>());
        assert_ne!(EventType::of::<TestEvent>(), EventType::of::<String>());
        assert_eq!(stoppable_tag(), EventType::of::<dyn Stoppable>());
        assert!(EventType::of::<TestEvent>().name().ends_with("TestEvent"));
    }
}
