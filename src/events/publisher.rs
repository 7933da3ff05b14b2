use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcast publisher for component lifecycle events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event with the given name and context.
    ///
    /// Publishing without subscribers is not an error.
    pub fn publish(&self, event_name: impl Into<String>, context: Value) {
        let event = PublishedEvent {
            name: event_name.into(),
            context,
            published_at: chrono::Utc::now(),
        };

        if self.sender.send(event).is_err() {
            tracing::trace!("No lifecycle event subscribers");
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(crate::constants::system::EVENT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_without_subscribers() {
        let publisher = EventPublisher::new(4);
        publisher.publish("component.state_changed", json!({}));
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_receives_events() {
        let publisher = EventPublisher::new(4);
        let mut receiver = publisher.subscribe();
        publisher.publish("service.registered", json!({"specifications": ["Sensor"]}));

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.name, "service.registered");
        assert_eq!(event.context["specifications"][0], "Sensor");
    }

    #[test]
    fn test_zero_capacity_still_delivers() {
        let publisher = EventPublisher::new(0);
        let mut receiver = publisher.subscribe();
        publisher.publish("component.state_changed", json!({"to": "VALID"}));

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.context["to"], "VALID");
    }
}
