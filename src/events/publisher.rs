use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::broadcast;

/// Fan-out of run events to any number of subscribers
///
/// Publishing never blocks. Events sent while nobody is subscribed are dropped, and a
/// subscriber that falls more than `capacity` events behind sees `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

#[derive(Debug, Clone)]
pub struct PublishedEvent {
    /// Prefixed event name, e.g. `discovery.work_unit_created`
    pub name: String,
    pub context: Value,
    pub published_at: DateTime<Utc>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Send `context` as event `name`, returning how many subscribers it reached
    pub fn publish(&self, name: impl Into<String>, context: Value) -> usize {
        let event = PublishedEvent {
            name: name.into(),
            context,
            published_at: Utc::now(),
        };
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
