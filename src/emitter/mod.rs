//! Bridge from lifecycle events to string-keyed listeners.

use event_emitter_rs::EventEmitter;
use tracing::warn;

use crate::lifecycle::{LifecycleEvent, LifecycleEvents};

/// Listener key for an event: `ride.<status>`, or `ride.warning`.
pub fn event_key(event: &LifecycleEvent) -> String {
    if event.is_warning() {
        "ride.warning".to_string()
    } else {
        format!("ride.{}", event.status)
    }
}

/// Fans lifecycle events out to listeners registered by key. Listeners get
/// the event as JSON and run on the emitter's own threads.
///
/// # Example
///
/// ```ignore
/// use swiftride::emitter::NotificationEmitter;
///
/// let mut emitter = NotificationEmitter::new();
/// emitter.on("ride.arriving", |json| println!("toast: {}", json));
/// emitter.forward(engine.rides().subscribe(ride_id).await?).await;
/// ```
pub struct NotificationEmitter {
    event_emitter: EventEmitter,
}

impl NotificationEmitter {
    pub fn new() -> Self {
        Self {
            event_emitter: EventEmitter::new(),
        }
    }

    pub fn on<F>(&mut self, key: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.event_emitter.on(key, listener);
    }

    /// Emit one event under its key.
    pub fn emit(&mut self, event: &LifecycleEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => {
                self.event_emitter.emit(&event_key(event), payload);
            }
            Err(err) => warn!(ride_id = event.ride_id, error = %err, "could not encode event"),
        }
    }

    /// Emit every event of a stream until it ends; returns how many.
    pub async fn forward(&mut self, mut events: LifecycleEvents) -> usize {
        let mut forwarded = 0;
        while let Some(event) = events.next().await {
            self.emit(&event);
            forwarded += 1;
        }
        forwarded
    }
}

impl Default for NotificationEmitter {
    fn default() -> Self {
        Self::new()
    }
}
