use serde::Serialize;
use tokio::sync::broadcast;
use tracing::warn;

use crate::ride::{Ride, RideStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EventKind {
    /// The ride moved one step forward.
    Transition,
    /// The ride reached `completed`; carries the final snapshot.
    Completed(Box<Ride>),
    Cancelled,
    /// A side effect failed; the local status still advanced.
    Warning(String),
}

/// Notification pushed to subscribers of a tracked ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleEvent {
    pub ride_id: u64,
    pub status: RideStatus,
    pub eta_minutes: u32,
    pub message: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl LifecycleEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Completed(_) | EventKind::Cancelled)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.kind, EventKind::Warning(_))
    }
}

/// Finite stream of one ride's lifecycle events.
///
/// Ends after the terminal event, or once the simulator is gone.
pub struct LifecycleEvents {
    rx: broadcast::Receiver<LifecycleEvent>,
    done: bool,
}

impl LifecycleEvents {
    pub(crate) fn new(rx: broadcast::Receiver<LifecycleEvent>) -> Self {
        Self { rx, done: false }
    }

    /// A stream that yields nothing; used for rides that are already over.
    pub(crate) fn finished(rx: broadcast::Receiver<LifecycleEvent>) -> Self {
        Self { rx, done: true }
    }

    pub async fn next(&mut self) -> Option<LifecycleEvent> {
        if self.done {
            return None;
        }
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    self.done = event.is_terminal();
                    return Some(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "lifecycle subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.done = true;
                    return None;
                }
            }
        }
    }

    /// Drain the stream to its end.
    pub async fn collect(mut self) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: RideStatus, kind: EventKind) -> LifecycleEvent {
        LifecycleEvent {
            ride_id: 7,
            status,
            eta_minutes: 0,
            message: String::new(),
            kind,
        }
    }

    #[tokio::test]
    async fn stream_ends_after_terminal_event() {
        let (tx, rx) = broadcast::channel(8);
        let mut events = LifecycleEvents::new(rx);
        tx.send(event(RideStatus::Assigned, EventKind::Transition)).unwrap();
        tx.send(event(RideStatus::Cancelled, EventKind::Cancelled)).unwrap();
        tx.send(event(RideStatus::Cancelled, EventKind::Warning("late".into())))
            .unwrap();

        assert_eq!(events.next().await.unwrap().status, RideStatus::Assigned);
        assert!(events.next().await.unwrap().is_terminal());
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_ends_when_sender_dropped() {
        let (tx, rx) = broadcast::channel::<LifecycleEvent>(8);
        drop(tx);
        assert!(LifecycleEvents::new(rx).collect().await.is_empty());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(event(RideStatus::Arriving, EventKind::Transition)).unwrap();
        assert_eq!(json["kind"], "transition");
        assert_eq!(json["status"], "arriving");
    }
}
