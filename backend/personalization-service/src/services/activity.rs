//! Live activity fan-out
//!
//! Every tracked interaction is published once and delivered to all dashboard
//! sockets subscribed at that moment. Subscribers that fall more than the
//! channel capacity behind skip the missed events; publishers never wait.

use crate::metrics::ACTIVITY_EVENTS_PUBLISHED_TOTAL;
use crate::models::ActivityEvent;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct ActivityHub {
    sender: broadcast::Sender<ActivityEvent>,
}

impl ActivityHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Deliver `event` to current subscribers. Returns how many received it;
    /// zero subscribers is not an error.
    pub fn publish(&self, event: ActivityEvent) -> usize {
        ACTIVITY_EVENTS_PUBLISHED_TOTAL.inc();
        self.sender.send(event).unwrap_or(0)
    }

    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
