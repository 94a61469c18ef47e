use otpgate_core::{EventSink, GateEvent};
use tokio::sync::broadcast;

/// Fans gate events out to any number of subscribers.
///
/// Emitting never blocks; with no subscriber attached events are dropped,
/// and slow subscribers see `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<GateEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: GateEvent) {
        // An error only means nobody is listening
        let _ = self.sender.send(event);
    }
}
