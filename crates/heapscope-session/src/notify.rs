use tokio::sync::broadcast;

/// Default capacity of the observer broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Notifications the session broadcasts to presentation-layer observers.
///
/// `Refreshed` is deliberately payload-free: observers re-read the live set
/// through the table's query surface instead of tracking deltas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A transport chunk was fully drained into the table.
    Refreshed,
    /// The emitter reported the outcome of its own relay handshake.
    Connected { success: bool },
    /// The transport closed and the table was cleared; `leaked` counts the
    /// objects that were still live.
    Closed { leaked: usize },
}

/// A broadcast channel receiver for session events.
pub type EventStream = broadcast::Receiver<SessionEvent>;

/// Fan-out handle for session events.
///
/// Clones share the same subscriber set, so a notifier handed to a fresh
/// session keeps feeding observers that subscribed before the session
/// existed.
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<SessionEvent>,
}

impl ChangeNotifier {
    /// Create a notifier whose subscribers may lag `capacity` events behind.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> EventStream {
        self.sender.subscribe()
    }

    /// Deliver an event to every current observer.
    pub fn fire(&self, event: SessionEvent) {
        // A failed send only means nobody is watching right now.
        let _ = self.sender.send(event);
    }

    /// Number of observers currently subscribed.
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
