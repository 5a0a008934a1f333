//! The event queue connecting the Worker Pool and Scheduler to the
//! Dispatcher's single consuming loop.
//!
//! Grounded on `revaer-events::routing::EventBus`'s split between a
//! cloneable sender handle and a single owned receiver, simplified from a
//! broadcast (many readers) to an mpsc (one reader: the Dispatcher), since
//! the item graph here is mutated only on the dispatcher thread.

use arbor_model::MediaItem;
use arbor_router::Emitter;
use tokio::sync::mpsc;

/// One event awaiting the router's decision: an item, and who emitted it.
#[derive(Debug, Clone)]
pub struct Event {
    /// Who produced `item`.
    pub emitter: Emitter,
    /// The item to merge and route.
    pub item: MediaItem,
}

/// Cloneable handle used by the Worker Pool, Scheduler, and any external
/// caller (e.g. a CLI `add` command) to enqueue events for the Dispatcher.
#[derive(Clone)]
pub struct EventQueueHandle {
    sender: mpsc::UnboundedSender<Event>,
}

impl EventQueueHandle {
    /// Enqueue `item` as emitted by `emitter`. Never blocks: the queue is
    /// unbounded, matching the original's unbounded `Queue`.
    pub fn enqueue(&self, emitter: Emitter, item: MediaItem) {
        // A closed receiver only happens once the Dispatcher has shut
        // down; dropping the event in that case is the correct behavior.
        let _ = self.sender.send(Event { emitter, item });
    }
}

/// Construct a fresh queue, returning the Dispatcher-side receiver and a
/// cloneable sender handle.
#[must_use]
pub fn channel() -> (EventQueueHandle, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventQueueHandle { sender: tx }, rx)
}
