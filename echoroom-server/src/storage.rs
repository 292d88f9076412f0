use async_trait::async_trait;
use echoroom_core::{ChatMessage, RoomId};
use tracing::debug;

/// Persistence hook for chat. The relay fires and forgets; nothing in the
/// signaling path waits on a store, and there is no readback surface.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn persist(&self, room: &RoomId, message: &ChatMessage);
}

/// Default store: discards messages, keeps a debug trace.
pub struct NullMessageStore;

#[async_trait]
impl MessageStore for NullMessageStore {
    async fn persist(&self, room: &RoomId, message: &ChatMessage) {
        debug!(
            "Discarding chat message for room '{}' from {}",
            room, message.from
        );
    }
}
