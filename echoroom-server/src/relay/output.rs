use async_trait::async_trait;
use echoroom_core::{ConnectionId, ServerMessage};

/// Delivery side of the relay. The production implementation queues JSON on
/// the per-connection WebSocket channel; tests record envelopes instead.
/// Delivery to a vanished connection is a logged no-op, never an error.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn deliver(&self, to: ConnectionId, message: ServerMessage);
}
