use crate::media::{LocalStream, MediaTrack};
use crate::transport::event::TransportEvent;
use async_trait::async_trait;
use echoroom_core::{ConnectionId, IceCandidate, IceServerConfig};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("webrtc failure: {0}")]
    Webrtc(#[from] webrtc::Error),

    #[error("track has no sample backing")]
    UnsupportedTrack,

    #[error("transport is closed")]
    Closed,
}

/// One leg of the mesh. Implementations own the underlying connection and
/// push `TransportEvent`s into the channel handed to the factory. SDP flows
/// through as opaque strings.
#[async_trait]
pub trait PeerTransport: Send {
    async fn create_offer(&mut self) -> Result<String, TransportError>;

    /// Applies a remote offer and returns the local answer SDP.
    async fn accept_offer(&mut self, sdp: &str) -> Result<String, TransportError>;

    async fn accept_answer(&mut self, sdp: &str) -> Result<(), TransportError>;

    async fn add_remote_candidate(&mut self, candidate: &IceCandidate)
    -> Result<(), TransportError>;

    /// Swaps the outbound video without tearing the connection down.
    async fn replace_video_track(&mut self, track: &MediaTrack) -> Result<(), TransportError>;

    async fn close(&mut self);
}

/// Builds one transport per remote, with the local stream attached before
/// any SDP is produced.
#[async_trait]
pub trait PeerTransportFactory: Send + Sync {
    async fn create(
        &self,
        remote: ConnectionId,
        stream: &LocalStream,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>, TransportError>;
}
