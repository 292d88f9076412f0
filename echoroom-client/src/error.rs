use crate::media::MediaError;
use crate::transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Join never proceeds without local media; see the acquisition order in
    /// `RoomClient::connect`.
    #[error("media acquisition failed: {0}")]
    Media(#[from] MediaError),

    #[error("signaling connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("signaling link closed")]
    LinkClosed,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
