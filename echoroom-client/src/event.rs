use crate::transport::RemoteTrackInfo;
use echoroom_core::{ChatMessage, ConnectionId, Participant};

/// Session happenings surfaced to the embedding UI. Rendering is entirely the
/// embedder's problem; this crate only reports.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    Joined {
        connection_id: ConnectionId,
    },
    RosterUpdated {
        participants: Vec<Participant>,
    },
    PeerConnected {
        id: ConnectionId,
    },
    PeerDisconnected {
        id: ConnectionId,
    },
    RemoteTrackAdded {
        id: ConnectionId,
        track: RemoteTrackInfo,
    },
    Chat {
        message: ChatMessage,
    },
    /// Remote screen-share presence. These events are the only source of
    /// truth; nothing is inferred from the media itself.
    ScreenShareChanged {
        id: ConnectionId,
        name: String,
        active: bool,
    },
    LocalScreenShareStarted,
    LocalScreenShareStopped,
    /// The user declined the capture picker. Not persistent; asking again
    /// is fine.
    ScreenShareDenied,
    /// Replacement and the full rebuild both failed; sharing stays off for
    /// the rest of the session.
    ScreenShareUnavailable,
    Left,
    ConnectionLost,
}

/// Verbs the embedding UI can issue while the session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    SetMicEnabled(bool),
    SetCamEnabled(bool),
    StartScreenShare,
    StopScreenShare,
    SendChat(String),
    Leave,
}
