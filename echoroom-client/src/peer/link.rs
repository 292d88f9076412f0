use crate::transport::{PeerTransport, RemoteTrackInfo};
use echoroom_core::ConnectionId;

/// Which side of the SDP exchange this link plays. The newcomer dials every
/// existing member, so the initiator is always the one who joined later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Initiator side, local offer being produced.
    Offering,
    /// Initiator side, offer sent, waiting for the remote answer.
    AwaitingAnswer,
    /// Responder side, remote offer received and answered.
    Offered,
    /// SDP exchange complete on either side, ICE still in flight.
    Answered,
    /// Transport reported a live connection.
    Connected,
    /// Track swap in progress on an established link.
    Renegotiating,
    Closed,
}

/// One live connection to a remote participant.
pub struct PeerLink {
    pub remote: ConnectionId,
    pub name: String,
    pub avatar_url: String,
    pub role: LinkRole,
    pub state: LinkState,
    pub remote_screen_sharing: bool,
    pub remote_tracks: Vec<RemoteTrackInfo>,
    pub transport: Box<dyn PeerTransport>,
}

impl std::fmt::Debug for PeerLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerLink")
            .field("remote", &self.remote)
            .field("name", &self.name)
            .field("avatar_url", &self.avatar_url)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("remote_screen_sharing", &self.remote_screen_sharing)
            .field("remote_tracks", &self.remote_tracks)
            .finish_non_exhaustive()
    }
}

impl PeerLink {
    pub fn new(
        remote: ConnectionId,
        name: impl Into<String>,
        avatar_url: impl Into<String>,
        role: LinkRole,
        transport: Box<dyn PeerTransport>,
    ) -> Self {
        let state = match role {
            LinkRole::Initiator => LinkState::Offering,
            LinkRole::Responder => LinkState::Offered,
        };
        Self {
            remote,
            name: name.into(),
            avatar_url: avatar_url.into(),
            role,
            state,
            remote_screen_sharing: false,
            remote_tracks: Vec::new(),
            transport,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state != LinkState::Closed
    }
}
