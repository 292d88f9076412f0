use crate::media::TrackKind;
use echoroom_core::{ConnectionId, IceCandidate};

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTrackInfo {
    pub id: String,
    pub kind: TrackKind,
}

/// Events a transport pushes into the session loop. Everything async about a
/// peer connection (ICE trickle, state changes, inbound tracks) arrives here.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected(ConnectionId),
    Disconnected(ConnectionId),
    CandidateGenerated(ConnectionId, IceCandidate),
    RemoteTrack(ConnectionId, RemoteTrackInfo),
}
