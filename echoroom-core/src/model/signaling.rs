use crate::model::chat::ChatMessage;
use crate::model::connection::ConnectionId;
use crate::model::participant::{Participant, ParticipantProfile};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Trickle ICE candidate as produced by the transport. Opaque to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
}

/// Envelopes a client may send. None of them carries a sender id: the server
/// derives `from` out of the connection the frame arrived on, so a spoofed
/// sender is not even representable on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    Join {
        room: RoomId,
        profile: ParticipantProfile,
    },
    Offer {
        to: ConnectionId,
        sdp: String,
    },
    Answer {
        to: ConnectionId,
        sdp: String,
    },
    Candidate {
        to: ConnectionId,
        candidate: IceCandidate,
    },
    Chat {
        text: String,
    },
    Presence {
        mic_on: bool,
        cam_on: bool,
    },
    ScreenShare {
        active: bool,
    },
    Leave,
}

/// Envelopes delivered to clients. Offer, answer and candidate stay distinct
/// variants: only a delivered offer may allocate a peer link on the receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    },
    /// Members already in the room, join order, never including the
    /// recipient. The newcomer dials exactly these.
    ExistingPeers {
        peers: Vec<Participant>,
    },
    Roster {
        participants: Vec<Participant>,
    },
    Offer {
        from: ConnectionId,
        name: String,
        avatar_url: String,
        sdp: String,
    },
    Answer {
        from: ConnectionId,
        sdp: String,
    },
    Candidate {
        from: ConnectionId,
        candidate: IceCandidate,
    },
    Chat {
        message: ChatMessage,
    },
    ScreenShare {
        from: ConnectionId,
        name: String,
        active: bool,
    },
}
