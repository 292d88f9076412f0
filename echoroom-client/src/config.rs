use echoroom_core::{ParticipantProfile, RoomId};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// ws:// or wss:// URL of the signaling endpoint.
    pub server_url: String,
    pub room: RoomId,
    pub profile: ParticipantProfile,
}

impl ClientConfig {
    pub fn new(
        server_url: impl Into<String>,
        room: impl Into<RoomId>,
        profile: ParticipantProfile,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            room: room.into(),
            profile,
        }
    }
}
