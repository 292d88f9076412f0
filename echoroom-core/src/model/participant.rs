use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};

/// What a client declares about itself when joining. The server never trusts
/// more than this; identity comes from the connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantProfile {
    pub name: String,
    pub avatar_url: String,
    pub mic_on: bool,
    pub cam_on: bool,
}

impl ParticipantProfile {
    pub fn new(name: impl Into<String>, avatar_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: avatar_url.into(),
            mic_on: true,
            cam_on: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: ConnectionId,
    pub name: String,
    pub avatar_url: String,
    pub mic_on: bool,
    pub cam_on: bool,
}

impl Participant {
    pub fn from_profile(id: ConnectionId, profile: ParticipantProfile) -> Self {
        Self {
            id,
            name: profile.name,
            avatar_url: profile.avatar_url,
            mic_on: profile.mic_on,
            cam_on: profile.cam_on,
        }
    }
}
