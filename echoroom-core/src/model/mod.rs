mod chat;
mod connection;
mod participant;
mod room;
mod signaling;

pub use chat::ChatMessage;
pub use connection::ConnectionId;
pub use participant::{Participant, ParticipantProfile};
pub use room::RoomId;
pub use signaling::{ClientMessage, IceCandidate, IceServerConfig, ServerMessage};
