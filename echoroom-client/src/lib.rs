pub mod config;
pub mod error;
pub mod event;
pub mod media;
pub mod peer;
pub mod room_client;
pub mod signaling;
pub mod transport;

pub use config::ClientConfig;
pub use error::ClientError;
pub use event::{ClientCommand, RoomEvent};
pub use room_client::{RoomClient, RoomHandle};
