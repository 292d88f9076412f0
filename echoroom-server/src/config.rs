use echoroom_core::IceServerConfig;
use std::net::SocketAddr;

pub const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// STUN/TURN bootstrap handed to every client in its welcome frame.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8000)),
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_URL)],
        }
    }
}
