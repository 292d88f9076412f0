use crate::relay::{RelayCommand, SignalingOutput};
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use echoroom_core::{ConnectionId, IceServerConfig, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Connection table shared between the WebSocket handlers and the relay.
/// Envelope routing decisions live in the relay; this only serializes and
/// queues frames for whoever is still attached.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) relay_tx: mpsc::Sender<RelayCommand>,
}

impl SignalingService {
    pub fn new(relay_tx: mpsc::Sender<RelayCommand>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
                ice_servers,
            }),
            relay_tx,
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_connection(&self, id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(id, tx);
    }

    pub fn remove_connection(&self, id: &ConnectionId) {
        self.inner.connections.remove(id);
    }

    pub fn send(&self, to: &ConnectionId, message: &ServerMessage) {
        let Some(connection) = self.inner.connections.get(to) else {
            warn!("Attempted to deliver to disconnected connection {}", to);
            return;
        };
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Err(e) = connection.send(Message::Text(json.into())) {
                    error!("Failed to queue WS frame for {}: {:?}", to, e);
                }
            }
            Err(e) => error!("Failed to serialize server message: {}", e),
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, to: ConnectionId, message: ServerMessage) {
        self.send(&to, &message);
    }
}
