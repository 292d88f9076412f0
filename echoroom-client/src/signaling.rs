use crate::error::ClientError;
use echoroom_core::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

const INBOUND_BUFFER: usize = 64;

/// The client half of the signaling socket. Outbound messages go through an
/// unbounded queue so sends never block the session loop; the socket is
/// closed once every sender clone is gone and the queue has drained, which
/// is what lets a final Leave flush before teardown.
pub struct SignalingLink {
    outbound: mpsc::UnboundedSender<ClientMessage>,
}

impl SignalingLink {
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<ServerMessage>), ClientError> {
        let (socket, _) = connect_async(url).await?;
        debug!("Signaling socket to {} is open", url);
        let (mut sink, mut source) = socket.split();

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (inbound_tx, inbound_rx) = mpsc::channel::<ServerMessage>(INBOUND_BUFFER);

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to serialize outbound message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::text(text)).await {
                    warn!("Signaling send failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(message) => {
                                if inbound_tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Unreadable server message: {}", e),
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Signaling socket error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                outbound: outbound_tx,
            },
            inbound_rx,
        ))
    }

    /// Best effort: once the writer task is gone there is nobody left to
    /// tell anyway.
    pub fn send(&self, message: ClientMessage) {
        let _ = self.outbound.send(message);
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<ClientMessage> {
        self.outbound.clone()
    }
}
