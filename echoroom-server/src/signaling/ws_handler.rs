use crate::relay::RelayCommand;
use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use echoroom_core::{ClientMessage, ConnectionId, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    // Identity is minted here, never taken from the client.
    let connection_id = ConnectionId::new();
    info!("New signaling connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_connection(connection_id.clone(), tx);
    service.send(
        &connection_id,
        &ServerMessage::Welcome {
            connection_id: connection_id.clone(),
            ice_servers: service.ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let connection_id = connection_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            let cmd = RelayCommand::Incoming {
                                from: connection_id.clone(),
                                message,
                            };
                            if let Err(e) = service.relay_tx.send(cmd).await {
                                error!("Relay loop gone: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid client message from {}: {:?}", connection_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_connection(&connection_id);
    // The departure must reach the relay even when the send half died first
    // and the receive task was aborted mid-loop.
    let _ = service
        .relay_tx
        .send(RelayCommand::Disconnected {
            from: connection_id.clone(),
        })
        .await;
    info!("Signaling connection closed: {}", connection_id);
}
