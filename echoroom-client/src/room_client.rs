use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::event::{ClientCommand, RoomEvent};
use crate::media::{MediaController, MediaDevices};
use crate::peer::PeerManager;
use crate::signaling::SignalingLink;
use crate::transport::{PeerTransportFactory, TransportEvent};
use echoroom_core::{ClientMessage, ConnectionId, IceServerConfig, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

const COMMAND_BUFFER: usize = 32;
const TRANSPORT_BUFFER: usize = 256;

/// The embedder's side of a running session: commands in, events out.
pub struct RoomHandle {
    pub commands: mpsc::Sender<ClientCommand>,
    pub events: mpsc::UnboundedReceiver<RoomEvent>,
}

impl RoomHandle {
    pub async fn command(&self, command: ClientCommand) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::LinkClosed)
    }

    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        self.events.recv().await
    }
}

/// One participant's session: local media, the signaling socket and the mesh
/// of peer links, driven by a single loop. Media comes first; a client that
/// cannot capture never even connects.
pub struct RoomClient {
    config: ClientConfig,
    link: SignalingLink,
    server_rx: mpsc::Receiver<ServerMessage>,
    command_rx: mpsc::Receiver<ClientCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    manager: PeerManager,
    media: MediaController,
    event_tx: mpsc::UnboundedSender<RoomEvent>,
    connection_id: Option<ConnectionId>,
    ice_servers: Vec<IceServerConfig>,
    share_unavailable: bool,
}

impl RoomClient {
    pub async fn connect(
        config: ClientConfig,
        devices: Arc<dyn MediaDevices>,
        factory: Arc<dyn PeerTransportFactory>,
    ) -> Result<(Self, RoomHandle), ClientError> {
        let mut media = MediaController::new(devices);
        media.acquire().await?;

        let (link, server_rx) = SignalingLink::connect(&config.server_url).await?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let manager = PeerManager::new(factory, link.sender(), transport_tx, event_tx.clone());

        let client = Self {
            config,
            link,
            server_rx,
            command_rx,
            transport_rx,
            manager,
            media,
            event_tx,
            connection_id: None,
            ice_servers: Vec::new(),
            share_unavailable: false,
        };
        let handle = RoomHandle {
            commands: command_tx,
            events: event_rx,
        };
        Ok((client, handle))
    }

    pub async fn run(mut self) {
        info!("Session loop for room {} starting", self.config.room);
        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_server_message(message).await,
                        None => {
                            warn!("Signaling link closed by the server");
                            self.teardown(false).await;
                            let _ = self.event_tx.send(RoomEvent::ConnectionLost);
                            break;
                        }
                    }
                }
                Some(event) = self.transport_rx.recv() => {
                    self.manager.handle_transport_event(event).await;
                }
                command = self.command_rx.recv() => {
                    // A dropped handle reads as a leave.
                    let command = command.unwrap_or(ClientCommand::Leave);
                    if self.handle_command(command).await {
                        break;
                    }
                }
                _ = self.media.screen_track_ended() => {
                    info!("Screen track ended outside the session, stopping share");
                    self.stop_screen_share().await;
                }
            }
        }
        info!("Session loop for room {} finished", self.config.room);
    }

    async fn handle_server_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Welcome {
                connection_id,
                ice_servers,
            } => {
                info!("Registered with the server as {}", connection_id);
                self.connection_id = Some(connection_id.clone());
                self.ice_servers = ice_servers;
                self.link.send(ClientMessage::Join {
                    room: self.config.room.clone(),
                    profile: self.config.profile.clone(),
                });
                let _ = self.event_tx.send(RoomEvent::Joined { connection_id });
            }
            ServerMessage::ExistingPeers { peers } => {
                let Some(stream) = self.media.stream().cloned() else {
                    warn!("Peer list arrived before local media was ready, ignoring");
                    return;
                };
                info!("Dialing {} existing member(s)", peers.len());
                for peer in &peers {
                    self.manager.dial(peer, &stream, &self.ice_servers).await;
                }
            }
            ServerMessage::Roster { participants } => {
                self.manager.sync_roster(&participants).await;
                let _ = self
                    .event_tx
                    .send(RoomEvent::RosterUpdated { participants });
            }
            ServerMessage::Offer {
                from,
                name,
                avatar_url,
                sdp,
            } => {
                let Some(stream) = self.media.stream().cloned() else {
                    warn!("Offer from {} before local media was ready, ignoring", from);
                    return;
                };
                self.manager
                    .handle_offer(from, name, avatar_url, &sdp, &stream, &self.ice_servers)
                    .await;
            }
            ServerMessage::Answer { from, sdp } => {
                self.manager.handle_answer(from, &sdp).await;
            }
            ServerMessage::Candidate { from, candidate } => {
                self.manager.handle_candidate(from, &candidate).await;
            }
            ServerMessage::Chat { message } => {
                let _ = self.event_tx.send(RoomEvent::Chat { message });
            }
            ServerMessage::ScreenShare { from, name, active } => {
                self.manager.set_remote_screen_sharing(&from, active);
                let _ = self.event_tx.send(RoomEvent::ScreenShareChanged {
                    id: from,
                    name,
                    active,
                });
            }
        }
    }

    /// Returns true when the session is over and the loop should exit.
    async fn handle_command(&mut self, command: ClientCommand) -> bool {
        match command {
            ClientCommand::SetMicEnabled(enabled) => {
                self.media.set_mic_enabled(enabled);
                self.send_presence();
            }
            ClientCommand::SetCamEnabled(enabled) => {
                self.media.set_cam_enabled(enabled);
                self.send_presence();
            }
            ClientCommand::StartScreenShare => {
                self.start_screen_share().await;
            }
            ClientCommand::StopScreenShare => {
                if self.media.is_sharing() {
                    self.stop_screen_share().await;
                }
            }
            ClientCommand::SendChat(text) => {
                self.link.send(ClientMessage::Chat { text });
            }
            ClientCommand::Leave => {
                self.teardown(true).await;
                let _ = self.event_tx.send(RoomEvent::Left);
                return true;
            }
        }
        false
    }

    fn send_presence(&self) {
        self.link.send(ClientMessage::Presence {
            mic_on: self.media.mic_enabled(),
            cam_on: self.media.cam_enabled(),
        });
    }

    async fn start_screen_share(&mut self) {
        if self.media.is_sharing() {
            return;
        }
        if self.share_unavailable {
            warn!("Screen sharing already failed this session, not retrying");
            let _ = self.event_tx.send(RoomEvent::ScreenShareUnavailable);
            return;
        }

        let screen = match self.media.start_screen_share().await {
            Ok(track) => track,
            Err(e) => {
                // Denied capture leaves the camera running and does not
                // latch; the user may simply try again.
                info!("Screen capture did not start: {}", e);
                let _ = self.event_tx.send(RoomEvent::ScreenShareDenied);
                return;
            }
        };

        let (replaced, failed) = self.manager.replace_outbound_video(&screen).await;
        if failed > replaced {
            warn!(
                "Track swap failed on {} of {} links, rebuilding the mesh",
                failed,
                replaced + failed
            );
            let Some(stream) = self.media.stream().cloned() else {
                return;
            };
            if !self.manager.rebuild_all(&stream, &self.ice_servers).await {
                warn!("Mesh rebuild failed, screen sharing disabled for this session");
                self.share_unavailable = true;
                if let Err(e) = self.media.stop_screen_share().await {
                    warn!("Camera restore after failed share: {}", e);
                }
                let _ = self.event_tx.send(RoomEvent::ScreenShareUnavailable);
                return;
            }
        }

        self.link.send(ClientMessage::ScreenShare { active: true });
        let _ = self.event_tx.send(RoomEvent::LocalScreenShareStarted);
    }

    async fn stop_screen_share(&mut self) {
        match self.media.stop_screen_share().await {
            Ok(camera) => {
                let (replaced, failed) = self.manager.replace_outbound_video(&camera).await;
                if failed > replaced {
                    if let Some(stream) = self.media.stream().cloned() {
                        self.manager.rebuild_all(&stream, &self.ice_servers).await;
                    }
                }
            }
            Err(e) => {
                warn!("Camera did not come back after screen share: {}", e);
            }
        }
        // Peers hear about the share ending even when the camera is gone.
        self.link.send(ClientMessage::ScreenShare { active: false });
        let _ = self.event_tx.send(RoomEvent::LocalScreenShareStopped);
    }

    async fn teardown(&mut self, notify: bool) {
        // Links die first, then local tracks, and only then does the server
        // get told.
        self.manager.shutdown().await;
        self.media.stop_all();
        if notify {
            self.link.send(ClientMessage::Leave);
        }
    }
}
