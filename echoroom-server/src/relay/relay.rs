use crate::relay::command::RelayCommand;
use crate::relay::output::SignalingOutput;
use crate::room::{JoinOutcome, RoomRegistry};
use crate::storage::MessageStore;
use chrono::Utc;
use echoroom_core::{
    ChatMessage, ClientMessage, ConnectionId, IceCandidate, Participant, ParticipantProfile,
    RoomId, ServerMessage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The signaling relay. One task owns the registry and consumes commands
/// sequentially, so every handler runs to completion before the next starts.
/// SDP and candidate payloads pass through opaque; the relay only decides
/// whether a delivery is allowed and stamps the sender identity.
pub struct Relay {
    registry: RoomRegistry,
    output: Arc<dyn SignalingOutput>,
    store: Arc<dyn MessageStore>,
    command_rx: mpsc::Receiver<RelayCommand>,
}

impl Relay {
    pub fn new(
        registry: RoomRegistry,
        output: Arc<dyn SignalingOutput>,
        store: Arc<dyn MessageStore>,
        command_rx: mpsc::Receiver<RelayCommand>,
    ) -> Self {
        Self {
            registry,
            output,
            store,
            command_rx,
        }
    }

    pub async fn run(mut self) {
        info!("Relay loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RelayCommand::Incoming { from, message } => {
                    self.handle_message(from, message).await;
                }
                RelayCommand::Disconnected { from } => {
                    self.handle_leave(from).await;
                }
            }
        }

        info!("Relay loop finished");
    }

    async fn handle_message(&mut self, from: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::Join { room, profile } => self.handle_join(from, room, profile).await,
            ClientMessage::Offer { to, sdp } => self.relay_offer(from, to, sdp).await,
            ClientMessage::Answer { to, sdp } => self.relay_answer(from, to, sdp).await,
            ClientMessage::Candidate { to, candidate } => {
                self.relay_candidate(from, to, candidate).await;
            }
            ClientMessage::Chat { text } => self.handle_chat(from, text).await,
            ClientMessage::Presence { mic_on, cam_on } => {
                self.handle_presence(from, mic_on, cam_on).await;
            }
            ClientMessage::ScreenShare { active } => {
                self.handle_screen_share(from, active).await;
            }
            ClientMessage::Leave => self.handle_leave(from).await,
        }
    }

    async fn handle_join(&mut self, from: ConnectionId, room: RoomId, profile: ParticipantProfile) {
        match self.registry.join(room.clone(), from.clone(), profile) {
            JoinOutcome::Joined {
                others,
                roster,
                departed,
            } => {
                if let Some(dep) = departed {
                    info!("{} switched rooms, leaving '{}'", from, dep.room);
                    self.broadcast_roster(&dep.remaining).await;
                }

                info!("{} joined room '{}' ({} member(s))", from, room, roster.len());
                self.output
                    .deliver(from, ServerMessage::ExistingPeers { peers: others })
                    .await;
                self.broadcast_roster(&roster).await;
            }
            JoinOutcome::Rejoined { roster } => {
                // Re-sending ExistingPeers here would provoke re-dialing, so a
                // retried join only refreshes the joiner's roster view.
                debug!("Duplicate join from {} for room '{}'", from, room);
                self.output
                    .deliver(
                        from,
                        ServerMessage::Roster {
                            participants: roster,
                        },
                    )
                    .await;
            }
        }
    }

    async fn handle_leave(&mut self, from: ConnectionId) {
        let Some(departure) = self.registry.leave(&from) else {
            return;
        };
        info!("{} left room '{}'", from, departure.room);
        self.broadcast_roster(&departure.remaining).await;
    }

    /// Relay is allowed only between members of one room. Violations drop the
    /// envelope without any reply, so a sender learns nothing about rooms or
    /// connections it cannot see.
    fn relay_allowed(&self, from: &ConnectionId, to: &ConnectionId) -> bool {
        let Some(room) = self.registry.room_of(from) else {
            debug!("Dropping signal from roomless connection {}", from);
            return false;
        };
        if !self.registry.is_member(room, to) {
            debug!("Dropping signal from {} to non-member {}", from, to);
            return false;
        }
        true
    }

    async fn relay_offer(&self, from: ConnectionId, to: ConnectionId, sdp: String) {
        if !self.relay_allowed(&from, &to) {
            return;
        }
        // The offer carries the dialer's profile so the responder can render
        // the newcomer before the next roster refresh.
        let Some(sender) = self.registry.participant(&from) else {
            return;
        };
        let message = ServerMessage::Offer {
            from: from.clone(),
            name: sender.name.clone(),
            avatar_url: sender.avatar_url.clone(),
            sdp,
        };
        debug!("Relaying offer {} -> {}", from, to);
        self.output.deliver(to, message).await;
    }

    async fn relay_answer(&self, from: ConnectionId, to: ConnectionId, sdp: String) {
        if !self.relay_allowed(&from, &to) {
            return;
        }
        debug!("Relaying answer {} -> {}", from, to);
        self.output
            .deliver(to, ServerMessage::Answer { from, sdp })
            .await;
    }

    async fn relay_candidate(&self, from: ConnectionId, to: ConnectionId, candidate: IceCandidate) {
        if !self.relay_allowed(&from, &to) {
            return;
        }
        self.output
            .deliver(to, ServerMessage::Candidate { from, candidate })
            .await;
    }

    async fn handle_chat(&self, from: ConnectionId, text: String) {
        let Some(room) = self.registry.room_of(&from).cloned() else {
            warn!("Dropping chat from roomless connection {}", from);
            return;
        };
        let Some(sender) = self.registry.participant(&from) else {
            return;
        };

        let message = ChatMessage {
            from: from.clone(),
            sender: sender.name.clone(),
            text,
            sent_at: Utc::now(),
        };

        // Persistence never blocks the signaling path.
        let store = self.store.clone();
        let stored = message.clone();
        let stored_room = room.clone();
        tokio::spawn(async move {
            store.persist(&stored_room, &stored).await;
        });

        for member in self.registry.roster(&room) {
            self.output
                .deliver(
                    member.id,
                    ServerMessage::Chat {
                        message: message.clone(),
                    },
                )
                .await;
        }
    }

    async fn handle_presence(&mut self, from: ConnectionId, mic_on: bool, cam_on: bool) {
        let Some((_, roster)) = self.registry.update_presence(&from, mic_on, cam_on) else {
            debug!("Dropping presence update from roomless connection {}", from);
            return;
        };
        self.broadcast_roster(&roster).await;
    }

    /// Screen-share presence fans out to everyone else in the room. These
    /// events are the only way remote participants learn about sharing.
    async fn handle_screen_share(&self, from: ConnectionId, active: bool) {
        let Some(room) = self.registry.room_of(&from) else {
            warn!("Dropping screen-share event from roomless connection {}", from);
            return;
        };
        let Some(sender) = self.registry.participant(&from) else {
            return;
        };
        let name = sender.name.clone();
        info!(
            "{} {} screen sharing in '{}'",
            from,
            if active { "started" } else { "stopped" },
            room
        );

        for member in self.registry.roster(room) {
            if member.id == from {
                continue;
            }
            self.output
                .deliver(
                    member.id,
                    ServerMessage::ScreenShare {
                        from: from.clone(),
                        name: name.clone(),
                        active,
                    },
                )
                .await;
        }
    }

    async fn broadcast_roster(&self, roster: &[Participant]) {
        for member in roster {
            self.output
                .deliver(
                    member.id.clone(),
                    ServerMessage::Roster {
                        participants: roster.to_vec(),
                    },
                )
                .await;
        }
    }
}
