use crate::event::RoomEvent;
use crate::media::{LocalStream, MediaTrack};
use crate::peer::link::{LinkRole, LinkState, PeerLink};
use crate::peer::link_set::PeerLinkSet;
use crate::transport::{PeerTransportFactory, TransportEvent};
use echoroom_core::{ClientMessage, ConnectionId, IceCandidate, IceServerConfig, Participant};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Owns every peer link in the mesh. Signaling verdicts live here: who gets
/// dialed, which offers are duplicates, which answers are stale. The rule is
/// one link per remote, enforced at insert.
pub struct PeerManager {
    links: PeerLinkSet,
    factory: Arc<dyn PeerTransportFactory>,
    signal_tx: mpsc::UnboundedSender<ClientMessage>,
    transport_tx: mpsc::Sender<TransportEvent>,
    event_tx: mpsc::UnboundedSender<RoomEvent>,
}

impl PeerManager {
    pub fn new(
        factory: Arc<dyn PeerTransportFactory>,
        signal_tx: mpsc::UnboundedSender<ClientMessage>,
        transport_tx: mpsc::Sender<TransportEvent>,
        event_tx: mpsc::UnboundedSender<RoomEvent>,
    ) -> Self {
        Self {
            links: PeerLinkSet::new(),
            factory,
            signal_tx,
            transport_tx,
            event_tx,
        }
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_linked(&self, remote: &ConnectionId) -> bool {
        self.links.contains(remote)
    }

    pub fn link_state(&self, remote: &ConnectionId) -> Option<LinkState> {
        self.links.get(remote).map(|link| link.state)
    }

    /// Opens an initiator link to an existing room member and sends the
    /// offer. Only newcomers dial; members learn about the newcomer when the
    /// offer arrives.
    pub async fn dial(
        &mut self,
        peer: &Participant,
        stream: &LocalStream,
        ice_servers: &[IceServerConfig],
    ) {
        if self.links.contains(&peer.id) {
            warn!("Already linked to {}, not dialing again", peer.id);
            return;
        }
        self.open_link(
            peer.id.clone(),
            peer.name.clone(),
            peer.avatar_url.clone(),
            stream,
            ice_servers,
        )
        .await;
    }

    async fn open_link(
        &mut self,
        remote: ConnectionId,
        name: String,
        avatar_url: String,
        stream: &LocalStream,
        ice_servers: &[IceServerConfig],
    ) -> bool {
        let transport = match self
            .factory
            .create(
                remote.clone(),
                stream,
                ice_servers,
                self.transport_tx.clone(),
            )
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                warn!("Failed to create transport for {}: {}", remote, e);
                return false;
            }
        };

        let link = PeerLink::new(
            remote.clone(),
            name,
            avatar_url,
            LinkRole::Initiator,
            transport,
        );
        let offer = match self.links.insert_new(link) {
            Ok(link) => link.transport.create_offer().await,
            Err(mut rejected) => {
                // An inbound offer for the same remote won the race.
                rejected.transport.close().await;
                return false;
            }
        };

        match offer {
            Ok(sdp) => {
                if let Some(link) = self.links.get_mut(&remote) {
                    link.state = LinkState::AwaitingAnswer;
                }
                let _ = self.signal_tx.send(ClientMessage::Offer { to: remote, sdp });
                true
            }
            Err(e) => {
                warn!("Offer creation for {} failed: {}", remote, e);
                self.close_link(&remote, false).await;
                false
            }
        }
    }

    /// Answers an inbound offer with a fresh responder link. A second offer
    /// for a remote that already has a link is dropped whole; honoring it
    /// would tear down a working connection.
    pub async fn handle_offer(
        &mut self,
        from: ConnectionId,
        name: String,
        avatar_url: String,
        sdp: &str,
        stream: &LocalStream,
        ice_servers: &[IceServerConfig],
    ) {
        if self.links.contains(&from) {
            warn!("Offer from {} ignored: link already exists", from);
            return;
        }

        let transport = match self
            .factory
            .create(from.clone(), stream, ice_servers, self.transport_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                warn!("Failed to create transport for {}: {}", from, e);
                return;
            }
        };

        let link = PeerLink::new(from.clone(), name, avatar_url, LinkRole::Responder, transport);
        let answer = match self.links.insert_new(link) {
            Ok(link) => link.transport.accept_offer(sdp).await,
            Err(mut rejected) => {
                rejected.transport.close().await;
                return;
            }
        };

        match answer {
            Ok(sdp) => {
                if let Some(link) = self.links.get_mut(&from) {
                    link.state = LinkState::Answered;
                }
                let _ = self.signal_tx.send(ClientMessage::Answer { to: from, sdp });
            }
            Err(e) => {
                warn!("Failed to answer offer from {}: {}", from, e);
                self.close_link(&from, false).await;
            }
        }
    }

    /// Applies a remote answer to the link that is waiting for one. Answers
    /// for unknown remotes or links past the waiting state are dropped.
    pub async fn handle_answer(&mut self, from: ConnectionId, sdp: &str) {
        let Some(link) = self.links.get_mut(&from) else {
            warn!("Answer from unknown remote {}, dropping", from);
            return;
        };
        if link.state != LinkState::AwaitingAnswer {
            warn!("Stale answer from {} in state {:?}, dropping", from, link.state);
            return;
        }
        match link.transport.accept_answer(sdp).await {
            Ok(()) => link.state = LinkState::Answered,
            Err(e) => {
                warn!("Failed to apply answer from {}: {}", from, e);
                self.close_link(&from, true).await;
            }
        }
    }

    /// Feeds a trickled candidate to its link. A candidate never creates a
    /// link; without one it is dropped on the floor.
    pub async fn handle_candidate(&mut self, from: ConnectionId, candidate: &IceCandidate) {
        let Some(link) = self.links.get_mut(&from) else {
            warn!("Candidate for unknown remote {}, dropping", from);
            return;
        };
        if let Err(e) = link.transport.add_remote_candidate(candidate).await {
            warn!("Failed to add candidate from {}: {}", from, e);
        }
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected(remote) => {
                if let Some(link) = self.links.get_mut(&remote) {
                    link.state = LinkState::Connected;
                    info!("Link to {} ({}) is up", remote, link.name);
                    let _ = self.event_tx.send(RoomEvent::PeerConnected { id: remote });
                }
            }
            TransportEvent::Disconnected(remote) => {
                info!("Link to {} went down", remote);
                self.close_link(&remote, true).await;
            }
            TransportEvent::CandidateGenerated(remote, candidate) => {
                if self.links.contains(&remote) {
                    let _ = self
                        .signal_tx
                        .send(ClientMessage::Candidate { to: remote, candidate });
                }
            }
            TransportEvent::RemoteTrack(remote, track) => {
                if let Some(link) = self.links.get_mut(&remote) {
                    link.remote_tracks.push(track.clone());
                    let _ = self
                        .event_tx
                        .send(RoomEvent::RemoteTrackAdded { id: remote, track });
                }
            }
        }
    }

    /// Reconciles links against the server roster. Links to members no
    /// longer listed get closed; the roster never causes dialing.
    pub async fn sync_roster(&mut self, participants: &[Participant]) {
        for participant in participants {
            if let Some(link) = self.links.get_mut(&participant.id) {
                link.name = participant.name.clone();
                link.avatar_url = participant.avatar_url.clone();
            }
        }

        let vanished: Vec<ConnectionId> = self
            .links
            .ids()
            .into_iter()
            .filter(|id| !participants.iter().any(|p| &p.id == id))
            .collect();
        for id in vanished {
            info!("{} is gone from the roster, closing link", id);
            self.close_link(&id, true).await;
        }
    }

    pub fn set_remote_screen_sharing(&mut self, remote: &ConnectionId, active: bool) {
        if let Some(link) = self.links.get_mut(remote) {
            link.remote_screen_sharing = active;
        }
    }

    /// Swaps the outbound video track on every open link in place. Returns
    /// how many links took the swap and how many refused it.
    pub async fn replace_outbound_video(&mut self, track: &MediaTrack) -> (usize, usize) {
        let mut replaced = 0;
        let mut failed = 0;
        for link in self.links.iter_mut() {
            if !link.is_open() {
                continue;
            }
            let prior = link.state;
            if prior == LinkState::Connected {
                link.state = LinkState::Renegotiating;
            }
            match link.transport.replace_video_track(track).await {
                Ok(()) => replaced += 1,
                Err(e) => {
                    warn!("Track swap for {} failed: {}", link.remote, e);
                    failed += 1;
                }
            }
            if link.state == LinkState::Renegotiating {
                link.state = prior;
            }
        }
        (replaced, failed)
    }

    /// Tears every link down and dials each remote again with the current
    /// stream. The fallback path for when an in-place swap did not take.
    /// Returns false only when not a single remote could be re-dialed.
    pub async fn rebuild_all(
        &mut self,
        stream: &LocalStream,
        ice_servers: &[IceServerConfig],
    ) -> bool {
        let remotes: Vec<(ConnectionId, String, String)> = self
            .links
            .ids()
            .into_iter()
            .filter_map(|id| {
                self.links
                    .get(&id)
                    .map(|link| (id, link.name.clone(), link.avatar_url.clone()))
            })
            .collect();

        for (id, _, _) in &remotes {
            self.close_link(id, false).await;
        }

        let mut reopened = 0;
        let empty = remotes.is_empty();
        for (id, name, avatar_url) in remotes {
            if self.open_link(id, name, avatar_url, stream, ice_servers).await {
                reopened += 1;
            }
        }
        empty || reopened > 0
    }

    pub async fn shutdown(&mut self) {
        for id in self.links.ids() {
            self.close_link(&id, false).await;
        }
    }

    async fn close_link(&mut self, remote: &ConnectionId, notify: bool) {
        let Some(mut link) = self.links.remove(remote) else {
            return;
        };
        link.state = LinkState::Closed;
        link.transport.close().await;
        if notify {
            let _ = self.event_tx.send(RoomEvent::PeerDisconnected {
                id: remote.clone(),
            });
        }
    }
}
