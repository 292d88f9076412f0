use crate::media::{LocalStream, MediaTrack, TrackKind};
use crate::transport::event::{RemoteTrackInfo, TransportEvent};
use crate::transport::peer_transport::{PeerTransport, PeerTransportFactory, TransportError};
use async_trait::async_trait;
use echoroom_core::{ConnectionId, IceCandidate, IceServerConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;

const CANDIDATE_QUEUE_LIMIT: usize = 32;

/// Factory for webrtc-backed transports: one peer connection per remote with
/// the local sample tracks attached up front.
#[derive(Default)]
pub struct RtcTransportFactory;

#[async_trait]
impl PeerTransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        remote: ConnectionId,
        stream: &LocalStream,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>, TransportError> {
        let transport = RtcPeerTransport::new(remote, stream, ice_servers, events).await?;
        Ok(Box::new(transport))
    }
}

struct RtcPeerTransport {
    remote: ConnectionId,
    connection: Arc<RTCPeerConnection>,
    video_sender: Arc<RTCRtpSender>,
    /// Remote candidates queued until the remote description lands. The
    /// answering side's candidates routinely race the answer itself.
    pending_candidates: Vec<RTCIceCandidateInit>,
    remote_description_set: bool,
    closed: Arc<AtomicBool>,
}

impl RtcPeerTransport {
    async fn new(
        remote: ConnectionId,
        stream: &LocalStream,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let connection = Arc::new(api.new_peer_connection(config).await?);

        let video = stream
            .video()
            .sample()
            .ok_or(TransportError::UnsupportedTrack)?;
        let video_sender = connection
            .add_track(video as Arc<dyn TrackLocal + Send + Sync>)
            .await?;
        if let Some(audio) = stream.audio() {
            let audio = audio.sample().ok_or(TransportError::UnsupportedTrack)?;
            connection
                .add_track(audio as Arc<dyn TrackLocal + Send + Sync>)
                .await?;
        }

        let closed = Arc::new(AtomicBool::new(false));

        let event_tx = events.clone();
        let remote_id = remote.clone();
        let closed_flag = closed.clone();
        connection.on_peer_connection_state_change(Box::new(move |state| {
            let event_tx = event_tx.clone();
            let remote_id = remote_id.clone();
            let closed_flag = closed_flag.clone();
            Box::pin(async move {
                debug!("Connection state for {}: {:?}", remote_id, state);
                match state {
                    RTCPeerConnectionState::Connected => {
                        let _ = event_tx.send(TransportEvent::Connected(remote_id)).await;
                    }
                    RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Closed => {
                        // Locally initiated closes are not failures.
                        if !closed_flag.load(Ordering::SeqCst) {
                            let _ = event_tx.send(TransportEvent::Disconnected(remote_id)).await;
                        }
                    }
                    _ => {}
                }
            })
        }));

        let event_tx = events.clone();
        let remote_id = remote.clone();
        connection.on_ice_candidate(Box::new(move |candidate| {
            let event_tx = event_tx.clone();
            let remote_id = remote_id.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else {
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => {
                        let candidate = IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_mline_index: init.sdp_mline_index,
                        };
                        let _ = event_tx
                            .send(TransportEvent::CandidateGenerated(remote_id, candidate))
                            .await;
                    }
                    Err(e) => warn!("Failed to serialize ICE candidate: {}", e),
                }
            })
        }));

        let event_tx = events;
        let remote_id = remote.clone();
        connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let event_tx = event_tx.clone();
            let remote_id = remote_id.clone();
            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => TrackKind::Audio,
                    _ => TrackKind::Video,
                };
                let info = RemoteTrackInfo {
                    id: track.id(),
                    kind,
                };
                debug!("Remote {:?} track from {}", kind, remote_id);
                let _ = event_tx
                    .send(TransportEvent::RemoteTrack(remote_id, info))
                    .await;
            })
        }));

        Ok(Self {
            remote,
            connection,
            video_sender,
            pending_candidates: Vec::new(),
            remote_description_set: false,
            closed,
        })
    }

    async fn flush_pending_candidates(&mut self) {
        for init in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.connection.add_ice_candidate(init).await {
                warn!("Failed to add buffered candidate for {}: {}", self.remote, e);
            }
        }
    }
}

#[async_trait]
impl PeerTransport for RtcPeerTransport {
    async fn create_offer(&mut self) -> Result<String, TransportError> {
        let offer = self.connection.create_offer(None).await?;
        self.connection.set_local_description(offer.clone()).await?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&mut self, sdp: &str) -> Result<String, TransportError> {
        let offer = RTCSessionDescription::offer(sdp.to_owned())?;
        self.connection.set_remote_description(offer).await?;
        self.remote_description_set = true;
        self.flush_pending_candidates().await;

        let answer = self.connection.create_answer(None).await?;
        self.connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn accept_answer(&mut self, sdp: &str) -> Result<(), TransportError> {
        let answer = RTCSessionDescription::answer(sdp.to_owned())?;
        self.connection.set_remote_description(answer).await?;
        self.remote_description_set = true;
        self.flush_pending_candidates().await;
        Ok(())
    }

    async fn add_remote_candidate(
        &mut self,
        candidate: &IceCandidate,
    ) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate.clone(),
            sdp_mid: candidate.sdp_mid.clone(),
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: None,
        };
        if !self.remote_description_set {
            if self.pending_candidates.len() >= CANDIDATE_QUEUE_LIMIT {
                warn!(
                    "Candidate queue full for {}, dropping candidate",
                    self.remote
                );
                return Ok(());
            }
            self.pending_candidates.push(init);
            return Ok(());
        }
        self.connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn replace_video_track(&mut self, track: &MediaTrack) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let sample = track.sample().ok_or(TransportError::UnsupportedTrack)?;
        self.video_sender
            .replace_track(Some(sample as Arc<dyn TrackLocal + Send + Sync>))
            .await?;
        Ok(())
    }

    async fn close(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.connection.close().await {
            warn!("Error closing connection to {}: {}", self.remote, e);
        }
    }
}
