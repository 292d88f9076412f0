use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use uuid::Uuid;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

struct TrackShared {
    id: String,
    kind: TrackKind,
    label: String,
    enabled: AtomicBool,
    stopped: AtomicBool,
    ended_tx: watch::Sender<bool>,
    sample: Option<Arc<TrackLocalStaticSample>>,
}

/// Handle to one local capture track. Clones share state the way browser
/// track objects do: flipping `enabled` mutes in place without touching any
/// transport, `stop` is terminal and observable through `ended`.
#[derive(Clone)]
pub struct MediaTrack {
    shared: Arc<TrackShared>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self::build(kind, label.into(), None)
    }

    /// Track backed by a webrtc sample writer; required by the production
    /// transport, which attaches the sample handle to the peer connection.
    pub fn with_sample(
        kind: TrackKind,
        label: impl Into<String>,
        sample: Arc<TrackLocalStaticSample>,
    ) -> Self {
        Self::build(kind, label.into(), Some(sample))
    }

    fn build(kind: TrackKind, label: String, sample: Option<Arc<TrackLocalStaticSample>>) -> Self {
        let (ended_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(TrackShared {
                id: Uuid::new_v4().to_string(),
                kind,
                label,
                enabled: AtomicBool::new(true),
                stopped: AtomicBool::new(false),
                ended_tx,
                sample,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn kind(&self) -> TrackKind {
        self.shared.kind
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    pub fn set_enabled(&self, enabled: bool) {
        if !self.is_stopped() {
            self.shared.enabled.store(enabled, Ordering::SeqCst);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        if !self.shared.stopped.swap(true, Ordering::SeqCst) {
            let _ = self.shared.ended_tx.send(true);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    /// Fires once when the track stops, whether through `stop` or the capture
    /// source going away. Subscribe before the stop can happen.
    pub fn ended(&self) -> watch::Receiver<bool> {
        self.shared.ended_tx.subscribe()
    }

    pub fn sample(&self) -> Option<Arc<TrackLocalStaticSample>> {
        self.shared.sample.clone()
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("id", &self.shared.id)
            .field("kind", &self.shared.kind)
            .field("label", &self.shared.label)
            .field("enabled", &self.is_enabled())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
