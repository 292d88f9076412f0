use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use echoroom_client::media::{MediaDevices, MediaError, MediaTrack, TrackKind};

/// Capture devices with injectable denials. Hands out bare tracks and keeps
/// a copy of every track it produced so teardown can be checked.
#[derive(Default)]
pub struct MockDevices {
    pub deny_camera: AtomicBool,
    pub deny_screen: AtomicBool,
    pub screen_captures: AtomicUsize,
    handed_out: Mutex<Vec<MediaTrack>>,
}

impl MockDevices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every track produced so far, in capture order.
    pub async fn tracks(&self) -> Vec<MediaTrack> {
        self.handed_out.lock().await.clone()
    }

    async fn record(&self, track: MediaTrack) -> MediaTrack {
        self.handed_out.lock().await.push(track.clone());
        track
    }
}

#[async_trait]
impl MediaDevices for MockDevices {
    async fn capture_camera(&self) -> Result<MediaTrack, MediaError> {
        if self.deny_camera.load(Ordering::SeqCst) {
            return Err(MediaError::Camera("permission denied".to_string()));
        }
        Ok(self
            .record(MediaTrack::new(TrackKind::Video, "mock-camera"))
            .await)
    }

    async fn capture_microphone(&self) -> Result<MediaTrack, MediaError> {
        Ok(self
            .record(MediaTrack::new(TrackKind::Audio, "mock-microphone"))
            .await)
    }

    async fn capture_screen(&self) -> Result<MediaTrack, MediaError> {
        if self.deny_screen.load(Ordering::SeqCst) {
            return Err(MediaError::Screen("permission denied".to_string()));
        }
        self.screen_captures.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .record(MediaTrack::new(TrackKind::Video, "mock-screen"))
            .await)
    }
}
