use crate::media::devices::{MediaDevices, MediaError};
use crate::media::stream::{LocalStream, StreamSource};
use crate::media::track::MediaTrack;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Single owner of local media state. Everything that touches capture tracks
/// funnels through here; the session loop reads the stream when wiring
/// transports but never mutates it.
pub struct MediaController {
    devices: Arc<dyn MediaDevices>,
    stream: Option<LocalStream>,
    mic_enabled: bool,
    cam_enabled: bool,
    sharing: bool,
    screen_ended_rx: Option<watch::Receiver<bool>>,
}

impl MediaController {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            devices,
            stream: None,
            mic_enabled: true,
            cam_enabled: true,
            sharing: false,
            screen_ended_rx: None,
        }
    }

    /// Camera and microphone, in that order. Any failure leaves the
    /// controller empty; the join flow must not proceed without media.
    pub async fn acquire(&mut self) -> Result<(), MediaError> {
        let video = self.devices.capture_camera().await?;
        let audio = self.devices.capture_microphone().await?;
        video.set_enabled(self.cam_enabled);
        audio.set_enabled(self.mic_enabled);
        self.stream = Some(LocalStream::new(StreamSource::Camera, video, Some(audio)));
        info!("Local media acquired");
        Ok(())
    }

    pub fn stream(&self) -> Option<&LocalStream> {
        self.stream.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_sharing(&self) -> bool {
        self.sharing
    }

    pub fn mic_enabled(&self) -> bool {
        self.mic_enabled
    }

    pub fn cam_enabled(&self) -> bool {
        self.cam_enabled
    }

    /// Mute is a flag flip on the live track. No renegotiation, no track
    /// replacement, no transport involvement at all.
    pub fn set_mic_enabled(&mut self, enabled: bool) {
        self.mic_enabled = enabled;
        if let Some(audio) = self.stream.as_ref().and_then(|s| s.audio()) {
            audio.set_enabled(enabled);
        }
    }

    /// Camera flag applies to the camera track only. While the screen is in
    /// the video slot, only the remembered flag changes; the fresh camera
    /// track picks it up on restore.
    pub fn set_cam_enabled(&mut self, enabled: bool) {
        self.cam_enabled = enabled;
        if let Some(stream) = &self.stream {
            if stream.source() == StreamSource::Camera {
                stream.video().set_enabled(enabled);
            }
        }
    }

    /// Swaps the video slot to display capture, keeping the microphone.
    /// Capture denial leaves the camera stream untouched.
    pub async fn start_screen_share(&mut self) -> Result<MediaTrack, MediaError> {
        let Some(current) = self.stream.clone() else {
            return Err(MediaError::Screen("no local stream".into()));
        };
        if self.sharing {
            return Ok(current.video().clone());
        }

        let screen = self.devices.capture_screen().await?;
        self.screen_ended_rx = Some(screen.ended());
        current.video().stop();
        let audio = current.audio().cloned();
        self.stream = Some(LocalStream::new(
            StreamSource::Screen,
            screen.clone(),
            audio,
        ));
        self.sharing = true;
        info!("Screen capture started");
        Ok(screen)
    }

    /// Back to the camera. The fresh camera track inherits the remembered
    /// cam flag; the microphone keeps its current state.
    pub async fn stop_screen_share(&mut self) -> Result<MediaTrack, MediaError> {
        if !self.sharing {
            return Err(MediaError::Screen("screen share is not active".into()));
        }
        self.sharing = false;
        self.screen_ended_rx = None;

        let audio = self.stream.as_ref().and_then(|s| s.audio().cloned());
        if let Some(stream) = &self.stream {
            stream.video().stop();
        }

        match self.devices.capture_camera().await {
            Ok(camera) => {
                camera.set_enabled(self.cam_enabled);
                self.stream = Some(LocalStream::new(
                    StreamSource::Camera,
                    camera.clone(),
                    audio,
                ));
                info!("Screen capture stopped, camera restored");
                Ok(camera)
            }
            Err(e) => {
                warn!("Failed to reacquire camera after screen share: {}", e);
                self.stream = None;
                Err(e)
            }
        }
    }

    /// Leave path: every live track stops before any signaling happens.
    pub fn stop_all(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_all();
        }
        self.sharing = false;
        self.screen_ended_rx = None;
    }

    /// Resolves when the live screen track ends (browser-chrome stop).
    /// Pends forever while not sharing, so it is safe in a select arm.
    pub async fn screen_track_ended(&mut self) {
        match &mut self.screen_ended_rx {
            Some(rx) => {
                if *rx.borrow() {
                    return;
                }
                let _ = rx.changed().await;
            }
            None => std::future::pending().await,
        }
    }
}
