use crate::media::track::{MediaTrack, TrackKind};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("camera capture failed: {0}")]
    Camera(String),

    #[error("microphone capture failed: {0}")]
    Microphone(String),

    #[error("screen capture failed: {0}")]
    Screen(String),
}

/// Capture seam. The production implementation hands out sample-backed
/// webrtc tracks; tests inject denials and bare tracks instead.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn capture_camera(&self) -> Result<MediaTrack, MediaError>;
    async fn capture_microphone(&self) -> Result<MediaTrack, MediaError>;
    async fn capture_screen(&self) -> Result<MediaTrack, MediaError>;
}

/// Devices producing `TrackLocalStaticSample` tracks (VP8 video, Opus
/// audio). The embedder pumps encoded frames into the sample handles;
/// talking to real capture hardware is outside this crate.
#[derive(Default)]
pub struct SampleDevices;

impl SampleDevices {
    fn video_track(label: &str) -> MediaTrack {
        let sample = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            label.to_owned(),
            "local-media".to_owned(),
        ));
        MediaTrack::with_sample(TrackKind::Video, label, sample)
    }

    fn audio_track(label: &str) -> MediaTrack {
        let sample = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            label.to_owned(),
            "local-media".to_owned(),
        ));
        MediaTrack::with_sample(TrackKind::Audio, label, sample)
    }
}

#[async_trait]
impl MediaDevices for SampleDevices {
    async fn capture_camera(&self) -> Result<MediaTrack, MediaError> {
        Ok(Self::video_track("camera"))
    }

    async fn capture_microphone(&self) -> Result<MediaTrack, MediaError> {
        Ok(Self::audio_track("microphone"))
    }

    async fn capture_screen(&self) -> Result<MediaTrack, MediaError> {
        Ok(Self::video_track("screen"))
    }
}
