use crate::media::track::MediaTrack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Camera,
    Screen,
}

/// The outbound media bundle: one video track plus the microphone. During
/// screen sharing the video slot holds the display track while the
/// microphone carries over unchanged.
#[derive(Debug, Clone)]
pub struct LocalStream {
    source: StreamSource,
    video: MediaTrack,
    audio: Option<MediaTrack>,
}

impl LocalStream {
    pub fn new(source: StreamSource, video: MediaTrack, audio: Option<MediaTrack>) -> Self {
        Self {
            source,
            video,
            audio,
        }
    }

    pub fn source(&self) -> StreamSource {
        self.source
    }

    pub fn video(&self) -> &MediaTrack {
        &self.video
    }

    pub fn audio(&self) -> Option<&MediaTrack> {
        self.audio.as_ref()
    }

    pub fn stop_all(&self) {
        self.video.stop();
        if let Some(audio) = &self.audio {
            audio.stop();
        }
    }
}
