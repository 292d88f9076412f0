mod controller;
mod devices;
mod stream;
mod track;

pub use controller::MediaController;
pub use devices::{MediaDevices, MediaError, SampleDevices};
pub use stream::{LocalStream, StreamSource};
pub use track::{MediaTrack, TrackKind};
