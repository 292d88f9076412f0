mod event;
mod peer_transport;
mod rtc;

pub use event::{RemoteTrackInfo, TransportEvent};
pub use peer_transport::{PeerTransport, PeerTransportFactory, TransportError};
pub use rtc::RtcTransportFactory;
