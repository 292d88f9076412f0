pub mod mock_devices;

pub use event_helpers::*;
pub use mock_devices::*;
pub use mock_transport::*;
pub use scripted_peer::*;
