pub use echoroom_core::model::ConnectionId;

pub mod model {
    pub use echoroom_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use echoroom_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use echoroom_client::*;
}
