pub mod config;
pub mod relay;
pub mod room;
pub mod signaling;
pub mod storage;

use axum::{Router, routing::get};

pub use relay::{Relay, RelayCommand, SignalingOutput};
pub use room::{Departure, JoinOutcome, RoomRegistry};
pub use signaling::SignalingService;

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/ws", get(signaling::ws_handler))
        .with_state(service)
}

async fn health() -> &'static str {
    "echoroom signaling server is alive"
}
