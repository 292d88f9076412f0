mod service;
mod ws_handler;

pub use service::SignalingService;
pub use ws_handler::ws_handler;
