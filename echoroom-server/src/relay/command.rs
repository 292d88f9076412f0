use echoroom_core::{ClientMessage, ConnectionId};

/// Commands fed to the relay loop by the WebSocket front end. `from` is
/// always the id the server minted for the socket the frame arrived on.
#[derive(Debug)]
pub enum RelayCommand {
    Incoming {
        from: ConnectionId,
        message: ClientMessage,
    },
    Disconnected {
        from: ConnectionId,
    },
}
