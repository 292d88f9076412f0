use anyhow::Result;
use clap::Parser;
use echoroom_core::IceServerConfig;
use echoroom_server::config::{DEFAULT_STUN_URL, ServerConfig};
use echoroom_server::relay::Relay;
use echoroom_server::room::RoomRegistry;
use echoroom_server::signaling::SignalingService;
use echoroom_server::storage::NullMessageStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "echoroom-server")]
#[command(about = "Signaling relay for full-mesh video rooms")]
struct Args {
    /// Address the HTTP/WebSocket endpoint listens on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// STUN server URL handed to clients. Repeatable.
    #[arg(long = "stun-url")]
    stun_urls: Vec<String>,

    /// Optional TURN relay handed to clients.
    #[arg(long = "turn-url")]
    turn_url: Option<String>,

    #[arg(long = "turn-username", requires = "turn_url")]
    turn_username: Option<String>,

    #[arg(long = "turn-credential", requires = "turn_url")]
    turn_credential: Option<String>,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let mut ice_servers: Vec<IceServerConfig> = if self.stun_urls.is_empty() {
            vec![IceServerConfig::stun(DEFAULT_STUN_URL)]
        } else {
            self.stun_urls.into_iter().map(IceServerConfig::stun).collect()
        };

        if let Some(url) = self.turn_url {
            ice_servers.push(IceServerConfig {
                urls: vec![url],
                username: self.turn_username,
                credential: self.turn_credential,
            });
        }

        ServerConfig {
            listen: self.listen,
            ice_servers,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();

    let (relay_tx, relay_rx) = mpsc::channel(256);
    let service = SignalingService::new(relay_tx, config.ice_servers.clone());
    let relay = Relay::new(
        RoomRegistry::new(),
        Arc::new(service.clone()),
        Arc::new(NullMessageStore),
        relay_rx,
    );
    tokio::spawn(relay.run());

    let app = echoroom_server::router(service);
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("Signaling server listening on {}", config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
