use std::sync::Arc;
use std::time::Duration;

use echoroom_client::media::SampleDevices;
use echoroom_client::transport::RtcTransportFactory;
use echoroom_client::{ClientCommand, ClientConfig, RoomClient, RoomEvent, RoomHandle};
use echoroom_core::ParticipantProfile;

use crate::integration::{init_tracing, spawn_server};

/// Timeout for connection establishment (ms). Real ICE and DTLS run here.
const CONNECTION_TIMEOUT_MS: u64 = 20000;

async fn connect_client(url: &str, name: &str) -> RoomHandle {
    let config = ClientConfig::new(url, "standup", ParticipantProfile::new(name, ""));
    let (client, handle) = RoomClient::connect(
        config,
        Arc::new(SampleDevices),
        Arc::new(RtcTransportFactory),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to connect client {}: {}", name, e));

    tokio::spawn(client.run());
    handle
}

async fn wait_for_event(
    handle: &mut RoomHandle,
    timeout_ms: u64,
    mut filter: impl FnMut(&RoomEvent) -> bool,
) -> RoomEvent {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let event = tokio::time::timeout_at(deadline, handle.next_event())
            .await
            .expect("Timeout waiting for event")
            .expect("Event stream closed");
        if filter(&event) {
            return event;
        }
    }
}

#[tokio::test]
async fn test_mesh_over_live_server() {
    init_tracing();

    let url = spawn_server().await;

    let mut alice = connect_client(&url, "alice").await;
    wait_for_event(&mut alice, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::RosterUpdated { participants } if participants.len() == 1)
    })
    .await;

    // Bob joins second and dials alice: one real link over loopback.
    let mut bob = connect_client(&url, "bob").await;
    wait_for_event(&mut alice, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::PeerConnected { .. })
    })
    .await;
    wait_for_event(&mut bob, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::PeerConnected { .. })
    })
    .await;

    // Carol dials both members; every side ends with its mesh legs up.
    let mut carol = connect_client(&url, "carol").await;
    for _ in 0..2 {
        wait_for_event(&mut carol, CONNECTION_TIMEOUT_MS, |e| {
            matches!(e, RoomEvent::PeerConnected { .. })
        })
        .await;
    }
    wait_for_event(&mut alice, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::PeerConnected { .. })
    })
    .await;
    wait_for_event(&mut bob, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::PeerConnected { .. })
    })
    .await;

    // Chat crosses the relay, not the mesh: one copy each, sender included.
    bob.command(ClientCommand::SendChat("hello".into()))
        .await
        .expect("Chat command failed");
    for handle in [&mut alice, &mut bob, &mut carol] {
        let event = wait_for_event(handle, CONNECTION_TIMEOUT_MS, |e| {
            matches!(e, RoomEvent::Chat { .. })
        })
        .await;
        let RoomEvent::Chat { message } = event else {
            unreachable!();
        };
        assert_eq!(message.text, "hello");
        assert_eq!(message.sender, "bob");
    }

    // One leave: the roster shrinks and the others drop exactly that link.
    carol
        .command(ClientCommand::Leave)
        .await
        .expect("Leave command failed");
    wait_for_event(&mut carol, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::Left)
    })
    .await;

    wait_for_event(&mut alice, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::PeerDisconnected { .. })
    })
    .await;
    wait_for_event(&mut bob, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, RoomEvent::PeerDisconnected { .. })
    })
    .await;
}
