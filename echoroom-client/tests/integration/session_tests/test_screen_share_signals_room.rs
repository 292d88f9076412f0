use std::sync::atomic::Ordering;

use echoroom_client::{ClientCommand, RoomEvent};
use echoroom_core::ClientMessage;

use crate::integration::session_tests::connect_session;
use crate::integration::{init_tracing, spawn_server};
use crate::utils::{EVENT_TIMEOUT_MS, ScriptedPeer, wait_for_event, wait_until};

#[tokio::test]
async fn test_screen_share_signals_room() {
    init_tracing();
    let url = spawn_server().await;

    let mut bob = ScriptedPeer::join(&url, "standup", "bob")
        .await
        .expect("Failed to join scripted peer");
    bob.wait_for_roster_len(1)
        .await
        .expect("Scripted peer never entered the room");

    // Alice joins, dials bob, and the link comes up through the mock.
    let mut alice = connect_session(&url, "standup", "alice").await;
    let (from, _) = bob.wait_for_offer().await.expect("No offer arrived");
    assert_eq!(from, alice.id);

    let transport = alice
        .factory
        .wait_for_handle(&bob.id, EVENT_TIMEOUT_MS)
        .await
        .expect("No transport for the dialed peer");
    bob.send(ClientMessage::Answer {
        to: alice.id.clone(),
        sdp: "scripted-answer".to_string(),
    })
    .await
    .expect("Failed to send answer");
    transport.fire_connected().await;
    wait_for_event(&mut alice.handle, EVENT_TIMEOUT_MS, |event| {
        matches!(event, RoomEvent::PeerConnected { .. })
    })
    .await
    .expect("Link never came up");

    // Start: the video slot swaps in place and the room hears about it.
    alice
        .handle
        .command(ClientCommand::StartScreenShare)
        .await
        .expect("Failed to send command");
    wait_for_event(&mut alice.handle, EVENT_TIMEOUT_MS, |event| {
        matches!(event, RoomEvent::LocalScreenShareStarted)
    })
    .await
    .expect("No local start event");

    let (sharer, active) = bob
        .wait_for_screen_share()
        .await
        .expect("No share envelope");
    assert_eq!(sharer, alice.id);
    assert!(active);
    assert_eq!(alice.devices.screen_captures.load(Ordering::SeqCst), 1);
    wait_until(EVENT_TIMEOUT_MS, || {
        transport.probe.replacements.load(Ordering::SeqCst) == 1
    })
    .await
    .expect("The video slot was never swapped");
    assert_eq!(
        alice.factory.created_count(),
        1,
        "An in-place swap must not rebuild the link"
    );

    // Stop: the camera returns and the room hears the share end.
    alice
        .handle
        .command(ClientCommand::StopScreenShare)
        .await
        .expect("Failed to send command");
    wait_for_event(&mut alice.handle, EVENT_TIMEOUT_MS, |event| {
        matches!(event, RoomEvent::LocalScreenShareStopped)
    })
    .await
    .expect("No local stop event");

    let (sharer, active) = bob
        .wait_for_screen_share()
        .await
        .expect("No share-end envelope");
    assert_eq!(sharer, alice.id);
    assert!(!active);
    wait_until(EVENT_TIMEOUT_MS, || {
        transport.probe.replacements.load(Ordering::SeqCst) == 2
    })
    .await
    .expect("The camera was never swapped back");

    // The screen track itself is dead once the share ends.
    let tracks = alice.devices.tracks().await;
    let screen = tracks
        .iter()
        .find(|track| track.label() == "mock-screen")
        .expect("Screen track was never captured");
    assert!(screen.is_stopped());
}
