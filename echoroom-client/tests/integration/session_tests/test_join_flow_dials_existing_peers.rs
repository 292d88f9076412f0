use std::sync::atomic::Ordering;

use echoroom_client::RoomEvent;
use echoroom_client::media::TrackKind;
use echoroom_core::{ClientMessage, ServerMessage};

use crate::integration::session_tests::connect_session;
use crate::integration::{init_tracing, spawn_server};
use crate::utils::{
    ENVELOPE_TIMEOUT_MS, EVENT_TIMEOUT_MS, ScriptedPeer, wait_for_event, wait_until,
};

#[tokio::test]
async fn test_join_flow_dials_existing_peers() {
    init_tracing();
    let url = spawn_server().await;

    let mut alice = ScriptedPeer::join(&url, "standup", "alice")
        .await
        .expect("Failed to join scripted peer");
    alice
        .wait_for_roster_len(1)
        .await
        .expect("Scripted peer never entered the room");

    // The newcomer acquires media, joins, and dials the one existing member.
    let mut bob = connect_session(&url, "standup", "bob").await;

    let (from, sdp) = alice.wait_for_offer().await.expect("No offer arrived");
    assert_eq!(from, bob.id);
    assert!(!sdp.is_empty());
    assert_eq!(bob.factory.created_count(), 1);

    // The answer comes back through signaling and lands on the transport.
    alice
        .send(ClientMessage::Answer {
            to: bob.id.clone(),
            sdp: "scripted-answer".to_string(),
        })
        .await
        .expect("Failed to send answer");

    let transport = bob
        .factory
        .wait_for_handle(&alice.id, EVENT_TIMEOUT_MS)
        .await
        .expect("No transport for the dialed peer");
    wait_until(EVENT_TIMEOUT_MS, || {
        transport.probe.answers_applied.load(Ordering::SeqCst) == 1
    })
    .await
    .expect("Answer never reached the transport");

    // The transport reports the link up and the session surfaces it.
    transport.fire_connected().await;
    let event = wait_for_event(&mut bob.handle, EVENT_TIMEOUT_MS, |event| {
        matches!(event, RoomEvent::PeerConnected { .. })
    })
    .await
    .expect("No peer-connected event");
    assert_eq!(event, RoomEvent::PeerConnected { id: alice.id.clone() });

    // Trickled candidates from the transport go out over signaling.
    transport.fire_candidate().await;
    let candidate = alice
        .wait_for(ENVELOPE_TIMEOUT_MS, |message| match message {
            ServerMessage::Candidate { from, candidate } if *from == bob.id => {
                Some(candidate.clone())
            }
            _ => None,
        })
        .await
        .expect("No candidate arrived");
    assert_eq!(candidate.sdp_mline_index, Some(0));

    // Inbound media and the final disconnect both surface as events.
    transport.fire_remote_track(TrackKind::Video).await;
    let event = wait_for_event(&mut bob.handle, EVENT_TIMEOUT_MS, |event| {
        matches!(event, RoomEvent::RemoteTrackAdded { .. })
    })
    .await
    .expect("No remote-track event");
    let (id, track) = match event {
        RoomEvent::RemoteTrackAdded { id, track } => (id, track),
        other => panic!("Expected a remote track, got {:?}", other),
    };
    assert_eq!(id, alice.id);
    assert_eq!(track.kind, TrackKind::Video);

    transport.fire_disconnected().await;
    let event = wait_for_event(&mut bob.handle, EVENT_TIMEOUT_MS, |event| {
        matches!(event, RoomEvent::PeerDisconnected { .. })
    })
    .await
    .expect("No disconnect event");
    assert_eq!(event, RoomEvent::PeerDisconnected { id: alice.id.clone() });
    assert!(transport.probe.is_closed());
}
