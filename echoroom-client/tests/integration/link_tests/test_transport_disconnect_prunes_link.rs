use echoroom_client::RoomEvent;
use echoroom_client::media::TrackKind;
use echoroom_client::peer::LinkState;
use echoroom_core::ClientMessage;

use crate::integration::{camera_stream, create_manager, init_tracing, participant};

#[tokio::test]
async fn test_transport_disconnect_prunes_link() {
    init_tracing();
    let mut harness = create_manager();
    let stream = camera_stream();
    let alice = participant("alice");

    harness.manager.dial(&alice, &stream, &[]).await;
    harness
        .manager
        .handle_answer(alice.id.clone(), "scripted-answer")
        .await;
    while harness.signal_rx.try_recv().is_ok() {}

    let transport = harness
        .factory
        .handle_for(&alice.id)
        .await
        .expect("Missing transport handle");

    transport.fire_connected().await;
    harness.pump_transport().await;
    assert_eq!(
        harness.manager.link_state(&alice.id),
        Some(LinkState::Connected)
    );
    assert_eq!(
        harness.event_rx.try_recv().expect("No connected event"),
        RoomEvent::PeerConnected {
            id: alice.id.clone()
        }
    );

    // Inbound media surfaces as an event on the link.
    transport.fire_remote_track(TrackKind::Video).await;
    harness.pump_transport().await;
    let event = harness.event_rx.try_recv().expect("No track event");
    let (id, track) = match event {
        RoomEvent::RemoteTrackAdded { id, track } => (id, track),
        other => panic!("Expected a remote track, got {:?}", other),
    };
    assert_eq!(id, alice.id);
    assert_eq!(track.kind, TrackKind::Video);

    // A locally generated candidate goes out while the link lives.
    transport.fire_candidate().await;
    harness.pump_transport().await;
    let message = harness.signal_rx.try_recv().expect("No candidate was sent");
    assert!(matches!(message, ClientMessage::Candidate { to, .. } if to == alice.id));

    // The disconnect prunes the link and tells the session.
    transport.fire_disconnected().await;
    harness.pump_transport().await;
    assert_eq!(harness.manager.link_count(), 0);
    assert_eq!(
        harness.event_rx.try_recv().expect("No disconnect event"),
        RoomEvent::PeerDisconnected {
            id: alice.id.clone()
        }
    );

    // Candidates from the dead transport no longer go anywhere.
    transport.fire_candidate().await;
    harness.pump_transport().await;
    assert!(
        harness.signal_rx.try_recv().is_err(),
        "A dead link must not emit candidates"
    );
}
