use std::sync::atomic::Ordering;

use echoroom_client::peer::LinkState;
use echoroom_core::{ClientMessage, ConnectionId};

use crate::integration::{camera_stream, create_manager, init_tracing};

#[tokio::test]
async fn test_duplicate_offer_is_ignored() {
    init_tracing();
    let mut harness = create_manager();
    let stream = camera_stream();
    let bob = ConnectionId::new();

    harness
        .manager
        .handle_offer(
            bob.clone(),
            "bob".to_string(),
            String::new(),
            "scripted-offer",
            &stream,
            &[],
        )
        .await;

    assert_eq!(harness.manager.link_state(&bob), Some(LinkState::Answered));
    let message = harness.signal_rx.try_recv().expect("No answer was sent");
    let (to, sdp) = match message {
        ClientMessage::Answer { to, sdp } => (to, sdp),
        other => panic!("Expected an answer, got {:?}", other),
    };
    assert_eq!(to, bob);
    assert!(!sdp.is_empty());

    // A second offer for a live link is dropped whole.
    harness
        .manager
        .handle_offer(
            bob.clone(),
            "bob".to_string(),
            String::new(),
            "scripted-offer-again",
            &stream,
            &[],
        )
        .await;

    assert_eq!(
        harness.factory.created_count(),
        1,
        "A duplicate offer must not create a second transport"
    );
    assert!(
        harness.signal_rx.try_recv().is_err(),
        "A duplicate offer must not be answered"
    );
    let handle = harness
        .factory
        .handle_for(&bob)
        .await
        .expect("Missing transport handle");
    assert!(
        !handle.probe.is_closed(),
        "The live link must survive the duplicate"
    );
    assert_eq!(
        handle.probe.offers_accepted.load(Ordering::SeqCst),
        1,
        "Only the first offer reaches the transport"
    );
}
