use std::sync::atomic::Ordering;

use echoroom_client::RoomEvent;
use echoroom_client::peer::LinkState;

use crate::integration::{camera_stream, create_manager, init_tracing, participant};

#[tokio::test]
async fn test_failed_negotiation_closes_link() {
    init_tracing();
    let mut harness = create_manager();
    let stream = camera_stream();

    // The transport comes up but refuses to produce an offer. The dial is
    // abandoned without a word to anyone.
    let alice = participant("alice");
    harness
        .factory
        .behavior
        .fail_offer
        .store(true, Ordering::SeqCst);
    harness.manager.dial(&alice, &stream, &[]).await;

    assert_eq!(harness.factory.created_count(), 1);
    assert!(!harness.manager.is_linked(&alice.id));
    let handle = harness
        .factory
        .handle_for(&alice.id)
        .await
        .expect("Missing transport handle");
    assert!(handle.probe.is_closed());
    assert!(
        harness.signal_rx.try_recv().is_err(),
        "A failed dial must not send an offer"
    );
    assert!(
        harness.event_rx.try_recv().is_err(),
        "A link that never opened has nothing to report"
    );

    // An answer the transport cannot apply kills the link, and this time the
    // session hears about it.
    let carol = participant("carol");
    harness
        .factory
        .behavior
        .fail_offer
        .store(false, Ordering::SeqCst);
    harness
        .factory
        .behavior
        .fail_answer
        .store(true, Ordering::SeqCst);
    harness.manager.dial(&carol, &stream, &[]).await;
    assert_eq!(
        harness.manager.link_state(&carol.id),
        Some(LinkState::AwaitingAnswer)
    );
    while harness.signal_rx.try_recv().is_ok() {}

    harness
        .manager
        .handle_answer(carol.id.clone(), "scripted-answer")
        .await;

    assert!(!harness.manager.is_linked(&carol.id));
    assert_eq!(
        harness.event_rx.try_recv().expect("No disconnect event"),
        RoomEvent::PeerDisconnected {
            id: carol.id.clone()
        }
    );
    let handle = harness
        .factory
        .handle_for(&carol.id)
        .await
        .expect("Missing transport handle");
    assert!(handle.probe.is_closed());
}
