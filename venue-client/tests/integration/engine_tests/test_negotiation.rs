use crate::integration::init_tracing;
use crate::utils::{RecordingMedia, join_client, test_service};
use venue_client::{ClientEvent, ConnectionState};

#[tokio::test]
async fn test_newer_peer_offers_and_both_connect() {
    init_tracing();
    let service = test_service().await;
    let alice_media = RecordingMedia::new();
    let bob_media = RecordingMedia::new();
    let mut alice = join_client(&service, 1, alice_media.clone()).await;
    let mut bob = join_client(&service, 2, bob_media.clone()).await;
    let alice_id = alice.client.peer_id();
    let bob_id = bob.client.peer_id();
    assert!(bob_id > alice_id);

    // The older peer waits to be offered to.
    alice.client.exchange_once().await.unwrap();
    assert_eq!(alice.client.pending_outgoing(), 0);
    assert_eq!(alice.client.connection_state(bob_id), None);

    bob.client.exchange_once().await.unwrap();
    assert_eq!(
        bob.client.connection_state(alice_id),
        Some(ConnectionState::Negotiating)
    );
    assert_eq!(bob.client.pending_outgoing(), 1);
    assert!(bob.drain_events().contains(&ClientEvent::ConnectionChanged {
        peer: alice_id,
        state: ConnectionState::Negotiating,
    }));

    // Push the offer, then let alice answer with an early candidate.
    bob.client.exchange_once().await.unwrap();
    assert_eq!(alice.client.exchange_once().await.unwrap(), 1);
    assert_eq!(
        alice.client.connection_state(bob_id),
        Some(ConnectionState::Connected)
    );
    alice.client.queue_candidate(bob_id, "candidate-a");
    assert_eq!(alice.client.pending_outgoing(), 2);
    alice.client.exchange_once().await.unwrap();

    assert_eq!(bob.client.exchange_once().await.unwrap(), 2);
    assert_eq!(
        bob.client.connection_state(alice_id),
        Some(ConnectionState::Connected)
    );

    assert_eq!(
        alice_media.calls_for(bob_id),
        vec![format!("accept_offer:offer-to-{alice_id}")]
    );
    assert_eq!(
        bob_media.calls_for(alice_id),
        vec![
            "create_offer".to_owned(),
            format!("accept_answer:answer-to-{bob_id}"),
            "ice:candidate-a".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_checkpoint_advances_and_signals_are_not_replayed() {
    init_tracing();
    let service = test_service().await;
    let mut alice = join_client(&service, 1, RecordingMedia::new()).await;
    let mut bob = join_client(&service, 2, RecordingMedia::new()).await;

    bob.client.exchange_once().await.unwrap();
    bob.client.exchange_once().await.unwrap();

    assert_eq!(alice.client.exchange_once().await.unwrap(), 1);
    let checkpoint = alice.client.checkpoint();
    assert!(checkpoint.0 > 0);

    // Nothing new: the offer is not handled a second time.
    assert_eq!(alice.client.exchange_once().await.unwrap(), 0);
    assert_eq!(alice.client.checkpoint(), checkpoint);
}
