use crate::integration::init_tracing;
use crate::utils::{RecordingMedia, join_client, test_service};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use venue_client::{ClientEvent, ConnectionState};

async fn wait_for(
    events: &mut UnboundedReceiver<ClientEvent>,
    wanted: impl Fn(&ClientEvent) -> bool,
) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            match events.recv().await {
                Some(event) if wanted(&event) => return event,
                Some(_) => {}
                None => panic!("event stream ended"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test(start_paused = true)]
async fn test_spawned_clients_connect_and_leave() {
    init_tracing();
    let service = test_service().await;
    let alice = join_client(&service, 1, RecordingMedia::new()).await;
    let bob = join_client(&service, 2, RecordingMedia::new()).await;
    let alice_id = alice.client.peer_id();
    let bob_id = bob.client.peer_id();

    let mut alice_events = alice.events;
    let mut bob_events = bob.events;
    let (alice_handle, _alice_task) = alice.client.spawn();
    let (bob_handle, bob_task) = bob.client.spawn();

    wait_for(&mut alice_events, |e| {
        *e == ClientEvent::ConnectionChanged {
            peer: bob_id,
            state: ConnectionState::Connected,
        }
    })
    .await;
    wait_for(&mut bob_events, |e| {
        *e == ClientEvent::ConnectionChanged {
            peer: alice_id,
            state: ConnectionState::Connected,
        }
    })
    .await;

    assert!(alice_handle.publish(Some("stage".into())));
    wait_for(&mut bob_events, |e| *e == ClientEvent::FeedChanged(Some(alice_id))).await;
    assert!(bob_handle.publish(None));
    wait_for(&mut bob_events, |e| *e == ClientEvent::FeedBusy).await;

    assert!(bob_handle.leave());
    wait_for(&mut bob_events, |e| *e == ClientEvent::Left).await;
    bob_task.await.unwrap();

    wait_for(&mut alice_events, |e| {
        *e == ClientEvent::ConnectionChanged {
            peer: bob_id,
            state: ConnectionState::Closed,
        }
    })
    .await;
    assert!(alice_handle.notify());
}
