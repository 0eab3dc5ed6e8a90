use venue_core::RoomId;
use venue_server::VenueStore;

use crate::integration::init_tracing;
use crate::utils::TestVenue;

#[tokio::test]
async fn test_relay_is_asked_once_per_room() {
    init_tracing();

    let venue = TestVenue::new();
    let room = venue.open_room(1, None).await;
    let mut peers = Vec::new();
    for user in 0..5 {
        let ctx = venue.participant(user);
        peers.push(venue.join(&ctx, room).await);
        venue.sessions.end(ctx.session_id());
    }
    venue.relay.set_participants(room, &["nobody"]);

    let report = venue.sweeper().sweep().await.unwrap();

    assert_eq!(report.evicted.len(), 5);
    assert_eq!(report.relay_calls, 1);
    assert_eq!(venue.relay.lookups(), vec![room]);
}

#[tokio::test]
async fn test_participant_cache_is_keyed_by_room() {
    init_tracing();

    let venue = TestVenue::new();
    let first = venue.open_room(1, None).await;
    let second = venue.open_room(2, None).await;

    let alice = venue.participant(1);
    let bob = venue.participant(2);
    let a = venue.join(&alice, first).await;
    let b = venue.join(&bob, second).await;

    // The first room's relay list happens to name bob's identity. A cache
    // reused across rooms would wrongly keep bob alive.
    venue.relay.set_participants(first, &[&a.to_string(), &b.to_string()]);
    venue.relay.set_participants(second, &["unrelated"]);

    venue.sessions.end(alice.session_id());
    venue.sessions.end(bob.session_id());
    let report = venue.sweeper().sweep().await.unwrap();

    assert_eq!(report.evicted, vec![b]);
    assert_eq!(report.relay_calls, 2);
    assert_eq!(venue.relay.lookups(), vec![RoomId(1), RoomId(2)]);
    assert!(venue.store.get_peer(a).await.unwrap().is_some());
}

#[tokio::test]
async fn test_rooms_without_relay_skip_the_lookup() {
    init_tracing();

    let venue = TestVenue::new();
    venue
        .service
        .open_room(venue_core::Room::venue(RoomId(3)))
        .await
        .unwrap();
    let alice = venue.participant(1);
    let a = venue.join(&alice, RoomId(3)).await;

    venue.sessions.end(alice.session_id());
    let report = venue.sweeper().sweep().await.unwrap();

    assert_eq!(report.evicted, vec![a]);
    assert_eq!(report.relay_calls, 0);
}
