use venue_core::{PublishFeedRequest, SignalId, VenueError};

use crate::integration::init_tracing;
use crate::utils::TestVenue;

fn publish() -> PublishFeedRequest {
    PublishFeedRequest {
        publish: true,
        feed: None,
    }
}

#[tokio::test]
async fn test_moderator_preempts_busy_feed() {
    init_tracing();

    let venue = TestVenue::new();
    let room = venue.open_room(1, None).await;
    let (alice, bob, mod_ctx) = (venue.participant(1), venue.participant(2), venue.moderator(3));
    let a = venue.join(&alice, room).await;
    let b = venue.join(&bob, room).await;
    let m = venue.join(&mod_ctx, room).await;

    let res = venue.service.publish_feed(&alice, a, publish()).await.unwrap();
    assert!(res.ok);
    assert_eq!(venue.service.feeds().current_feed(room).await.unwrap(), Some(a));

    let err = venue
        .service
        .publish_feed(&bob, b, publish())
        .await
        .unwrap_err();
    assert_eq!(err, VenueError::FeedBusy(room));
    assert_eq!(
        venue.service.feeds().current_feed(room).await.unwrap(),
        Some(a),
        "rejected publish leaves the feed alone"
    );

    venue
        .service
        .publish_feed(&mod_ctx, m, publish())
        .await
        .expect("moderator preempts");
    assert_eq!(venue.service.feeds().current_feed(room).await.unwrap(), Some(m));
    assert_eq!(venue.feed_holders(room).await, 1);

    let snapshot = venue.poll(&alice, a, SignalId(0)).await;
    let alice_settings = snapshot.settings.iter().find(|s| s.id == a).unwrap();
    assert!(!alice_settings.feed, "preempted publisher learns on next poll");
    let mod_settings = snapshot.settings.iter().find(|s| s.id == m).unwrap();
    assert!(mod_settings.feed);
}

#[tokio::test]
async fn test_republish_by_holder_refreshes_key() {
    init_tracing();

    let venue = TestVenue::new();
    let room = venue.open_room(1, None).await;
    let alice = venue.participant(1);
    let a = venue.join(&alice, room).await;

    for key in ["cam-1", "cam-2"] {
        venue
            .service
            .publish_feed(
                &alice,
                a,
                PublishFeedRequest {
                    publish: true,
                    feed: Some(key.into()),
                },
            )
            .await
            .unwrap();
    }

    use venue_server::VenueStore;
    let peer = venue.store.get_peer(a).await.unwrap().unwrap();
    assert_eq!(peer.feed_key, "cam-2");
    assert_eq!(peer.relay_identity(), "cam-2");
}

#[tokio::test]
async fn test_publisher_join_with_busy_feed_still_joins() {
    init_tracing();

    let venue = TestVenue::new();
    let room = venue.open_room(1, None).await;
    let (alice, bob) = (venue.participant(1), venue.participant(2));

    let mut req = venue_core::JoinRequest::new(room);
    req.capability = venue_core::JoinCapability::Publisher;
    req.feed = Some("alice-cam".into());
    let first = venue.service.join(&alice, req.clone()).await.unwrap();
    assert!(first.feed);

    let second = venue.service.join(&bob, req).await.unwrap();
    assert!(!second.feed);
    assert_eq!(
        venue.service.feeds().current_feed(room).await.unwrap(),
        Some(first.peer_id)
    );
}
