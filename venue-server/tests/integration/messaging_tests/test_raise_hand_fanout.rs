use venue_core::{ControlMessage, SignalId, SignalKind, VolumeLevels};

use crate::integration::init_tracing;
use crate::utils::TestVenue;

#[tokio::test]
async fn test_raise_hand_reaches_every_other_peer() {
    init_tracing();

    let venue = TestVenue::new();
    let room = venue.open_room(1, None).await;
    let (alice, bob, carol) = (
        venue.participant(1),
        venue.participant(2),
        venue.participant(3),
    );
    let a = venue.join(&alice, room).await;
    let b = venue.join(&bob, room).await;
    let c = venue.join(&carol, room).await;

    let res = venue.service.raise_hand(&alice, a, true).await.unwrap();
    assert!(res.ok);

    for (ctx, peer) in [(&bob, b), (&carol, c)] {
        let got = venue.poll(ctx, peer, SignalId(0)).await.messages;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].kind, SignalKind::control());
        assert_eq!(got[0].frompeer, a);
        assert_eq!(
            ControlMessage::from_payload(&got[0].message),
            Some(ControlMessage::RaiseHand(true))
        );
    }
    assert!(venue.poll(&alice, a, SignalId(0)).await.messages.is_empty());
}

#[tokio::test]
async fn test_volume_levels_are_clamped_before_fan_out() {
    init_tracing();

    let venue = TestVenue::new();
    let room = venue.open_room(1, None).await;
    let (alice, bob) = (venue.participant(1), venue.participant(2));
    let a = venue.join(&alice, room).await;
    let b = venue.join(&bob, room).await;

    venue
        .service
        .send_volume(
            &alice,
            a,
            VolumeLevels {
                low: 0.5,
                mid: 2.0,
                high: -1.0,
            },
        )
        .await
        .unwrap();

    let got = venue.poll(&bob, b, SignalId(0)).await.messages;
    let Some(ControlMessage::Volume(levels)) = ControlMessage::from_payload(&got[0].message)
    else {
        panic!("expected a volume message");
    };
    assert_eq!(levels.low, 0.5);
    assert_eq!(levels.mid, 1.0);
    assert_eq!(levels.high, 0.0);
}
