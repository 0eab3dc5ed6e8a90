use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use venue_core::{
    Capabilities, ErrorBody, ErrorCode, ExchangeRequest, ExchangeResponse, JoinRequest,
    OutgoingSignal, Room, RoomId, SessionContext, SignalId, SignalKind, UserId,
};
use venue_server::{MemorySessions, MemoryStore, VenueConfig, VenueState, router};

use crate::integration::init_tracing;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn serve(state: VenueState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("ws://{addr}")
}

/// Next text frame, or None once the server has ended the stream.
async fn next_text(socket: &mut Socket) -> Option<String> {
    loop {
        match timeout(WAIT, socket.next()).await.expect("stream stalled") {
            Some(Ok(Message::Text(text))) => return Some(text.as_str().to_owned()),
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return None,
            Some(Ok(_)) => {}
        }
    }
}

#[tokio::test]
async fn test_stream_pushes_signals_and_ends_on_leave() {
    init_tracing();

    let alice = SessionContext::new(UserId(1), Capabilities::participant());
    let bob = SessionContext::new(UserId(2), Capabilities::participant());
    let sessions = Arc::new(MemorySessions::new());
    sessions.open("alice", alice);
    sessions.open("bob", bob);

    let state = VenueState::build(
        Arc::new(MemoryStore::new()),
        sessions,
        &VenueConfig::default(),
    );
    let service = state.service.clone();
    let room = RoomId(1);
    service.open_room(Room::venue(room)).await.unwrap();
    let a = service.join(&alice, JoinRequest::new(room)).await.unwrap().peer_id;
    let b = service.join(&bob, JoinRequest::new(room)).await.unwrap().peer_id;

    let base = serve(state).await;
    let (mut socket, _) = connect_async(format!("{base}/peers/{b}/ws?token=bob"))
        .await
        .unwrap();

    // A client frame is answered like a plain exchange.
    let hello = serde_json::to_string(&ExchangeRequest::default()).unwrap();
    socket.send(Message::Text(hello.into())).await.unwrap();
    let first: ExchangeResponse = serde_json::from_str(&next_text(&mut socket).await.unwrap()).unwrap();
    assert!(first.messages.is_empty());
    assert!(first.peers.contains(&a));

    // A roommate's signal arrives without bob asking.
    service
        .exchange(
            &alice,
            a,
            ExchangeRequest {
                messages: vec![OutgoingSignal {
                    to_peer: b,
                    kind: SignalKind::Offer,
                    payload: "sdp-offer".into(),
                }],
                lastsignal: SignalId(0),
            },
        )
        .await
        .unwrap();

    let pushed = loop {
        let text = next_text(&mut socket).await.expect("stream ended before the push");
        let response: ExchangeResponse = serde_json::from_str(&text).unwrap();
        if !response.messages.is_empty() {
            break response;
        }
    };
    assert_eq!(pushed.messages.len(), 1);
    assert_eq!(pushed.messages[0].frompeer, a);
    assert_eq!(pushed.messages[0].kind, SignalKind::Offer);
    assert_eq!(pushed.messages[0].message, "sdp-offer");

    // Removing the peer ends the stream with its error.
    service.leave(&bob, b).await.unwrap();

    let mut last = None;
    while let Some(text) = next_text(&mut socket).await {
        last = Some(text);
    }
    let error: ErrorBody = serde_json::from_str(&last.expect("no frame before close")).unwrap();
    assert!(!error.ok);
    assert_eq!(error.error, ErrorCode::UnknownPeer);
}

#[tokio::test]
async fn test_stream_refuses_foreign_peer() {
    init_tracing();

    let sessions = Arc::new(MemorySessions::new());
    sessions.open("alice", SessionContext::new(UserId(1), Capabilities::participant()));
    sessions.open("bob", SessionContext::new(UserId(2), Capabilities::participant()));
    let state = VenueState::build(
        Arc::new(MemoryStore::new()),
        sessions,
        &VenueConfig::default(),
    );
    let service = state.service.clone();
    service.open_room(Room::venue(RoomId(1))).await.unwrap();
    let a = service
        .join(
            &SessionContext::new(UserId(1), Capabilities::participant()),
            JoinRequest::new(RoomId(1)),
        )
        .await
        .unwrap()
        .peer_id;

    let base = serve(state).await;
    assert!(connect_async(format!("{base}/peers/{a}/ws?token=bob")).await.is_err());
}
