use crate::signaling::{ApiError, Caller, VenueState};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use venue_core::{
    ErrorBody, ExchangeRequest, ExchangeResponse, PeerId, RoomId, SessionContext, SignalId,
    VenueResult,
};

/// Streaming variant of the exchange endpoint. Text frames from the client
/// are `ExchangeRequest`s; every reply and every server push is an
/// `ExchangeResponse`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(peer_id): Path<u64>,
    State(state): State<VenueState>,
    Caller(ctx): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let peer_id = PeerId(peer_id);
    let room_id = state.service.room_of(&ctx, peer_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, ctx, peer_id, room_id)))
}

async fn handle_socket(
    socket: WebSocket,
    state: VenueState,
    ctx: SessionContext,
    peer_id: PeerId,
    room_id: RoomId,
) {
    info!("New venue stream: peer {} in room {}", peer_id, room_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    // Last checkpoint the client reported; pushes never acknowledge past it.
    let checkpoint = Arc::new(AtomicU64::new(0));

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                return;
            }
        }
        let _ = sender.close().await;
    });

    let mut push_task = tokio::spawn({
        let state = state.clone();
        let tx = tx.clone();
        let checkpoint = checkpoint.clone();
        let mut hints = state.notifier.subscribe(room_id);

        async move {
            loop {
                match hints.recv().await {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        let req = ExchangeRequest {
                            messages: Vec::new(),
                            lastsignal: SignalId(checkpoint.load(Ordering::SeqCst)),
                        };
                        let res = state.service.exchange(&ctx, peer_id, req).await;
                        if !reply(&tx, res) {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ExchangeRequest>(&text) {
                        Ok(req) => {
                            checkpoint.fetch_max(req.lastsignal.0, Ordering::SeqCst);
                            let res = state.service.exchange(&ctx, peer_id, req).await;
                            if !reply(&tx, res) {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid ExchangeRequest from {}: {}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    // Once both producers stop, the writer flushes what is queued and closes.
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            push_task.abort();
        }
        _ = (&mut recv_task) => {
            push_task.abort();
            let _ = send_task.await;
        }
        _ = (&mut push_task) => {
            recv_task.abort();
            let _ = send_task.await;
        }
    };

    info!("Venue stream closed: peer {}", peer_id);
}

/// Queues the outcome of an exchange for the socket. Returns false when the
/// stream should end: the peer is gone or the socket writer stopped.
fn reply(tx: &mpsc::UnboundedSender<Message>, res: VenueResult<ExchangeResponse>) -> bool {
    let (json, keep_open) = match res {
        Ok(response) => (serde_json::to_string(&response), true),
        Err(e) => (serde_json::to_string(&ErrorBody::from(&e)), !e.is_gone()),
    };

    match json {
        Ok(json) => tx.send(Message::Text(json.into())).is_ok() && keep_open,
        Err(e) => {
            error!("Failed to serialize exchange reply: {}", e);
            keep_open
        }
    }
}
