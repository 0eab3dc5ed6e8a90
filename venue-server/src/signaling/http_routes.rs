use crate::config::VenueConfig;
use crate::presence::SessionDirectory;
use crate::signaling::{ApiError, BroadcastNotifier, VenueService, ws_handler};
use crate::store::VenueStore;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use venue_core::{
    ExchangeRequest, ExchangeResponse, JoinRequest, JoinResponse, OkResponse, PeerId,
    PublishFeedRequest, RaiseHandRequest, SessionContext, SettingsUpdate, VenueError,
    VolumeRequest,
};

/// Shared state of every HTTP and WebSocket handler.
#[derive(Clone)]
pub struct VenueState {
    pub service: VenueService,
    pub sessions: Arc<dyn SessionDirectory>,
    pub notifier: Arc<BroadcastNotifier>,
}

impl VenueState {
    /// Wires a service whose change hints feed the WebSocket push path.
    pub fn build(
        store: Arc<dyn VenueStore>,
        sessions: Arc<dyn SessionDirectory>,
        config: &VenueConfig,
    ) -> Self {
        let notifier = Arc::new(BroadcastNotifier::new());
        let service = VenueService::new(store, notifier.clone(), config);
        Self {
            service,
            sessions,
            notifier,
        }
    }
}

pub fn router(state: VenueState) -> Router {
    Router::new()
        .route("/join", post(join))
        .route("/peers/{peer_id}", delete(leave))
        .route("/peers/{peer_id}/exchange", post(exchange))
        .route("/peers/{peer_id}/feed", post(publish_feed))
        .route("/peers/{peer_id}/settings", post(update_settings))
        .route("/peers/{peer_id}/hand", post(raise_hand))
        .route("/peers/{peer_id}/volume", post(send_volume))
        .route("/peers/{peer_id}/ws", get(ws_handler))
        .with_state(state)
}

/// Caller identity resolved from `Authorization: Bearer` or `?token=`.
pub struct Caller(pub SessionContext);

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header_token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned());

    header_token.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|q| q.0.token)
    })
}

impl FromRequestParts<VenueState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &VenueState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError(VenueError::Unauthorized))?;
        state
            .sessions
            .resolve(&token)
            .await
            .map(Caller)
            .ok_or(ApiError(VenueError::Unauthorized))
    }
}

async fn join(
    State(state): State<VenueState>,
    Caller(ctx): Caller,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    Ok(Json(state.service.join(&ctx, req).await?))
}

async fn exchange(
    State(state): State<VenueState>,
    Caller(ctx): Caller,
    Path(peer_id): Path<u64>,
    Json(req): Json<ExchangeRequest>,
) -> Result<Json<ExchangeResponse>, ApiError> {
    Ok(Json(state.service.exchange(&ctx, PeerId(peer_id), req).await?))
}

async fn publish_feed(
    State(state): State<VenueState>,
    Caller(ctx): Caller,
    Path(peer_id): Path<u64>,
    Json(req): Json<PublishFeedRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    Ok(Json(
        state.service.publish_feed(&ctx, PeerId(peer_id), req).await?,
    ))
}

async fn update_settings(
    State(state): State<VenueState>,
    Caller(ctx): Caller,
    Path(peer_id): Path<u64>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<OkResponse>, ApiError> {
    Ok(Json(
        state
            .service
            .update_settings(&ctx, PeerId(peer_id), update)
            .await?,
    ))
}

async fn raise_hand(
    State(state): State<VenueState>,
    Caller(ctx): Caller,
    Path(peer_id): Path<u64>,
    Json(req): Json<RaiseHandRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    Ok(Json(
        state
            .service
            .raise_hand(&ctx, PeerId(peer_id), req.raised)
            .await?,
    ))
}

async fn send_volume(
    State(state): State<VenueState>,
    Caller(ctx): Caller,
    Path(peer_id): Path<u64>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    Ok(Json(
        state
            .service
            .send_volume(&ctx, PeerId(peer_id), req.volume)
            .await?,
    ))
}

async fn leave(
    State(state): State<VenueState>,
    Caller(ctx): Caller,
    Path(peer_id): Path<u64>,
) -> Result<Json<OkResponse>, ApiError> {
    Ok(Json(state.service.leave(&ctx, PeerId(peer_id)).await?))
}
