use crate::config::VenueConfig;
use crate::feed::FeedArbitrator;
use crate::queue::SignalQueue;
use crate::registry::{PeerRegistry, load_owned_peer};
use crate::signaling::ChangeNotifier;
use crate::store::VenueStore;
use std::sync::Arc;
use tracing::{debug, info, warn};
use venue_core::{
    ControlMessage, ExchangeRequest, ExchangeResponse, IceServerConfig, JoinCapability,
    JoinRequest, JoinResponse, OkResponse, PeerId, PublishFeedRequest, Room, RoomId,
    SessionContext, SettingsUpdate, SignalEnvelope, SignalKind, VenueError, VenueResult,
    VolumeLevels,
};

struct VenueInner {
    store: Arc<dyn VenueStore>,
    registry: PeerRegistry,
    queue: SignalQueue,
    feeds: FeedArbitrator,
    notifier: Arc<dyn ChangeNotifier>,
    ice_servers: Vec<IceServerConfig>,
}

/// The RPC surface of the signaling core. Cheap to clone; every handler
/// gets its own copy.
#[derive(Clone)]
pub struct VenueService {
    inner: Arc<VenueInner>,
}

impl VenueService {
    pub fn new(
        store: Arc<dyn VenueStore>,
        notifier: Arc<dyn ChangeNotifier>,
        config: &VenueConfig,
    ) -> Self {
        let feeds = FeedArbitrator::new(store.clone(), notifier.clone());
        let registry = PeerRegistry::new(store.clone(), feeds.clone(), notifier.clone())
            .with_default_limit(config.default_peer_limit);

        Self {
            inner: Arc::new(VenueInner {
                queue: SignalQueue::new(store.clone()),
                store,
                registry,
                feeds,
                notifier,
                ice_servers: config.ice_servers.clone(),
            }),
        }
    }

    pub fn store(&self) -> Arc<dyn VenueStore> {
        self.inner.store.clone()
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.inner.registry
    }

    pub fn feeds(&self) -> &FeedArbitrator {
        &self.inner.feeds
    }

    pub fn queue(&self) -> &SignalQueue {
        &self.inner.queue
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    /// Registers a room on behalf of the host.
    pub async fn open_room(&self, room: Room) -> VenueResult<()> {
        info!("Opening room {} ({:?})", room.id, room.kind);
        self.inner.store.put_room(room).await
    }

    /// Room of a peer the caller owns.
    pub async fn room_of(&self, ctx: &SessionContext, peer_id: PeerId) -> VenueResult<RoomId> {
        Ok(load_owned_peer(self.inner.store.as_ref(), ctx, peer_id)
            .await?
            .room_id)
    }

    pub async fn join(&self, ctx: &SessionContext, req: JoinRequest) -> VenueResult<JoinResponse> {
        let registry = &self.inner.registry;

        let attached = match req.peer_id {
            Some(existing) => match registry.attach(ctx, req.room_id, existing).await {
                Ok(peer) => Some(peer),
                Err(VenueError::UnknownPeer(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let (peer_id, mut feed) = match &attached {
            Some(peer) => (peer.id, peer.holds_feed()),
            None => (registry.register(ctx, req.room_id).await?, false),
        };

        if req.capability == JoinCapability::Publisher {
            if let Some(key) = req.feed {
                match self.inner.feeds.publish(ctx, peer_id, Some(key)).await {
                    Ok(()) => feed = true,
                    Err(VenueError::FeedBusy(room)) => {
                        info!("Peer {} joined room {} without the feed (busy)", peer_id, room)
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(JoinResponse {
            peer_id,
            room_id: req.room_id,
            attached: attached.is_some(),
            feed,
            ice_servers: self.get_ice_servers(),
        })
    }

    /// Pushes the caller's outgoing signals, drains what is addressed to it
    /// and returns the room snapshot.
    pub async fn exchange(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        req: ExchangeRequest,
    ) -> VenueResult<ExchangeResponse> {
        let peer = load_owned_peer(self.inner.store.as_ref(), ctx, peer_id).await?;
        let roommates = self.inner.store.peers_in_room(peer.room_id).await?;

        let mut sent = 0usize;
        for msg in req.messages {
            if msg.to_peer == peer_id || !roommates.iter().any(|p| p.id == msg.to_peer) {
                debug!("Dropping {} from {} for {}: not a roommate", msg.kind, peer_id, msg.to_peer);
                continue;
            }
            match self
                .inner
                .queue
                .send(peer_id, msg.to_peer, msg.kind, msg.payload)
                .await
            {
                Ok(_) => sent += 1,
                Err(VenueError::UnknownPeer(to)) => {
                    debug!("Dropping signal from {}: peer {} is gone", peer_id, to)
                }
                Err(e) => return Err(e),
            }
        }
        if sent > 0 {
            self.inner.notifier.room_changed(peer.room_id).await;
        }

        let messages = self
            .inner
            .queue
            .drain(peer_id, req.lastsignal)
            .await?
            .into_iter()
            .map(SignalEnvelope::from)
            .collect();

        let settings = self.inner.registry.get_settings(peer_id).await?;
        let peers = settings
            .iter()
            .filter(|s| !s.closed && s.id != peer_id)
            .map(|s| s.id)
            .collect();

        Ok(ExchangeResponse {
            messages,
            peers,
            settings,
        })
    }

    pub async fn publish_feed(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        req: PublishFeedRequest,
    ) -> VenueResult<OkResponse> {
        if req.publish {
            self.inner.feeds.publish(ctx, peer_id, req.feed).await?;
        } else {
            self.inner.feeds.unpublish(ctx, peer_id).await?;
        }
        Ok(OkResponse::OK)
    }

    pub async fn update_settings(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        update: SettingsUpdate,
    ) -> VenueResult<OkResponse> {
        self.inner
            .registry
            .update_settings(ctx, peer_id, update)
            .await?;
        Ok(OkResponse::OK)
    }

    /// Tells every other live peer in the room about a raised or lowered hand.
    pub async fn raise_hand(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        raised: bool,
    ) -> VenueResult<OkResponse> {
        self.fan_out(ctx, peer_id, ControlMessage::RaiseHand(raised))
            .await?;
        Ok(OkResponse::OK)
    }

    pub async fn send_volume(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        levels: VolumeLevels,
    ) -> VenueResult<OkResponse> {
        self.fan_out(ctx, peer_id, ControlMessage::Volume(levels.clamped()))
            .await?;
        Ok(OkResponse::OK)
    }

    /// Immediate departure. The peer row and its signals are gone on return.
    pub async fn leave(&self, ctx: &SessionContext, peer_id: PeerId) -> VenueResult<OkResponse> {
        load_owned_peer(self.inner.store.as_ref(), ctx, peer_id).await?;
        self.inner.registry.remove(peer_id).await?;
        Ok(OkResponse::OK)
    }

    async fn fan_out(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        message: ControlMessage,
    ) -> VenueResult<usize> {
        let peer = load_owned_peer(self.inner.store.as_ref(), ctx, peer_id).await?;
        if peer.closed {
            return Err(VenueError::UnknownPeer(peer_id));
        }

        let payload = message
            .to_payload()
            .map_err(|e| VenueError::InvalidInput(e.to_string()))?;
        let mut delivered = 0;
        for other in self.inner.registry.live_peers(peer.room_id).await? {
            if other.id == peer_id {
                continue;
            }
            match self
                .inner
                .queue
                .send(peer_id, other.id, SignalKind::control(), payload.clone())
                .await
            {
                Ok(_) => delivered += 1,
                Err(VenueError::UnknownPeer(_)) => {}
                Err(e) => {
                    warn!("Control fan-out from {} stopped: {}", peer_id, e);
                    return Err(e);
                }
            }
        }

        if delivered > 0 {
            self.inner.notifier.room_changed(peer.room_id).await;
        }
        Ok(delivered)
    }
}
