use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::peer_connection::{ConnectionState, MediaFactory, PeerConnection};
use crate::transport::VenueTransport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use venue_core::{
    IceServerConfig, JoinRequest, OutgoingSignal, PeerId, PeerSettings, RoomId, SignalId,
    SignalKind, VolumeLevels,
};

mod exchange_impl;
mod handle_signal_impl;
mod reconcile_impl;
mod run_impl;
mod throttle;

pub use run_impl::{ClientCommand, ClientHandle};
pub use throttle::Throttle;

/// What the host UI hears about the room.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Settings of every peer in the room, sorted by id.
    SettingsChanged(Vec<PeerSettings>),
    FeedChanged(Option<PeerId>),
    HandRaised { peer: PeerId, raised: bool },
    Volume { peer: PeerId, levels: VolumeLevels },
    ConnectionChanged { peer: PeerId, state: ConnectionState },
    /// Another peer already publishes the room's feed.
    FeedBusy,
    /// The server no longer knows this peer.
    Evicted,
    Left,
}

/// Client side of one joined peer: batches outgoing signals into exchange
/// calls, tracks the delivery checkpoint and drives one `PeerConnection`
/// per remote peer.
pub struct VenueClient {
    transport: Arc<dyn VenueTransport>,
    media: Arc<dyn MediaFactory>,
    config: ClientConfig,
    peer_id: PeerId,
    room_id: RoomId,
    ice_servers: Vec<IceServerConfig>,
    checkpoint: SignalId,
    outbox: Vec<OutgoingSignal>,
    connections: HashMap<PeerId, PeerConnection>,
    settings: HashMap<PeerId, PeerSettings>,
    throttle: Throttle,
    failures: u32,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl VenueClient {
    /// Joins a room and returns the client plus its event stream.
    pub async fn join(
        transport: Arc<dyn VenueTransport>,
        media: Arc<dyn MediaFactory>,
        config: ClientConfig,
        req: JoinRequest,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ClientEvent>), ClientError> {
        let joined = transport.join(req).await?;
        info!(
            "Joined room {} as peer {} (attached: {})",
            joined.room_id, joined.peer_id, joined.attached
        );

        let (events, rx) = mpsc::unbounded_channel();
        let client = Self {
            transport,
            media,
            throttle: Throttle::new(config.throttle_window),
            config,
            peer_id: joined.peer_id,
            room_id: joined.room_id,
            ice_servers: joined.ice_servers,
            checkpoint: SignalId(0),
            outbox: Vec::new(),
            connections: HashMap::new(),
            settings: HashMap::new(),
            failures: 0,
            events,
        };
        Ok((client, rx))
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    /// Highest signal id consumed so far.
    pub fn checkpoint(&self) -> SignalId {
        self.checkpoint
    }

    pub fn pending_outgoing(&self) -> usize {
        self.outbox.len()
    }

    pub fn connection_state(&self, remote: PeerId) -> Option<ConnectionState> {
        self.connections.get(&remote).map(|c| c.state())
    }

    pub fn settings_of(&self, peer: PeerId) -> Option<&PeerSettings> {
        self.settings.get(&peer)
    }

    /// Queues a signal for the next exchange.
    pub fn queue(&mut self, to_peer: PeerId, kind: SignalKind, payload: impl Into<String>) {
        self.outbox.push(OutgoingSignal {
            to_peer,
            kind,
            payload: payload.into(),
        });
    }

    /// Queues a local ICE candidate for a connection in progress.
    pub fn queue_candidate(&mut self, remote: PeerId, candidate: impl Into<String>) {
        if let Some(signal) = self
            .connections
            .get(&remote)
            .and_then(|c| c.candidate(candidate))
        {
            self.outbox.push(signal);
        }
    }

    fn emit(&self, event: ClientEvent) {
        // The host may have dropped the receiver; the client keeps working.
        let _ = self.events.send(event);
    }

    fn open_connection(&mut self, remote: PeerId) -> &mut PeerConnection {
        let local = self.peer_id;
        let media = &self.media;
        self.connections
            .entry(remote)
            .or_insert_with(|| PeerConnection::new(local, remote, media.open(remote)))
    }

    fn close_all(&mut self) {
        for (peer, mut conn) in self.connections.drain() {
            conn.close();
            let _ = self.events.send(ClientEvent::ConnectionChanged {
                peer,
                state: ConnectionState::Closed,
            });
        }
    }
}
