use crate::error::ClientError;
use async_trait::async_trait;
use tracing::{debug, info};
use venue_core::{OutgoingSignal, PeerId, SignalKind};

/// Lifecycle of the link to one remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Negotiating,
    Connected,
    Closed,
}

/// Local media engine behind one connection. Descriptions and candidates
/// are passed through as the opaque strings that travel in signal payloads.
#[async_trait]
pub trait MediaSession: Send {
    async fn create_offer(&mut self) -> Result<String, ClientError>;

    /// Applies a remote offer and returns the local answer.
    async fn accept_offer(&mut self, offer: &str) -> Result<String, ClientError>;

    async fn accept_answer(&mut self, answer: &str) -> Result<(), ClientError>;

    async fn add_ice_candidate(&mut self, candidate: &str) -> Result<(), ClientError>;

    /// Discards a local offer that lost a glare race.
    async fn rollback(&mut self) -> Result<(), ClientError>;

    fn close(&mut self);
}

pub trait MediaFactory: Send + Sync {
    fn open(&self, remote: PeerId) -> Box<dyn MediaSession>;
}

pub struct PeerConnection {
    local: PeerId,
    remote: PeerId,
    state: ConnectionState,
    media: Box<dyn MediaSession>,
    has_remote_description: bool,
    pending_candidates: Vec<String>,
}

impl PeerConnection {
    pub fn new(local: PeerId, remote: PeerId, media: Box<dyn MediaSession>) -> Self {
        Self {
            local,
            remote,
            state: ConnectionState::Idle,
            media,
            has_remote_description: false,
            pending_candidates: Vec::new(),
        }
    }

    pub fn remote(&self) -> PeerId {
        self.remote
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// On a glare the peer with the lower id drops its own offer.
    fn yields_on_glare(&self) -> bool {
        self.local < self.remote
    }

    /// Creates the initial offer. Only an idle connection starts.
    pub async fn start(&mut self) -> Result<Option<OutgoingSignal>, ClientError> {
        if self.state != ConnectionState::Idle {
            return Ok(None);
        }
        let offer = self.media.create_offer().await?;
        self.state = ConnectionState::Negotiating;
        info!("Offering to peer {}", self.remote);
        Ok(Some(self.outgoing(SignalKind::Offer, offer)))
    }

    /// Feeds one negotiation signal from the remote peer. Returns the reply
    /// to send back, if any.
    pub async fn on_signal(
        &mut self,
        kind: &SignalKind,
        payload: &str,
    ) -> Result<Option<OutgoingSignal>, ClientError> {
        if self.state == ConnectionState::Closed {
            debug!("Dropping {} for closed connection to {}", kind, self.remote);
            return Ok(None);
        }

        match kind {
            SignalKind::Offer => {
                if self.state == ConnectionState::Negotiating {
                    if !self.yields_on_glare() {
                        debug!("Ignoring colliding offer from {}", self.remote);
                        return Ok(None);
                    }
                    self.media.rollback().await?;
                }
                let answer = self.media.accept_offer(payload).await?;
                self.remote_description_applied().await?;
                self.state = ConnectionState::Connected;
                info!("Answering peer {}", self.remote);
                Ok(Some(self.outgoing(SignalKind::Answer, answer)))
            }
            SignalKind::Answer => {
                if self.state != ConnectionState::Negotiating {
                    debug!("Stale answer from {} in {:?}", self.remote, self.state);
                    return Ok(None);
                }
                self.media.accept_answer(payload).await?;
                self.remote_description_applied().await?;
                self.state = ConnectionState::Connected;
                info!("Connected to peer {}", self.remote);
                Ok(None)
            }
            SignalKind::IceCandidate => {
                if self.has_remote_description {
                    self.media.add_ice_candidate(payload).await?;
                } else {
                    self.pending_candidates.push(payload.to_owned());
                }
                Ok(None)
            }
            SignalKind::Control(_) => Ok(None),
        }
    }

    /// Wraps a local ICE candidate for the remote peer.
    pub fn candidate(&self, candidate: impl Into<String>) -> Option<OutgoingSignal> {
        (self.state != ConnectionState::Closed)
            .then(|| self.outgoing(SignalKind::IceCandidate, candidate.into()))
    }

    pub fn close(&mut self) {
        if self.state != ConnectionState::Closed {
            self.media.close();
            self.pending_candidates.clear();
            self.state = ConnectionState::Closed;
            info!("Closed connection to peer {}", self.remote);
        }
    }

    async fn remote_description_applied(&mut self) -> Result<(), ClientError> {
        self.has_remote_description = true;
        for candidate in std::mem::take(&mut self.pending_candidates) {
            self.media.add_ice_candidate(&candidate).await?;
        }
        Ok(())
    }

    fn outgoing(&self, kind: SignalKind, payload: String) -> OutgoingSignal {
        OutgoingSignal {
            to_peer: self.remote,
            kind,
            payload,
        }
    }
}
