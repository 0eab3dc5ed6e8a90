use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use venue_core::{
    Capabilities, IceServerConfig, Owner, RelayCoordinates, Room, RoomId, SessionContext,
    SessionId, TaskKind, UserId, VenueError, VenueResult,
};

/// Server configuration, usually read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    pub bind: SocketAddr,
    /// Participant limit for rooms that set none.
    pub default_peer_limit: Option<u32>,
    pub sweep_interval_secs: u64,
    pub ice_servers: Vec<IceServerConfig>,
    pub rooms: Vec<RoomConfig>,
    pub sessions: Vec<SessionConfig>,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            default_peer_limit: None,
            sweep_interval_secs: 60,
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            rooms: Vec::new(),
            sessions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    pub id: u64,
    #[serde(default = "default_kind")]
    pub kind: TaskKind,
    #[serde(default)]
    pub peer_limit: Option<u32>,
    #[serde(default)]
    pub relay: Option<RelayCoordinates>,
}

fn default_kind() -> TaskKind {
    TaskKind::Venue
}

/// Static bearer token for hosts without their own session layer.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub token: String,
    pub user_id: u64,
    #[serde(default)]
    pub moderator: bool,
}

impl VenueConfig {
    pub fn from_toml_str(s: &str) -> VenueResult<Self> {
        toml::from_str(s).map_err(|e| VenueError::InvalidInput(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> VenueResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| VenueError::InvalidInput(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl From<&RoomConfig> for Room {
    fn from(cfg: &RoomConfig) -> Self {
        Room {
            id: RoomId(cfg.id),
            kind: cfg.kind,
            peer_limit: cfg.peer_limit,
            relay: cfg.relay.clone(),
            published_feed: None,
        }
    }
}

impl SessionConfig {
    pub fn context(&self) -> SessionContext {
        SessionContext {
            owner: Owner {
                user_id: UserId(self.user_id),
                session_id: SessionId::new(),
            },
            capabilities: if self.moderator {
                Capabilities::moderator()
            } else {
                Capabilities::participant()
            },
        }
    }
}
