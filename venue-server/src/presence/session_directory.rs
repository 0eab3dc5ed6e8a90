use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use venue_core::{SessionContext, SessionId};

/// The host's view of its transport sessions.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Maps a bearer token to the caller's context.
    async fn resolve(&self, token: &str) -> Option<SessionContext>;

    /// Whether the underlying transport session still exists.
    async fn is_alive(&self, session_id: SessionId) -> bool;
}

/// Token table kept in memory. Used by the standalone server and tests.
#[derive(Default)]
pub struct MemorySessions {
    by_token: DashMap<String, SessionContext>,
    tokens: DashMap<SessionId, String>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, token: impl Into<String>, ctx: SessionContext) {
        let token = token.into();
        self.tokens.insert(ctx.session_id(), token.clone());
        self.by_token.insert(token, ctx);
    }

    /// Ends a session, as a logout or session expiry would.
    pub fn end(&self, session_id: SessionId) {
        if let Some((_, token)) = self.tokens.remove(&session_id) {
            self.by_token.remove(&token);
            debug!("Session {} ended", session_id);
        }
    }
}

#[async_trait]
impl SessionDirectory for MemorySessions {
    async fn resolve(&self, token: &str) -> Option<SessionContext> {
        self.by_token.get(token).map(|ctx| *ctx.value())
    }

    async fn is_alive(&self, session_id: SessionId) -> bool {
        self.tokens.contains_key(&session_id)
    }
}
