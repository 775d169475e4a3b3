//! Explicit login sessions. A login issues a token with an expiry; logout
//! and expiry are first-class transitions, and every protected operation
//! resolves its session object instead of reading ambient role state.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::Role;

/// Opaque bearer token identifying one login session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn issue() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A live login: who it is and when it lapses.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub token: SessionToken,
    pub role: Role,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl AuthenticatedSession {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Issues, resolves, and retires session tokens.
pub struct SessionManager {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionToken, AuthenticatedSession>>,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session for a verified role.
    pub fn login(&self, role: Role) -> AuthenticatedSession {
        let now = OffsetDateTime::now_utc();
        let session = AuthenticatedSession {
            token: SessionToken::issue(),
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.write().insert(session.token, session.clone());
        info!(role = %session.role, token = %session.token, "session started");
        session
    }

    /// Resolves a token to its live session. An expired session reads as
    /// absent and is discarded on the spot.
    pub fn authenticate(&self, token: SessionToken) -> Option<AuthenticatedSession> {
        let now = OffsetDateTime::now_utc();
        {
            let sessions = self.sessions.read();
            match sessions.get(&token) {
                None => return None,
                Some(session) if !session.is_expired_at(now) => return Some(session.clone()),
                Some(_) => {}
            }
        }
        self.sessions.write().remove(&token);
        debug!(%token, "expired session discarded");
        None
    }

    /// Ends a session. Returns whether a session was actually removed.
    pub fn logout(&self, token: SessionToken) -> bool {
        let removed = self.sessions.write().remove(&token);
        if let Some(session) = &removed {
            info!(role = %session.role, %token, "session ended");
        }
        removed.is_some()
    }

    /// Drops every lapsed session, returning their tokens so state keyed on
    /// them (per-session views) can be torn down too.
    pub fn purge_expired(&self) -> Vec<SessionToken> {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write();
        let lapsed: Vec<SessionToken> = sessions
            .values()
            .filter(|s| s.is_expired_at(now))
            .map(|s| s.token)
            .collect();
        for token in &lapsed {
            sessions.remove(token);
        }
        if !lapsed.is_empty() {
            debug!(count = lapsed.len(), "purged expired sessions");
        }
        lapsed
    }
}
