//! Session guard: resolves the bearer token to a session object and checks
//! the role a route requires. Missing tokens, lapsed sessions, and role
//! mismatches all redirect to the login entry rather than reporting an
//! error.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::model::{Role, Tenant};
use crate::session::{AuthenticatedSession, SessionToken};

use super::error::ApiError;
use super::AppState;

/// Extractor for the authenticated session on protected routes.
pub struct CurrentSession(pub AuthenticatedSession);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::LoginRedirect)?;
        let session = state.authenticate(token).ok_or(ApiError::LoginRedirect)?;
        Ok(CurrentSession(session))
    }
}

fn bearer_token(parts: &Parts) -> Option<SessionToken> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim()
        .parse()
        .ok()
}

impl CurrentSession {
    pub fn token(&self) -> SessionToken {
        self.0.token
    }

    /// Admin routes accept only the admin role.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        match self.0.role {
            Role::Admin => Ok(()),
            Role::College(_) => Err(ApiError::LoginRedirect),
        }
    }

    /// College routes require exactly that tenant's role; admins included
    /// are bounced to their own views.
    pub fn require_college(&self, tenant: Tenant) -> Result<(), ApiError> {
        match self.0.role {
            Role::College(t) if t == tenant => Ok(()),
            _ => Err(ApiError::LoginRedirect),
        }
    }
}
