//! HTTP surface: application state, route table, and the session sweeper.

mod error;
mod guard;
mod handlers;
mod views;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::Authenticator;
use crate::image::ImageHost;
use crate::session::{AuthenticatedSession, SessionManager, SessionToken};
use crate::store::ExpenseStore;
use views::ViewRegistry;

pub(crate) const LOGIN_PATH: &str = "/login";

/// Shared state behind every route: the adapters, the session manager, and
/// the per-session view registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppInner>,
}

struct AppInner {
    store: Arc<dyn ExpenseStore>,
    images: Arc<dyn ImageHost>,
    auth: Arc<dyn Authenticator>,
    sessions: SessionManager,
    views: ViewRegistry,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ExpenseStore>,
        images: Arc<dyn ImageHost>,
        auth: Arc<dyn Authenticator>,
        session_ttl: time::Duration,
    ) -> Self {
        Self {
            inner: Arc::new(AppInner {
                store,
                images,
                auth,
                sessions: SessionManager::new(session_ttl),
                views: ViewRegistry::default(),
            }),
        }
    }

    pub(crate) fn store(&self) -> &Arc<dyn ExpenseStore> {
        &self.inner.store
    }

    pub(crate) fn images(&self) -> &Arc<dyn ImageHost> {
        &self.inner.images
    }

    pub(crate) fn auth(&self) -> &dyn Authenticator {
        self.inner.auth.as_ref()
    }

    pub(crate) fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    pub(crate) fn views(&self) -> &ViewRegistry {
        &self.inner.views
    }

    /// Resolves a token, tearing down the session's views if it lapsed.
    pub(crate) fn authenticate(&self, token: SessionToken) -> Option<AuthenticatedSession> {
        let session = self.inner.sessions.authenticate(token);
        if session.is_none() {
            self.inner.views.teardown(token);
        }
        session
    }

    /// Ends a session along with the views it owns.
    pub(crate) fn logout(&self, token: SessionToken) -> bool {
        self.inner.views.teardown(token);
        self.inner.sessions.logout(token)
    }

    /// Removes expired sessions and the views they own; returns how many
    /// sessions were retired.
    pub fn purge_expired_sessions(&self) -> usize {
        let lapsed = self.inner.sessions.purge_expired();
        for token in &lapsed {
            self.inner.views.teardown(*token);
        }
        lapsed.len()
    }
}

/// Builds the full route table over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(LOGIN_PATH, get(handlers::login_entry).post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/colleges/{tenant}", get(handlers::college_dashboard))
        .route("/colleges/{tenant}/filter", post(handlers::college_filter))
        .route(
            "/colleges/{tenant}/expenses",
            post(handlers::college_add_expense),
        )
        .route("/admin/summary", get(handlers::admin_summary))
        .route(
            "/admin/colleges/{tenant}",
            get(handlers::admin_college_detail),
        )
        .route(
            "/admin/colleges/{tenant}/filter",
            post(handlers::admin_college_filter),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically retires expired sessions so abandoned logins release their
/// feed subscriptions without waiting for another request on that token.
pub fn spawn_session_sweeper(
    state: AppState,
    every: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let purged = state.purge_expired_sessions();
            if purged > 0 {
                debug!(purged, "expired sessions swept");
            }
        }
    })
}
