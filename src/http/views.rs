//! Per-session view registry. A view-model exists while its owning session
//! does; tearing the session down drops its views and releases their feed
//! subscriptions.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::dashboard::Dashboard;
use crate::image::ImageHost;
use crate::model::Tenant;
use crate::rollup::Rollup;
use crate::session::SessionToken;
use crate::store::ExpenseStore;

#[derive(Default)]
struct SessionViews {
    dashboard: Option<Arc<Dashboard>>,
    rollup: Option<Arc<Rollup>>,
    admin_details: HashMap<Tenant, Arc<Dashboard>>,
}

/// Lazily created view-models keyed by session token.
#[derive(Default)]
pub struct ViewRegistry {
    inner: Mutex<HashMap<SessionToken, SessionViews>>,
}

impl ViewRegistry {
    /// The college dashboard owned by this session, created on first use.
    pub fn dashboard(
        &self,
        token: SessionToken,
        tenant: Tenant,
        store: &Arc<dyn ExpenseStore>,
        images: &Arc<dyn ImageHost>,
    ) -> Arc<Dashboard> {
        let mut inner = self.inner.lock();
        let views = inner.entry(token).or_default();
        views
            .dashboard
            .get_or_insert_with(|| {
                Arc::new(Dashboard::new(tenant, Arc::clone(store), Arc::clone(images)))
            })
            .clone()
    }

    /// The admin rollup owned by this session.
    pub fn rollup(&self, token: SessionToken, store: &Arc<dyn ExpenseStore>) -> Arc<Rollup> {
        let mut inner = self.inner.lock();
        let views = inner.entry(token).or_default();
        views
            .rollup
            .get_or_insert_with(|| Arc::new(Rollup::new(store.as_ref())))
            .clone()
    }

    /// The admin detail view of one tenant, kept separate from that
    /// college's own dashboard so filter state never crosses sessions.
    pub fn admin_detail(
        &self,
        token: SessionToken,
        tenant: Tenant,
        store: &Arc<dyn ExpenseStore>,
        images: &Arc<dyn ImageHost>,
    ) -> Arc<Dashboard> {
        let mut inner = self.inner.lock();
        let views = inner.entry(token).or_default();
        views
            .admin_details
            .entry(tenant)
            .or_insert_with(|| {
                Arc::new(Dashboard::new(tenant, Arc::clone(store), Arc::clone(images)))
            })
            .clone()
    }

    /// Drops every view owned by the session.
    pub fn teardown(&self, token: SessionToken) {
        self.inner.lock().remove(&token);
    }
}
