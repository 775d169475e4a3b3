//! Admin-side totals: one live feed per tenant, summed without filtering.

use parking_lot::Mutex;
use tracing::debug;

use crate::filter;
use crate::model::{Tenant, TenantTotals};
use crate::store::{ExpenseStore, FeedSubscription};

/// Cross-tenant rollup view. Holds one subscription per tenant for its
/// lifetime and reports a total for every tenant; dropping the rollup
/// releases every subscription.
pub struct Rollup {
    inner: Mutex<RollupInner>,
}

struct RollupInner {
    feeds: Vec<(Tenant, FeedSubscription)>,
    totals: TenantTotals,
}

impl Rollup {
    pub fn new(store: &dyn ExpenseStore) -> Self {
        let mut totals = TenantTotals::zeroed();
        let feeds = Tenant::ALL
            .into_iter()
            .map(|tenant| {
                let mut feed = store.subscribe(tenant);
                totals.set(tenant, filter::total_amount(&feed.snapshot()));
                (tenant, feed)
            })
            .collect();
        Self {
            inner: Mutex::new(RollupInner { feeds, totals }),
        }
    }

    /// Current totals, refreshing only the tenants whose feed has new data.
    /// Other tenants' entries stay as last computed.
    pub fn totals(&self) -> TenantTotals {
        let mut inner = self.inner.lock();
        let RollupInner { feeds, totals } = &mut *inner;
        for (tenant, feed) in feeds.iter_mut() {
            if feed.has_changed() {
                let total = filter::total_amount(&feed.snapshot());
                totals.set(*tenant, total);
                debug!(tenant = %tenant, total, "rollup total refreshed");
            }
        }
        totals.clone()
    }
}
