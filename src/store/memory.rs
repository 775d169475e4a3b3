//! Process-local store adapter backed by per-tenant watch channels.

use std::array;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use super::{ExpenseStore, FeedSnapshot, FeedSubscription, StoreError};
use crate::model::{ExpenseId, ExpenseRecord, NewExpense, Tenant};

/// In-memory [`ExpenseStore`]: one append-only shard per tenant, each
/// publishing its full ordered snapshot on every insert.
pub struct InMemoryStore {
    shards: [Shard; Tenant::ALL.len()],
}

struct Shard {
    records: Mutex<Vec<ExpenseRecord>>,
    feed: watch::Sender<FeedSnapshot>,
}

impl Shard {
    fn new() -> Self {
        let (feed, _) = watch::channel(FeedSnapshot::from(Vec::new()));
        Self {
            records: Mutex::new(Vec::new()),
            feed,
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            shards: array::from_fn(|_| Shard::new()),
        }
    }

    fn shard(&self, tenant: Tenant) -> &Shard {
        &self.shards[tenant as usize]
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn insert(&self, tenant: Tenant, expense: NewExpense) -> Result<ExpenseId, StoreError> {
        if !expense.amount.is_finite() || expense.amount < 0.0 {
            return Err(StoreError::InvalidAmount);
        }
        let record = ExpenseRecord {
            id: ExpenseId::new(),
            tenant,
            description: expense.description,
            amount: expense.amount,
            occurred_at: expense.occurred_at,
            created_at: expense.created_at,
            display_date: expense.display_date,
            receipt_image: expense.receipt_image,
        };
        let id = record.id;
        let shard = self.shard(tenant);
        let count;
        {
            let mut records = shard.records.lock();
            records.push(record);
            let snapshot = ordered_snapshot(&records);
            count = snapshot.len();
            shard.feed.send_replace(snapshot);
        }
        debug!(%tenant, %id, records = count, "expense inserted");
        Ok(id)
    }

    fn subscribe(&self, tenant: Tenant) -> FeedSubscription {
        FeedSubscription::new(self.shard(tenant).feed.subscribe())
    }
}

/// Display order: `created_at` descending, equal dates newest insert first.
fn ordered_snapshot(appended: &[ExpenseRecord]) -> FeedSnapshot {
    let mut ordered: Vec<ExpenseRecord> = appended.iter().rev().cloned().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered.into()
}
