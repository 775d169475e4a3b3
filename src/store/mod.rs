//! Expense store adapter: append-only per-tenant collections that publish
//! the complete ordered record set on every change.

mod memory;

pub use memory::InMemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::model::{ExpenseId, ExpenseRecord, NewExpense, Tenant};

/// Full ordered record set for one tenant, as published by its feed.
pub type FeedSnapshot = Arc<[ExpenseRecord]>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("expense amount must be a non-negative number")]
    InvalidAmount,
    #[error("expense store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only expense storage, partitioned by tenant. Records are never
/// updated or deleted; every accepted insert publishes a whole replacement
/// snapshot to that tenant's feed.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Persists a record and returns its assigned id.
    async fn insert(&self, tenant: Tenant, expense: NewExpense) -> Result<ExpenseId, StoreError>;

    /// Opens a live feed of `tenant`'s records, ordered by `created_at`
    /// descending. The current snapshot is readable immediately; dropping
    /// the subscription releases it.
    fn subscribe(&self, tenant: Tenant) -> FeedSubscription;
}

/// Handle on one tenant's live feed.
pub struct FeedSubscription {
    rx: watch::Receiver<FeedSnapshot>,
}

impl FeedSubscription {
    pub(crate) fn new(rx: watch::Receiver<FeedSnapshot>) -> Self {
        Self { rx }
    }

    /// Latest published snapshot, marked as seen.
    pub fn snapshot(&mut self) -> FeedSnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Whether a snapshot has been published since the last
    /// [`FeedSubscription::snapshot`] call. A closed feed reads as
    /// unchanged so the last snapshot stays serveable.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits until the next snapshot is published.
    pub async fn changed(&mut self) -> Result<(), FeedClosed> {
        self.rx.changed().await.map_err(|_| FeedClosed)
    }
}

#[derive(Debug, Error)]
#[error("expense feed closed")]
pub struct FeedClosed;
