//! Per-view dashboard state: mirrors one tenant's live feed, applies the
//! filter engine on demand, and owns the add-expense draft flow.
//!
//! Feed application is cooperative: every operation first drains the
//! subscription on the caller's thread of control. Applying a snapshot
//! replaces the full record mirror and resets the visible list to it; the
//! entered criteria stay in the form state but are not re-applied until the
//! user triggers the filter again.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};

use crate::filter::{self, FilterOutcome};
use crate::image::{ImageHost, ReceiptUpload};
use crate::model::{
    CriteriaError, ExpenseId, ExpenseRecord, FilterCriteria, NewExpense, Tenant, DATE_INPUT,
};
use crate::store::{ExpenseStore, FeedSnapshot, FeedSubscription, StoreError};

/// The add-expense form as entered so far. Fields stay raw strings until
/// submit; a failed submit leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: String,
    pub date: String,
    pub receipt: Option<ReceiptUpload>,
}

impl ExpenseDraft {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.amount.is_empty()
            && self.date.is_empty()
            && self.receipt.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Description,
    Amount,
    Date,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DraftField::Description => "description",
            DraftField::Amount => "amount",
            DraftField::Date => "date",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(DraftField),
    #[error("amount must be a non-negative number")]
    InvalidAmount,
    #[error("date must be formatted as YYYY-MM-DD")]
    InvalidDate,
}

#[derive(Debug, Error)]
pub enum AddExpenseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to save expense: {0}")]
    Store(#[from] StoreError),
}

/// Render state for one dashboard: the visible list and its total, the
/// criteria as entered, and a summary of the draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub tenant: Tenant,
    pub records: Vec<ExpenseRecord>,
    pub total: f64,
    pub criteria: FilterCriteria,
    pub draft: DraftSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub description: String,
    pub amount: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_file: Option<String>,
}

/// One tenant dashboard view. Holds the live feed subscription for as long
/// as the view exists; dropping the dashboard releases it.
pub struct Dashboard {
    tenant: Tenant,
    store: Arc<dyn ExpenseStore>,
    images: Arc<dyn ImageHost>,
    inner: Mutex<DashboardInner>,
}

struct DashboardInner {
    feed: FeedSubscription,
    all: FeedSnapshot,
    visible: Vec<ExpenseRecord>,
    total: f64,
    criteria: FilterCriteria,
    draft: ExpenseDraft,
}

impl DashboardInner {
    /// Applies any snapshot published since the last operation: the full
    /// mirror is replaced wholesale and the visible list resets to it.
    fn drain_feed(&mut self, tenant: Tenant) {
        if !self.feed.has_changed() {
            return;
        }
        let snapshot = self.feed.snapshot();
        self.all = snapshot.clone();
        self.visible = snapshot.to_vec();
        self.total = filter::total_amount(&self.visible);
        debug!(%tenant, records = self.all.len(), "feed snapshot applied, visible list reset");
    }
}

impl Dashboard {
    pub fn new(tenant: Tenant, store: Arc<dyn ExpenseStore>, images: Arc<dyn ImageHost>) -> Self {
        let mut feed = store.subscribe(tenant);
        let all = feed.snapshot();
        let visible = all.to_vec();
        let total = filter::total_amount(&visible);
        Self {
            tenant,
            store,
            images,
            inner: Mutex::new(DashboardInner {
                feed,
                all,
                visible,
                total,
                criteria: FilterCriteria::default(),
                draft: ExpenseDraft::default(),
            }),
        }
    }

    pub fn tenant(&self) -> Tenant {
        self.tenant
    }

    /// Current render state, after applying any pending feed update.
    pub fn view(&self) -> DashboardView {
        let mut inner = self.inner.lock();
        inner.drain_feed(self.tenant);
        self.render(&inner)
    }

    /// Stores `criteria` as the entered filter and recomputes the visible
    /// list and total from the current full mirror.
    pub fn apply_filter(&self, criteria: FilterCriteria) -> Result<DashboardView, CriteriaError> {
        criteria.validate()?;
        let mut inner = self.inner.lock();
        inner.drain_feed(self.tenant);
        let FilterOutcome { records, total } = filter::apply(&inner.all, &criteria);
        debug!(
            tenant = %self.tenant,
            kept = records.len(),
            out_of = inner.all.len(),
            "filter applied"
        );
        inner.criteria = criteria;
        inner.visible = records;
        inner.total = total;
        Ok(self.render(&inner))
    }

    /// Overwrites draft fields in place. The route layer records the
    /// submitted form here before calling [`Dashboard::submit_draft`].
    pub fn edit_draft(&self, edit: impl FnOnce(&mut ExpenseDraft)) {
        edit(&mut self.inner.lock().draft);
    }

    pub fn draft(&self) -> ExpenseDraft {
        self.inner.lock().draft.clone()
    }

    /// Validates and submits the draft. An attached receipt uploads first
    /// (an upload error or empty reference degrades to "no image"), then the
    /// record is inserted with `created_at` fixed to the chosen date. The
    /// draft is cleared only after a successful insert.
    pub async fn submit_draft(&self) -> Result<ExpenseId, AddExpenseError> {
        let draft = self.draft();
        let (description, amount, date) = validate_draft(&draft)?;
        let receipt_image = match &draft.receipt {
            None => None,
            Some(receipt) => match self.images.upload(receipt).await {
                Ok(reference) => reference,
                Err(error) => {
                    warn!(
                        tenant = %self.tenant,
                        file = %receipt.file_name,
                        %error,
                        "receipt upload failed, saving expense without an image"
                    );
                    None
                }
            },
        };
        let expense = NewExpense::dated(description, amount, date).with_receipt(receipt_image);
        let id = self.store.insert(self.tenant, expense).await?;
        info!(tenant = %self.tenant, %id, amount, "expense recorded");
        self.inner.lock().draft = ExpenseDraft::default();
        Ok(id)
    }

    fn render(&self, inner: &DashboardInner) -> DashboardView {
        DashboardView {
            tenant: self.tenant,
            records: inner.visible.clone(),
            total: inner.total,
            criteria: inner.criteria.clone(),
            draft: DraftSummary {
                description: inner.draft.description.clone(),
                amount: inner.draft.amount.clone(),
                date: inner.draft.date.clone(),
                receipt_file: inner.draft.receipt.as_ref().map(|r| r.file_name.clone()),
            },
        }
    }
}

fn validate_draft(draft: &ExpenseDraft) -> Result<(String, f64, Date), ValidationError> {
    let description = draft.description.trim();
    if description.is_empty() {
        return Err(ValidationError::Missing(DraftField::Description));
    }
    let amount_raw = draft.amount.trim();
    if amount_raw.is_empty() {
        return Err(ValidationError::Missing(DraftField::Amount));
    }
    let date_raw = draft.date.trim();
    if date_raw.is_empty() {
        return Err(ValidationError::Missing(DraftField::Date));
    }
    let amount: f64 = amount_raw
        .parse()
        .map_err(|_| ValidationError::InvalidAmount)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::InvalidAmount);
    }
    let date = Date::parse(date_raw, DATE_INPUT).map_err(|_| ValidationError::InvalidDate)?;
    Ok((description.to_owned(), amount, date))
}
