//! Domain types shared across the service: tenants, roles, expense records,
//! filter criteria, and the display-date rendering rule.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;
use uuid::Uuid;

/// Format accepted for user-entered dates (`2024-03-05`).
pub(crate) const DATE_INPUT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// One college partition of the expense data. The set is closed; every
/// record and every college login belongs to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenant {
    Cas,
    Ios,
    Iict,
    Coed,
    Cias,
    Cof,
}

impl Tenant {
    /// Canonical iteration order, also the order rollups report in.
    pub const ALL: [Tenant; 6] = [
        Tenant::Cas,
        Tenant::Ios,
        Tenant::Iict,
        Tenant::Coed,
        Tenant::Cias,
        Tenant::Cof,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Tenant::Cas => "cas",
            Tenant::Ios => "ios",
            Tenant::Iict => "iict",
            Tenant::Coed => "coed",
            Tenant::Cias => "cias",
            Tenant::Cof => "cof",
        }
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown college code: {0}")]
pub struct UnknownTenant(pub String);

impl FromStr for Tenant {
    type Err = UnknownTenant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tenant::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| UnknownTenant(s.to_owned()))
    }
}

/// What a login grants: the admin overview or a single college dashboard.
/// Serialized as the flat identifier set `admin | cas | ios | ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Role {
    Admin,
    College(Tenant),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::College(t) => f.write_str(t.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "admin" {
            return Ok(Role::Admin);
        }
        s.parse::<Tenant>()
            .map(Role::College)
            .map_err(|_| UnknownRole(s.to_owned()))
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Store-assigned record identifier, unique within a tenant's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An immutable expense entry. Records are never updated or deleted once the
/// store has accepted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub tenant: Tenant,
    pub description: String,
    /// Non-negative; whole or fractional currency units.
    pub amount: f64,
    /// The date the user chose for the expense. Date-only semantics.
    pub occurred_at: Date,
    /// Set equal to `occurred_at` at insert time; display order is by this
    /// field, descending.
    pub created_at: Date,
    /// Rendering of `occurred_at` fixed at write time; see [`display_date`].
    pub display_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_image: Option<String>,
}

/// Insert payload: everything the store does not assign itself.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub occurred_at: Date,
    pub created_at: Date,
    pub display_date: String,
    pub receipt_image: Option<String>,
}

impl NewExpense {
    /// Builds a payload for the given date, fixing `created_at` equal to the
    /// chosen date and rendering `display_date` through [`display_date`].
    pub fn dated(description: impl Into<String>, amount: f64, occurred_at: Date) -> Self {
        Self {
            description: description.into(),
            amount,
            occurred_at,
            created_at: occurred_at,
            display_date: display_date(occurred_at),
            receipt_image: None,
        }
    }

    pub fn with_receipt(mut self, receipt_image: Option<String>) -> Self {
        self.receipt_image = receipt_image;
        self
    }
}

/// The single rendering rule for stored display dates: `M/D/YYYY` without
/// zero padding (`3/5/2024`). The exact-date filter compares against this
/// same rendering, so the two sides can only drift if a record was written
/// by a producer using a different rule.
pub fn display_date(date: Date) -> String {
    format!("{}/{}/{}", u8::from(date.month()), date.day(), date.year())
}

/// User-entered narrowing for a dashboard list. All fields are independently
/// optional; present fields combine with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub date: Option<Date>,
    pub month: Option<u8>,
    pub year: Option<i32>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.month.is_none() && self.year.is_none()
    }

    /// Bounds-checks the month (1-12) and year (four digits). Out-of-range
    /// values are caller errors, reported rather than silently matched
    /// against nothing.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(CriteriaError::MonthOutOfRange(month));
            }
        }
        if let Some(year) = self.year {
            if !(1000..=9999).contains(&year) {
                return Err(CriteriaError::YearOutOfRange(year));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u8),
    #[error("year must be a four-digit year, got {0}")]
    YearOutOfRange(i32),
}

/// Per-tenant unfiltered totals for the admin summary. Always carries every
/// tenant in [`Tenant::ALL`]; tenants with no records report 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TenantTotals(BTreeMap<Tenant, f64>);

impl TenantTotals {
    pub fn zeroed() -> Self {
        Self(Tenant::ALL.iter().map(|&t| (t, 0.0)).collect())
    }

    pub fn set(&mut self, tenant: Tenant, total: f64) {
        self.0.insert(tenant, total);
    }

    pub fn get(&self, tenant: Tenant) -> f64 {
        self.0.get(&tenant).copied().unwrap_or(0.0)
    }

    pub fn grand_total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tenant, f64)> + '_ {
        self.0.iter().map(|(&t, &v)| (t, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn display_date_has_no_zero_padding() {
        assert_eq!(display_date(date!(2024 - 03 - 05)), "3/5/2024");
        assert_eq!(display_date(date!(2025 - 12 - 31)), "12/31/2025");
    }

    #[test]
    fn tenant_codes_round_trip() {
        for tenant in Tenant::ALL {
            assert_eq!(tenant.code().parse::<Tenant>(), Ok(tenant));
        }
        assert!("law".parse::<Tenant>().is_err());
    }

    #[test]
    fn role_parses_admin_and_college_codes() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("coed".parse::<Role>(), Ok(Role::College(Tenant::Coed)));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn criteria_bounds_are_enforced() {
        let ok = FilterCriteria {
            month: Some(12),
            year: Some(2024),
            ..FilterCriteria::default()
        };
        assert_eq!(ok.validate(), Ok(()));

        let bad_month = FilterCriteria {
            month: Some(13),
            ..FilterCriteria::default()
        };
        assert_eq!(
            bad_month.validate(),
            Err(CriteriaError::MonthOutOfRange(13))
        );

        let bad_year = FilterCriteria {
            year: Some(99),
            ..FilterCriteria::default()
        };
        assert_eq!(bad_year.validate(), Err(CriteriaError::YearOutOfRange(99)));
    }

    #[test]
    fn totals_default_to_zero_for_every_tenant() {
        let totals = TenantTotals::zeroed();
        for tenant in Tenant::ALL {
            assert_eq!(totals.get(tenant), 0.0);
        }
        assert_eq!(totals.grand_total(), 0.0);
    }

    #[test]
    fn criteria_serde_accepts_missing_fields() {
        let criteria: FilterCriteria = serde_json::from_str(r#"{"month": 3}"#).unwrap();
        assert_eq!(criteria.month, Some(3));
        assert_eq!(criteria.date, None);
        assert_eq!(criteria.year, None);
        assert!(!criteria.is_empty());
        assert!(serde_json::from_str::<FilterCriteria>("{}").unwrap().is_empty());
    }
}
