//! Pure filtering and summation over an in-memory expense list.
//!
//! The engine narrows in a fixed order (exact date, then month, then year)
//! with AND semantics, preserving the input order throughout. The exact-date
//! criterion compares the record's stored `display_date` string against the
//! same rendering of the requested date ([`crate::model::display_date`]);
//! records written under a different rendering rule will not match. Month
//! and year compare calendar components of `created_at`. Criteria that match
//! nothing yield an empty list and a total of zero, never an error.

use crate::model::{display_date, ExpenseRecord, FilterCriteria};

/// Result of one filter pass: the kept records, in input order, and the sum
/// of their amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub records: Vec<ExpenseRecord>,
    pub total: f64,
}

/// Applies `criteria` to `records`. With no criteria set this is the
/// identity: every record is kept and the total covers the whole input.
pub fn apply(records: &[ExpenseRecord], criteria: &FilterCriteria) -> FilterOutcome {
    let mut kept: Vec<ExpenseRecord> = records.to_vec();
    if let Some(date) = criteria.date {
        let wanted = display_date(date);
        kept.retain(|r| r.display_date == wanted);
    }
    if let Some(month) = criteria.month {
        kept.retain(|r| u8::from(r.created_at.month()) == month);
    }
    if let Some(year) = criteria.year {
        kept.retain(|r| r.created_at.year() == year);
    }
    let total = total_amount(&kept);
    FilterOutcome {
        records: kept,
        total,
    }
}

/// Sum of `amount` over a record list.
pub fn total_amount(records: &[ExpenseRecord]) -> f64 {
    records.iter().map(|r| r.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpenseId, Tenant};
    use time::macros::date;
    use time::Date;

    fn record(amount: f64, day: Date) -> ExpenseRecord {
        ExpenseRecord {
            id: ExpenseId::new(),
            tenant: Tenant::Cas,
            description: "supplies".into(),
            amount,
            occurred_at: day,
            created_at: day,
            display_date: display_date(day),
            receipt_image: None,
        }
    }

    fn ids(records: &[ExpenseRecord]) -> Vec<ExpenseId> {
        records.iter().map(|r| r.id).collect()
    }

    fn criteria(
        date: Option<Date>,
        month: Option<u8>,
        year: Option<i32>,
    ) -> FilterCriteria {
        FilterCriteria { date, month, year }
    }

    #[test]
    fn empty_criteria_is_identity() {
        let records = vec![
            record(100.0, date!(2024 - 04 - 01)),
            record(50.0, date!(2024 - 03 - 05)),
            record(25.5, date!(2023 - 12 - 31)),
        ];
        let outcome = apply(&records, &FilterCriteria::default());
        assert_eq!(outcome.records, records);
        assert_eq!(outcome.total, 175.5);
    }

    #[test]
    fn year_filter_keeps_exactly_that_year() {
        let records = vec![
            record(10.0, date!(2024 - 06 - 15)),
            record(20.0, date!(2023 - 06 - 15)),
            record(30.0, date!(2024 - 01 - 02)),
        ];
        let outcome = apply(&records, &criteria(None, None, Some(2024)));
        assert_eq!(ids(&outcome.records), vec![records[0].id, records[2].id]);
        assert!(outcome.records.iter().all(|r| r.created_at.year() == 2024));
        assert_eq!(outcome.total, 40.0);
    }

    #[test]
    fn month_scenario_from_mixed_months() {
        let records = vec![
            record(100.0, date!(2024 - 03 - 05)),
            record(50.0, date!(2024 - 04 - 01)),
        ];
        let outcome = apply(&records, &criteria(None, Some(3), None));
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].amount, 100.0);
        assert_eq!(outcome.total, 100.0);
    }

    #[test]
    fn month_and_year_compose_as_intersection() {
        let records = vec![
            record(1.0, date!(2024 - 03 - 01)),
            record(2.0, date!(2023 - 03 - 01)),
            record(4.0, date!(2024 - 07 - 01)),
            record(8.0, date!(2024 - 03 - 20)),
        ];
        let by_month = apply(&records, &criteria(None, Some(3), None));
        let by_year = apply(&records, &criteria(None, None, Some(2024)));
        let combined = apply(&records, &criteria(None, Some(3), Some(2024)));

        let expected: Vec<ExpenseId> = by_month
            .records
            .iter()
            .filter(|r| by_year.records.iter().any(|y| y.id == r.id))
            .map(|r| r.id)
            .collect();
        assert_eq!(ids(&combined.records), expected);
        assert_eq!(combined.total, 9.0);
    }

    #[test]
    fn date_filter_compares_rendered_strings_not_calendar_dates() {
        let mut padded = record(70.0, date!(2024 - 03 - 05));
        padded.display_date = "03/05/2024".into();
        let plain = record(30.0, date!(2024 - 03 - 05));
        let records = vec![padded.clone(), plain.clone()];

        let outcome = apply(&records, &criteria(Some(date!(2024 - 03 - 05)), None, None));
        // Same calendar date, but the padded rendering does not match.
        assert_eq!(ids(&outcome.records), vec![plain.id]);
        assert_eq!(outcome.total, 30.0);

        let other_day = apply(&records, &criteria(Some(date!(2024 - 03 - 06)), None, None));
        assert!(other_day.records.is_empty());
        assert_eq!(other_day.total, 0.0);
    }

    #[test]
    fn unmatched_criteria_yield_empty_and_zero() {
        let records = vec![record(12.0, date!(2024 - 05 - 09))];
        let outcome = apply(&records, &criteria(None, None, Some(1999)));
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.total, 0.0);
    }

    #[test]
    fn filtering_preserves_input_order() {
        let records = vec![
            record(1.0, date!(2024 - 03 - 30)),
            record(2.0, date!(2024 - 03 - 15)),
            record(3.0, date!(2024 - 03 - 01)),
        ];
        let outcome = apply(&records, &criteria(None, Some(3), Some(2024)));
        assert_eq!(ids(&outcome.records), ids(&records));
    }

    #[test]
    fn total_always_matches_the_kept_records() {
        let records = vec![
            record(10.0, date!(2024 - 01 - 01)),
            record(20.0, date!(2024 - 02 - 01)),
            record(40.0, date!(2025 - 01 - 01)),
        ];
        for c in [
            FilterCriteria::default(),
            criteria(None, Some(1), None),
            criteria(None, None, Some(2024)),
            criteria(Some(date!(2024 - 02 - 01)), None, None),
        ] {
            let outcome = apply(&records, &c);
            assert_eq!(outcome.total, total_amount(&outcome.records));
        }
    }
}
