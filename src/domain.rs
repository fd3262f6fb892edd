//! Domain filtering.
//!
//! Narrows the global candidate list to the values each item accepts. A
//! value is admitted iff it satisfies *every* unit date constraint and
//! *every* unit time constraint of the item; an item without unit
//! constraints admits every candidate.
//!
//! Admitted values are copied into the item's own domain and stamped with
//! the item's gap, so two items sharing a calendar slot can still require
//! different separations from their neighbours.

use tracing::debug;

use crate::error::{ExamError, Result};
use crate::models::{CandidateValue, ItemPool, ScheduleItem};
use crate::operators::{satisfies_date, satisfies_time};

/// Whether `value` satisfies all unit constraints of `item`.
pub fn is_compatible(item: &ScheduleItem, value: &CandidateValue) -> bool {
    item.date_constraints()
        .iter()
        .all(|c| satisfies_date(value, c))
        && item
            .time_constraints()
            .iter()
            .all(|c| satisfies_time(value, c))
}

/// Filtered domain of one item, in candidate order.
///
/// # Errors
/// [`ExamError::EmptyDomain`] if no candidate survives.
pub fn filter_domain(
    item: &ScheduleItem,
    candidates: &[CandidateValue],
) -> Result<Vec<CandidateValue>> {
    let domain: Vec<CandidateValue> = candidates
        .iter()
        .filter(|value| is_compatible(item, value))
        .map(|value| value.clone().with_gap(item.gap_hours))
        .collect();

    if domain.is_empty() {
        return Err(ExamError::EmptyDomain {
            key: item.key().clone(),
            name: item.name.clone(),
        });
    }

    debug!(key = %item.key(), size = domain.len(), "domain filtered");
    Ok(domain)
}

/// Filtered domains of every item, aligned with the pool order.
///
/// Stops at the first item with an empty domain.
pub fn filter_domains(
    pool: &ItemPool,
    candidates: &[CandidateValue],
) -> Result<Vec<Vec<CandidateValue>>> {
    pool.iter()
        .map(|item| filter_domain(item, candidates))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellRef, DateConstraint, Operator, TimeConstraint};
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    /// Two slots (9:00 and 16:00) on every day from April 28 to May 14.
    fn candidates() -> Vec<CandidateValue> {
        let mut values = Vec::new();
        let mut day = date(2024, 4, 28);
        while day <= date(2024, 5, 14) {
            values.push(CandidateValue::new(day, time(9)));
            values.push(CandidateValue::new(day, time(16)));
            day = day.succ_opt().unwrap();
        }
        values
    }

    fn item() -> ScheduleItem {
        ScheduleItem::new(CellRef::new("GII", "A", 2), "GII", "Algebra")
    }

    #[test]
    fn test_unconstrained_item_admits_everything() {
        let values = candidates();
        let domain = filter_domain(&item(), &values).unwrap();
        assert_eq!(domain.len(), values.len());
    }

    #[test]
    fn test_date_range_conjunction() {
        let values = candidates();
        let it = item().with_date_constraints([
            DateConstraint::new(Operator::Ge, date(2024, 5, 1)),
            DateConstraint::new(Operator::Lt, date(2024, 5, 10)),
        ]);
        let domain = filter_domain(&it, &values).unwrap();

        // Nine days, both slots each.
        assert_eq!(domain.len(), 18);
        assert!(domain
            .iter()
            .all(|v| v.date >= date(2024, 5, 1) && v.date < date(2024, 5, 10)));
        for v in &values {
            let inside = v.date >= date(2024, 5, 1) && v.date < date(2024, 5, 10);
            assert_eq!(is_compatible(&it, v), inside);
        }
    }

    #[test]
    fn test_time_constraint_ignores_date() {
        let values = candidates();
        let it = item().with_time_constraints([TimeConstraint::new(Operator::Gt, time(12))]);
        let domain = filter_domain(&it, &values).unwrap();
        assert_eq!(domain.len(), values.len() / 2);
        assert!(domain.iter().all(|v| v.time == time(16)));
    }

    #[test]
    fn test_domain_stamped_with_item_gap() {
        let values = candidates();
        let it = item().with_gap(72);
        let domain = filter_domain(&it, &values).unwrap();
        assert!(domain.iter().all(|v| v.gap_hours == 72));
        // The shared candidate list is untouched.
        assert!(values.iter().all(|v| v.gap_hours == 24));
    }

    #[test]
    fn test_empty_domain_flagged() {
        let values = candidates();
        let never = DateConstraint::new(Operator::Eq, date(2099, 1, 1));
        let it = item().with_date_constraints([never]);
        let err = filter_domain(&it, &values).unwrap_err();
        match err {
            ExamError::EmptyDomain { key, name } => {
                assert_eq!(key.to_string(), "$GII.A2");
                assert_eq!(name, "Algebra");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filter_domains_aligned_with_pool() {
        let mut pool = ItemPool::new();
        pool.push(item()).unwrap();
        pool.push(
            ScheduleItem::new(CellRef::new("GII", "A", 3), "GII", "Calculus")
                .with_date_constraints([DateConstraint::new(Operator::Eq, date(2024, 5, 2))]),
        )
        .unwrap();

        let domains = filter_domains(&pool, &candidates()).unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[1].len(), 2);
    }
}
