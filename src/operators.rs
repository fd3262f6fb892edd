//! Comparison predicates.
//!
//! Four operator-driven families plus the minimum-gap relation:
//!
//! | Family | Compares |
//! |--------|----------|
//! | [`unit_date`] | date part of a value vs. a constant date |
//! | [`unit_time`] | time part of a value vs. a constant time |
//! | [`binary_date`] | date parts of two values |
//! | [`binary_time`] | time parts of two values |
//! | [`minimum_gap`] | distance between two values vs. the later one's gap |
//!
//! Dispatch is an exhaustive match on [`Operator`], so every family is
//! total over the six symbols.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime};

use crate::models::{CandidateValue, DateConstraint, Operator, TimeConstraint};

/// `value.date <op> constant`.
#[inline]
pub fn unit_date(op: Operator, value: &CandidateValue, constant: &NaiveDate) -> bool {
    op.compare(&value.date, constant)
}

/// `value.time <op> constant`.
#[inline]
pub fn unit_time(op: Operator, value: &CandidateValue, constant: &NaiveTime) -> bool {
    op.compare(&value.time, constant)
}

/// `first.date <op> second.date`.
#[inline]
pub fn binary_date(op: Operator, first: &CandidateValue, second: &CandidateValue) -> bool {
    op.compare(&first.date, &second.date)
}

/// `first.time <op> second.time`.
#[inline]
pub fn binary_time(op: Operator, first: &CandidateValue, second: &CandidateValue) -> bool {
    op.compare(&first.time, &second.time)
}

/// Whether two values are far enough apart.
///
/// The gap that applies is the one carried by the *later* value. When both
/// values fall on the same instant each one counts as the later, so both
/// gaps must be met. Holds iff the absolute distance is at least that many
/// hours. Symmetric in its arguments.
pub fn minimum_gap(first: &CandidateValue, second: &CandidateValue) -> bool {
    let (a, b) = (first.datetime(), second.datetime());
    let (distance, gap_hours) = match a.cmp(&b) {
        Ordering::Greater => (a - b, first.gap_hours),
        Ordering::Less => (b - a, second.gap_hours),
        Ordering::Equal => (a - b, first.gap_hours.max(second.gap_hours)),
    };
    distance.num_seconds() >= i64::from(gap_hours) * 3600
}

/// Whether a value satisfies a unit date constraint.
#[inline]
pub fn satisfies_date(value: &CandidateValue, constraint: &DateConstraint) -> bool {
    unit_date(constraint.op, value, &constraint.constant)
}

/// Whether a value satisfies a unit time constraint.
#[inline]
pub fn satisfies_time(value: &CandidateValue, constraint: &TimeConstraint) -> bool {
    unit_time(constraint.op, value, &constraint.constant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(y: i32, m: u32, d: u32, h: u32, min: u32) -> CandidateValue {
        CandidateValue::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(h, min, 0).unwrap(),
        )
    }

    #[test]
    fn test_unit_date_ignores_time() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let morning = value(2024, 5, 2, 9, 0);
        let evening = value(2024, 5, 2, 21, 0);
        assert!(unit_date(Operator::Eq, &morning, &date));
        assert!(unit_date(Operator::Eq, &evening, &date));
        assert!(!unit_date(Operator::Lt, &evening, &date));
        assert!(unit_date(Operator::Le, &evening, &date));
        assert!(unit_date(Operator::Gt, &value(2024, 5, 3, 0, 0), &date));
        assert!(unit_date(Operator::Ne, &value(2024, 5, 3, 0, 0), &date));
    }

    #[test]
    fn test_unit_time_ignores_date() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(unit_time(Operator::Eq, &value(2024, 5, 2, 9, 0), &nine));
        assert!(unit_time(Operator::Eq, &value(2030, 1, 1, 9, 0), &nine));
        assert!(unit_time(Operator::Ge, &value(2024, 5, 2, 15, 0), &nine));
        assert!(!unit_time(Operator::Lt, &value(2024, 5, 2, 15, 0), &nine));
    }

    #[test]
    fn test_binary_families() {
        let a = value(2024, 5, 2, 9, 0);
        let b = value(2024, 5, 3, 9, 0);
        assert!(binary_date(Operator::Lt, &a, &b));
        assert!(!binary_date(Operator::Eq, &a, &b));
        assert!(binary_time(Operator::Eq, &a, &b));
        assert!(!binary_time(Operator::Ne, &a, &b));
        assert!(binary_date(Operator::Ge, &b, &a));
    }

    #[test]
    fn test_minimum_gap_later_item_governs() {
        // A is later (gap 24), B earlier (gap 48): 24h apart satisfies A's gap.
        let a = value(2024, 5, 2, 9, 0).with_gap(24);
        let b = value(2024, 5, 1, 9, 0).with_gap(48);
        assert!(minimum_gap(&a, &b));
        assert!(minimum_gap(&b, &a));

        // One minute short fails.
        let a = value(2024, 5, 2, 8, 59).with_gap(24);
        assert!(!minimum_gap(&a, &b));
        assert!(!minimum_gap(&b, &a));
    }

    #[test]
    fn test_minimum_gap_not_maximum() {
        // Later item needs only 24h even though the earlier one asks 72h.
        let early = value(2024, 5, 1, 9, 0).with_gap(72);
        let late = value(2024, 5, 2, 12, 0).with_gap(24);
        assert!(minimum_gap(&early, &late));

        // Later item asks 72h: 27h is not enough.
        let early = value(2024, 5, 1, 9, 0).with_gap(24);
        let late = value(2024, 5, 2, 12, 0).with_gap(72);
        assert!(!minimum_gap(&early, &late));
    }

    #[test]
    fn test_minimum_gap_same_slot() {
        let a = value(2024, 5, 2, 9, 0);
        let b = value(2024, 5, 2, 9, 0);
        assert!(!minimum_gap(&a, &b));
        assert!(minimum_gap(&a.clone().with_gap(0), &b.clone().with_gap(0)));
    }

    #[test]
    fn test_minimum_gap_same_slot_needs_both_gaps() {
        let strict = value(2024, 5, 1, 9, 0).with_gap(24);
        let relaxed = value(2024, 5, 1, 9, 0).with_gap(0);
        assert!(!minimum_gap(&strict, &relaxed));
        assert!(!minimum_gap(&relaxed, &strict));
    }

    #[test]
    fn test_minimum_gap_symmetric() {
        let slots = [
            value(2024, 5, 1, 9, 0).with_gap(0),
            value(2024, 5, 1, 9, 0).with_gap(24),
            value(2024, 5, 1, 16, 0).with_gap(6),
            value(2024, 5, 2, 9, 0).with_gap(48),
        ];
        for a in &slots {
            for b in &slots {
                assert_eq!(minimum_gap(a, b), minimum_gap(b, a), "{a} / {b}");
            }
        }
    }

    #[test]
    fn test_satisfies_helpers() {
        let v = value(2024, 5, 2, 9, 0);
        let d = DateConstraint::new(Operator::Ge, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let t = TimeConstraint::new(Operator::Gt, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(satisfies_date(&v, &d));
        assert!(!satisfies_time(&v, &t));
    }
}
