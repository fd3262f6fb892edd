//! Schedule item (exam) model.
//!
//! An item is one exam to be placed on the calendar. It is identified by
//! the cell holding its name in the master workbook and carries the
//! constraints written in its date and time cells.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::value::DEFAULT_GAP_HOURS;
use super::{BinaryConstraint, CellRef, ConstraintSet, DateConstraint, TimeConstraint};

/// An exam to be scheduled.
///
/// Equality and hashing use the identity key only. The key is fixed at
/// construction; after that an item only changes when a solution assigns
/// its date and time.
///
/// # Examples
///
/// ```
/// use u_exam::models::{CellRef, ScheduleItem};
///
/// let item = ScheduleItem::new(CellRef::new("GII", "B", 2), "GII", "Algebra")
///     .with_course(1)
///     .with_term(2);
/// assert_eq!(item.key().to_string(), "$GII.B2");
/// assert!(item.assigned().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    key: CellRef,
    /// Group (degree) the exam belongs to; the sheet name.
    pub group: String,
    /// Subject name.
    pub name: String,
    /// Course level (year of study).
    pub course: u32,
    /// Term (semester).
    pub term: u32,
    /// Minimum gap in hours to earlier exams of the same group and course.
    pub gap_hours: u32,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    date_constraints: ConstraintSet<DateConstraint>,
    time_constraints: ConstraintSet<TimeConstraint>,
    date_references: ConstraintSet<BinaryConstraint>,
    time_references: ConstraintSet<BinaryConstraint>,
}

impl ScheduleItem {
    /// Creates an unassigned item with no constraints and the default gap.
    pub fn new(key: CellRef, group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key,
            group: group.into(),
            name: name.into(),
            course: 0,
            term: 0,
            gap_hours: DEFAULT_GAP_HOURS,
            date: None,
            time: None,
            date_constraints: ConstraintSet::new(),
            time_constraints: ConstraintSet::new(),
            date_references: ConstraintSet::new(),
            time_references: ConstraintSet::new(),
        }
    }

    /// Sets the course level.
    pub fn with_course(mut self, course: u32) -> Self {
        self.course = course;
        self
    }

    /// Sets the term.
    pub fn with_term(mut self, term: u32) -> Self {
        self.term = term;
        self
    }

    /// Sets the minimum gap (hours).
    pub fn with_gap(mut self, gap_hours: u32) -> Self {
        self.gap_hours = gap_hours;
        self
    }

    /// Adds unit date constraints (bound to this item's own key).
    pub fn with_date_constraints(
        mut self,
        constraints: impl IntoIterator<Item = DateConstraint>,
    ) -> Self {
        for c in constraints {
            self.date_constraints.insert(self.key.clone(), c);
        }
        self
    }

    /// Adds unit time constraints (bound to this item's own key).
    pub fn with_time_constraints(
        mut self,
        constraints: impl IntoIterator<Item = TimeConstraint>,
    ) -> Self {
        for c in constraints {
            self.time_constraints.insert(self.key.clone(), c);
        }
        self
    }

    /// Adds binary date constraints, each bound to its target key.
    pub fn with_date_references(
        mut self,
        constraints: impl IntoIterator<Item = BinaryConstraint>,
    ) -> Self {
        for c in constraints {
            self.date_references.insert(c.target.clone(), c);
        }
        self
    }

    /// Adds binary time constraints, each bound to its target key.
    pub fn with_time_references(
        mut self,
        constraints: impl IntoIterator<Item = BinaryConstraint>,
    ) -> Self {
        for c in constraints {
            self.time_references.insert(c.target.clone(), c);
        }
        self
    }

    /// Identity key.
    pub fn key(&self) -> &CellRef {
        &self.key
    }

    /// Unit date constraints.
    pub fn date_constraints(&self) -> &ConstraintSet<DateConstraint> {
        &self.date_constraints
    }

    /// Unit time constraints.
    pub fn time_constraints(&self) -> &ConstraintSet<TimeConstraint> {
        &self.time_constraints
    }

    /// Binary date constraints, keyed by the referenced item.
    pub fn date_references(&self) -> &ConstraintSet<BinaryConstraint> {
        &self.date_references
    }

    /// Binary time constraints, keyed by the referenced item.
    pub fn time_references(&self) -> &ConstraintSet<BinaryConstraint> {
        &self.time_references
    }

    /// Every key referenced by a binary constraint (date first, then time).
    pub fn referenced_keys(&self) -> impl Iterator<Item = &CellRef> {
        self.date_references.keys().chain(self.time_references.keys())
    }

    /// Whether the item carries no unit constraint at all.
    pub fn is_unconstrained(&self) -> bool {
        self.date_constraints.is_empty() && self.time_constraints.is_empty()
    }

    /// Records the solved date and time.
    pub fn assign(&mut self, date: NaiveDate, time: NaiveTime) {
        self.date = Some(date);
        self.time = Some(time);
    }

    /// Assigned date, if solved.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Assigned time, if solved.
    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Assigned date and time, if solved.
    pub fn assigned(&self) -> Option<NaiveDateTime> {
        Some(self.date?.and_time(self.time?))
    }

    /// Multi-line listing of the constraints attached to this item.
    pub fn describe_constraints(&self) -> Vec<String> {
        fn line<C: fmt::Display>(label: &str, set: &ConstraintSet<C>) -> Option<String> {
            if set.is_empty() {
                return None;
            }
            let mut out = format!("     {label}:");
            for c in set.iter() {
                out.push_str(&format!(" {c}"));
            }
            Some(out)
        }

        [
            line("Unit date constraints", &self.date_constraints),
            line("Unit time constraints", &self.time_constraints),
            line("Binary date constraints", &self.date_references),
            line("Binary time constraints", &self.time_references),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl PartialEq for ScheduleItem {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ScheduleItem {}

impl Hash for ScheduleItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for ScheduleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".repeat(10));
        let time = self
            .time
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".repeat(8));
        write!(
            f,
            "[{:<12}] {:<60} [{}.{}] >{:>4} ({} {})",
            self.key.to_string(),
            self.name,
            self.course,
            self.term,
            self.gap_hours,
            date,
            time
        )
    }
}
