//! Run summary.
//!
//! Reports what a scheduling run did and the shape of the timetable it
//! produced.
//!
//! # Figures
//!
//! | Figure | Definition |
//! |--------|-----------|
//! | Direct items | Items matching the selection |
//! | Indirect items | Items loaded to close references |
//! | Candidates | Values read from the timeslot sheet |
//! | Bindings | Constraints posted, per family |
//! | First / last exam | Earliest and latest assigned date and time |
//! | Exam days | Distinct dates used |
//! | Tightest gap | Smallest separation between two exams of the same group and course |

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::csp::{BindingCounts, CspSolution, Problem, Relation, SolverStats};
use crate::models::ItemPool;

/// Figures describing one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Items loaded from the selection.
    pub direct_items: usize,
    /// Items loaded while resolving references.
    pub indirect_items: usize,
    /// Candidate values in the timeslot sheet.
    pub candidates: usize,
    /// Bindings posted, per family.
    pub bindings: BindingCounts,
    /// Search statistics.
    pub stats: SolverStats,
    /// Earliest assigned exam.
    pub first_exam: Option<NaiveDateTime>,
    /// Latest assigned exam.
    pub last_exam: Option<NaiveDateTime>,
    /// Number of distinct exam dates.
    pub exam_days: usize,
    /// Smallest separation, in hours, across minimum-gap bindings.
    pub tightest_gap_hours: Option<i64>,
}

impl RunSummary {
    /// Computes the summary of a solved run.
    ///
    /// # Arguments
    /// * `pool` - Items after the solution has been applied.
    /// * `problem` / `solution` - The solved problem, for binding figures.
    pub fn calculate(
        pool: &ItemPool,
        direct_items: usize,
        indirect_items: usize,
        candidates: usize,
        problem: &Problem,
        solution: &CspSolution,
    ) -> Self {
        let assigned: Vec<NaiveDateTime> = pool.iter().filter_map(|i| i.assigned()).collect();
        let days: BTreeSet<_> = assigned.iter().map(|dt| dt.date()).collect();

        let tightest_gap_hours = problem
            .bindings()
            .iter()
            .filter(|b| b.relation == Relation::MinimumGap)
            .filter_map(|b| {
                let first = solution.value(problem, b.first)?.datetime();
                let second = solution.value(problem, b.second)?.datetime();
                Some(distance(first, second).num_hours())
            })
            .min();

        Self {
            direct_items,
            indirect_items,
            candidates,
            bindings: problem.binding_counts(),
            stats: solution.stats,
            first_exam: assigned.iter().min().copied(),
            last_exam: assigned.iter().max().copied(),
            exam_days: days.len(),
            tightest_gap_hours,
        }
    }

    /// Total items in the timetable.
    pub fn total_items(&self) -> usize {
        self.direct_items + self.indirect_items
    }
}

fn distance(a: NaiveDateTime, b: NaiveDateTime) -> Duration {
    if a > b {
        a - b
    } else {
        b - a
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " #items (direct)      : {}", self.direct_items)?;
        writeln!(f, " #items (indirect)    : {}", self.indirect_items)?;
        writeln!(f, " #candidate values    : {}", self.candidates)?;
        writeln!(
            f,
            " #bindings            : {} (gap {}, date {}, time {})",
            self.bindings.total(),
            self.bindings.minimum_gap,
            self.bindings.date,
            self.bindings.time
        )?;
        writeln!(
            f,
            " search               : {} nodes, {} backtracks, {} ms",
            self.stats.nodes, self.stats.backtracks, self.stats.solve_time_ms
        )?;
        if let (Some(first), Some(last)) = (self.first_exam, self.last_exam) {
            writeln!(f, " period               : {first} .. {last} ({} days)", self.exam_days)?;
        }
        if let Some(gap) = self.tightest_gap_hours {
            writeln!(f, " tightest gap         : {gap} h")?;
        }
        Ok(())
    }
}
