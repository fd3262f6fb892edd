//! End-to-end exam scheduler.
//!
//! # Algorithm
//!
//! 1. Load the selected items of every subject sheet.
//! 2. Optionally load every item they reference, transitively.
//! 3. Validate the pool. Issues are logged as warnings: self references
//!    are ignored and dangling references fail at assembly.
//! 4. Read the candidate list from the timeslot sheet.
//! 5. Filter each item's domain by its unit constraints.
//! 6. Assemble the CSP and hand it to the solver.
//! 7. Record the solved date and time on every item.
//!
//! Each phase completes before the next starts; the first error aborts.

use tracing::{info, warn};

use super::summary::RunSummary;
use crate::builder;
use crate::config::ExamConfig;
use crate::csp::{BacktrackingSolver, CspSolution, CspSolver, ExamCspBuilder, Problem};
use crate::domain;
use crate::error::{ExamError, Result};
use crate::models::ItemPool;
use crate::resolver;
use crate::validation;
use crate::workbook::Workbook;

/// Input container for scheduling.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Master workbook: subject sheets plus the timeslot sheet.
    pub workbook: Workbook,
    /// Run configuration.
    pub config: ExamConfig,
}

impl ScheduleRequest {
    /// Creates a request with the default configuration.
    pub fn new(workbook: Workbook) -> Self {
        Self {
            workbook,
            config: ExamConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: ExamConfig) -> Self {
        self.config = config;
        self
    }
}

/// A solved timetable.
#[derive(Debug, Clone)]
pub struct Timetable {
    /// Items with their assigned date and time, in load order.
    pub items: ItemPool,
    /// What the run did.
    pub summary: RunSummary,
}

/// Exam scheduler.
///
/// # Example
///
/// ```
/// use u_exam::scheduler::{ExamScheduler, ScheduleRequest};
/// use u_exam::workbook::Workbook;
///
/// let workbook = Workbook::from_json_str(r#"{ "sheets": [
///     { "name": "GII", "rows": [
///         ["Asignatura", "Curso", "Cuatrimestre", "Fecha", "Hora"],
///         ["Algebra", 1, 1, ">=2024-05-02", ""],
///         ["Calculus", 1, 1, "", ""]
///     ] },
///     { "name": "Timeslots", "rows": [
///         ["Fecha", "Slot #1"],
///         ["2024-05-01", "9:00"],
///         ["2024-05-02", "9:00"],
///         ["2024-05-03", "9:00"]
///     ] }
/// ] }"#).unwrap();
///
/// let timetable = ExamScheduler::new()
///     .schedule(&ScheduleRequest::new(workbook))
///     .unwrap();
/// assert!(timetable.items.iter().all(|item| item.assigned().is_some()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExamScheduler<S = BacktrackingSolver> {
    solver: S,
}

impl ExamScheduler {
    /// Creates a scheduler with the backtracking solver.
    pub fn new() -> Self {
        Self {
            solver: BacktrackingSolver::new(),
        }
    }
}

impl<S: CspSolver> ExamScheduler<S> {
    /// Creates a scheduler with a custom solver.
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Runs every phase and returns the solved timetable.
    ///
    /// # Errors
    /// The first error of any phase; [`ExamError::NoSolution`] when the
    /// constraints cannot be satisfied together.
    pub fn schedule(&self, request: &ScheduleRequest) -> Result<Timetable> {
        let workbook = &request.workbook;
        let config = &request.config;

        let mut pool = builder::load_pool(workbook, config)?;
        let direct_items = pool.len();
        if pool.is_empty() {
            warn!("no items matched the selection");
        }

        let indirect_items = if config.load_indirects {
            let added = resolver::resolve_references(&mut pool, workbook, config)?;
            info!(added, total = pool.len(), "references resolved");
            added
        } else {
            0
        };

        report_issues(&pool);

        let candidates = builder::candidate_values(workbook, config)?;
        let domains = domain::filter_domains(&pool, &candidates)?;

        let csp = ExamCspBuilder::new(&pool, domains);
        let problem = csp.build()?;
        let counts = problem.binding_counts();
        info!(
            variables = problem.variable_count(),
            bindings = counts.total(),
            "problem posted"
        );

        let solution = self.solver.solve(&problem);
        info!(
            solved = solution.is_solution_found(),
            nodes = solution.stats.nodes,
            backtracks = solution.stats.backtracks,
            time_ms = solution.stats.solve_time_ms,
            "search finished"
        );
        if !solution.is_solution_found() {
            return Err(ExamError::NoSolution);
        }

        apply_solution(&mut pool, &problem, &solution);

        let summary = RunSummary::calculate(
            &pool,
            direct_items,
            indirect_items,
            candidates.len(),
            &problem,
            &solution,
        );
        Ok(Timetable {
            items: pool,
            summary,
        })
    }
}

/// Records the value chosen for each variable on the matching item.
pub fn apply_solution(pool: &mut ItemPool, problem: &Problem, solution: &CspSolution) {
    for item in pool.iter_mut() {
        let value = problem
            .index_of(item.key())
            .and_then(|var| solution.value(problem, var));
        if let Some(value) = value {
            item.assign(value.date, value.time);
        }
    }
}

/// Logs every validation issue.
fn report_issues(pool: &ItemPool) {
    if let Err(errors) = validation::validate_pool(pool) {
        for e in &errors {
            warn!(item = %e.item, kind = ?e.kind, "{}", e.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selection;
    use crate::error::ErrorKind;
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::json;

    fn master() -> Workbook {
        serde_json::from_value(json!({
            "sheets": [
                {
                    "name": "GII",
                    "rows": [
                        ["Asignatura", "Curso", "Cuatrimestre", "Fecha", "Hora", "Setup"],
                        ["Algebra", 1, 1, ">=2024-05-02", ">=12:00", null],
                        ["Calculus", 1, 1, "> A2", "", 48],
                        ["Logic", 1, 2, "", "", null],
                        ["Networks", 2, 1, "", "= $EII.A2", null]
                    ]
                },
                {
                    "name": "EII",
                    "rows": [
                        ["Asignatura", "Curso", "Cuatrimestre", "Fecha", "Hora"],
                        ["Physics", 2, 1, "2024-05-06", ""]
                    ]
                },
                {
                    "name": "Timeslots",
                    "rows": [
                        ["Fecha", "Slot #1", "Slot #2"],
                        ["2024-05-01", "9:00", "4:00 PM"],
                        ["2024-05-02", "9:00", "4:00 PM"],
                        ["2024-05-03", "9:00", "4:00 PM"],
                        ["2024-05-06", "9:00", "4:00 PM"],
                        ["2024-05-07", "9:00", null]
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn request(config: ExamConfig) -> ScheduleRequest {
        ScheduleRequest::new(master()).with_config(config)
    }

    fn assigned(timetable: &Timetable, name: &str) -> chrono::NaiveDateTime {
        timetable
            .items
            .iter()
            .find(|i| i.name == name)
            .and_then(|i| i.assigned())
            .unwrap()
    }

    #[test]
    fn test_full_schedule() {
        let timetable = ExamScheduler::new().schedule(&request(ExamConfig::default())).unwrap();
        assert_eq!(timetable.items.len(), 5);
        assert!(timetable.items.iter().all(|i| i.assigned().is_some()));

        let algebra = assigned(&timetable, "Algebra");
        assert!(algebra.date() >= NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(algebra.time(), NaiveTime::from_hms_opt(16, 0, 0).unwrap());

        // Calculus comes later and needs 48 hours after Algebra.
        let calculus = assigned(&timetable, "Calculus");
        assert!(calculus.date() > algebra.date());
        assert!(calculus - algebra >= chrono::Duration::hours(48));

        // Same time of day as Physics, which is fixed on May 6.
        let physics = assigned(&timetable, "Physics");
        assert_eq!(physics.date(), NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(assigned(&timetable, "Networks").time(), physics.time());

        assert_eq!(timetable.summary.direct_items, 5);
        assert_eq!(timetable.summary.indirect_items, 0);
        assert_eq!(timetable.summary.candidates, 9);
    }

    #[test]
    fn test_selection_with_indirects() {
        let config = ExamConfig::default()
            .with_selection(Selection::all().with_group("GII").with_course(2))
            .with_load_indirects(true);
        let timetable = ExamScheduler::new().schedule(&request(config)).unwrap();
        assert_eq!(timetable.summary.direct_items, 1);
        assert_eq!(timetable.summary.indirect_items, 1);
        let names: Vec<_> = timetable.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Networks", "Physics"]);
    }

    #[test]
    fn test_unresolved_without_indirects() {
        let config =
            ExamConfig::default().with_selection(Selection::all().with_group("GII").with_course(2));
        let err = ExamScheduler::new().schedule(&request(config)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
        assert!(matches!(err, ExamError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_empty_domain() {
        let mut wb = master();
        wb.sheets[1].rows[1][3] = "2099-01-01".into();
        let err = ExamScheduler::new().schedule(&ScheduleRequest::new(wb)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDomain);
        assert!(matches!(err, ExamError::EmptyDomain { key, .. } if key.to_string() == "$EII.A2"));
    }

    #[test]
    fn test_no_solution() {
        // Algebra and Logic both on May 7 (a single slot) with a 24h gap.
        let mut wb = master();
        wb.sheets[0].rows[1][3] = "2024-05-07".into();
        wb.sheets[0].rows[1][4] = "".into();
        wb.sheets[0].rows[3][3] = "2024-05-07".into();
        let err = ExamScheduler::new().schedule(&ScheduleRequest::new(wb)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSolution);
    }

    #[test]
    fn test_self_reference_ignored() {
        let mut wb = master();
        wb.sheets[0].rows[3][3] = ">=2024-05-01, = A4".into();
        let timetable = ExamScheduler::new().schedule(&ScheduleRequest::new(wb)).unwrap();
        assert_eq!(timetable.items.len(), 5);
        assert!(timetable.items.iter().all(|i| i.assigned().is_some()));
    }

    fn two_exams(first_gap: u32, second_gap: u32) -> Workbook {
        serde_json::from_value(json!({
            "sheets": [
                {
                    "name": "GII",
                    "rows": [
                        ["Asignatura", "Curso", "Cuatrimestre", "Fecha", "Hora", "Setup"],
                        ["Algebra", 1, 1, "", "", first_gap],
                        ["Calculus", 1, 1, "", "", second_gap]
                    ]
                },
                {
                    "name": "Timeslots",
                    "rows": [
                        ["Fecha", "Slot #1"],
                        ["2024-05-01", "9:00"]
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_gap_independent_of_row_order() {
        // A single slot: the 24h gap of either exam rules out sharing it.
        for (first, second) in [(24, 0), (0, 24)] {
            let wb = two_exams(first, second);
            let err = ExamScheduler::new().schedule(&ScheduleRequest::new(wb)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoSolution, "gaps ({first}, {second})");
        }

        let request = ScheduleRequest::new(two_exams(0, 0));
        let timetable = ExamScheduler::new().schedule(&request).unwrap();
        assert_eq!(assigned(&timetable, "Algebra"), assigned(&timetable, "Calculus"));
    }

    #[test]
    fn test_syntax_error_aborts() {
        let mut wb = master();
        wb.sheets[0].rows[2][4] = "after lunch".into();
        let err = ExamScheduler::new().schedule(&ScheduleRequest::new(wb)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
