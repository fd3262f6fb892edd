//! CSP formulation of an exam timetable.
//!
//! Bridges the exam domain models to a finite-domain CSP. Builds a
//! [`Problem`] from a pool of items and their filtered domains, then
//! solves it with any [`CspSolver`].
//!
//! # Bindings
//!
//! For every pair of distinct items `i`, `j` (in pool order):
//!
//! | Condition | Binding |
//! |-----------|---------|
//! | same group and course level | minimum gap, once per unordered pair |
//! | `j` under `i`'s date references | `i.date <op> j.date` per constraint |
//! | `j` under `i`'s time references | `i.time <op> j.time` per constraint |
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod problem;
pub mod solver;

pub use problem::{Binding, BindingCounts, Problem, Relation, Variable};
pub use solver::{BacktrackingSolver, CspSolution, CspSolver, SolverStats, SolverStatus};

use tracing::debug;

use crate::error::{ExamError, Result};
use crate::models::{CandidateValue, ItemPool};

/// Builds a CSP problem from exam domain objects.
///
/// # Example
/// ```no_run
/// use u_exam::csp::{BacktrackingSolver, ExamCspBuilder};
/// use u_exam::models::ItemPool;
///
/// let pool = ItemPool::new();
/// let domains = Vec::new();
/// let builder = ExamCspBuilder::new(&pool, domains);
/// let problem = builder.build().unwrap();
/// let solution = builder.solve(&BacktrackingSolver::new()).unwrap();
/// ```
pub struct ExamCspBuilder<'a> {
    pool: &'a ItemPool,
    domains: Vec<Vec<CandidateValue>>,
}

impl<'a> ExamCspBuilder<'a> {
    /// Creates a builder. `domains[i]` is the filtered domain of the
    /// `i`-th item of the pool.
    pub fn new(pool: &'a ItemPool, domains: Vec<Vec<CandidateValue>>) -> Self {
        Self { pool, domains }
    }

    /// Builds the problem.
    ///
    /// Creates:
    /// - A variable per item, in pool order, with its filtered domain
    /// - Minimum-gap bindings within each group and course level
    /// - Binary date and time bindings from the items' references
    ///
    /// # Errors
    /// - [`ExamError::UnresolvedReference`] if a reference targets an item
    ///   outside the pool
    /// - [`ExamError::EmptyDomain`] if an item has no domain
    pub fn build(&self) -> Result<Problem> {
        let items = self.pool.items();

        for item in items {
            if let Some(target) = item.referenced_keys().find(|k| !self.pool.contains(k)) {
                return Err(ExamError::UnresolvedReference {
                    from: item.key().clone(),
                    target: target.clone(),
                });
            }
        }

        let mut problem = Problem::new();
        for (i, item) in items.iter().enumerate() {
            let domain = self.domains.get(i).cloned().unwrap_or_default();
            if domain.is_empty() {
                return Err(ExamError::EmptyDomain {
                    key: item.key().clone(),
                    name: item.name.clone(),
                });
            }
            problem.add_variable(item.key().clone(), domain);
        }

        for (i, first) in items.iter().enumerate() {
            for (j, second) in items.iter().enumerate() {
                if i == j {
                    continue;
                }

                if i < j && first.group == second.group && first.course == second.course {
                    problem.add_binding(Relation::MinimumGap, i, j);
                }

                for c in first.date_references().get(second.key()).unwrap_or_default() {
                    problem.add_binding(Relation::Date(c.op), i, j);
                }

                for c in first.time_references().get(second.key()).unwrap_or_default() {
                    problem.add_binding(Relation::Time(c.op), i, j);
                }
            }
        }

        let counts = problem.binding_counts();
        debug!(
            variables = problem.variable_count(),
            minimum_gap = counts.minimum_gap,
            date = counts.date,
            time = counts.time,
            "problem assembled"
        );
        Ok(problem)
    }

    /// Builds and solves the problem.
    ///
    /// # Errors
    /// Any error from [`build`](Self::build), or [`ExamError::NoSolution`]
    /// when the solver exhausts the search space.
    pub fn solve<S: CspSolver>(&self, solver: &S) -> Result<(Problem, CspSolution)> {
        let problem = self.build()?;
        let solution = solver.solve(&problem);
        if !solution.is_solution_found() {
            return Err(ExamError::NoSolution);
        }
        Ok((problem, solution))
    }
}
