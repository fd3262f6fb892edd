//! CSP solver interface and backtracking implementation.
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//! Ch. 6.3 (backtracking search, forward checking)

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::problem::{Binding, Problem};
use crate::models::{CandidateValue, CellRef};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    /// Every variable has a value satisfying all bindings.
    Solved,
    /// The search space was exhausted.
    Infeasible,
}

/// Search statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Values tried.
    pub nodes: u64,
    /// Variables whose domain was exhausted.
    pub backtracks: u64,
    /// Wall time in milliseconds.
    pub solve_time_ms: u64,
}

/// Solution from a CSP solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CspSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Chosen domain index per variable; empty unless solved.
    pub assignment: Vec<usize>,
    /// Search statistics.
    pub stats: SolverStats,
}

impl CspSolution {
    /// Creates a solution with no assignment.
    pub fn infeasible(stats: SolverStats) -> Self {
        Self {
            status: SolverStatus::Infeasible,
            assignment: Vec::new(),
            stats,
        }
    }

    /// Whether a solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status == SolverStatus::Solved
    }

    /// Value assigned to variable `var`.
    pub fn value<'p>(&self, problem: &'p Problem, var: usize) -> Option<&'p CandidateValue> {
        let index = *self.assignment.get(var)?;
        problem.variables().get(var)?.domain.get(index)
    }

    /// `(key, value)` pairs in variable order.
    pub fn values<'p>(
        &'p self,
        problem: &'p Problem,
    ) -> impl Iterator<Item = (&'p CellRef, &'p CandidateValue)> + 'p {
        problem
            .variables()
            .iter()
            .enumerate()
            .filter_map(move |(var, v)| Some((&v.key, self.value(problem, var)?)))
    }
}

/// Trait for CSP solver implementations.
///
/// Implementors receive the assembled problem as an opaque unit and
/// return one domain index per variable, or an infeasible status.
pub trait CspSolver {
    /// Solves the problem.
    fn solve(&self, problem: &Problem) -> CspSolution;
}

/// Backtracking search with forward checking.
///
/// Variables are ordered once, smallest domain first (ties by index), and
/// assigned in that order. Each variable keeps the list of its values still
/// compatible with the assignments made so far. Assigning a value removes
/// the values of unassigned neighbours that violate a shared binding; when
/// a neighbour is left with none, the value is undone and the next one is
/// tried. Deterministic: domain values are tried in candidate order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingSolver;

impl BacktrackingSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }

    /// Variable order used by the search.
    pub fn order(problem: &Problem) -> Vec<usize> {
        let mut order: Vec<usize> = (0..problem.variable_count()).collect();
        order.sort_by_key(|&var| (problem.variables()[var].domain.len(), var));
        order
    }
}

impl CspSolver for BacktrackingSolver {
    fn solve(&self, problem: &Problem) -> CspSolution {
        let start = Instant::now();

        let mut adjacency: Vec<Vec<&Binding>> = vec![Vec::new(); problem.variable_count()];
        for b in problem.bindings() {
            adjacency[b.first].push(b);
            if b.second != b.first {
                adjacency[b.second].push(b);
            }
        }

        let mut search = Search {
            problem,
            adjacency,
            order: Self::order(problem),
            assignment: vec![None; problem.variable_count()],
            live: problem
                .variables()
                .iter()
                .map(|v| (0..v.domain.len()).collect())
                .collect(),
            stats: SolverStats::default(),
        };
        let found = search.assign(0);

        let mut stats = search.stats;
        stats.solve_time_ms = start.elapsed().as_millis() as u64;

        if found {
            CspSolution {
                status: SolverStatus::Solved,
                assignment: search.assignment.into_iter().flatten().collect(),
                stats,
            }
        } else {
            CspSolution::infeasible(stats)
        }
    }
}

/// Domain lists replaced by one forward-checking step, oldest first.
type Trail = Vec<(usize, Vec<usize>)>;

struct Search<'a> {
    problem: &'a Problem,
    adjacency: Vec<Vec<&'a Binding>>,
    order: Vec<usize>,
    assignment: Vec<Option<usize>>,
    /// Domain indices per variable not yet ruled out.
    live: Vec<Vec<usize>>,
    stats: SolverStats,
}

impl<'a> Search<'a> {
    fn assign(&mut self, depth: usize) -> bool {
        let Some(&var) = self.order.get(depth) else {
            return true;
        };

        for index in self.live[var].clone() {
            self.stats.nodes += 1;
            self.assignment[var] = Some(index);
            if let Some(trail) = self.forward_check(var, index) {
                if self.assign(depth + 1) {
                    return true;
                }
                self.restore(trail);
            }
        }

        self.assignment[var] = None;
        self.stats.backtracks += 1;
        false
    }

    /// Prunes unassigned neighbours of `var` against its value `index`.
    ///
    /// Returns `None`, with every list restored, when a neighbour runs out
    /// of values.
    fn forward_check(&mut self, var: usize, index: usize) -> Option<Trail> {
        let problem: &'a Problem = self.problem;
        let value = &problem.variables()[var].domain[index];

        let mut trail = Trail::new();
        let mut wiped = false;
        for &b in &self.adjacency[var] {
            let Some(other) = b.other(var) else {
                continue;
            };
            if other == var {
                if !b.relation.holds(value, value) {
                    wiped = true;
                    break;
                }
                continue;
            }
            if self.assignment[other].is_some() {
                continue;
            }

            let domain = &problem.variables()[other].domain;
            let supported = |w: usize| {
                if b.first == var {
                    b.relation.holds(value, &domain[w])
                } else {
                    b.relation.holds(&domain[w], value)
                }
            };
            let kept: Vec<usize> = self.live[other]
                .iter()
                .copied()
                .filter(|&w| supported(w))
                .collect();
            if kept.len() < self.live[other].len() {
                let old = std::mem::replace(&mut self.live[other], kept);
                trail.push((other, old));
            }
            if self.live[other].is_empty() {
                wiped = true;
                break;
            }
        }

        if wiped {
            self.restore(trail);
            return None;
        }
        Some(trail)
    }

    fn restore(&mut self, trail: Trail) {
        for (var, values) in trail.into_iter().rev() {
            self.live[var] = values;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::problem::Relation;
    use crate::models::Operator;
    use chrono::{NaiveDate, NaiveTime};

    fn value(d: u32, h: u32) -> CandidateValue {
        CandidateValue::new(
            NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
        )
    }

    fn week() -> Vec<CandidateValue> {
        (1..=5).flat_map(|d| [value(d, 9), value(d, 16)]).collect()
    }

    fn key(row: u32) -> CellRef {
        CellRef::new("GII", "A", row)
    }

    fn check(problem: &Problem, solution: &CspSolution) {
        for b in problem.bindings() {
            let first = solution.value(problem, b.first).unwrap();
            let second = solution.value(problem, b.second).unwrap();
            assert!(b.relation.holds(first, second), "{} violated", b.relation);
        }
    }

    #[test]
    fn test_empty_problem() {
        let solution = BacktrackingSolver::new().solve(&Problem::new());
        assert!(solution.is_solution_found());
        assert!(solution.assignment.is_empty());
    }

    #[test]
    fn test_chain_with_gaps() {
        let mut p = Problem::new();
        let vars: Vec<usize> = (2..6).map(|r| p.add_variable(key(r), week())).collect();
        for i in 0..vars.len() {
            for j in (i + 1)..vars.len() {
                p.add_binding(Relation::MinimumGap, vars[i], vars[j]);
            }
        }
        p.add_binding(Relation::Date(Operator::Gt), vars[0], vars[3]);

        let solution = BacktrackingSolver::new().solve(&p);
        assert!(solution.is_solution_found());
        assert_eq!(solution.assignment.len(), 4);
        check(&p, &solution);
        assert!(solution.stats.nodes >= 4);
    }

    #[test]
    fn test_infeasible() {
        // Three items a day apart in a two-day window.
        let mut p = Problem::new();
        let two_days = vec![value(1, 9), value(1, 16), value(2, 9), value(2, 16)];
        let vars: Vec<usize> = (2..5).map(|r| p.add_variable(key(r), two_days.clone())).collect();
        for i in 0..vars.len() {
            for j in (i + 1)..vars.len() {
                p.add_binding(Relation::MinimumGap, vars[i], vars[j]);
            }
        }

        let solution = BacktrackingSolver::new().solve(&p);
        assert!(!solution.is_solution_found());
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(solution.stats.backtracks > 0);
    }

    #[test]
    fn test_smallest_domain_first() {
        let mut p = Problem::new();
        p.add_variable(key(2), week());
        p.add_variable(key(3), vec![value(3, 9)]);
        p.add_variable(key(4), vec![value(1, 9), value(2, 9)]);
        assert_eq!(BacktrackingSolver::order(&p), vec![1, 2, 0]);
    }

    #[test]
    fn test_equal_time_binding() {
        let mut p = Problem::new();
        let a = p.add_variable(key(2), vec![value(1, 9), value(2, 16)]);
        let b = p.add_variable(key(3), vec![value(3, 16)]);
        p.add_binding(Relation::Time(Operator::Eq), a, b);

        let solution = BacktrackingSolver::new().solve(&p);
        assert!(solution.is_solution_found());
        assert_eq!(solution.value(&p, a), Some(&value(2, 16)));
        let pairs: Vec<_> = solution.values(&p).map(|(k, _)| k.clone()).collect();
        assert_eq!(pairs, vec![key(2), key(3)]);
    }

    #[test]
    fn test_forward_checking_prunes() {
        // b is fixed on May 3, so a only tries the two May 3 slots.
        let mut p = Problem::new();
        let a = p.add_variable(key(2), week());
        let b = p.add_variable(key(3), vec![value(3, 16)]);
        p.add_binding(Relation::Date(Operator::Eq), a, b);

        let solution = BacktrackingSolver::new().solve(&p);
        assert!(solution.is_solution_found());
        assert_eq!(solution.value(&p, a), Some(&value(3, 9)));
        assert_eq!(solution.stats.nodes, 2);
        assert_eq!(solution.stats.backtracks, 0);
    }

    #[test]
    fn test_wipeout_undoes_pruning() {
        // a = May 3 leaves b nothing; a = May 1 must see b's full domain again.
        let mut p = Problem::new();
        let a = p.add_variable(key(2), vec![value(3, 9), value(1, 9)]);
        let b = p.add_variable(key(3), vec![value(1, 9), value(2, 9), value(3, 9)]);
        p.add_binding(Relation::Date(Operator::Lt), a, b);

        let solution = BacktrackingSolver::new().solve(&p);
        assert!(solution.is_solution_found());
        check(&p, &solution);
        assert_eq!(solution.value(&p, a), Some(&value(1, 9)));
        assert_eq!(solution.value(&p, b), Some(&value(2, 9)));
        assert_eq!(solution.stats.nodes, 3);
        assert_eq!(solution.stats.backtracks, 0);
    }
}
