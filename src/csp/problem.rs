//! CSP problem instance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{CandidateValue, CellRef, Operator};
use crate::operators;

/// A variable: one item and its filtered domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Identity key of the item.
    pub key: CellRef,
    /// Admissible values, in candidate order.
    pub domain: Vec<CandidateValue>,
}

/// Predicate family of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// The two values are at least the later one's gap apart.
    MinimumGap,
    /// `first.date <op> second.date`.
    Date(Operator),
    /// `first.time <op> second.time`.
    Time(Operator),
}

impl Relation {
    /// Evaluates the relation on two values.
    pub fn holds(self, first: &CandidateValue, second: &CandidateValue) -> bool {
        match self {
            Self::MinimumGap => operators::minimum_gap(first, second),
            Self::Date(op) => operators::binary_date(op, first, second),
            Self::Time(op) => operators::binary_time(op, first, second),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinimumGap => write!(f, "gap"),
            Self::Date(op) => write!(f, "date {op}"),
            Self::Time(op) => write!(f, "time {op}"),
        }
    }
}

/// A relation posted between two variables (by index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Predicate family.
    pub relation: Relation,
    /// Left-hand variable.
    pub first: usize,
    /// Right-hand variable.
    pub second: usize,
}

impl Binding {
    /// Creates a binding.
    pub fn new(relation: Relation, first: usize, second: usize) -> Self {
        Self {
            relation,
            first,
            second,
        }
    }

    /// The variable at the other end, if `var` is one of the two.
    pub fn other(&self, var: usize) -> Option<usize> {
        if var == self.first {
            Some(self.second)
        } else if var == self.second {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Number of bindings per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingCounts {
    /// Minimum-gap bindings.
    pub minimum_gap: usize,
    /// Binary date bindings.
    pub date: usize,
    /// Binary time bindings.
    pub time: usize,
}

impl BindingCounts {
    /// Total bindings.
    pub fn total(&self) -> usize {
        self.minimum_gap + self.date + self.time
    }
}

/// Variables with their domains plus the bindings among them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    variables: Vec<Variable>,
    bindings: Vec<Binding>,
}

impl Problem {
    /// Creates an empty problem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its index.
    pub fn add_variable(&mut self, key: CellRef, domain: Vec<CandidateValue>) -> usize {
        self.variables.push(Variable { key, domain });
        self.variables.len() - 1
    }

    /// Posts a binding between two existing variables.
    pub fn add_binding(&mut self, relation: Relation, first: usize, second: usize) {
        debug_assert!(first < self.variables.len() && second < self.variables.len());
        self.bindings.push(Binding::new(relation, first, second));
    }

    /// Variables in index order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Bindings in posting order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Index of the variable for `key`.
    pub fn index_of(&self, key: &CellRef) -> Option<usize> {
        self.variables.iter().position(|v| &v.key == key)
    }

    /// Bindings touching `var`.
    pub fn bindings_of(&self, var: usize) -> impl Iterator<Item = &Binding> {
        self.bindings
            .iter()
            .filter(move |b| b.first == var || b.second == var)
    }

    /// Bindings per family.
    pub fn binding_counts(&self) -> BindingCounts {
        let mut counts = BindingCounts::default();
        for b in &self.bindings {
            match b.relation {
                Relation::MinimumGap => counts.minimum_gap += 1,
                Relation::Date(_) => counts.date += 1,
                Relation::Time(_) => counts.time += 1,
            }
        }
        counts
    }

    /// Size of the search space as a product of domain sizes (saturating).
    pub fn search_space(&self) -> u128 {
        self.variables
            .iter()
            .fold(1u128, |acc, v| acc.saturating_mul(v.domain.len() as u128))
    }
}
