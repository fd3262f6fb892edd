//! Constraint records and keyed constraint sets.
//!
//! Defines what a cell may ask of an exam: a relation to a constant
//! date or time (unit constraint), or a relation to another exam
//! identified by its cell (binary constraint).
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};

use super::CellRef;

/// Relational operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=` (the default when no operator is written).
    #[default]
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Operator {
    /// All operators.
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
    ];

    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Evaluates `lhs <op> rhs`.
    #[inline]
    pub fn compare<T: Ord + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(format!("'{other}' is not a relational operator")),
        }
    }
}

/// A relation between an item's value and a constant: `value <op> constant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConstraint<T> {
    /// Relational operator.
    pub op: Operator,
    /// Constant the value is compared against.
    pub constant: T,
}

/// Unit constraint over the date part of a value.
pub type DateConstraint = UnitConstraint<NaiveDate>;

/// Unit constraint over the time part of a value.
pub type TimeConstraint = UnitConstraint<NaiveTime>;

impl<T> UnitConstraint<T> {
    /// Creates a unit constraint.
    pub fn new(op: Operator, constant: T) -> Self {
        Self { op, constant }
    }
}

impl<T: fmt::Display> fmt::Display for UnitConstraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.constant)
    }
}

/// A relation to another item: `this.value <op> other.value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConstraint {
    /// Relational operator.
    pub op: Operator,
    /// Identity key of the other item.
    pub target: CellRef,
}

impl BinaryConstraint {
    /// Creates a binary constraint.
    pub fn new(op: Operator, target: CellRef) -> Self {
        Self { op, target }
    }
}

impl fmt::Display for BinaryConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.target)
    }
}

/// Constraints grouped by the identity key they are bound to.
///
/// Inserting under an existing key appends, so a key may carry several
/// constraints (e.g. `>` and `<` to bound a range). No key ever maps to
/// an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet<C> {
    constraints: BTreeMap<CellRef, Vec<C>>,
}

impl<C> Default for ConstraintSet<C> {
    fn default() -> Self {
        Self {
            constraints: BTreeMap::new(),
        }
    }
}

impl<C> ConstraintSet<C> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constraint under `key`.
    pub fn insert(&mut self, key: CellRef, constraint: C) {
        self.constraints.entry(key).or_default().push(constraint);
    }

    /// Builder: appends a constraint and returns self.
    pub fn with(mut self, key: CellRef, constraint: C) -> Self {
        self.insert(key, constraint);
        self
    }

    /// Constraints bound to `key`, in insertion order.
    pub fn get(&self, key: &CellRef) -> Option<&[C]> {
        self.constraints.get(key).map(Vec::as_slice)
    }

    /// Whether any constraint is bound to `key`.
    pub fn contains(&self, key: &CellRef) -> bool {
        self.constraints.contains_key(key)
    }

    /// Keys with at least one constraint.
    pub fn keys(&self) -> impl Iterator<Item = &CellRef> {
        self.constraints.keys()
    }

    /// All constraints, flattened across keys.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.constraints.values().flatten()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Total number of constraints across keys.
    pub fn constraint_count(&self) -> usize {
        self.constraints.values().map(Vec::len).sum()
    }
}

impl<C: fmt::Display> fmt::Display for ConstraintSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, constraints) in &self.constraints {
            write!(f, "[{key}]:")?;
            for c in constraints {
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
