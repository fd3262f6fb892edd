//! Pool integrity checks.
//!
//! Run after loading (and resolving) items, before domains are filtered.
//! Detects:
//! - Items referencing themselves
//! - References to items that are not in the pool
//! - Cycles of strict ordering (`A < B < ... < A`) in either the date or
//!   the time references, which no assignment can satisfy
//!
//! Every issue is collected so that all of them can be reported at once.
//! None of them stops a run by itself: a self reference posts no binding,
//! a dangling reference fails when the problem is assembled, and a cycle
//! leaves the solver without a solution.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use crate::models::{BinaryConstraint, CellRef, ConstraintSet, ItemPool, Operator};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Item the issue was found on.
    pub item: CellRef,
    /// Referenced item, when the issue is about a reference.
    pub target: Option<CellRef>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An item holds a binary constraint on itself.
    SelfReference,
    /// A binary constraint targets an item outside the pool.
    UnresolvedReference,
    /// Strict date or time ordering forms a cycle.
    CyclicOrdering,
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        item: &CellRef,
        target: Option<&CellRef>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            item: item.clone(),
            target: target.cloned(),
            message: message.into(),
        }
    }
}

/// Validates the items of a pool.
///
/// Checks:
/// 1. No item references itself
/// 2. Every referenced key is in the pool
/// 3. No cycle of strict date ordering
/// 4. No cycle of strict time ordering
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_pool(pool: &ItemPool) -> ValidationResult {
    let mut errors = Vec::new();

    for item in pool {
        for target in item.referenced_keys() {
            if target == item.key() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfReference,
                    item.key(),
                    Some(target),
                    format!("Item {} references itself; the constraint is ignored", item.key()),
                ));
            } else if !pool.contains(target) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnresolvedReference,
                    item.key(),
                    Some(target),
                    format!("Item {} references {}, which is not loaded", item.key(), target),
                ));
            }
        }
    }

    for (family, select) in [("date", Family::Date), ("time", Family::Time)] {
        if let Some(node) = detect_cycles(pool, select) {
            errors.push(ValidationError::new(
                ValidationErrorKind::CyclicOrdering,
                &node,
                None,
                format!("Circular {family} ordering detected involving item {node}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Clone, Copy)]
enum Family {
    Date,
    Time,
}

/// Detects cycles in the strict-ordering graph of one family using DFS.
///
/// Edges run from the earlier item to the later one: `i < j` gives
/// `i -> j`, `i > j` gives `j -> i`. Non-strict operators and self
/// references add no edge.
fn detect_cycles(pool: &ItemPool, family: Family) -> Option<CellRef> {
    let mut adj: HashMap<&CellRef, Vec<&CellRef>> = HashMap::new();

    for item in pool {
        let references: &ConstraintSet<BinaryConstraint> = match family {
            Family::Date => item.date_references(),
            Family::Time => item.time_references(),
        };
        for c in references.iter().filter(|c| &c.target != item.key()) {
            match c.op {
                Operator::Lt => adj.entry(item.key()).or_default().push(&c.target),
                Operator::Gt => adj.entry(&c.target).or_default().push(item.key()),
                _ => {}
            }
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for item in pool {
        let node = item.key();
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(node.clone());
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a CellRef,
    adj: &HashMap<&'a CellRef, Vec<&'a CellRef>>,
    visited: &mut HashSet<&'a CellRef>,
    in_stack: &mut HashSet<&'a CellRef>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}
