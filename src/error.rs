//! Error taxonomy.
//!
//! Every failure detected while compiling a timetable is fatal: the run
//! stops at the first error and reports it. Errors are grouped into
//! [`ErrorKind`]s so the front end can say *what* went wrong (a malformed
//! cell, a dangling reference, an item with no legal slot, or an
//! unsatisfiable combination) before saying *where*.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::CellRef;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ExamError>;

/// Broad failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed constraint text or a misplaced date/time specification.
    Syntax,
    /// A referenced item could not be found.
    UnresolvedReference,
    /// An item has no candidate value left after unit filtering.
    EmptyDomain,
    /// The solver exhausted the search space.
    NoSolution,
    /// Unreadable or inconsistent input (files, sheets, columns, fields).
    Input,
}

/// Errors raised while building or solving a timetable.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error(
        "syntax error: the content '{text}' found in the register {location} \
         is not a valid constraint specification"
    )]
    Syntax { text: String, location: String },

    #[error(
        "syntax error: cell {location} contains a time specification \
         but it is a date cell: {found}"
    )]
    TimeInDateCell { location: CellRef, found: String },

    #[error(
        "syntax error: cell {location} contains a date specification \
         but it is a time cell: {found}"
    )]
    DateInTimeCell { location: CellRef, found: String },

    #[error("syntax error: unknown type of '{value}' found in the {field} of record {location}")]
    UnsupportedCell {
        value: String,
        field: String,
        location: CellRef,
    },

    #[error("syntax error in the register name '{0}'")]
    InvalidCellRef(String),

    #[error("the register {0} has not been found")]
    UnknownRegister(CellRef),

    #[error("unresolved reference: {from} refers to {target}, which has not been loaded")]
    UnresolvedReference { from: CellRef, target: CellRef },

    #[error("item {0} has been loaded twice")]
    DuplicateItem(CellRef),

    #[error("empty domain for item {key} ({name})")]
    EmptyDomain { key: CellRef, name: String },

    #[error("no solution found")]
    NoSolution,

    #[error("sheet '{0}' not found")]
    UnknownSheet(String),

    #[error("unknown header '{column}' in sheet '{sheet}'")]
    UnknownColumn { sheet: String, column: String },

    #[error("invalid {field} '{value}' in record {location}")]
    InvalidField {
        field: String,
        value: String,
        location: CellRef,
    },

    #[error("'{value}' in {location} is not a legal timeslot")]
    InvalidTimeslot { value: String, location: CellRef },

    #[error("the output file '{}' already exists or can not be created", .0.display())]
    OutputExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Config(#[from] toml::de::Error),
}

impl ExamError {
    /// Failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. }
            | Self::TimeInDateCell { .. }
            | Self::DateInTimeCell { .. }
            | Self::UnsupportedCell { .. }
            | Self::InvalidCellRef(_) => ErrorKind::Syntax,
            Self::UnknownRegister(_) | Self::UnresolvedReference { .. } => {
                ErrorKind::UnresolvedReference
            }
            Self::EmptyDomain { .. } => ErrorKind::EmptyDomain,
            Self::NoSolution => ErrorKind::NoSolution,
            Self::DuplicateItem(_)
            | Self::UnknownSheet(_)
            | Self::UnknownColumn { .. }
            | Self::InvalidField { .. }
            | Self::InvalidTimeslot { .. }
            | Self::OutputExists(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_) => ErrorKind::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let key: CellRef = "$GII.B2".parse().unwrap();
        assert_eq!(
            ExamError::Syntax {
                text: "foo".into(),
                location: "$GII.B2".into()
            }
            .kind(),
            ErrorKind::Syntax
        );
        assert_eq!(
            ExamError::UnknownRegister(key.clone()).kind(),
            ErrorKind::UnresolvedReference
        );
        assert_eq!(
            ExamError::EmptyDomain {
                key,
                name: "Algebra".into()
            }
            .kind(),
            ErrorKind::EmptyDomain
        );
        assert_eq!(ExamError::NoSolution.kind(), ErrorKind::NoSolution);
    }

    #[test]
    fn test_messages_name_location() {
        let err = ExamError::UnresolvedReference {
            from: "$GII.B2".parse().unwrap(),
            target: "$EII.C30".parse().unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("$GII.B2"));
        assert!(msg.contains("$EII.C30"));
    }
}
