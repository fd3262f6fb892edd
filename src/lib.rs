//! Exam timetabling compiler.
//!
//! Reads exam subjects and their date/time constraints from a master
//! workbook, compiles the constraint text into a finite-domain CSP and
//! solves it to give every exam a concrete date and time.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ScheduleItem`, `ItemPool`, `CandidateValue`,
//!   `CellRef`, `UnitConstraint`, `BinaryConstraint`, `Operator`
//! - **`operators`**: Predicates evaluated by the filter and the solver
//! - **`parser`**: Constraint cell text to typed constraints
//! - **`workbook`**: Sheets, cells and the header-keyed row reader
//! - **`builder`**: Items from subject rows, candidates from the timeslot sheet
//! - **`resolver`**: Transitive loading of referenced items
//! - **`validation`**: Pool integrity checks (self references, dangling
//!   references, cyclic strict orderings)
//! - **`domain`**: Unit-constraint filtering of candidate values
//! - **`csp`**: Problem assembly and the solver seam
//! - **`scheduler`**: End-to-end run and summary
//! - **`export`**: Per-group timetable output
//! - **`config`**: Run configuration
//!
//! # Pipeline
//!
//! ```text
//! workbook ─▶ builder ─▶ resolver ─▶ validation
//!          ─▶ domain ─▶ csp ─▶ solver ─▶ export
//! ```
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination Timetabling: Algorithmic
//!   Strategies and Applications"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod builder;
pub mod config;
pub mod csp;
pub mod domain;
pub mod error;
pub mod export;
pub mod models;
pub mod operators;
pub mod parser;
pub mod resolver;
pub mod scheduler;
pub mod validation;
pub mod workbook;

pub use error::{ErrorKind, ExamError, Result};
