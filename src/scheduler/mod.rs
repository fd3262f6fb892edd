//! Exam scheduler and run summary.
//!
//! Drives the whole pipeline, from master workbook to solved timetable,
//! and reports what each run did.
//!
//! # Algorithm
//!
//! `ExamScheduler` chains loading, reference resolution, validation,
//! domain filtering, CSP assembly and search. Every phase must succeed
//! before the next one starts.
//!
//! # Summary
//!
//! `RunSummary` counts loaded items, candidate values and posted bindings,
//! and describes the shape of the solved timetable.
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination Timetabling: Algorithmic
//!   Strategies and Applications"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

mod summary;
mod timetable;

pub use summary::RunSummary;
pub use timetable::{apply_solution, ExamScheduler, ScheduleRequest, Timetable};
