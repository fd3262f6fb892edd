//! Exam timetabling domain models.
//!
//! Provides the data types the compiler works on: items to schedule,
//! the constraints attached to them, the candidate values they can take,
//! and the cell coordinates that identify them.
//!
//! # Domain Mappings
//!
//! | u-exam | Spreadsheet | CSP |
//! |--------|-------------|-----|
//! | ScheduleItem | Subject row | Variable |
//! | CandidateValue | Timeslot cell | Domain value |
//! | UnitConstraint | Date/time cell constant | Unary constraint |
//! | BinaryConstraint | Cell reference | Binary constraint |
//! | CellRef | `$Sheet.B21` | Variable identity |

mod cell;
mod constraint;
mod item;
mod pool;
mod value;

pub use cell::{column_index, column_name, CellRef};
pub use constraint::{
    BinaryConstraint, ConstraintSet, DateConstraint, Operator, TimeConstraint, UnitConstraint,
};
pub use item::ScheduleItem;
pub use pool::ItemPool;
pub use value::{CandidateValue, DEFAULT_GAP_HOURS};
