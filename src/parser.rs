//! Constraint expression parser.
//!
//! A date or time cell holds a comma-separated list of fragments. Each
//! fragment is tried, in this order, as
//!
//! 1. a unit date: `[op] YYYY-MM-DD` or `[op] YYYY/MM/DD`
//! 2. a unit time: `[op] H:MM[:SS] [AM|PM]`
//! 3. a reference: `[op] [$Sheet.]B21`
//!
//! and the first match wins. The order matters: a date-like token must
//! never be read as a cell reference. A fragment matching none of the
//! three is a syntax error and aborts the run. The operator defaults to
//! `=` when omitted.
//!
//! Fragments whose numbers do not form a real calendar date or clock time
//! (`2024-13-01`, `25:00`) fall through to the next tier and end up as
//! syntax errors.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};

use crate::error::{ExamError, Result};
use crate::models::{BinaryConstraint, CellRef, DateConstraint, Operator, TimeConstraint};

const OP: &str = r"(?P<op><=|>=|!=|<|>|=)?";
const CLOCK: &str = r"(?P<hour>\d{1,2}):(?P<minute>\d{1,2})(?::(?P<second>\d{1,2}))?";

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*{OP}\s*(?P<year>\d{{4}})[/-](?P<month>\d{{1,2}})[/-](?P<day>\d{{1,2}})\s*$"
    ))
    .expect("unit date pattern")
});

static RE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*{OP}\s*{CLOCK}\s*(?P<qualifier>[AaPp][Mm])?\s*$"
    ))
    .expect("unit time pattern")
});

static RE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*{OP}\s*(?:\$(?P<sheet>.+)\.)?(?P<column>[a-zA-Z]+)(?P<row>\d+)\s*$"
    ))
    .expect("reference pattern")
});

/// One recognized fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Unit date constraint.
    Date(DateConstraint),
    /// Unit time constraint.
    Time(TimeConstraint),
    /// Binary constraint on another item.
    Reference(BinaryConstraint),
}

/// Constraints found in one cell, in source order within each list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCell {
    /// Unit date constraints.
    pub dates: Vec<DateConstraint>,
    /// Unit time constraints.
    pub times: Vec<TimeConstraint>,
    /// Binary constraints.
    pub references: Vec<BinaryConstraint>,
}

impl ParsedCell {
    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.times.is_empty() && self.references.is_empty()
    }
}

/// Parses the text of a date or time cell.
///
/// `sheet` qualifies references written without a `$Sheet.` prefix;
/// `location` is only used in diagnostics.
///
/// # Errors
/// [`ExamError::Syntax`] for the first fragment that is not a constraint.
pub fn parse_cell(text: &str, sheet: &str, location: &CellRef) -> Result<ParsedCell> {
    let mut parsed = ParsedCell::default();

    for fragment in text.split(',') {
        if fragment.trim().is_empty() {
            continue;
        }
        match parse_fragment(fragment, sheet) {
            Some(Fragment::Date(c)) => parsed.dates.push(c),
            Some(Fragment::Time(c)) => parsed.times.push(c),
            Some(Fragment::Reference(c)) => parsed.references.push(c),
            None => {
                return Err(ExamError::Syntax {
                    text: fragment.trim().to_string(),
                    location: location.to_string(),
                })
            }
        }
    }

    Ok(parsed)
}

/// Classifies a single fragment, trying date, then time, then reference.
pub fn parse_fragment(fragment: &str, sheet: &str) -> Option<Fragment> {
    if let Some(c) = parse_date_constraint(fragment) {
        return Some(Fragment::Date(c));
    }
    if let Some(c) = parse_time_constraint(fragment) {
        return Some(Fragment::Time(c));
    }
    parse_reference(fragment, sheet).map(Fragment::Reference)
}

/// Parses `[op] YYYY-MM-DD` (or with `/` separators).
pub fn parse_date_constraint(fragment: &str) -> Option<DateConstraint> {
    let caps = RE_DATE.captures(fragment)?;
    let date = NaiveDate::from_ymd_opt(
        caps["year"].parse().ok()?,
        caps["month"].parse().ok()?,
        caps["day"].parse().ok()?,
    )?;
    Some(DateConstraint::new(operator(&caps), date))
}

/// Parses `[op] H:MM[:SS] [AM|PM]`.
///
/// With `PM`, hours below 12 are moved to the afternoon; `12 PM` stays 12.
/// `AM` leaves the hour untouched. Seconds default to zero.
pub fn parse_time_constraint(fragment: &str) -> Option<TimeConstraint> {
    let caps = RE_TIME.captures(fragment)?;
    let mut hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = match caps.name("second") {
        Some(s) => s.as_str().parse().ok()?,
        None => 0,
    };
    let pm = caps
        .name("qualifier")
        .is_some_and(|q| q.as_str().eq_ignore_ascii_case("PM"));
    if pm && hour < 12 {
        hour += 12;
    }
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(TimeConstraint::new(operator(&caps), time))
}

/// Parses `[op] [$Sheet.]B21`, qualifying bare cells with `sheet`.
pub fn parse_reference(fragment: &str, sheet: &str) -> Option<BinaryConstraint> {
    let caps = RE_REFERENCE.captures(fragment)?;
    let row: u32 = caps["row"].parse().ok()?;
    if row == 0 {
        return None;
    }
    let sheet = caps.name("sheet").map_or(sheet, |s| s.as_str());
    let target = CellRef::new(sheet, &caps["column"], row);
    Some(BinaryConstraint::new(operator(&caps), target))
}

/// Reads a plain date (operator-free) such as a timeslot cell.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_date_constraint(text)
        .filter(|c| c.op == Operator::Eq)
        .map(|c| c.constant)
}

/// Reads a plain time (operator-free) such as a timeslot cell.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    parse_time_constraint(text)
        .filter(|c| c.op == Operator::Eq)
        .map(|c| c.constant)
}

fn operator(caps: &Captures<'_>) -> Operator {
    caps.name("op")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}
