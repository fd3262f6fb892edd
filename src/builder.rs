//! Item and candidate builders.
//!
//! Turns workbook rows into [`ScheduleItem`]s and the timeslot sheet
//! into the global list of [`CandidateValue`]s.
//!
//! # Row layout
//!
//! | Column (default header) | Meaning | When blank |
//! |-------------------------|---------|------------|
//! | `Asignatura` | subject name; its cell is the identity key | row skipped |
//! | `Curso` | course level | 0 |
//! | `Cuatrimestre` | term | 0 |
//! | `Fecha` | date constraints and date references | unconstrained |
//! | `Hora` | time constraints and time references | unconstrained |
//! | `Setup` | minimum gap in hours | configured default |
//!
//! Items can be built by scanning a sheet with a selection, or by looking
//! up a single coordinate (used to load referenced items on demand).

use tracing::{debug, info, warn};

use crate::config::{ExamConfig, Selection};
use crate::error::{ExamError, Result};
use crate::models::{CandidateValue, CellRef, ItemPool, ScheduleItem};
use crate::parser::{self, ParsedCell};
use crate::workbook::{Record, SheetReader, Workbook};

/// Builds the item described by the record last read from `reader`.
///
/// # Errors
/// - [`ExamError::UnknownColumn`] if the sheet has no name column
/// - syntax errors from either constraint cell
/// - [`ExamError::TimeInDateCell`] / [`ExamError::DateInTimeCell`] when a
///   unit constraint sits in the wrong cell
/// - [`ExamError::InvalidField`] for a non-numeric course, term or gap
pub fn build_item(
    record: &Record<'_>,
    reader: &SheetReader<'_>,
    config: &ExamConfig,
) -> Result<ScheduleItem> {
    let columns = &config.columns;
    let sheet = reader.sheet_name();
    let key = identity(reader, config)?;

    let name = field_text(record, &columns.name, &key)?;
    let course = numeric_field(record, &columns.course, &key)?.unwrap_or(0);
    let term = numeric_field(record, &columns.term, &key)?.unwrap_or(0);
    let gap = numeric_field(record, &columns.gap, &key)?.unwrap_or(config.default_gap_hours);

    let dates = parser::parse_cell(&field_text(record, &columns.date, &key)?, sheet, &key)?;
    let times = parser::parse_cell(&field_text(record, &columns.time, &key)?, sheet, &key)?;
    check_placement(&key, &dates, &times)?;

    Ok(ScheduleItem::new(key, sheet, name)
        .with_course(course)
        .with_term(term)
        .with_gap(gap)
        .with_date_constraints(dates.dates)
        .with_date_references(dates.references)
        .with_time_constraints(times.times)
        .with_time_references(times.references))
}

/// Loads every selected item of one sheet, in row order.
///
/// Rows with a blank name are skipped. The group criterion of the
/// selection is not checked here; the sheet is the group.
pub fn load_items(
    workbook: &Workbook,
    sheet: &str,
    selection: &Selection,
    config: &ExamConfig,
) -> Result<Vec<ScheduleItem>> {
    let mut reader = workbook.reader(sheet)?;
    let mut items = Vec::new();

    while let Some(record) = reader.next_record() {
        let key = identity(&reader, config)?;
        if record.get(&config.columns.name).map_or(true, |c| c.is_empty()) {
            debug!(row = record.row(), sheet, "row without a name skipped");
            continue;
        }

        let course = numeric_field(&record, &config.columns.course, &key)?.unwrap_or(0);
        let term = numeric_field(&record, &config.columns.term, &key)?.unwrap_or(0);
        if !selection.matches(course, term) {
            continue;
        }

        let item = build_item(&record, &reader, config)?;
        debug!(item = %item, "item loaded");
        items.push(item);
    }

    Ok(items)
}

/// Loads the selected items of every subject sheet into a new pool.
///
/// The timeslot sheet is never read as a subject sheet. A selected sheet
/// that contributes nothing is reported and skipped.
pub fn load_pool(workbook: &Workbook, config: &ExamConfig) -> Result<ItemPool> {
    let mut pool = ItemPool::new();

    for sheet in workbook.sheet_names() {
        if sheet == config.timeslots.sheet || !config.selection.matches_group(sheet) {
            continue;
        }

        let items = load_items(workbook, sheet, &config.selection, config)?;
        if items.is_empty() {
            warn!(sheet, "no items selected, sheet skipped");
            continue;
        }
        pool.extend(items)?;
        info!(sheet, total = pool.len(), "sheet processed");
    }

    Ok(pool)
}

/// Loads the single item whose name cell is `key`.
///
/// # Errors
/// [`ExamError::UnknownRegister`] if the sheet does not exist or no row
/// has its name at that coordinate.
pub fn load_item_at(
    workbook: &Workbook,
    key: &CellRef,
    config: &ExamConfig,
) -> Result<ScheduleItem> {
    let mut reader = match workbook.reader(key.sheet()) {
        Ok(reader) => reader,
        Err(ExamError::UnknownSheet(_)) => return Err(ExamError::UnknownRegister(key.clone())),
        Err(e) => return Err(e),
    };

    while let Some(record) = reader.next_record() {
        if reader.cell_of(&config.columns.name).as_ref() == Some(key) {
            return build_item(&record, &reader, config);
        }
    }

    Err(ExamError::UnknownRegister(key.clone()))
}

/// Reads the global candidate list from the timeslot sheet.
///
/// Each row holds a date plus numbered slot columns with times of day;
/// every non-blank slot yields one candidate. Slot columns are read while
/// `<prefix>1`, `<prefix>2`, ... exist in the header.
///
/// # Errors
/// - [`ExamError::UnknownSheet`] / [`ExamError::UnknownColumn`] for a
///   missing sheet or date column
/// - [`ExamError::InvalidTimeslot`] for an unreadable date or time
pub fn candidate_values(workbook: &Workbook, config: &ExamConfig) -> Result<Vec<CandidateValue>> {
    let layout = &config.timeslots;
    let mut reader = workbook.reader(&layout.sheet)?;
    if !reader.has_column(&layout.date_column) {
        return Err(ExamError::UnknownColumn {
            sheet: layout.sheet.clone(),
            column: layout.date_column.clone(),
        });
    }

    let slots: Vec<String> = (1..)
        .map(|n| layout.slot_column(n))
        .take_while(|column| reader.has_column(column))
        .collect();

    let mut values = Vec::new();
    while let Some(record) = reader.next_record() {
        let location = located(&reader, &layout.date_column)?;
        let text = field_text(&record, &layout.date_column, &location)?;
        let date = parser::parse_date(&text).ok_or_else(|| ExamError::InvalidTimeslot {
            value: text.clone(),
            location,
        })?;

        for slot in &slots {
            let location = located(&reader, slot)?;
            let text = field_text(&record, slot, &location)?;
            if text.is_empty() {
                continue;
            }
            let time = parser::parse_time(&text)
                .ok_or_else(|| ExamError::InvalidTimeslot { value: text, location })?;
            values.push(CandidateValue::new(date, time).with_gap(config.default_gap_hours));
        }
    }

    info!(candidates = values.len(), slots = slots.len(), "timeslots read");
    Ok(values)
}

fn identity(reader: &SheetReader<'_>, config: &ExamConfig) -> Result<CellRef> {
    located(reader, &config.columns.name)
}

fn located(reader: &SheetReader<'_>, column: &str) -> Result<CellRef> {
    reader.cell_of(column).ok_or_else(|| ExamError::UnknownColumn {
        sheet: reader.sheet_name().to_string(),
        column: column.to_string(),
    })
}

/// Text of `column`, or empty when the sheet has no such column.
fn field_text(record: &Record<'_>, column: &str, location: &CellRef) -> Result<String> {
    match record.get(column) {
        Some(cell) => cell.text(column, location),
        None => Ok(String::new()),
    }
}

fn numeric_field(record: &Record<'_>, column: &str, location: &CellRef) -> Result<Option<u32>> {
    let text = field_text(record, column, location)?;
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| ExamError::InvalidField {
        field: column.to_string(),
        value: text,
        location: location.clone(),
    })
}

fn check_placement(key: &CellRef, dates: &ParsedCell, times: &ParsedCell) -> Result<()> {
    if !dates.times.is_empty() {
        return Err(ExamError::TimeInDateCell {
            location: key.clone(),
            found: join(&dates.times),
        });
    }
    if !times.dates.is_empty() {
        return Err(ExamError::DateInTimeCell {
            location: key.clone(),
            found: join(&times.dates),
        });
    }
    Ok(())
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
