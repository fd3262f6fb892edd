//! Timetable output.
//!
//! Renders a solved pool as a workbook with one sheet per group. Each
//! sheet starts with a header row (name, course, term, date, time) and
//! lists the group's exams sorted by course, term, date and time.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ColumnNames;
use crate::error::{ExamError, Result};
use crate::models::{ItemPool, ScheduleItem};
use crate::workbook::{Cell, Sheet, Workbook};

/// Suffix appended to the master file stem for the default output name.
pub const OUTPUT_SUFFIX: &str = "-timetable";

/// Builds the timetable workbook.
///
/// Groups appear in the order their first item was loaded. Unassigned
/// items keep blank date and time cells and sort last within their term.
pub fn timetable_workbook(pool: &ItemPool, columns: &ColumnNames) -> Workbook {
    let mut groups: Vec<(&str, Vec<&ScheduleItem>)> = Vec::new();
    for item in pool {
        match groups.iter_mut().find(|(g, _)| *g == item.group) {
            Some((_, items)) => items.push(item),
            None => groups.push((item.group.as_str(), vec![item])),
        }
    }

    let mut workbook = Workbook::new();
    for (group, mut items) in groups {
        items.sort_by(|a, b| compare(a, b));

        let mut sheet = Sheet::new(group).with_row([
            columns.name.as_str(),
            columns.course.as_str(),
            columns.term.as_str(),
            columns.date.as_str(),
            columns.time.as_str(),
        ]);
        for item in items {
            sheet.push_row(row(item));
        }
        workbook = workbook.with_sheet(sheet);
    }
    workbook
}

fn compare(a: &ScheduleItem, b: &ScheduleItem) -> Ordering {
    // `None` sorts before `Some`; flip so unassigned items go last.
    let slot = |i: &ScheduleItem| (i.date().is_none(), i.date(), i.time());
    (a.course, a.term)
        .cmp(&(b.course, b.term))
        .then_with(|| slot(a).cmp(&slot(b)))
}

fn row(item: &ScheduleItem) -> Vec<Cell> {
    vec![
        Cell::from(item.name.as_str()),
        Cell::from(item.course),
        Cell::from(item.term),
        Cell::from(item.date().map(|d| d.format("%Y-%m-%d").to_string())),
        Cell::from(item.time().map(|t| t.format("%H:%M").to_string())),
    ]
}

/// Resolves where the timetable is written.
///
/// Without an explicit path the output goes next to the master, named
/// `<stem>-timetable.json`.
///
/// # Errors
/// [`ExamError::OutputExists`] if the file is already there.
pub fn output_path(master: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let stem = master
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "master".to_string());
            master.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.json"))
        }
    };

    if path.exists() {
        return Err(ExamError::OutputExists(path));
    }
    Ok(path)
}

/// Writes the timetable workbook to `path`.
pub fn write_timetable(pool: &ItemPool, columns: &ColumnNames, path: &Path) -> Result<()> {
    let workbook = timetable_workbook(pool, columns);
    workbook.save(path)?;
    info!(path = %path.display(), sheets = workbook.sheets.len(), "timetable written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellRef;
    use chrono::{NaiveDate, NaiveTime};

    fn item(sheet: &str, row: u32, name: &str, course: u32, term: u32) -> ScheduleItem {
        ScheduleItem::new(CellRef::new(sheet, "A", row), sheet, name)
            .with_course(course)
            .with_term(term)
    }

    fn assigned(mut item: ScheduleItem, day: u32, hour: u32) -> ScheduleItem {
        item.assign(
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        );
        item
    }

    fn sample_pool() -> ItemPool {
        let mut pool = ItemPool::new();
        pool.extend([
            assigned(item("GII", 2, "Networks", 2, 1), 3, 9),
            assigned(item("GII", 3, "Calculus", 1, 1), 4, 9),
            assigned(item("EII", 2, "Physics", 1, 1), 6, 16),
            assigned(item("GII", 4, "Algebra", 1, 1), 2, 16),
            assigned(item("GII", 5, "Logic", 1, 2), 1, 9),
        ])
        .unwrap();
        pool
    }

    #[test]
    fn test_sheets_per_group() {
        let wb = timetable_workbook(&sample_pool(), &ColumnNames::default());
        assert_eq!(wb.sheet_names(), vec!["GII", "EII"]);

        let gii = wb.sheet("GII").unwrap();
        assert_eq!(gii.rows.len(), 5);
        assert_eq!(gii.cell(0, 0), &Cell::from("Asignatura"));
        let names: Vec<String> = gii.rows[1..].iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["Algebra", "Calculus", "Logic", "Networks"]);
    }

    #[test]
    fn test_row_format() {
        let wb = timetable_workbook(&sample_pool(), &ColumnNames::default());
        let eii = wb.sheet("EII").unwrap();
        assert_eq!(eii.cell(1, 3), &Cell::from("2024-05-06"));
        assert_eq!(eii.cell(1, 4), &Cell::from("16:00"));
        assert_eq!(eii.cell(1, 1), &Cell::from(1u32));
    }

    #[test]
    fn test_unassigned_sorts_last() {
        let mut pool = ItemPool::new();
        pool.extend([
            item("GII", 2, "Pending", 1, 1),
            assigned(item("GII", 3, "Done", 1, 1), 9, 9),
        ])
        .unwrap();
        let wb = timetable_workbook(&pool, &ColumnNames::default());
        let gii = wb.sheet("GII").unwrap();
        assert_eq!(gii.cell(1, 0), &Cell::from("Done"));
        assert!(gii.cell(2, 3).is_empty());
    }

    #[test]
    fn test_output_path() {
        let dir = std::env::temp_dir().join(format!("u-exam-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let master = dir.join("master.json");

        let path = output_path(&master, None).unwrap();
        assert_eq!(path, dir.join("master-timetable.json"));

        write_timetable(&sample_pool(), &ColumnNames::default(), &path).unwrap();
        let err = output_path(&master, None).unwrap_err();
        assert!(matches!(err, ExamError::OutputExists(p) if p == path));

        let reloaded = Workbook::load(&path).unwrap();
        assert_eq!(reloaded.sheet_names(), vec!["GII", "EII"]);

        let explicit = dir.join("custom.json");
        assert_eq!(output_path(&master, Some(&explicit)).unwrap(), explicit);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
