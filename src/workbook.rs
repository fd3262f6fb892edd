//! In-memory workbook and row reader.
//!
//! A workbook is a list of named sheets, each a grid of loosely typed
//! cells. Workbooks are read from and written to JSON:
//!
//! ```json
//! { "sheets": [ { "name": "GII", "rows": [["Asignatura", "Curso"], ["Algebra", 1]] } ] }
//! ```
//!
//! [`SheetReader`] walks a sheet as a sequence of records keyed by the
//! header row:
//!
//! - the header is the first row holding any non-empty cell
//! - columns without a text header are ignored
//! - rows with no non-empty cell in a kept column are skipped
//!
//! Coordinates reported by the reader are spreadsheet coordinates: rows
//! are 1-based and columns use bijective base-26 letters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExamError, Result};
use crate::models::CellRef;

/// A single cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Blank cell (`null`).
    #[default]
    Empty,
    /// Boolean. Never valid as constraint or field text.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

impl Cell {
    /// Whether the cell is blank or holds only whitespace.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual form of the cell, or `None` for booleans.
    ///
    /// Text is trimmed, integral floats print without a fraction and
    /// blanks become the empty string.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Empty => Some(String::new()),
            Self::Bool(_) => None,
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.trim().to_string()),
        }
    }

    /// Textual form of the cell as the value of `field` at `location`.
    ///
    /// # Errors
    /// [`ExamError::UnsupportedCell`] when the cell holds a boolean.
    pub fn text(&self, field: &str, location: &CellRef) -> Result<String> {
        self.to_text().ok_or_else(|| ExamError::UnsupportedCell {
            value: self.to_string(),
            field: field.to_string(),
            location: location.clone(),
        })
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Cell {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// A named grid of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name.
    pub name: String,
    /// Rows, top to bottom.
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn with_row<C: Into<Cell>>(mut self, cells: impl IntoIterator<Item = C>) -> Self {
        self.push_row(cells);
        self
    }

    /// Appends a row in place.
    pub fn push_row<C: Into<Cell>>(&mut self, cells: impl IntoIterator<Item = C>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Cell at 0-based `(row, column)`; blank outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }
}

/// A collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    /// Sheets in file order.
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Creates an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet.
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Parses a workbook from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads a workbook from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serializes the workbook as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the workbook to a new file.
    ///
    /// # Errors
    /// [`ExamError::OutputExists`] if the file is already there.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        use std::io::Write;

        let path = path.as_ref();
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => ExamError::OutputExists(path.to_path_buf()),
                _ => ExamError::Io(e),
            })?;
        file.write_all(self.to_json_string()?.as_bytes())?;
        Ok(())
    }

    /// Sheet names in file order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Looks up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Opens a record reader over a sheet.
    ///
    /// # Errors
    /// [`ExamError::UnknownSheet`] if no sheet has that name.
    pub fn reader(&self, name: &str) -> Result<SheetReader<'_>> {
        self.sheet(name)
            .map(SheetReader::new)
            .ok_or_else(|| ExamError::UnknownSheet(name.to_string()))
    }
}

/// One data row, keyed by header.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    row: u32,
    fields: Vec<(&'a str, &'a Cell)>,
}

impl<'a> Record<'a> {
    /// 1-based row number.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Cell under `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, cell)| *cell)
    }

    /// `(header, cell)` pairs in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> + '_ {
        self.fields.iter().copied()
    }
}

/// Sequential record reader over one sheet.
#[derive(Debug, Clone)]
pub struct SheetReader<'a> {
    sheet: &'a Sheet,
    columns: Vec<(usize, &'a str)>,
    next_row: usize,
    current: Option<usize>,
}

impl<'a> SheetReader<'a> {
    /// Locates the header and prepares to read the rows below it.
    ///
    /// Only text cells name columns; a repeated header keeps its first
    /// occurrence.
    pub fn new(sheet: &'a Sheet) -> Self {
        let header = sheet
            .rows
            .iter()
            .position(|row| row.iter().any(|c| !c.is_empty()));

        let mut columns: Vec<(usize, &'a str)> = Vec::new();
        if let Some(h) = header {
            for (index, cell) in sheet.rows[h].iter().enumerate() {
                if let Cell::Text(text) = cell {
                    let name = text.trim();
                    if !name.is_empty() && !columns.iter().any(|(_, n)| *n == name) {
                        columns.push((index, name));
                    }
                }
            }
        }

        Self {
            sheet,
            columns,
            next_row: header.map_or(sheet.rows.len(), |h| h + 1),
            current: None,
        }
    }

    /// Sheet name.
    pub fn sheet_name(&self) -> &'a str {
        &self.sheet.name
    }

    /// Header names in column order.
    pub fn columns(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.columns.iter().map(|(_, n)| *n)
    }

    /// Whether the header has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    /// Reads the next non-empty row.
    pub fn next_record(&mut self) -> Option<Record<'a>> {
        while self.next_row < self.sheet.rows.len() {
            let row = self.next_row;
            self.next_row += 1;

            let fields: Vec<(&'a str, &'a Cell)> = self
                .columns
                .iter()
                .map(|&(index, name)| (name, self.sheet.cell(row, index)))
                .collect();

            if fields.iter().all(|(_, c)| c.is_empty()) {
                continue;
            }

            self.current = Some(row);
            return Some(Record {
                row: row as u32 + 1,
                fields,
            });
        }
        self.current = None;
        None
    }

    /// Coordinate of `column` in the row last returned by
    /// [`next_record`](Self::next_record).
    pub fn cell_of(&self, column: &str) -> Option<CellRef> {
        let row = self.current?;
        let index = self.column_position(column)?;
        Some(CellRef::at(self.sheet.name.as_str(), index, row as u32 + 1))
    }

    fn column_position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(index, _)| *index)
    }
}

impl<'a> Iterator for SheetReader<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}
