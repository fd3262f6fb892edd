//! Cell coordinates.
//!
//! Every schedule item is identified by the cell where its name is written
//! in the master workbook, rendered as `$<sheet>.<COLUMN><ROW>`. Columns use
//! spreadsheet naming: bijective base 26, `A` = first column, `Z` = 26th,
//! `AA` = 27th. Rows are 1-based.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExamError;

static RE_CELLREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$(?P<sheet>.+)\.(?P<column>[a-zA-Z]+)(?P<row>\d+)\s*$")
        .expect("cell reference pattern")
});

/// Fully-qualified cell coordinate, used as the identity key of an item.
///
/// Two coordinates are equal iff sheet, column and row are equal. Column
/// letters are stored uppercase.
///
/// # Examples
///
/// ```
/// use u_exam::models::CellRef;
///
/// let key: CellRef = "$GII.b21".parse().unwrap();
/// assert_eq!(key.to_string(), "$GII.B21");
/// assert_eq!(key.column_index(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    sheet: String,
    column: String,
    row: u32,
}

impl CellRef {
    /// Creates a coordinate from a sheet, column letters and 1-based row.
    pub fn new(sheet: impl Into<String>, column: impl AsRef<str>, row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            column: column.as_ref().to_ascii_uppercase(),
            row,
        }
    }

    /// Creates a coordinate from a 0-based column index.
    pub fn at(sheet: impl Into<String>, column_index: usize, row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            column: column_name(column_index),
            row,
        }
    }

    /// Sheet name.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Column letters.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// 1-based row number.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// 0-based column index.
    pub fn column_index(&self) -> usize {
        // letters are validated on every construction path
        column_index(&self.column).unwrap_or(0)
    }

    /// The cell part without the sheet, e.g. `B21`.
    pub fn cell(&self) -> String {
        format!("{}{}", self.column, self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{}{}", self.sheet, self.column, self.row)
    }
}

impl FromStr for CellRef {
    type Err = ExamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = RE_CELLREF
            .captures(s)
            .ok_or_else(|| ExamError::InvalidCellRef(s.to_string()))?;
        let row: u32 = caps["row"]
            .parse()
            .map_err(|_| ExamError::InvalidCellRef(s.to_string()))?;
        if row == 0 {
            return Err(ExamError::InvalidCellRef(s.to_string()));
        }
        Ok(Self::new(&caps["sheet"], &caps["column"], row))
    }
}

impl TryFrom<String> for CellRef {
    type Error = ExamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellRef> for String {
    fn from(value: CellRef) -> Self {
        value.to_string()
    }
}

/// Spreadsheet column letters for a 0-based column index.
///
/// `0 → A`, `25 → Z`, `26 → AA`, `701 → ZZ`, `702 → AAA`.
pub fn column_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut rest = index;
    loop {
        letters.push(char::from(b'A' + (rest % 26) as u8));
        if rest < 26 {
            break;
        }
        rest = rest / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// 0-based column index of spreadsheet column letters (case-insensitive).
///
/// Returns `None` for an empty string or non-letters.
pub fn column_index(letters: &str) -> Option<usize> {
    let mut index = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    index.checked_sub(1)
}
