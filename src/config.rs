//! Run configuration.
//!
//! Every field has a default matching the usual master workbook layout,
//! so an empty file (or no file) is a valid configuration. Command-line
//! flags are applied on top of whatever is loaded here.
//!
//! # Examples
//!
//! ```
//! use u_exam::config::ExamConfig;
//!
//! let config = ExamConfig::from_toml_str(r#"
//!     load_indirects = true
//!
//!     [selection]
//!     group = "GII"
//!     course = 2
//!
//!     [timeslots]
//!     sheet = "Slots"
//! "#).unwrap();
//!
//! assert!(config.load_indirects);
//! assert_eq!(config.selection.course, Some(2));
//! assert_eq!(config.timeslots.sheet, "Slots");
//! assert_eq!(config.columns.name, "Asignatura");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::DEFAULT_GAP_HOURS;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExamConfig {
    /// Header names of the subject sheets.
    pub columns: ColumnNames,

    /// Layout of the timeslot sheet.
    pub timeslots: TimeslotLayout,

    /// Gap (hours) applied when a row leaves the gap column blank.
    pub default_gap_hours: u32,

    /// Which rows are loaded directly.
    pub selection: Selection,

    /// Load items referenced by binary constraints but not selected.
    pub load_indirects: bool,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            timeslots: TimeslotLayout::default(),
            default_gap_hours: DEFAULT_GAP_HOURS,
            selection: Selection::default(),
            load_indirects: false,
        }
    }
}

impl ExamConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the selection.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Enables or disables reference resolution.
    pub fn with_load_indirects(mut self, load_indirects: bool) -> Self {
        self.load_indirects = load_indirects;
        self
    }

    /// Sets the default gap.
    pub fn with_default_gap(mut self, hours: u32) -> Self {
        self.default_gap_hours = hours;
        self
    }
}

/// Header names used in subject sheets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Subject name; its cell is the item's identity.
    pub name: String,
    /// Course level.
    pub course: String,
    /// Term.
    pub term: String,
    /// Date constraints.
    pub date: String,
    /// Time constraints.
    pub time: String,
    /// Optional gap override (hours).
    pub gap: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: "Asignatura".to_string(),
            course: "Curso".to_string(),
            term: "Cuatrimestre".to_string(),
            date: "Fecha".to_string(),
            time: "Hora".to_string(),
            gap: "Setup".to_string(),
        }
    }
}

/// Timeslot sheet layout: one row per date, numbered slot columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeslotLayout {
    /// Sheet name.
    pub sheet: String,
    /// Date column header.
    pub date_column: String,
    /// Slot column prefix; slots are `<prefix>1`, `<prefix>2`, ...
    pub slot_prefix: String,
}

impl TimeslotLayout {
    /// Header of the `n`-th slot column (1-based).
    pub fn slot_column(&self, n: usize) -> String {
        format!("{}{}", self.slot_prefix, n)
    }
}

impl Default for TimeslotLayout {
    fn default() -> Self {
        Self {
            sheet: "Timeslots".to_string(),
            date_column: "Fecha".to_string(),
            slot_prefix: "Slot #".to_string(),
        }
    }
}

/// Row selection. Unset criteria match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Selection {
    /// Group (sheet name).
    pub group: Option<String>,
    /// Course level.
    pub course: Option<u32>,
    /// Term.
    pub term: Option<u32>,
}

impl Selection {
    /// Selects everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to one group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Restricts to one course level.
    pub fn with_course(mut self, course: u32) -> Self {
        self.course = Some(course);
        self
    }

    /// Restricts to one term.
    pub fn with_term(mut self, term: u32) -> Self {
        self.term = Some(term);
        self
    }

    /// Whether a sheet is selected.
    pub fn matches_group(&self, group: &str) -> bool {
        self.group.as_deref().map_or(true, |g| g == group)
    }

    /// Whether a row with this course and term is selected.
    pub fn matches(&self, course: u32, term: u32) -> bool {
        self.course.map_or(true, |c| c == course) && self.term.map_or(true, |t| t == term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExamConfig::default();
        assert_eq!(config.default_gap_hours, 24);
        assert_eq!(config.columns.term, "Cuatrimestre");
        assert_eq!(config.timeslots.slot_column(2), "Slot #2");
        assert!(!config.load_indirects);
        assert_eq!(config.selection, Selection::all());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ExamConfig::from_toml_str("").unwrap(), ExamConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ExamConfig::from_toml_str(
            r#"
            default_gap_hours = 48

            [columns]
            name = "Subject"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_gap_hours, 48);
        assert_eq!(config.columns.name, "Subject");
        assert_eq!(config.columns.course, "Curso");
    }

    #[test]
    fn test_invalid_toml() {
        let err = ExamConfig::from_toml_str("default_gap_hours = \"many\"").unwrap_err();
        assert!(matches!(err, crate::error::ExamError::Config(_)));
    }

    #[test]
    fn test_selection_matching() {
        let all = Selection::all();
        assert!(all.matches_group("GII"));
        assert!(all.matches(3, 1));

        let sel = Selection::all().with_group("GII").with_course(2);
        assert!(sel.matches_group("GII"));
        assert!(!sel.matches_group("EII"));
        assert!(sel.matches(2, 1));
        assert!(sel.matches(2, 2));
        assert!(!sel.matches(1, 1));

        let sel = Selection::all().with_term(2);
        assert!(sel.matches(4, 2));
        assert!(!sel.matches(4, 1));
    }
}
