//! Document host — the mutable spreadsheet the executor drives.
//!
//! The executor only ever talks to a [`DocumentHost`]. Reads come before
//! writes wherever an inverse has to be captured, and all calls of one
//! batch happen between [`DocumentHost::begin`] and [`DocumentHost::commit`].

pub mod memory;
pub mod reference;

use serde::{Deserialize, Serialize};

pub use memory::Workbook;
pub use reference::{Address, Axis, CellRange, CellRef, Lines, Shift};

/// Failures reported by a host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("{0}")]
    Rejected(String),
    /// The mutation session itself failed; nothing after this can run.
    #[error("{0}")]
    Session(String),
}

impl HostError {
    pub fn is_session(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}

/// A chart as listed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartInfo {
    pub name: String,
    pub title: String,
}

/// The full state of one used cell, read before it is overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSnapshot {
    pub at: Address,
    pub value: String,
    pub formula: Option<String>,
    pub bold: bool,
    pub fill: String,
}

/// Capabilities the executor needs from a spreadsheet document.
///
/// Addresses without a sheet refer to the active sheet. Value, formula
/// and format reads report the top-left cell of the range; writes apply
/// to every cell in it.
pub trait DocumentHost {
    /// Open a mutation session.
    fn begin(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    /// Commit everything done since [`begin`](Self::begin).
    fn commit(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn value(&self, at: &Address) -> Result<String, HostError>;
    fn set_value(&mut self, at: &Address, value: &str) -> Result<(), HostError>;

    /// The formula of a cell, or its constant value when it has none.
    fn formula(&self, at: &Address) -> Result<String, HostError>;
    fn set_formula(&mut self, at: &Address, formula: &str) -> Result<(), HostError>;

    fn bold(&self, at: &Address) -> Result<bool, HostError>;
    fn set_bold(&mut self, at: &Address, bold: bool) -> Result<(), HostError>;

    /// Fill colour; empty when the cell has none.
    fn fill(&self, at: &Address) -> Result<String, HostError>;
    fn set_fill(&mut self, at: &Address, color: &str) -> Result<(), HostError>;

    fn clear(&mut self, at: &Address) -> Result<(), HostError>;
    fn select(&mut self, at: &Address) -> Result<(), HostError>;

    /// Insert whole rows or columns on the active sheet.
    fn insert(&mut self, lines: &Lines, shift: Shift) -> Result<(), HostError>;
    /// Delete whole rows or columns on the active sheet.
    fn delete(&mut self, lines: &Lines, shift: Shift) -> Result<(), HostError>;

    /// Copy values, formulas and formats from one range onto another.
    fn copy_range(&mut self, source: &Address, target: &Address) -> Result<(), HostError>;
    /// Every used cell inside a range.
    fn snapshot(&self, at: &Address) -> Result<Vec<CellSnapshot>, HostError>;

    /// Fails with [`HostError::AlreadyExists`] when the name is taken.
    fn add_sheet(&mut self, name: &str) -> Result<(), HostError>;
    /// The stored name of a sheet, or of the active sheet for `None`.
    fn sheet_name(&self, name: Option<&str>) -> Result<String, HostError>;
    fn rename_sheet(&mut self, from: &str, to: &str) -> Result<(), HostError>;
    fn delete_sheet(&mut self, name: &str) -> Result<(), HostError>;
    fn activate_sheet(&mut self, name: &str) -> Result<(), HostError>;

    /// Add a chart to the active sheet and return its name.
    fn add_chart(&mut self, chart_type: &str, source: &Address, title: &str)
        -> Result<String, HostError>;
    /// Charts on the active sheet.
    fn charts(&self) -> Result<Vec<ChartInfo>, HostError>;
    fn delete_chart(&mut self, name: &str) -> Result<(), HostError>;

    /// Sort the rows of a range by a zero-based column, case-insensitively.
    fn sort(&mut self, at: &Address, key: usize, ascending: bool) -> Result<(), HostError>;
}
