//! Address notation for sheet-qualified ranges, A1 cells, whole rows and whole columns.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Last addressable row (1-based).
pub const MAX_ROWS: u32 = 1_048_576;
/// Last addressable column (1-based, `XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

static ROW_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d+)$").unwrap());
static COLUMN_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{1,3}):([A-Za-z]{1,3})$").unwrap());
static CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?(\d+)$").unwrap());

/// A range reference, optionally qualified with a sheet name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub sheet: Option<String>,
    /// The range part, in whatever notation the host understands.
    pub reference: String,
}

impl Address {
    /// A reference on the active sheet.
    pub fn local(reference: impl Into<String>) -> Self {
        Self {
            sheet: None,
            reference: reference.into(),
        }
    }

    /// Parse `Sheet!A1:B2`, `'My Sheet'!A1` or bare `A1:B2`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        let (sheet, reference) = match text.split_once('!') {
            Some((sheet, reference)) => {
                let sheet = sheet.replace('\'', "");
                let sheet = sheet.trim();
                if sheet.is_empty() {
                    return Err(format!("missing sheet name in {text}"));
                }
                (Some(sheet.to_string()), reference.trim())
            }
            None => (None, text),
        };
        if reference.is_empty() {
            return Err("missing address".to_string());
        }
        Ok(Self {
            sheet,
            reference: reference.to_string(),
        })
    }

    /// Same sheet, different range.
    pub fn with_reference(&self, reference: impl Into<String>) -> Self {
        Self {
            sheet: self.sheet.clone(),
            reference: reference.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                write!(f, "{sheet}!{}", self.reference)
            }
            Some(sheet) => write!(f, "'{sheet}'!{}", self.reference),
            None => f.write_str(&self.reference),
        }
    }
}

/// Which way whole lines run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Rows,
    Columns,
}

/// Direction existing cells move when lines are inserted or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    Down,
    Up,
    Right,
    Left,
}

/// A block of whole rows or whole columns, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lines {
    pub axis: Axis,
    pub first: u32,
    pub last: u32,
}

impl Lines {
    /// Parse `5:5` or `2:10`.
    pub fn rows(text: &str) -> Option<Self> {
        let caps = ROW_SPAN.captures(text.trim())?;
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        Self::new(Axis::Rows, a, b, MAX_ROWS)
    }

    /// Parse `B:B` or `A:C`.
    pub fn columns(text: &str) -> Option<Self> {
        let caps = COLUMN_SPAN.captures(text.trim())?;
        let a = column_index(&caps[1])?;
        let b = column_index(&caps[2])?;
        Self::new(Axis::Columns, a, b, MAX_COLUMNS)
    }

    fn new(axis: Axis, a: u32, b: u32, max: u32) -> Option<Self> {
        let (first, last) = (a.min(b), a.max(b));
        (first >= 1 && last <= max).then_some(Self { axis, first, last })
    }

    pub fn count(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn insert_shift(&self) -> Shift {
        match self.axis {
            Axis::Rows => Shift::Down,
            Axis::Columns => Shift::Right,
        }
    }

    pub fn delete_shift(&self) -> Shift {
        match self.axis {
            Axis::Rows => Shift::Up,
            Axis::Columns => Shift::Left,
        }
    }
}

impl fmt::Display for Lines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Axis::Rows => write!(f, "{}:{}", self.first, self.last),
            Axis::Columns => write!(
                f,
                "{}:{}",
                column_name(self.first),
                column_name(self.last)
            ),
        }
    }
}

/// `A` → 1, `Z` → 26, `AA` → 27.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut idx: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A' + 1) as u32;
        idx = idx.checked_mul(26)?.checked_add(digit)?;
    }
    (idx <= MAX_COLUMNS).then_some(idx)
}

/// 1 → `A`, 27 → `AA`.
pub fn column_name(mut idx: u32) -> String {
    let mut out = Vec::new();
    while idx > 0 {
        let rem = (idx - 1) % 26;
        out.push(b'A' + rem as u8);
        idx = (idx - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A single cell position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse `B12` or `$B$12`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = CELL.captures(text.trim())?;
        let col = column_index(&caps[1])?;
        let row: u32 = caps[2].parse().ok()?;
        (1..=MAX_ROWS).contains(&row).then_some(Self { row, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

/// A rectangular block of cells, inclusive on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl CellRange {
    /// Parse a cell (`A1`), a block (`A1:C3`), whole rows (`5:7`) or
    /// whole columns (`B:D`).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(lines) = Lines::rows(text) {
            return Some(Self {
                top: lines.first,
                left: 1,
                bottom: lines.last,
                right: MAX_COLUMNS,
            });
        }
        if let Some(lines) = Lines::columns(text) {
            return Some(Self {
                top: 1,
                left: lines.first,
                bottom: MAX_ROWS,
                right: lines.last,
            });
        }
        let (a, b) = match text.split_once(':') {
            Some((a, b)) => (CellRef::parse(a)?, CellRef::parse(b)?),
            None => {
                let cell = CellRef::parse(text)?;
                (cell, cell)
            }
        };
        Some(Self {
            top: a.row.min(b.row),
            left: a.col.min(b.col),
            bottom: a.row.max(b.row),
            right: a.col.max(b.col),
        })
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.top, self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.top..=self.bottom).contains(&cell.row) && (self.left..=self.right).contains(&cell.col)
    }
}
