//! In-memory workbook implementing [`DocumentHost`].
//!
//! Sparse cells per sheet, charts, an active sheet and a selection.
//! Formulas are stored as text and never evaluated. Workbooks round-trip
//! through YAML with cells keyed by A1 address.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::reference::{column_name, Address, Axis, CellRange, CellRef, Lines, Shift};
use super::reference::{MAX_COLUMNS, MAX_ROWS};
use super::{CellSnapshot, ChartInfo, DocumentHost, HostError};

/// Largest range a single value or format write may cover.
const MAX_WRITE_CELLS: u64 = 1 << 16;

/// Contents and format of one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fill: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.formula.is_none() && !self.bold && self.fill.is_empty()
    }

    /// The text a sort compares: the formula when there is no value.
    fn sort_text(&self) -> &str {
        match (&self.formula, self.value.is_empty()) {
            (Some(f), true) => f,
            _ => &self.value,
        }
    }
}

/// A chart on a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub name: String,
    pub chart_type: String,
    pub source: String,
    pub title: String,
}

/// One worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SheetRecord", into = "SheetRecord")]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<CellRef, Cell>,
    pub charts: Vec<Chart>,
}

#[derive(Serialize, Deserialize)]
struct SheetRecord {
    name: String,
    #[serde(default)]
    cells: BTreeMap<String, Cell>,
    #[serde(default)]
    charts: Vec<Chart>,
}

impl TryFrom<SheetRecord> for Sheet {
    type Error = String;

    fn try_from(record: SheetRecord) -> Result<Self, Self::Error> {
        let mut cells = BTreeMap::new();
        for (a1, cell) in record.cells {
            let at = CellRef::parse(&a1)
                .ok_or_else(|| format!("bad cell address {a1} on sheet {}", record.name))?;
            if !cell.is_blank() {
                cells.insert(at, cell);
            }
        }
        Ok(Self {
            name: record.name,
            cells,
            charts: record.charts,
        })
    }
}

impl From<Sheet> for SheetRecord {
    fn from(sheet: Sheet) -> Self {
        Self {
            name: sheet.name,
            cells: sheet
                .cells
                .into_iter()
                .map(|(at, cell)| (at.to_string(), cell))
                .collect(),
            charts: sheet.charts,
        }
    }
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            charts: Vec::new(),
        }
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    /// Number of non-blank cells.
    pub fn used_cells(&self) -> usize {
        self.cells.len()
    }

    fn cells_in(&self, range: CellRange) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells
            .range(CellRef::new(range.top, 0)..=CellRef::new(range.bottom, u32::MAX))
            .filter(move |(at, _)| range.contains(**at))
    }

    fn clear_range(&mut self, range: CellRange) {
        self.cells.retain(|at, _| !range.contains(*at));
    }

    /// Apply `f` to every cell of a bounded range, dropping cells it blanks.
    fn update_range(
        &mut self,
        range: CellRange,
        mut f: impl FnMut(&mut Cell),
    ) -> Result<(), HostError> {
        let size = range.height() as u64 * range.width() as u64;
        if size > MAX_WRITE_CELLS {
            return Err(HostError::Rejected(format!(
                "range of {size} cells is too large to write"
            )));
        }
        for row in range.top..=range.bottom {
            for col in range.left..=range.right {
                let at = CellRef::new(row, col);
                let cell = self.cells.entry(at).or_default();
                f(cell);
                if cell.is_blank() {
                    self.cells.remove(&at);
                }
            }
        }
        Ok(())
    }

    fn remap(&mut self, f: impl Fn(CellRef) -> Option<CellRef>) {
        let cells = std::mem::take(&mut self.cells);
        self.cells = cells
            .into_iter()
            .filter_map(|(at, cell)| f(at).map(|to| (to, cell)))
            .collect();
    }

    /// Shrink whole-row or whole-column ranges to the used area.
    fn clip_to_used(&self, range: CellRange) -> CellRange {
        let bottom = self.cells.keys().map(|c| c.row).max().unwrap_or(range.top);
        let right = self.cells.keys().map(|c| c.col).max().unwrap_or(range.left);
        CellRange {
            bottom: range.bottom.min(bottom.max(range.top)),
            right: range.right.min(right.max(range.left)),
            ..range
        }
    }

    fn next_chart_name(&self) -> String {
        (1..)
            .map(|n| format!("Chart {n}"))
            .find(|name| !self.charts.iter().any(|c| c.name.eq_ignore_ascii_case(name)))
            .unwrap_or_default()
    }
}

/// An in-memory spreadsheet document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    #[serde(default)]
    active: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selection: Option<Address>,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// A workbook with a single empty `Sheet1`.
    pub fn new() -> Self {
        Self::with_sheets(["Sheet1"])
    }

    /// A workbook with the given sheets, the first one active.
    pub fn with_sheets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheets: Vec<Sheet> = names.into_iter().map(Sheet::new).collect();
        if sheets.is_empty() {
            sheets.push(Sheet::new("Sheet1"));
        }
        Self {
            sheets,
            active: 0,
            selection: None,
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index(name).map(|idx| &self.sheets[idx])
    }

    pub fn active(&self) -> &Sheet {
        &self.sheets[self.active_index()]
    }

    pub fn selection(&self) -> Option<&Address> {
        self.selection.as_ref()
    }

    /// Look up a cell by `A1` or `Sheet!A1`.
    pub fn cell(&self, address: &str) -> Option<&Cell> {
        let at = Address::parse(address).ok()?;
        let (idx, range) = self.resolve(&at).ok()?;
        self.sheets[idx].cell(range.top_left())
    }

    /// Value of a cell by `A1` or `Sheet!A1`; empty when blank.
    pub fn value_at(&self, address: &str) -> String {
        self.cell(address).map(|c| c.value.clone()).unwrap_or_default()
    }

    /// Write a constant straight into a cell, bypassing any session.
    pub fn put(&mut self, address: &str, value: &str) -> Result<(), HostError> {
        let at = Address::parse(address).map_err(HostError::InvalidAddress)?;
        self.set_value(&at, value)
    }

    fn active_index(&self) -> usize {
        self.active.min(self.sheets.len().saturating_sub(1))
    }

    fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn require_sheet(&self, name: &str) -> Result<usize, HostError> {
        self.sheet_index(name)
            .ok_or_else(|| HostError::NotFound(format!("sheet {name}")))
    }

    fn resolve(&self, at: &Address) -> Result<(usize, CellRange), HostError> {
        let idx = match &at.sheet {
            Some(name) => self.require_sheet(name)?,
            None => self.active_index(),
        };
        let range = CellRange::parse(&at.reference)
            .ok_or_else(|| HostError::InvalidAddress(at.to_string()))?;
        Ok((idx, range))
    }

    fn read<T>(&self, at: &Address, f: impl FnOnce(Option<&Cell>) -> T) -> Result<T, HostError> {
        let (idx, range) = self.resolve(at)?;
        Ok(f(self.sheets[idx].cell(range.top_left())))
    }

    fn write(&mut self, at: &Address, f: impl FnMut(&mut Cell)) -> Result<(), HostError> {
        let (idx, range) = self.resolve(at)?;
        self.sheets[idx].update_range(range, f)
    }

    fn active_mut(&mut self) -> &mut Sheet {
        let idx = self.active_index();
        &mut self.sheets[idx]
    }
}

fn check_shift(lines: &Lines, shift: Shift, allowed: [Shift; 2]) -> Result<(), HostError> {
    let expected = match lines.axis {
        Axis::Rows => allowed[0],
        Axis::Columns => allowed[1],
    };
    if shift == expected {
        Ok(())
    } else {
        Err(HostError::Rejected(format!(
            "cannot shift {shift:?} when changing {lines}"
        )))
    }
}

/// Blanks last in either direction; numbers before text; text case-insensitive.
fn compare_keys(a: &str, b: &str, ascending: bool) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    let ord = match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.to_lowercase().cmp(&b.to_lowercase()),
    };
    if ascending {
        ord
    } else {
        ord.reverse()
    }
}

impl DocumentHost for Workbook {
    fn value(&self, at: &Address) -> Result<String, HostError> {
        self.read(at, |c| c.map(|c| c.value.clone()).unwrap_or_default())
    }

    fn set_value(&mut self, at: &Address, value: &str) -> Result<(), HostError> {
        self.write(at, |c| {
            c.value = value.to_string();
            c.formula = None;
        })
    }

    fn formula(&self, at: &Address) -> Result<String, HostError> {
        self.read(at, |c| {
            c.map(|c| c.formula.clone().unwrap_or_else(|| c.value.clone()))
                .unwrap_or_default()
        })
    }

    fn set_formula(&mut self, at: &Address, formula: &str) -> Result<(), HostError> {
        self.write(at, |c| {
            if formula.starts_with('=') {
                c.formula = Some(formula.to_string());
                c.value.clear();
            } else {
                c.formula = None;
                c.value = formula.to_string();
            }
        })
    }

    fn bold(&self, at: &Address) -> Result<bool, HostError> {
        self.read(at, |c| c.is_some_and(|c| c.bold))
    }

    fn set_bold(&mut self, at: &Address, bold: bool) -> Result<(), HostError> {
        self.write(at, |c| c.bold = bold)
    }

    fn fill(&self, at: &Address) -> Result<String, HostError> {
        self.read(at, |c| c.map(|c| c.fill.clone()).unwrap_or_default())
    }

    fn set_fill(&mut self, at: &Address, color: &str) -> Result<(), HostError> {
        self.write(at, |c| c.fill = color.to_string())
    }

    fn clear(&mut self, at: &Address) -> Result<(), HostError> {
        let (idx, range) = self.resolve(at)?;
        self.sheets[idx].clear_range(range);
        Ok(())
    }

    fn select(&mut self, at: &Address) -> Result<(), HostError> {
        self.resolve(at)?;
        self.selection = Some(at.clone());
        Ok(())
    }

    fn insert(&mut self, lines: &Lines, shift: Shift) -> Result<(), HostError> {
        check_shift(lines, shift, [Shift::Down, Shift::Right])?;
        let (first, n) = (lines.first, lines.count());
        match lines.axis {
            Axis::Rows => self.active_mut().remap(|at| {
                if at.row < first {
                    Some(at)
                } else {
                    let row = at.row + n;
                    (row <= MAX_ROWS).then_some(CellRef::new(row, at.col))
                }
            }),
            Axis::Columns => self.active_mut().remap(|at| {
                if at.col < first {
                    Some(at)
                } else {
                    let col = at.col + n;
                    (col <= MAX_COLUMNS).then_some(CellRef::new(at.row, col))
                }
            }),
        }
        Ok(())
    }

    fn delete(&mut self, lines: &Lines, shift: Shift) -> Result<(), HostError> {
        check_shift(lines, shift, [Shift::Up, Shift::Left])?;
        let (first, last, n) = (lines.first, lines.last, lines.count());
        match lines.axis {
            Axis::Rows => self.active_mut().remap(|at| match at.row {
                r if r < first => Some(at),
                r if r <= last => None,
                r => Some(CellRef::new(r - n, at.col)),
            }),
            Axis::Columns => self.active_mut().remap(|at| match at.col {
                c if c < first => Some(at),
                c if c <= last => None,
                c => Some(CellRef::new(at.row, c - n)),
            }),
        }
        Ok(())
    }

    fn copy_range(&mut self, source: &Address, target: &Address) -> Result<(), HostError> {
        let (src_idx, src) = self.resolve(source)?;
        let (dst_idx, dst) = self.resolve(target)?;

        let block: Vec<(u32, u32, Cell)> = self.sheets[src_idx]
            .cells_in(src)
            .map(|(at, cell)| (at.row - src.top, at.col - src.left, cell.clone()))
            .collect();

        let footprint = CellRange {
            top: dst.top,
            left: dst.left,
            bottom: (dst.top + src.height() - 1).min(MAX_ROWS),
            right: (dst.left + src.width() - 1).min(MAX_COLUMNS),
        };
        let sheet = &mut self.sheets[dst_idx];
        sheet.clear_range(footprint);
        for (dr, dc, cell) in block {
            let at = CellRef::new(dst.top + dr, dst.left + dc);
            if footprint.contains(at) {
                sheet.cells.insert(at, cell);
            }
        }
        Ok(())
    }

    fn snapshot(&self, at: &Address) -> Result<Vec<CellSnapshot>, HostError> {
        let (idx, range) = self.resolve(at)?;
        Ok(self.sheets[idx]
            .cells_in(range)
            .map(|(cell_at, cell)| CellSnapshot {
                at: at.with_reference(cell_at.to_string()),
                value: cell.value.clone(),
                formula: cell.formula.clone(),
                bold: cell.bold,
                fill: cell.fill.clone(),
            })
            .collect())
    }

    fn add_sheet(&mut self, name: &str) -> Result<(), HostError> {
        if self.sheet_index(name).is_some() {
            return Err(HostError::AlreadyExists(format!("sheet {name}")));
        }
        self.sheets.push(Sheet::new(name));
        Ok(())
    }

    fn sheet_name(&self, name: Option<&str>) -> Result<String, HostError> {
        let idx = match name {
            Some(name) => self.require_sheet(name)?,
            None => self.active_index(),
        };
        Ok(self.sheets[idx].name.clone())
    }

    fn rename_sheet(&mut self, from: &str, to: &str) -> Result<(), HostError> {
        let idx = self.require_sheet(from)?;
        if self.sheet_index(to).is_some_and(|other| other != idx) {
            return Err(HostError::AlreadyExists(format!("sheet {to}")));
        }
        self.sheets[idx].name = to.to_string();
        Ok(())
    }

    fn delete_sheet(&mut self, name: &str) -> Result<(), HostError> {
        let idx = self.require_sheet(name)?;
        if self.sheets.len() == 1 {
            return Err(HostError::Rejected(
                "a workbook must keep at least one sheet".to_string(),
            ));
        }
        let active = self.active_index();
        self.sheets.remove(idx);
        self.active = if idx < active {
            active - 1
        } else {
            active.min(self.sheets.len() - 1)
        };
        Ok(())
    }

    fn activate_sheet(&mut self, name: &str) -> Result<(), HostError> {
        self.active = self.require_sheet(name)?;
        Ok(())
    }

    fn add_chart(
        &mut self,
        chart_type: &str,
        source: &Address,
        title: &str,
    ) -> Result<String, HostError> {
        self.resolve(source)?;
        let sheet = self.active_mut();
        let name = sheet.next_chart_name();
        sheet.charts.push(Chart {
            name: name.clone(),
            chart_type: chart_type.to_string(),
            source: source.to_string(),
            title: title.to_string(),
        });
        Ok(name)
    }

    fn charts(&self) -> Result<Vec<ChartInfo>, HostError> {
        Ok(self
            .active()
            .charts
            .iter()
            .map(|c| ChartInfo {
                name: c.name.clone(),
                title: c.title.clone(),
            })
            .collect())
    }

    fn delete_chart(&mut self, name: &str) -> Result<(), HostError> {
        let sheet = self.active_mut();
        let idx = sheet
            .charts
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| HostError::NotFound(format!("chart {name}")))?;
        sheet.charts.remove(idx);
        Ok(())
    }

    fn sort(&mut self, at: &Address, key: usize, ascending: bool) -> Result<(), HostError> {
        let (idx, range) = self.resolve(at)?;
        let sheet = &mut self.sheets[idx];
        if key as u64 >= range.width() as u64 {
            return Err(HostError::Rejected(format!(
                "sort column {key} is outside {}",
                at.reference
            )));
        }
        let key_col = range.left + key as u32;
        let whole_lines =
            Lines::rows(&at.reference).is_some() || Lines::columns(&at.reference).is_some();
        let range = if whole_lines {
            let used = sheet.clip_to_used(range);
            CellRange {
                right: used.right.max(key_col),
                ..used
            }
        } else {
            range
        };

        let mut rows: Vec<(String, Vec<(u32, Cell)>)> = (range.top..=range.bottom)
            .map(|row| {
                let segment = CellRange {
                    top: row,
                    bottom: row,
                    ..range
                };
                let cells: Vec<(u32, Cell)> = sheet
                    .cells_in(segment)
                    .map(|(at, cell)| (at.col, cell.clone()))
                    .collect();
                let sort_key = sheet
                    .cell(CellRef::new(row, key_col))
                    .map(|c| c.sort_text().to_string())
                    .unwrap_or_default();
                (sort_key, cells)
            })
            .collect();
        rows.sort_by(|a, b| compare_keys(&a.0, &b.0, ascending));

        sheet.clear_range(range);
        for (offset, (_, cells)) in rows.into_iter().enumerate() {
            for (col, cell) in cells {
                sheet.cells.insert(CellRef::new(range.top + offset as u32, col), cell);
            }
        }
        Ok(())
    }
}

/// Load a workbook from YAML. A missing file yields a fresh workbook.
pub fn load_workbook(path: &Path) -> Result<Workbook, io::Error> {
    if !path.exists() {
        return Ok(Workbook::new());
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Save a workbook as YAML, creating parent directories as needed.
pub fn save_workbook(path: &Path, workbook: &Workbook) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(workbook).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}

/// Render the used area of a sheet as tab-separated rows, for display.
pub fn render_sheet(sheet: &Sheet) -> String {
    let Some(bottom) = sheet.cells.keys().map(|c| c.row).max() else {
        return String::new();
    };
    let right = sheet.cells.keys().map(|c| c.col).max().unwrap_or(1);
    let mut out = String::from("\t");
    out.push_str(
        &(1..=right)
            .map(column_name)
            .collect::<Vec<_>>()
            .join("\t"),
    );
    for row in 1..=bottom {
        out.push('\n');
        out.push_str(&row.to_string());
        for col in 1..=right {
            out.push('\t');
            if let Some(cell) = sheet.cell(CellRef::new(row, col)) {
                out.push_str(cell.formula.as_deref().unwrap_or(&cell.value));
            }
        }
    }
    out
}
