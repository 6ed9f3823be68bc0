//! Per-operation handlers and the inverse each one records.

use tracing::debug;

use crate::dsl::{Command, CommandKind, Op};
use crate::host::{Address, Axis, CellSnapshot, ChartInfo, DocumentHost, HostError};

/// What applying one operation did.
#[derive(Debug, Default)]
pub(super) struct Applied {
    /// Whether the operation counts as executed.
    pub executed: bool,
    /// Commands undoing this operation, in replay order.
    pub inverse: Vec<Command>,
}

impl Applied {
    fn done() -> Self {
        Self {
            executed: true,
            inverse: Vec::new(),
        }
    }

    fn undone_by(inverse: Vec<Command>) -> Self {
        Self {
            executed: true,
            inverse,
        }
    }
}

/// Why an operation did not apply.
#[derive(Debug)]
pub(super) enum StepError {
    Host(HostError),
    /// A failure already phrased for the user.
    Report(String),
}

impl From<HostError> for StepError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

fn inverse(kind: CommandKind, args: Vec<String>) -> Command {
    Command::synthesize(kind, args)
}

/// Apply one operation. Reads needed for the inverse happen before the write.
pub(super) fn apply<H: DocumentHost + ?Sized>(
    host: &mut H,
    op: &Op,
    copy_snapshot_limit: Option<usize>,
) -> Result<Applied, StepError> {
    let applied = match op {
        Op::SetValue { at, value } => {
            let restore = previous_contents(host, at)?;
            host.set_value(at, value)?;
            Applied::undone_by(vec![restore])
        }
        Op::SetFormula { at, formula } => {
            let old = host.formula(at)?;
            host.set_formula(at, formula)?;
            Applied::undone_by(vec![inverse(
                CommandKind::SetFormula,
                vec![at.to_string(), old],
            )])
        }
        Op::FormatBold { at, bold } => {
            let old = host.bold(at)?;
            host.set_bold(at, *bold)?;
            Applied::undone_by(vec![inverse(
                CommandKind::FormatBold,
                vec![at.to_string(), old.to_string()],
            )])
        }
        Op::FormatColor { at, color } => {
            let old = host.fill(at)?;
            host.set_fill(at, color)?;
            Applied::undone_by(vec![inverse(
                CommandKind::FormatColor,
                vec![at.to_string(), old],
            )])
        }
        Op::FormatFill { at, color } => {
            let old = host.fill(at)?;
            host.set_fill(at, color)?;
            Applied::undone_by(vec![inverse(
                CommandKind::FormatFill,
                vec![at.to_string(), old],
            )])
        }
        Op::Clear { at } => {
            host.clear(at)?;
            Applied::done()
        }
        Op::Select { at } => {
            host.select(at)?;
            Applied::done()
        }
        Op::InsertLines(lines) => {
            host.insert(lines, lines.insert_shift())?;
            let kind = match lines.axis {
                Axis::Rows => CommandKind::DeleteRows,
                Axis::Columns => CommandKind::DeleteColumns,
            };
            Applied::undone_by(vec![inverse(kind, vec![lines.to_string()])])
        }
        Op::DeleteLines(lines) => {
            host.delete(lines, lines.delete_shift())?;
            Applied::done()
        }
        Op::Copy { source, target } => {
            let restore = match copy_snapshot_limit {
                Some(limit) => snapshot_restore(host, target, limit)?,
                None => Vec::new(),
            };
            host.copy_range(source, target)?;
            Applied::undone_by(restore)
        }
        Op::Sort { at, key, ascending } => {
            host.sort(at, *key, *ascending)?;
            Applied::done()
        }
        Op::CreateSheet { name } => match host.add_sheet(name) {
            Ok(()) => Applied::undone_by(vec![inverse(CommandKind::DeleteSheet, vec![name.clone()])]),
            Err(HostError::AlreadyExists(_)) => {
                debug!(sheet = %name, "sheet already exists");
                Applied::done()
            }
            Err(e) => return Err(e.into()),
        },
        Op::DeleteSheet { name } => {
            host.delete_sheet(name)?;
            Applied::done()
        }
        Op::RenameSheet { from, to } => {
            let old = host.sheet_name(from.as_deref())?;
            host.rename_sheet(&old, to)?;
            Applied::undone_by(vec![inverse(CommandKind::RenameSheet, vec![to.clone(), old])])
        }
        Op::ActivateSheet { name } => {
            host.activate_sheet(name)?;
            Applied::done()
        }
        Op::CreateChart {
            chart_type,
            source,
            title,
        } => {
            let name = host.add_chart(chart_type, source, title)?;
            Applied::undone_by(vec![inverse(CommandKind::DeleteChart, vec![name])])
        }
        Op::DeleteChart { name } => {
            let charts = host.charts()?;
            let found = find_chart(&charts, name)
                .ok_or_else(|| StepError::Report(format!("Chart not found: {name}")))?;
            let found = found.name.clone();
            host.delete_chart(&found)?;
            Applied::done()
        }
        Op::DeleteAllCharts => {
            for chart in host.charts()?.iter().rev() {
                host.delete_chart(&chart.name)?;
            }
            Applied::done()
        }
    };
    Ok(applied)
}

/// The command putting a cell's contents back: its formula if it has
/// one, else its constant value.
fn previous_contents<H: DocumentHost + ?Sized>(
    host: &H,
    at: &Address,
) -> Result<Command, HostError> {
    let value = host.value(at)?;
    let formula = host.formula(at)?;
    let restore = if formula != value {
        inverse(CommandKind::SetFormula, vec![at.to_string(), formula])
    } else {
        inverse(CommandKind::SetValue, vec![at.to_string(), value])
    };
    Ok(restore)
}

/// Exact name or title first, then a title containing the term; all case-insensitive.
pub(super) fn find_chart<'a>(charts: &'a [ChartInfo], term: &str) -> Option<&'a ChartInfo> {
    let term = term.trim().to_lowercase();
    charts
        .iter()
        .find(|c| c.name.to_lowercase() == term || c.title.to_lowercase() == term)
        .or_else(|| {
            charts
                .iter()
                .find(|c| !c.title.is_empty() && c.title.to_lowercase().contains(&term))
        })
}

/// Commands putting a copy target back the way it was, if it is small enough.
fn snapshot_restore<H: DocumentHost + ?Sized>(
    host: &H,
    target: &Address,
    limit: usize,
) -> Result<Vec<Command>, HostError> {
    let cells = host.snapshot(target)?;
    if cells.len() > limit {
        debug!(target = %target, cells = cells.len(), limit, "copy target too large to snapshot");
        return Ok(Vec::new());
    }
    let mut restore = vec![inverse(CommandKind::Clear, vec![target.to_string()])];
    restore.extend(cells.iter().flat_map(restore_cell));
    Ok(restore)
}

fn restore_cell(cell: &CellSnapshot) -> Vec<Command> {
    let at = cell.at.to_string();
    let mut out = Vec::new();
    match &cell.formula {
        Some(formula) => out.push(inverse(
            CommandKind::SetFormula,
            vec![at.clone(), formula.clone()],
        )),
        None if !cell.value.is_empty() => out.push(inverse(
            CommandKind::SetValue,
            vec![at.clone(), cell.value.clone()],
        )),
        None => {}
    }
    if cell.bold {
        out.push(inverse(CommandKind::FormatBold, vec![at.clone(), "true".into()]));
    }
    if !cell.fill.is_empty() {
        out.push(inverse(CommandKind::FormatFill, vec![at, cell.fill.clone()]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(name: &str, title: &str) -> ChartInfo {
        ChartInfo {
            name: name.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn chart_lookup_prefers_exact_match() {
        let charts = vec![chart("Chart 1", "Sales by Region"), chart("Chart 2", "Sales")];
        assert_eq!(find_chart(&charts, "sales").unwrap().name, "Chart 2");
        assert_eq!(find_chart(&charts, "CHART 1").unwrap().name, "Chart 1");
    }

    #[test]
    fn chart_lookup_falls_back_to_title_substring() {
        let charts = vec![chart("Chart 1", "Quarterly Revenue")];
        assert_eq!(find_chart(&charts, "revenue").unwrap().name, "Chart 1");
        assert!(find_chart(&charts, "costs").is_none());
    }

    #[test]
    fn restore_cell_covers_contents_and_format() {
        let cell = CellSnapshot {
            at: Address::local("B2"),
            value: String::new(),
            formula: Some("=A1*2".to_string()),
            bold: true,
            fill: "yellow".to_string(),
        };
        let wires: Vec<_> = restore_cell(&cell).iter().map(Command::wire).collect();
        assert_eq!(
            wires,
            vec!["SET_FORMULA|B2|=A1*2", "FORMAT_BOLD|B2|true", "FORMAT_FILL|B2|yellow"]
        );
    }
}
