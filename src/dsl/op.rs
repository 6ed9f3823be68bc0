//! Typed primitive operations.
//!
//! [`Op::decode`] is the one place argument strings are interpreted;
//! executor handlers match on `Op` and never look at raw args.

use crate::host::{Address, Lines};

use super::command::{ArgShape, Command, CommandKind};

/// Title given to charts created without one.
pub const DEFAULT_CHART_TITLE: &str = "Chart";

/// A primitive operation with decoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    SetValue { at: Address, value: String },
    SetFormula { at: Address, formula: String },
    FormatBold { at: Address, bold: bool },
    FormatColor { at: Address, color: String },
    FormatFill { at: Address, color: String },
    Clear { at: Address },
    Select { at: Address },
    InsertLines(Lines),
    DeleteLines(Lines),
    Copy { source: Address, target: Address },
    Sort { at: Address, key: usize, ascending: bool },
    CreateSheet { name: String },
    DeleteSheet { name: String },
    RenameSheet { from: Option<String>, to: String },
    ActivateSheet { name: String },
    CreateChart { chart_type: String, source: Address, title: String },
    DeleteChart { name: String },
    DeleteAllCharts,
}

impl Op {
    /// Decode a command into a primitive operation.
    ///
    /// Fails for `ERROR` and unknown commands, for unexpanded macros, for
    /// UNDO (which never runs as an ordinary operation), and for argument
    /// lists that do not fit the command's signature.
    pub fn decode(cmd: &Command) -> Result<Op, String> {
        let sig = match &cmd.kind {
            CommandKind::Error => {
                return Err(cmd
                    .arg(0)
                    .unwrap_or("invalid command")
                    .to_string())
            }
            CommandKind::Unknown(name) => return Err(format!("unknown command type {name}")),
            CommandKind::Undo => return Err("UNDO must be sent on its own".to_string()),
            kind if kind.is_macro() => {
                return Err(format!("{kind} must be expanded before it can run"))
            }
            kind => kind
                .signature()
                .ok_or_else(|| format!("unknown command type {kind}"))?,
        };

        if cmd.args.len() < sig.min_args {
            return Err(format!(
                "{} requires at least {} argument{} ({})",
                sig.name,
                sig.min_args,
                if sig.min_args == 1 { "" } else { "s" },
                sig.usage
            ));
        }

        let lines = match sig.shape {
            ArgShape::Free => None,
            ArgShape::RowRange => Some(
                Lines::rows(&cmd.args[0])
                    .ok_or("row range must look like 5:5 or 2:10")?,
            ),
            ArgShape::ColumnRange => Some(
                Lines::columns(&cmd.args[0])
                    .ok_or("column range must look like B:B or A:C")?,
            ),
        };

        let arg = |idx: usize| cmd.args[idx].clone();
        let address = |idx: usize| Address::parse(&cmd.args[idx]);

        let op = match cmd.kind {
            CommandKind::SetValue => Op::SetValue {
                at: address(0)?,
                value: arg(1),
            },
            CommandKind::SetFormula => Op::SetFormula {
                at: address(0)?,
                formula: arg(1),
            },
            CommandKind::FormatBold => Op::FormatBold {
                at: address(0)?,
                bold: cmd.args[1].trim().eq_ignore_ascii_case("true"),
            },
            CommandKind::FormatColor => Op::FormatColor {
                at: address(0)?,
                color: arg(1),
            },
            CommandKind::FormatFill => Op::FormatFill {
                at: address(0)?,
                color: arg(1),
            },
            CommandKind::Clear => Op::Clear { at: address(0)? },
            CommandKind::Select => Op::Select { at: address(0)? },
            CommandKind::InsertRows | CommandKind::InsertColumns => {
                Op::InsertLines(lines.ok_or("missing line range")?)
            }
            CommandKind::DeleteRows | CommandKind::DeleteColumns => {
                Op::DeleteLines(lines.ok_or("missing line range")?)
            }
            CommandKind::Copy => Op::Copy {
                source: address(0)?,
                target: address(1)?,
            },
            CommandKind::Sort => Op::Sort {
                at: address(0)?,
                key: cmd.args[1]
                    .trim()
                    .parse()
                    .map_err(|_| "SORT column must be a zero-based number".to_string())?,
                ascending: !cmd.args[2].trim().eq_ignore_ascii_case("false"),
            },
            CommandKind::CreateSheet => Op::CreateSheet {
                name: sheet_name(&cmd.args[0])?,
            },
            CommandKind::DeleteSheet => Op::DeleteSheet {
                name: sheet_name(&cmd.args[0])?,
            },
            CommandKind::RenameSheet => match cmd.args.as_slice() {
                [to] => Op::RenameSheet {
                    from: None,
                    to: sheet_name(to)?,
                },
                [from, to, ..] => Op::RenameSheet {
                    from: Some(sheet_name(from)?),
                    to: sheet_name(to)?,
                },
                [] => return Err("RENAME_SHEET requires a new name".to_string()),
            },
            CommandKind::ActivateSheet => Op::ActivateSheet {
                name: sheet_name(&cmd.args[0])?,
            },
            CommandKind::CreateChart => Op::CreateChart {
                chart_type: arg(0),
                source: address(1)?,
                title: cmd
                    .arg(2)
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(DEFAULT_CHART_TITLE)
                    .to_string(),
            },
            CommandKind::DeleteChart => Op::DeleteChart { name: arg(0) },
            CommandKind::DeleteAllCharts => Op::DeleteAllCharts,
            ref other => return Err(format!("{other} cannot be executed")),
        };
        Ok(op)
    }
}

fn sheet_name(raw: &str) -> Result<String, String> {
    let name = raw.trim().trim_matches('\'');
    if name.is_empty() {
        Err("sheet name must not be empty".to_string())
    } else {
        Ok(name.to_string())
    }
}
