//! Commands and the vocabulary they are drawn from.
//!
//! The vocabulary is a table of [`Signature`]s: name, minimum argument
//! count and the shape of the first argument. Parsing, validation and
//! preview all consult the table, so a new operation is a table row plus
//! an [`Op`](super::op::Op) variant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single command as read from assistant text or produced by expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub args: Vec<String>,
    /// Verbatim source line, or a descriptive label for synthesized commands.
    pub original: String,
}

impl Command {
    pub fn new(kind: CommandKind, args: Vec<String>, original: impl Into<String>) -> Self {
        Self {
            kind,
            args,
            original: original.into(),
        }
    }

    /// Build a command whose `original` is its own wire form (`TYPE|a|b`).
    pub fn synthesize(kind: CommandKind, args: Vec<String>) -> Self {
        let original = render_wire(&kind, &args);
        Self {
            kind,
            args,
            original,
        }
    }

    /// An expansion failure carried through to validation.
    pub fn error(message: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            kind: CommandKind::Error,
            args: vec![message.into()],
            original: original.into(),
        }
    }

    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }

    /// The `TYPE|a|b` rendering of this command.
    pub fn wire(&self) -> String {
        render_wire(&self.kind, &self.args)
    }
}

fn render_wire(kind: &CommandKind, args: &[String]) -> String {
    let mut out = kind.name().to_string();
    for arg in args {
        out.push('|');
        out.push_str(arg);
    }
    out
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// The kind of a command. Closed over the vocabulary, plus `Error` for
/// failed macro expansion and `Unknown` for well-formed lines naming no
/// known operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandKind {
    SetValue,
    SetFormula,
    FormatBold,
    FormatColor,
    FormatFill,
    Clear,
    Select,
    DeleteRows,
    InsertRows,
    DeleteColumns,
    InsertColumns,
    Copy,
    CopyRow,
    MoveRow,
    SwapRows,
    Sort,
    CreateSheet,
    DeleteSheet,
    RenameSheet,
    ActivateSheet,
    CreateChart,
    DeleteChart,
    DeleteAllCharts,
    Undo,
    Error,
    Unknown(String),
}

impl CommandKind {
    /// Resolve a type name, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "SET_VALUE" => Self::SetValue,
            "SET_FORMULA" => Self::SetFormula,
            "FORMAT_BOLD" => Self::FormatBold,
            "FORMAT_COLOR" => Self::FormatColor,
            "FORMAT_FILL" => Self::FormatFill,
            "CLEAR" => Self::Clear,
            "SELECT" => Self::Select,
            "DELETE_ROWS" => Self::DeleteRows,
            "INSERT_ROWS" => Self::InsertRows,
            "DELETE_COLUMNS" => Self::DeleteColumns,
            "INSERT_COLUMNS" => Self::InsertColumns,
            "COPY" => Self::Copy,
            "COPY_ROW" => Self::CopyRow,
            "MOVE_ROW" => Self::MoveRow,
            "SWAP_ROWS" => Self::SwapRows,
            "SORT" => Self::Sort,
            "CREATE_SHEET" => Self::CreateSheet,
            "DELETE_SHEET" => Self::DeleteSheet,
            "RENAME_SHEET" => Self::RenameSheet,
            "ACTIVATE_SHEET" => Self::ActivateSheet,
            "CREATE_CHART" => Self::CreateChart,
            "DELETE_CHART" => Self::DeleteChart,
            "DELETE_ALL_CHARTS" => Self::DeleteAllCharts,
            "UNDO" => Self::Undo,
            "ERROR" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Canonical upper-case name.
    pub fn name(&self) -> &str {
        match self {
            Self::SetValue => "SET_VALUE",
            Self::SetFormula => "SET_FORMULA",
            Self::FormatBold => "FORMAT_BOLD",
            Self::FormatColor => "FORMAT_COLOR",
            Self::FormatFill => "FORMAT_FILL",
            Self::Clear => "CLEAR",
            Self::Select => "SELECT",
            Self::DeleteRows => "DELETE_ROWS",
            Self::InsertRows => "INSERT_ROWS",
            Self::DeleteColumns => "DELETE_COLUMNS",
            Self::InsertColumns => "INSERT_COLUMNS",
            Self::Copy => "COPY",
            Self::CopyRow => "COPY_ROW",
            Self::MoveRow => "MOVE_ROW",
            Self::SwapRows => "SWAP_ROWS",
            Self::Sort => "SORT",
            Self::CreateSheet => "CREATE_SHEET",
            Self::DeleteSheet => "DELETE_SHEET",
            Self::RenameSheet => "RENAME_SHEET",
            Self::ActivateSheet => "ACTIVATE_SHEET",
            Self::CreateChart => "CREATE_CHART",
            Self::DeleteChart => "DELETE_CHART",
            Self::DeleteAllCharts => "DELETE_ALL_CHARTS",
            Self::Undo => "UNDO",
            Self::Error => "ERROR",
            Self::Unknown(name) => name,
        }
    }

    /// The vocabulary entry for this kind. `None` for `Error` and `Unknown`.
    pub fn signature(&self) -> Option<&'static Signature> {
        let name = self.name();
        VOCABULARY.iter().find(|s| s.name == name)
    }

    /// Whether this kind expands into primitive commands before validation.
    pub fn is_macro(&self) -> bool {
        self.signature()
            .is_some_and(|s| s.family == Family::RowMacro)
    }
}

impl From<String> for CommandKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<CommandKind> for String {
    fn from(kind: CommandKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Required shape of a command's first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// Any text; interpreted by the operation.
    Free,
    /// Whole-row notation `digits:digits`.
    RowRange,
    /// Whole-column notation `Letters:Letters`.
    ColumnRange,
}

/// Coarse grouping of the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    CellWrite,
    Format,
    Range,
    Structure,
    Sheet,
    Chart,
    RowMacro,
    Control,
}

/// One vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub name: &'static str,
    pub family: Family,
    pub min_args: usize,
    pub shape: ArgShape,
    /// Recognized as a whole line with no `|` and no arguments.
    pub bare: bool,
    pub usage: &'static str,
}

const fn sig(
    name: &'static str,
    family: Family,
    min_args: usize,
    shape: ArgShape,
    usage: &'static str,
) -> Signature {
    Signature {
        name,
        family,
        min_args,
        shape,
        bare: false,
        usage,
    }
}

const fn bare(name: &'static str, family: Family) -> Signature {
    Signature {
        name,
        family,
        min_args: 0,
        shape: ArgShape::Free,
        bare: true,
        usage: name,
    }
}

/// The full command vocabulary.
pub const VOCABULARY: &[Signature] = &[
    sig("SET_VALUE", Family::CellWrite, 2, ArgShape::Free, "SET_VALUE|address|value"),
    sig("SET_FORMULA", Family::CellWrite, 2, ArgShape::Free, "SET_FORMULA|address|formula"),
    sig("FORMAT_BOLD", Family::Format, 2, ArgShape::Free, "FORMAT_BOLD|address|true/false"),
    sig("FORMAT_COLOR", Family::Format, 2, ArgShape::Free, "FORMAT_COLOR|address|color"),
    sig("FORMAT_FILL", Family::Format, 2, ArgShape::Free, "FORMAT_FILL|address|color"),
    sig("CLEAR", Family::Range, 1, ArgShape::Free, "CLEAR|address"),
    sig("SELECT", Family::Range, 1, ArgShape::Free, "SELECT|address"),
    sig("COPY", Family::Range, 2, ArgShape::Free, "COPY|source|target"),
    sig("SORT", Family::Range, 3, ArgShape::Free, "SORT|range|column|ascending"),
    sig("DELETE_ROWS", Family::Structure, 1, ArgShape::RowRange, "DELETE_ROWS|5:5"),
    sig("INSERT_ROWS", Family::Structure, 1, ArgShape::RowRange, "INSERT_ROWS|5:5"),
    sig("DELETE_COLUMNS", Family::Structure, 1, ArgShape::ColumnRange, "DELETE_COLUMNS|B:B"),
    sig("INSERT_COLUMNS", Family::Structure, 1, ArgShape::ColumnRange, "INSERT_COLUMNS|B:B"),
    sig("COPY_ROW", Family::RowMacro, 2, ArgShape::Free, "COPY_ROW|source|target"),
    sig("MOVE_ROW", Family::RowMacro, 2, ArgShape::Free, "MOVE_ROW|source|target|after/before"),
    sig("SWAP_ROWS", Family::RowMacro, 2, ArgShape::Free, "SWAP_ROWS|row|row"),
    sig("CREATE_SHEET", Family::Sheet, 1, ArgShape::Free, "CREATE_SHEET|name"),
    sig("DELETE_SHEET", Family::Sheet, 1, ArgShape::Free, "DELETE_SHEET|name"),
    sig("RENAME_SHEET", Family::Sheet, 1, ArgShape::Free, "RENAME_SHEET|[old|]new"),
    sig("ACTIVATE_SHEET", Family::Sheet, 1, ArgShape::Free, "ACTIVATE_SHEET|name"),
    sig("CREATE_CHART", Family::Chart, 2, ArgShape::Free, "CREATE_CHART|type|range|title"),
    sig("DELETE_CHART", Family::Chart, 1, ArgShape::Free, "DELETE_CHART|title"),
    bare("DELETE_ALL_CHARTS", Family::Chart),
    bare("UNDO", Family::Control),
];

/// Look up a bare (argument-less) command by its whole-line text.
pub fn bare_command(line: &str) -> Option<&'static Signature> {
    let upper = line.to_ascii_uppercase();
    VOCABULARY.iter().find(|s| s.bare && s.name == upper)
}
