//! Assistant turns — one reply taken from text to an applied batch.
//!
//! A turn parses the reply, validates the commands it carries and, if the
//! whole batch is valid, hands it to the executor. Nothing executes when
//! any command is invalid. A reply holding nothing but UNDO skips
//! validation and goes straight to the undo path.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dsl::{validate, Command, CommandKind, CommandParser, Validation};
use crate::executor::{ExecutionResult, Executor};
use crate::host::DocumentHost;

/// Where a turn ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    /// The reply carried no commands.
    NoCommands,
    /// Validation failed; the messages say why. Nothing ran.
    Rejected { errors: Vec<String> },
    /// Validation passed and nothing was executed yet.
    Ready,
    /// The batch ran.
    Executed(ExecutionResult),
}

/// One assistant reply, split and judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The reply with command lines removed.
    pub prose: String,
    /// Expanded primitive commands in source order.
    pub commands: Vec<Command>,
    #[serde(flatten)]
    pub status: TurnStatus,
}

impl Turn {
    /// Parse and validate a reply without touching any document.
    pub fn preview(reply: &str) -> Self {
        let parsed = CommandParser::parse(reply);
        let status = if parsed.commands.is_empty() {
            TurnStatus::NoCommands
        } else {
            verdict(&validate(&parsed.commands))
        };
        Self {
            prose: parsed.text,
            commands: parsed.commands,
            status,
        }
    }

    /// Whether the commands of this turn may run.
    pub fn is_runnable(&self) -> bool {
        matches!(self.status, TurnStatus::Ready)
    }

    /// Whether this turn is a lone UNDO.
    pub fn is_undo(&self) -> bool {
        matches!(self.commands.as_slice(), [only] if only.kind == CommandKind::Undo)
    }

    /// The execution result, once the turn has run.
    pub fn result(&self) -> Option<&ExecutionResult> {
        match &self.status {
            TurnStatus::Executed(result) => Some(result),
            _ => None,
        }
    }
}

fn verdict(validation: &Validation) -> TurnStatus {
    if validation.is_valid() {
        TurnStatus::Ready
    } else {
        TurnStatus::Rejected {
            errors: validation.messages(),
        }
    }
}

impl Executor {
    /// Run one assistant reply against `host`.
    pub fn run_turn<H: DocumentHost + ?Sized>(&mut self, host: &mut H, reply: &str) -> Turn {
        let mut turn = Turn::preview(reply);
        match &turn.status {
            TurnStatus::Ready => {
                let result = self.execute(host, &turn.commands);
                info!(
                    executed = result.executed,
                    success = result.success,
                    undo = turn.is_undo(),
                    "turn applied"
                );
                turn.status = TurnStatus::Executed(result);
            }
            TurnStatus::Rejected { errors } => {
                warn!(errors = errors.len(), "turn rejected, nothing executed");
            }
            TurnStatus::NoCommands | TurnStatus::Executed(_) => {}
        }
        turn
    }
}
