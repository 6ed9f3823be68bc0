//! Pre-execution validation of a whole batch.

use super::command::{Command, CommandKind};
use super::error::CommandError;
use super::op::Op;

/// Every problem found in a batch. Valid iff there are none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<CommandError>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors rendered as `Command N: message (original)`.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Check every command of a batch, collecting all errors rather than
/// stopping at the first.
///
/// A batch holding exactly one UNDO is valid; UNDO anywhere else is not.
pub fn validate(commands: &[Command]) -> Validation {
    if let [only] = commands {
        if only.kind == CommandKind::Undo {
            return Validation::default();
        }
    }

    let errors = commands
        .iter()
        .enumerate()
        .filter_map(|(idx, cmd)| {
            let message = Op::decode(cmd).err()?;
            let position = idx + 1;
            let error = match cmd.kind {
                CommandKind::Error => CommandError::expansion(position, message, &cmd.original),
                CommandKind::Unknown(_) => CommandError::unknown(position, message, &cmd.original),
                _ => CommandError::validation(position, message, &cmd.original),
            };
            Some(error)
        })
        .collect();
    Validation { errors }
}
