//! Executor — applies a validated batch to a document host.
//!
//! Each batch runs inside one host session. Commands run strictly in
//! order; a command the host rejects is recorded and the batch moves on,
//! while a session failure stops it. Every applied command that has an
//! inverse contributes it to the front of the batch's inverse list, and
//! the finished list goes onto the undo history.

mod handlers;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dsl::{Command, CommandKind, Op};
use crate::history::UndoHistory;
use crate::host::DocumentHost;

use handlers::StepError;

/// Outcome of executing one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True iff `errors` is empty.
    pub success: bool,
    /// Commands that took effect, including those of a batch that later failed.
    pub executed: usize,
    pub errors: Vec<String>,
}

impl ExecutionResult {
    fn new(executed: usize, errors: Vec<String>) -> Self {
        Self {
            success: errors.is_empty(),
            executed,
            errors,
        }
    }
}

/// Whether a run records inverses for the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Record,
    Skip,
}

/// Runs command batches and owns the undo history they produce.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    history: UndoHistory,
    copy_snapshot_limit: Option<usize>,
}

impl Executor {
    /// An executor with an empty default-depth history and no COPY snapshots.
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor configured from `config`, with an empty history.
    pub fn from_config(config: &Config) -> Self {
        Self {
            history: UndoHistory::with_depth(config.undo_depth),
            copy_snapshot_limit: config.copy_snapshot_limit,
        }
    }

    /// Replace the undo history, e.g. with one loaded from disk.
    pub fn with_history(mut self, history: UndoHistory) -> Self {
        self.history = history;
        self
    }

    /// Snapshot COPY targets of at most `limit` used cells so COPY can be undone.
    pub fn with_copy_snapshot_limit(mut self, limit: Option<usize>) -> Self {
        self.copy_snapshot_limit = limit;
        self
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    /// Execute a batch.
    ///
    /// A batch consisting of a single UNDO replays the newest inverse batch
    /// instead. Any other batch is expected to have passed validation.
    pub fn execute<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        commands: &[Command],
    ) -> ExecutionResult {
        if let [only] = commands {
            if only.kind == CommandKind::Undo {
                return self.undo(host);
            }
        }
        let (result, inverse) = self.run_batch(host, commands, Capture::Record);
        if let Some(inverse) = inverse {
            self.history.push(inverse);
        }
        result
    }

    /// Replay the most recent inverse batch.
    ///
    /// The replay records no inverse of its own, so repeated undos walk
    /// further back through history.
    pub fn undo<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> ExecutionResult {
        let Some(batch) = self.history.pop() else {
            return ExecutionResult::new(0, vec!["Nothing to undo".to_string()]);
        };
        info!(commands = batch.len(), remaining = self.history.len(), "undo");
        let (result, _) = self.run_batch(host, &batch, Capture::Skip);
        result
    }

    /// Run every command of a batch. Returns the inverse batch when the
    /// session committed and at least one inverse was captured.
    fn run_batch<H: DocumentHost + ?Sized>(
        &self,
        host: &mut H,
        commands: &[Command],
        capture: Capture,
    ) -> (ExecutionResult, Option<Vec<Command>>) {
        if commands.is_empty() {
            return (ExecutionResult::new(0, Vec::new()), None);
        }

        let mut executed = 0;
        let mut errors = Vec::new();
        let mut inverse: Vec<Command> = Vec::new();

        if let Err(e) = host.begin() {
            errors.push(session_error(&e));
            return (ExecutionResult::new(0, errors), None);
        }

        for cmd in commands {
            debug!(command = %cmd.wire(), "executing");
            let op = match Op::decode(cmd) {
                Ok(op) => op,
                Err(message) => {
                    warn!(command = %cmd.wire(), %message, "undecodable command");
                    errors.push(format!("Error executing {}: {message}", cmd.kind));
                    continue;
                }
            };

            match handlers::apply(host, &op, self.copy_snapshot_limit) {
                Ok(applied) => {
                    if applied.executed {
                        executed += 1;
                    }
                    if capture == Capture::Record && !applied.inverse.is_empty() {
                        inverse.splice(0..0, applied.inverse);
                    }
                }
                Err(StepError::Host(e)) if e.is_session() => {
                    warn!(command = %cmd.wire(), error = %e, "session failed, aborting batch");
                    errors.push(session_error(&e));
                    return (ExecutionResult::new(executed, errors), None);
                }
                Err(StepError::Host(e)) => {
                    warn!(command = %cmd.wire(), error = %e, "command failed");
                    errors.push(format!("Error executing {}: {e}", cmd.kind));
                }
                Err(StepError::Report(message)) => {
                    warn!(command = %cmd.wire(), %message, "command failed");
                    errors.push(message);
                }
            }
        }

        if let Err(e) = host.commit() {
            warn!(error = %e, "commit failed");
            errors.push(session_error(&e));
            return (ExecutionResult::new(executed, errors), None);
        }

        info!(executed, errors = errors.len(), inverse = inverse.len(), "batch finished");
        let inverse = (!inverse.is_empty()).then_some(inverse);
        (ExecutionResult::new(executed, errors), inverse)
    }
}

fn session_error(e: &crate::host::HostError) -> String {
    format!("Session error: {e}")
}
