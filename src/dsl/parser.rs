//! Line parser for assistant replies.
//!
//! Splits free-form text into the prose a user should read and the
//! commands embedded in it, one per line:
//!
//! ```text
//! TYPE|arg1|arg2|...
//! UNDO
//! DELETE_ALL_CHARTS
//! ```
//!
//! Lines that only resemble a command stay in the prose. Nothing here
//! is an error; broken macros surface later as `ERROR` commands.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::command::{bare_command, Command, CommandKind};
use super::expand::expand;

/// Fenced code blocks; the interior is kept, the fences and language tag dropped.
static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```\w*\n?(.*?)```").unwrap());

static PIPE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\|\s*").unwrap());

static COMMAND_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\|(.*)$").unwrap());

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// The outcome of parsing one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Prose with every command line removed and blank runs collapsed.
    pub text: String,
    /// Commands in source order, macros already expanded.
    pub commands: Vec<Command>,
}

pub struct LineParser<'a> {
    source: &'a str,
}

impl<'a> LineParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn parse(&self) -> ParseResult {
        let unfenced = FENCE.replace_all(self.source, "$1");
        let mut commands = Vec::new();
        let mut prose = Vec::new();

        for line in unfenced.split('\n') {
            match self.parse_line(line) {
                Some(mut parsed) => commands.append(&mut parsed),
                None => prose.push(line),
            }
        }

        let text = BLANK_RUN.replace_all(&prose.join("\n"), "\n").trim().to_string();
        debug!(commands = commands.len(), "parsed assistant reply");
        ParseResult { text, commands }
    }

    /// Recognize one line. `None` means the line is prose.
    fn parse_line(&self, line: &str) -> Option<Vec<Command>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(sig) = bare_command(trimmed) {
            trace!(command = sig.name, "bare command");
            return Some(vec![Command::new(
                CommandKind::from_name(sig.name),
                Vec::new(),
                trimmed,
            )]);
        }

        let normalized = PIPE_SPACING.replace_all(trimmed, "|");
        let caps = COMMAND_LINE.captures(&normalized)?;
        let kind = CommandKind::from_name(&caps[1]);
        let args = caps[2].split('|').map(|a| a.trim().to_string()).collect();
        trace!(command = %kind, "piped command");
        Some(expand(kind, args, trimmed))
    }
}
