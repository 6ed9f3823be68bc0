//! Command language — assistant reply → commands → validated batch.
//!
//! Replies carry one command per line (`TYPE|arg|arg`). Parsing pulls
//! them out of the surrounding prose and expands row macros in place;
//! validation then checks the whole batch before anything runs.

pub mod command;
pub mod error;
pub mod expand;
pub mod op;
pub mod parser;
pub mod validate;

pub use command::{ArgShape, Command, CommandKind, Family, Signature, VOCABULARY};
pub use error::{CommandError, ErrorKind};
pub use expand::expand;
pub use op::{Op, DEFAULT_CHART_TITLE};
pub use parser::ParseResult;
pub use validate::{validate, Validation};

use parser::LineParser;

/// The command parser.
pub struct CommandParser;

impl CommandParser {
    /// Split a reply into prose and expanded commands.
    pub fn parse(source: &str) -> ParseResult {
        LineParser::new(source).parse()
    }

    /// Parse a reply and validate the commands it contains.
    pub fn check(source: &str) -> (ParseResult, Validation) {
        let parsed = Self::parse(source);
        let validation = validate(&parsed.commands);
        (parsed, validation)
    }
}
