//! gridpilot: turns assistant replies into undoable spreadsheet edits.
//!
//! Replies are parsed into line commands, row macros are expanded into
//! index-safe primitives, the batch is validated as a whole, and the
//! executor applies it to a [`host::DocumentHost`] while recording the
//! inverse of every change on a bounded undo history.

pub mod config;
pub mod dsl;
pub mod executor;
pub mod history;
pub mod host;
pub mod turn;
