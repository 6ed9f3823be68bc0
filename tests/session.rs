//! Integration tests for sessions that fail mid-batch.

use gridpilot::dsl::CommandParser;
use gridpilot::executor::Executor;
use gridpilot::host::{
    Address, CellSnapshot, ChartInfo, DocumentHost, HostError, Lines, Shift, Workbook,
};

/// A workbook whose session breaks on demand.
struct FlakyHost {
    book: Workbook,
    fail_begin: bool,
    fail_commit: bool,
    /// Writing this value drops the session.
    poison: Option<&'static str>,
    commits: usize,
}

impl FlakyHost {
    fn new() -> Self {
        Self {
            book: Workbook::new(),
            fail_begin: false,
            fail_commit: false,
            poison: None,
            commits: 0,
        }
    }
}

impl DocumentHost for FlakyHost {
    fn begin(&mut self) -> Result<(), HostError> {
        if self.fail_begin {
            return Err(HostError::Session("document is read-only".into()));
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), HostError> {
        if self.fail_commit {
            return Err(HostError::Session("sync failed".into()));
        }
        self.commits += 1;
        Ok(())
    }

    fn value(&self, at: &Address) -> Result<String, HostError> {
        self.book.value(at)
    }

    fn set_value(&mut self, at: &Address, value: &str) -> Result<(), HostError> {
        if self.poison == Some(value) {
            return Err(HostError::Session("connection lost".into()));
        }
        self.book.set_value(at, value)
    }

    fn formula(&self, at: &Address) -> Result<String, HostError> {
        self.book.formula(at)
    }

    fn set_formula(&mut self, at: &Address, formula: &str) -> Result<(), HostError> {
        self.book.set_formula(at, formula)
    }

    fn bold(&self, at: &Address) -> Result<bool, HostError> {
        self.book.bold(at)
    }

    fn set_bold(&mut self, at: &Address, bold: bool) -> Result<(), HostError> {
        self.book.set_bold(at, bold)
    }

    fn fill(&self, at: &Address) -> Result<String, HostError> {
        self.book.fill(at)
    }

    fn set_fill(&mut self, at: &Address, color: &str) -> Result<(), HostError> {
        self.book.set_fill(at, color)
    }

    fn clear(&mut self, at: &Address) -> Result<(), HostError> {
        self.book.clear(at)
    }

    fn select(&mut self, at: &Address) -> Result<(), HostError> {
        self.book.select(at)
    }

    fn insert(&mut self, lines: &Lines, shift: Shift) -> Result<(), HostError> {
        self.book.insert(lines, shift)
    }

    fn delete(&mut self, lines: &Lines, shift: Shift) -> Result<(), HostError> {
        self.book.delete(lines, shift)
    }

    fn copy_range(&mut self, source: &Address, target: &Address) -> Result<(), HostError> {
        self.book.copy_range(source, target)
    }

    fn snapshot(&self, at: &Address) -> Result<Vec<CellSnapshot>, HostError> {
        self.book.snapshot(at)
    }

    fn add_sheet(&mut self, name: &str) -> Result<(), HostError> {
        self.book.add_sheet(name)
    }

    fn sheet_name(&self, name: Option<&str>) -> Result<String, HostError> {
        self.book.sheet_name(name)
    }

    fn rename_sheet(&mut self, from: &str, to: &str) -> Result<(), HostError> {
        self.book.rename_sheet(from, to)
    }

    fn delete_sheet(&mut self, name: &str) -> Result<(), HostError> {
        self.book.delete_sheet(name)
    }

    fn activate_sheet(&mut self, name: &str) -> Result<(), HostError> {
        self.book.activate_sheet(name)
    }

    fn add_chart(
        &mut self,
        chart_type: &str,
        source: &Address,
        title: &str,
    ) -> Result<String, HostError> {
        self.book.add_chart(chart_type, source, title)
    }

    fn charts(&self) -> Result<Vec<ChartInfo>, HostError> {
        self.book.charts()
    }

    fn delete_chart(&mut self, name: &str) -> Result<(), HostError> {
        self.book.delete_chart(name)
    }

    fn sort(&mut self, at: &Address, key: usize, ascending: bool) -> Result<(), HostError> {
        self.book.sort(at, key, ascending)
    }
}

#[test]
fn batches_commit_once() {
    let mut exec = Executor::new();
    let mut host = FlakyHost::new();
    let cmds = CommandParser::parse("SET_VALUE|A1|a\nSET_VALUE|A2|b").commands;
    assert!(exec.execute(&mut host, &cmds).success);
    assert_eq!(host.commits, 1);
}

#[test]
fn failed_begin_runs_nothing() {
    let mut exec = Executor::new();
    let mut host = FlakyHost::new();
    host.fail_begin = true;
    let cmds = CommandParser::parse("SET_VALUE|A1|a").commands;
    let result = exec.execute(&mut host, &cmds);
    assert_eq!(result.executed, 0);
    assert_eq!(result.errors, vec!["Session error: document is read-only"]);
    assert_eq!(host.book.value_at("A1"), "");
    assert!(exec.history().is_empty());
}

#[test]
fn session_loss_aborts_the_rest_of_the_batch() {
    let mut exec = Executor::new();
    let mut host = FlakyHost::new();
    host.poison = Some("boom");
    let cmds = CommandParser::parse("SET_VALUE|A1|ok\nSET_VALUE|A2|boom\nSET_VALUE|A3|never").commands;
    let result = exec.execute(&mut host, &cmds);
    assert!(!result.success);
    assert_eq!(result.executed, 1);
    assert_eq!(result.errors, vec!["Session error: connection lost"]);
    assert_eq!(host.book.value_at("A3"), "");
    assert_eq!(host.commits, 0);
    assert!(exec.history().is_empty());
}

#[test]
fn failed_commit_discards_the_inverse() {
    let mut exec = Executor::new();
    let mut host = FlakyHost::new();
    host.fail_commit = true;
    let cmds = CommandParser::parse("SET_VALUE|A1|a\nSET_VALUE|A2|b").commands;
    let result = exec.execute(&mut host, &cmds);
    assert_eq!(result.executed, 2);
    assert_eq!(result.errors, vec!["Session error: sync failed"]);
    assert!(exec.history().is_empty());
}

#[test]
fn ordinary_rejections_are_not_session_errors() {
    let mut exec = Executor::new();
    let mut host = FlakyHost::new();
    let cmds = CommandParser::parse("DELETE_SHEET|Sheet1\nSET_VALUE|A1|after").commands;
    let result = exec.execute(&mut host, &cmds);
    assert_eq!(result.executed, 1);
    assert_eq!(
        result.errors,
        vec!["Error executing DELETE_SHEET: a workbook must keep at least one sheet"]
    );
    assert_eq!(host.commits, 1);
    assert_eq!(exec.history().len(), 1);
}
