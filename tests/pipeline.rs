//! Pipeline integration tests — reply text → parse → expand → validate → workbook.

use gridpilot::dsl::{CommandKind, CommandParser};
use gridpilot::executor::Executor;
use gridpilot::host::Workbook;
use gridpilot::turn::{Turn, TurnStatus};

/// Helper: a workbook with `r1`..`rN` down column A.
fn numbered_rows(n: u32) -> Workbook {
    let mut book = Workbook::new();
    for row in 1..=n {
        book.put(&format!("A{row}"), &format!("r{row}")).unwrap();
    }
    book
}

/// Helper: column A, top to bottom, up to `n` rows.
fn column_a(book: &Workbook, n: u32) -> Vec<String> {
    (1..=n).map(|row| book.value_at(&format!("A{row}"))).collect()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn reply_with_prose_and_commands() {
    let reply = "I'll add the headers for you.\n\n\
                 SET_VALUE|A1|Name\n\
                 SET_VALUE|B1|Amount\n\
                 FORMAT_BOLD|A1:B1|true\n\n\
                 Let me know if you want totals too.";
    let parsed = CommandParser::parse(reply);
    assert_eq!(parsed.commands.len(), 3);
    assert_eq!(
        parsed.text,
        "I'll add the headers for you.\nLet me know if you want totals too."
    );
}

#[test]
fn fenced_reply_runs_like_plain_lines() {
    let mut exec = Executor::new();
    let mut book = Workbook::new();
    let turn = exec.run_turn(
        &mut book,
        "Here you go:\n```\nSET_VALUE|A1|Total\nSET_FORMULA|B1|=SUM(B2:B9)\n```",
    );
    assert!(turn.result().unwrap().success);
    assert_eq!(book.value_at("A1"), "Total");
    assert_eq!(book.cell("B1").unwrap().formula.as_deref(), Some("=SUM(B2:B9)"));
}

#[test]
fn unknown_type_blocks_the_batch() {
    let mut exec = Executor::new();
    let mut book = Workbook::new();
    let turn = exec.run_turn(&mut book, "SET_VALUE|A1|x\nMERGE_CELLS|A1:B1");
    match turn.status {
        TurnStatus::Rejected { errors } => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Command 2: "));
            assert!(errors[0].ends_with("(MERGE_CELLS|A1:B1)"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(book.value_at("A1"), "");
}

// ---------------------------------------------------------------------------
// Row macros against a real workbook
// ---------------------------------------------------------------------------

#[test]
fn move_row_down_lands_after_target() {
    let mut exec = Executor::new();
    let mut book = numbered_rows(5);
    let turn = exec.run_turn(&mut book, "MOVE_ROW|2|4|after");
    assert_eq!(turn.result().unwrap().executed, 3);
    assert_eq!(column_a(&book, 5), vec!["r1", "r3", "r4", "r2", "r5"]);
}

#[test]
fn move_row_up_lands_before_target() {
    let mut exec = Executor::new();
    let mut book = numbered_rows(5);
    exec.run_turn(&mut book, "MOVE_ROW|4|2|before");
    assert_eq!(column_a(&book, 5), vec!["r1", "r4", "r2", "r3", "r5"]);
}

#[test]
fn move_row_defaults_to_after() {
    let mut exec = Executor::new();
    let mut book = numbered_rows(5);
    exec.run_turn(&mut book, "MOVE_ROW|1|3");
    assert_eq!(column_a(&book, 5), vec!["r2", "r3", "r1", "r4", "r5"]);
}

#[test]
fn swap_rows_exchanges_contents() {
    let mut exec = Executor::new();
    let mut book = numbered_rows(5);
    let turn = exec.run_turn(&mut book, "SWAP_ROWS|2|4");
    assert_eq!(turn.result().unwrap().executed, 5);
    assert_eq!(column_a(&book, 6), vec!["r1", "r4", "r3", "r2", "r5", ""]);
}

#[test]
fn copy_row_duplicates_formatting() {
    let mut exec = Executor::new();
    let mut book = numbered_rows(2);
    exec.run_turn(&mut book, "FORMAT_BOLD|A1|true\nCOPY_ROW|1|3");
    assert_eq!(book.value_at("A3"), "r1");
    assert!(book.cell("A3").unwrap().bold);
}

#[test]
fn broken_macro_is_rejected_with_its_text() {
    let turn = Turn::preview("MOVE_ROW|2");
    match turn.status {
        TurnStatus::Rejected { errors } => {
            assert_eq!(
                errors,
                vec!["Command 1: MOVE_ROW requires source and target rows (MOVE_ROW|2)"]
            );
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn expanded_commands_carry_labels() {
    let turn = Turn::preview("SWAP_ROWS|3|7");
    assert!(turn.is_runnable());
    assert!(turn.commands.iter().all(|c| c.original.starts_with("[SWAP]")));
    assert_eq!(turn.commands[0].kind, CommandKind::InsertRows);
    assert_eq!(turn.commands[0].args, vec!["8:8"]);
}

// ---------------------------------------------------------------------------
// Sheets, charts and sorting
// ---------------------------------------------------------------------------

#[test]
fn sheet_qualified_writes() {
    let mut exec = Executor::new();
    let mut book = Workbook::new();
    let turn = exec.run_turn(
        &mut book,
        "CREATE_SHEET|Q1 Data\nSET_VALUE|'Q1 Data'!B2|42\nACTIVATE_SHEET|Q1 Data",
    );
    assert!(turn.result().unwrap().success);
    assert_eq!(book.value_at("'Q1 Data'!B2"), "42");
    assert_eq!(book.active().name, "Q1 Data");
}

#[test]
fn chart_lifecycle() {
    let mut exec = Executor::new();
    let mut book = Workbook::new();
    exec.run_turn(
        &mut book,
        "CREATE_CHART|ColumnClustered|A1:B5|Revenue by Month\nCREATE_CHART|Pie|A1:B5",
    );
    let titles: Vec<_> = book.active().charts.iter().map(|c| c.title.clone()).collect();
    assert_eq!(titles, vec!["Revenue by Month", "Chart"]);

    let turn = exec.run_turn(&mut book, "DELETE_CHART|revenue");
    assert!(turn.result().unwrap().success);
    assert_eq!(book.active().charts.len(), 1);

    exec.run_turn(&mut book, "DELETE_ALL_CHARTS");
    assert!(book.active().charts.is_empty());
}

#[test]
fn sort_orders_numbers_before_text() {
    let mut exec = Executor::new();
    let mut book = Workbook::new();
    for (at, v) in [("A1", "pear"), ("A2", "10"), ("A3", "Apple"), ("A4", "2")] {
        book.put(at, v).unwrap();
    }
    exec.run_turn(&mut book, "SORT|A1:A4|0|true");
    assert_eq!(column_a(&book, 4), vec!["2", "10", "Apple", "pear"]);

    exec.run_turn(&mut book, "SORT|A1:A4|0|false");
    assert_eq!(column_a(&book, 4), vec!["pear", "Apple", "10", "2"]);
}

#[test]
fn failed_command_does_not_stop_the_batch() {
    let mut exec = Executor::new();
    let mut book = Workbook::new();
    let turn = exec.run_turn(
        &mut book,
        "SET_VALUE|A1|first\nACTIVATE_SHEET|Missing\nSET_VALUE|A2|third",
    );
    let result = turn.result().unwrap();
    assert!(!result.success);
    assert_eq!(result.executed, 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Error executing ACTIVATE_SHEET:"));
    assert_eq!(book.value_at("A2"), "third");
}

#[test]
fn sort_by_a_blank_column_inside_the_range() {
    let mut exec = Executor::new();
    let mut book = Workbook::new();
    for (at, v) in [("A1", "b"), ("B1", "2"), ("A2", "a"), ("B2", "1")] {
        book.put(at, v).unwrap();
    }
    let turn = exec.run_turn(&mut book, "SORT|A1:C2|2|true");
    let result = turn.result().unwrap();
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(column_a(&book, 2), vec!["b", "a"]);
}

#[test]
fn oversized_row_numbers_are_rejected_not_fatal() {
    let turn = Turn::preview("SWAP_ROWS|4294967295|1\nMOVE_ROW|1|4294967295|after");
    match turn.status {
        TurnStatus::Rejected { errors } => {
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().all(|e| e.contains("Invalid row numbers")));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}
