//! Macro expansion — composite row operations → index-safe primitives.
//!
//! Runs once per recognized line, before validation, so everything
//! downstream only ever sees primitive commands. Row arithmetic accounts
//! for the shift an insertion causes below it.

use super::command::{Command, CommandKind};
use crate::host::reference::MAX_ROWS;

/// Expand one recognized line into the commands it stands for.
///
/// Non-macro kinds pass through as a single command. A macro with
/// unusable arguments becomes a single `ERROR` command carrying the reason.
pub fn expand(kind: CommandKind, args: Vec<String>, original: &str) -> Vec<Command> {
    match kind {
        CommandKind::MoveRow => expand_move_row(&args, original),
        CommandKind::CopyRow => expand_copy_row(&args, original),
        CommandKind::SwapRows => expand_swap_rows(&args, original),
        _ => vec![Command::new(kind, args, original)],
    }
}

/// Parse a 1-based row number on the sheet.
fn row_number(arg: &str) -> Option<u32> {
    arg.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_ROWS).contains(n))
}

/// The row below `row`, if the sheet has one.
fn next_row(row: u32) -> Option<u32> {
    (row < MAX_ROWS).then(|| row + 1)
}

fn row_pair(args: &[String]) -> Option<(u32, u32)> {
    Some((row_number(&args[0])?, row_number(&args[1])?))
}

fn whole_row(row: u32) -> String {
    format!("{row}:{row}")
}

fn insert_rows(row: u32, label: String) -> Command {
    Command::new(CommandKind::InsertRows, vec![whole_row(row)], label)
}

fn delete_rows(row: u32, label: String) -> Command {
    Command::new(CommandKind::DeleteRows, vec![whole_row(row)], label)
}

fn copy_rows(from: u32, to: u32, label: String) -> Command {
    Command::new(CommandKind::Copy, vec![whole_row(from), whole_row(to)], label)
}

fn expand_move_row(args: &[String], original: &str) -> Vec<Command> {
    if args.len() < 2 {
        return vec![Command::error(
            "MOVE_ROW requires source and target rows",
            original,
        )];
    }
    let Some((source, target)) = row_pair(args) else {
        return vec![Command::error("Invalid row numbers", original)];
    };

    let after = args
        .get(2)
        .map(|p| p.trim().eq_ignore_ascii_case("after"))
        .unwrap_or(true);
    let insert_at = if after { next_row(target) } else { Some(target) };
    let Some(insert_at) = insert_at else {
        return vec![Command::error("Invalid row numbers", original)];
    };

    if source < insert_at {
        // Moving down: the source row sits above the insertion and keeps its index.
        vec![
            insert_rows(insert_at, format!("[MOVE down] insert row {insert_at}")),
            copy_rows(source, insert_at, format!("[MOVE down] copy {source} -> {insert_at}")),
            delete_rows(source, format!("[MOVE down] delete {source}")),
        ]
    } else {
        // Moving up: the insertion pushes the source row down by one.
        let Some(shifted) = next_row(source) else {
            return vec![Command::error("Invalid row numbers", original)];
        };
        vec![
            insert_rows(insert_at, format!("[MOVE up] insert row {insert_at}")),
            copy_rows(shifted, insert_at, format!("[MOVE up] copy {shifted} -> {insert_at}")),
            delete_rows(shifted, format!("[MOVE up] delete {shifted}")),
        ]
    }
}

fn expand_copy_row(args: &[String], original: &str) -> Vec<Command> {
    if args.len() < 2 {
        return vec![Command::error(
            "COPY_ROW requires source and target rows",
            original,
        )];
    }
    let Some((source, target)) = row_pair(args) else {
        return vec![Command::error("Invalid row numbers", original)];
    };
    vec![Command::new(
        CommandKind::Copy,
        vec![whole_row(source), whole_row(target)],
        original,
    )]
}

fn expand_swap_rows(args: &[String], original: &str) -> Vec<Command> {
    if args.len() < 2 {
        return vec![Command::error("SWAP_ROWS requires two row numbers", original)];
    }
    let Some((a, b)) = row_pair(args) else {
        return vec![Command::error("Invalid row numbers", original)];
    };

    // Scratch row just past both rows, so neither index moves when it is inserted.
    let Some(temp) = next_row(a.max(b)) else {
        return vec![Command::error("Invalid row numbers", original)];
    };
    vec![
        insert_rows(temp, format!("[SWAP] create temp row {temp}")),
        copy_rows(a, temp, format!("[SWAP] save row {a}")),
        copy_rows(b, a, format!("[SWAP] {b} -> {a}")),
        copy_rows(temp, b, format!("[SWAP] temp -> {b}")),
        delete_rows(temp, format!("[SWAP] delete temp row {temp}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn shape(cmds: &[Command]) -> Vec<(CommandKind, Vec<String>)> {
        cmds.iter().map(|c| (c.kind.clone(), c.args.clone())).collect()
    }

    #[test]
    fn primitives_pass_through() {
        let cmds = expand(CommandKind::SetValue, args(&["A1", "x"]), "SET_VALUE|A1|x");
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, CommandKind::SetValue);
        assert_eq!(cmds[0].original, "SET_VALUE|A1|x");
    }

    #[test]
    fn move_row_down_after_target() {
        let cmds = expand(CommandKind::MoveRow, args(&["5", "10", "after"]), "MOVE_ROW|5|10|after");
        assert_eq!(
            shape(&cmds),
            vec![
                (CommandKind::InsertRows, args(&["11:11"])),
                (CommandKind::Copy, args(&["5:5", "11:11"])),
                (CommandKind::DeleteRows, args(&["5:5"])),
            ]
        );
    }

    #[test]
    fn move_row_defaults_to_after() {
        let cmds = expand(CommandKind::MoveRow, args(&["2", "4"]), "MOVE_ROW|2|4");
        assert_eq!(cmds[0].args, args(&["5:5"]));
    }

    #[test]
    fn move_row_up_uses_shifted_source() {
        let cmds = expand(CommandKind::MoveRow, args(&["10", "5", "before"]), "MOVE_ROW|10|5|before");
        assert_eq!(
            shape(&cmds),
            vec![
                (CommandKind::InsertRows, args(&["5:5"])),
                (CommandKind::Copy, args(&["11:11", "5:5"])),
                (CommandKind::DeleteRows, args(&["11:11"])),
            ]
        );
    }

    #[test]
    fn move_row_position_is_case_insensitive() {
        let cmds = expand(CommandKind::MoveRow, args(&["3", "8", "AFTER"]), "x");
        assert_eq!(cmds[0].args, args(&["9:9"]));
    }

    #[test]
    fn move_row_labels_describe_steps() {
        let cmds = expand(CommandKind::MoveRow, args(&["5", "10"]), "MOVE_ROW|5|10");
        assert!(cmds.iter().all(|c| c.original.starts_with("[MOVE down]")));
    }

    #[test]
    fn move_row_rejects_non_numeric() {
        let cmds = expand(CommandKind::MoveRow, args(&["five", "10"]), "MOVE_ROW|five|10");
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, CommandKind::Error);
        assert_eq!(cmds[0].args, args(&["Invalid row numbers"]));
        assert_eq!(cmds[0].original, "MOVE_ROW|five|10");
    }

    #[test]
    fn move_row_requires_two_args() {
        let cmds = expand(CommandKind::MoveRow, args(&["5"]), "MOVE_ROW|5");
        assert_eq!(cmds[0].kind, CommandKind::Error);
    }

    #[test]
    fn copy_row_becomes_single_copy() {
        let cmds = expand(CommandKind::CopyRow, args(&["2", "9"]), "COPY_ROW|2|9");
        assert_eq!(shape(&cmds), vec![(CommandKind::Copy, args(&["2:2", "9:9"]))]);
        assert_eq!(cmds[0].original, "COPY_ROW|2|9");
    }

    #[test]
    fn swap_rows_uses_scratch_row_below_both() {
        let cmds = expand(CommandKind::SwapRows, args(&["3", "7"]), "SWAP_ROWS|3|7");
        assert_eq!(
            shape(&cmds),
            vec![
                (CommandKind::InsertRows, args(&["8:8"])),
                (CommandKind::Copy, args(&["3:3", "8:8"])),
                (CommandKind::Copy, args(&["7:7", "3:3"])),
                (CommandKind::Copy, args(&["8:8", "7:7"])),
                (CommandKind::DeleteRows, args(&["8:8"])),
            ]
        );
    }

    #[test]
    fn swap_rows_order_of_arguments_does_not_move_scratch() {
        let cmds = expand(CommandKind::SwapRows, args(&["7", "3"]), "SWAP_ROWS|7|3");
        assert_eq!(cmds[0].args, args(&["8:8"]));
        assert_eq!(cmds[4].args, args(&["8:8"]));
    }

    #[test]
    fn swap_rows_rejects_zero() {
        let cmds = expand(CommandKind::SwapRows, args(&["0", "3"]), "SWAP_ROWS|0|3");
        assert_eq!(cmds[0].kind, CommandKind::Error);
    }

    #[test]
    fn rows_past_the_sheet_are_invalid() {
        for (kind, list) in [
            (CommandKind::SwapRows, ["4294967295", "1"]),
            (CommandKind::MoveRow, ["1", "4294967295"]),
            (CommandKind::CopyRow, ["1048577", "2"]),
        ] {
            let cmds = expand(kind, args(&list), "x");
            assert_eq!(cmds.len(), 1);
            assert_eq!(cmds[0].kind, CommandKind::Error);
            assert_eq!(cmds[0].args, args(&["Invalid row numbers"]));
        }
    }

    #[test]
    fn last_row_has_no_room_below() {
        let last = MAX_ROWS.to_string();
        let last = last.as_str();
        let cmds = expand(CommandKind::SwapRows, args(&[last, "1"]), "x");
        assert_eq!(cmds[0].kind, CommandKind::Error);
        let cmds = expand(CommandKind::MoveRow, args(&["1", last, "after"]), "x");
        assert_eq!(cmds[0].kind, CommandKind::Error);
        let cmds = expand(CommandKind::MoveRow, args(&["1", last, "before"]), "x");
        assert_eq!(cmds[0].kind, CommandKind::InsertRows);
    }
}
