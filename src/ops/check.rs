use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::board::Board;

/// Structured result of a board integrity check.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
}

/// A broken link between `tasks` and the column index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Task exists but no column lists it
    #[serde(rename = "unindexed_task")]
    UnindexedTask { task_id: String },
    /// Task ID listed more than once across all columns
    #[serde(rename = "duplicate_index")]
    DuplicateIndex { task_id: String, column_ids: Vec<String> },
    /// Column lists an ID that has no task
    #[serde(rename = "dangling_index")]
    DanglingIndex { column_id: String, task_id: String },
    /// Task's `columnId` disagrees with the column that lists it
    #[serde(rename = "column_mismatch")]
    ColumnMismatch {
        task_id: String,
        column_id: String,
        indexed_in: String,
    },
    /// Task's `columnId` names no column on the board
    #[serde(rename = "unknown_column")]
    UnknownColumn { task_id: String, column_id: String },
    #[serde(rename = "duplicate_task_id")]
    DuplicateTaskId { task_id: String },
    #[serde(rename = "duplicate_column_id")]
    DuplicateColumnId { column_id: String },
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Validate that every task is listed by exactly one column, the one its
/// `columnId` names, and that columns list nothing else.
///
/// Read-only.
pub fn check_board(board: &Board) -> CheckResult {
    let mut result = CheckResult::default();

    let mut column_ids = HashSet::new();
    for column in &board.columns {
        if !column_ids.insert(column.id.as_str()) {
            result.errors.push(CheckError::DuplicateColumnId {
                column_id: column.id.clone(),
            });
        }
    }

    let mut task_ids = HashSet::new();
    for task in &board.tasks {
        if !task_ids.insert(task.id.as_str()) {
            result.errors.push(CheckError::DuplicateTaskId {
                task_id: task.id.clone(),
            });
        }
    }

    // task id -> columns listing it, in column order
    let mut holders: HashMap<&str, Vec<&str>> = HashMap::new();
    for column in &board.columns {
        for id in &column.task_ids {
            if !task_ids.contains(id.as_str()) {
                result.errors.push(CheckError::DanglingIndex {
                    column_id: column.id.clone(),
                    task_id: id.clone(),
                });
                continue;
            }
            holders.entry(id.as_str()).or_default().push(column.id.as_str());
        }
    }

    for task in &board.tasks {
        if !column_ids.contains(task.column_id.as_str()) {
            result.errors.push(CheckError::UnknownColumn {
                task_id: task.id.clone(),
                column_id: task.column_id.clone(),
            });
        }
        match holders.get(task.id.as_str()).map(Vec::as_slice) {
            None | Some([]) => result.errors.push(CheckError::UnindexedTask {
                task_id: task.id.clone(),
            }),
            Some([only]) => {
                if *only != task.column_id && column_ids.contains(task.column_id.as_str()) {
                    result.errors.push(CheckError::ColumnMismatch {
                        task_id: task.id.clone(),
                        column_id: task.column_id.clone(),
                        indexed_in: (*only).to_string(),
                    });
                }
            }
            Some(many) => result.errors.push(CheckError::DuplicateIndex {
                task_id: task.id.clone(),
                column_ids: many.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    result.valid = result.errors.is_empty();
    result
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

/// Rebuild the column index so `check_board` passes.
///
/// A task's `columnId` wins over where the index happened to list it; tasks
/// naming a missing column go to the first column. Surviving index entries
/// keep their order and newly indexed tasks are appended. Duplicate tasks
/// keep their first occurrence. Returns the number of fixes applied.
pub fn repair_board(board: &mut Board) -> usize {
    let mut fixes = 0;

    let mut seen_tasks = HashSet::new();
    let before = board.tasks.len();
    board.tasks.retain(|t| seen_tasks.insert(t.id.clone()));
    fixes += before - board.tasks.len();

    let mut seen_columns = HashSet::new();
    let before = board.columns.len();
    board.columns.retain(|c| seen_columns.insert(c.id.clone()));
    fixes += before - board.columns.len();

    let Some(fallback) = board.columns.first().map(|c| c.id.clone()) else {
        // Nothing can hold the tasks; leave the board for the caller to reseed.
        return fixes;
    };

    for task in &mut board.tasks {
        if !seen_columns.contains(&task.column_id) {
            task.column_id = fallback.clone();
            fixes += 1;
        }
    }

    let owner: HashMap<String, String> = board
        .tasks
        .iter()
        .map(|t| (t.id.clone(), t.column_id.clone()))
        .collect();
    let mut indexed = HashSet::new();
    for column in &mut board.columns {
        let before = column.task_ids.len();
        column.task_ids.retain(|id| {
            owner.get(id).is_some_and(|c| *c == column.id) && indexed.insert(id.clone())
        });
        fixes += before - column.task_ids.len();
    }

    for task in &board.tasks {
        if !indexed.contains(&task.id) {
            if let Some(column) = board.columns.iter_mut().find(|c| c.id == task.column_id) {
                column.task_ids.push(task.id.clone());
                fixes += 1;
            }
        }
    }

    fixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::Column;
    use crate::model::task::{Priority, Task};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn task(id: &str, column_id: &str) -> Task {
        Task {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            column_id: column_id.into(),
            category: "General".into(),
            priority: Priority::Low,
            due_date: None,
            due_time: None,
            created_at: Utc::now(),
            completed: false,
        }
    }

    fn board(columns: Vec<(&str, Vec<&str>)>, tasks: Vec<Task>) -> Board {
        let mut board = Board::new("b", "B", Utc::now());
        board.columns = columns
            .into_iter()
            .map(|(id, ids)| Column {
                id: id.into(),
                title: id.into(),
                task_ids: ids.into_iter().map(String::from).collect(),
            })
            .collect();
        board.tasks = tasks;
        board
    }

    #[test]
    fn consistent_board_is_valid() {
        let b = board(
            vec![("todo", vec!["a"]), ("done", vec!["b"])],
            vec![task("a", "todo"), task("b", "done")],
        );
        let result = check_board(&b);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn reports_each_kind_of_breakage() {
        let b = board(
            vec![("todo", vec!["a", "ghost", "c"]), ("done", vec!["a", "d"])],
            vec![
                task("a", "todo"),
                task("b", "todo"),
                task("c", "done"),
                task("d", "gone"),
            ],
        );
        let errors = check_board(&b).errors;
        assert!(errors.contains(&CheckError::DanglingIndex {
            column_id: "todo".into(),
            task_id: "ghost".into()
        }));
        assert!(errors.contains(&CheckError::DuplicateIndex {
            task_id: "a".into(),
            column_ids: vec!["todo".into(), "done".into()]
        }));
        assert!(errors.contains(&CheckError::UnindexedTask { task_id: "b".into() }));
        assert!(errors.contains(&CheckError::ColumnMismatch {
            task_id: "c".into(),
            column_id: "done".into(),
            indexed_in: "todo".into()
        }));
        assert!(errors.contains(&CheckError::UnknownColumn {
            task_id: "d".into(),
            column_id: "gone".into()
        }));
    }

    #[test]
    fn repair_makes_board_valid() {
        let mut b = board(
            vec![("todo", vec!["a", "ghost", "c"]), ("done", vec!["a", "d"])],
            vec![
                task("a", "todo"),
                task("b", "todo"),
                task("c", "done"),
                task("d", "gone"),
                task("a", "done"),
            ],
        );
        let fixes = repair_board(&mut b);
        assert!(fixes > 0);
        assert!(check_board(&b).valid, "{:?}", check_board(&b).errors);
        assert_eq!(b.column("todo").unwrap().task_ids, vec!["a", "b", "d"]);
        assert_eq!(b.column("done").unwrap().task_ids, vec!["c"]);
    }

    #[test]
    fn repair_of_valid_board_is_noop() {
        let mut b = board(vec![("todo", vec!["a"])], vec![task("a", "todo")]);
        let before = b.clone();
        assert_eq!(repair_board(&mut b), 0);
        assert_eq!(b, before);
    }
}
