use chrono::{DateTime, Utc};

use super::{BoardError, require_non_empty};
use crate::model::board::Board;
use crate::model::task::{DEFAULT_CATEGORY, Task, TaskDraft, TaskPatch};
use crate::util::ids::generate_id;

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Add a task built from `draft` to the end of its column.
/// Returns the assigned ID.
pub fn add_task(board: &mut Board, draft: TaskDraft, now: DateTime<Utc>) -> Result<String, BoardError> {
    require_non_empty(&draft.title, "task title")?;
    let column = board
        .column_mut(&draft.column_id)
        .ok_or_else(|| BoardError::UnknownColumn(draft.column_id.clone()))?;

    let id = generate_id("task");
    column.task_ids.push(id.clone());

    let category = draft
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    board.tasks.push(Task {
        id: id.clone(),
        title: draft.title,
        description: draft.description.unwrap_or_default(),
        column_id: draft.column_id,
        category,
        priority: draft.priority.unwrap_or_default(),
        due_date: draft.due_date,
        due_time: draft.due_time,
        created_at: now,
        completed: draft.completed.unwrap_or(false),
    });
    Ok(id)
}

/// Merge `patch` into a task. Column membership is left alone.
pub fn update_task(board: &mut Board, task_id: &str, patch: &TaskPatch) -> Result<(), BoardError> {
    if let Some(title) = &patch.title {
        require_non_empty(title, "task title")?;
    }
    let task = board.task_mut(task_id).ok_or_else(|| BoardError::task(task_id))?;
    patch.apply(task);
    Ok(())
}

/// Remove a task and every index entry pointing at it.
pub fn delete_task(board: &mut Board, task_id: &str) -> Result<Task, BoardError> {
    let idx = board
        .tasks
        .iter()
        .position(|t| t.id == task_id)
        .ok_or_else(|| BoardError::task(task_id))?;
    let task = board.tasks.remove(idx);
    // At most one column should hold it, but clear all of them in case the index is corrupt.
    for column in &mut board.columns {
        column.task_ids.retain(|id| id != task_id);
    }
    Ok(task)
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// Move a task to `target_index` in `target_column_id`.
///
/// The index counts positions after the task has been taken out of its old
/// place, so within one column `[a, b, c]` moving `a` to 2 gives `[b, c, a]`.
/// Out-of-range indexes clamp to the end.
pub fn move_task(
    board: &mut Board,
    task_id: &str,
    target_column_id: &str,
    target_index: usize,
) -> Result<(), BoardError> {
    if board.task(task_id).is_none() {
        return Err(BoardError::task(task_id));
    }
    if board.column(target_column_id).is_none() {
        return Err(BoardError::UnknownColumn(target_column_id.to_string()));
    }

    for column in &mut board.columns {
        column.task_ids.retain(|id| id != task_id);
    }
    if let Some(target) = board.column_mut(target_column_id) {
        let idx = target_index.min(target.task_ids.len());
        target.task_ids.insert(idx, task_id.to_string());
    }
    if let Some(task) = board.task_mut(task_id) {
        task.column_id = target_column_id.to_string();
    }
    Ok(())
}

/// Position of a task within its column, if indexed.
pub fn task_position(board: &Board, task_id: &str) -> Option<(String, usize)> {
    board.columns.iter().find_map(|col| {
        col.task_ids
            .iter()
            .position(|id| id == task_id)
            .map(|idx| (col.id.clone(), idx))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::Column;
    use crate::model::task::Priority;
    use crate::ops::check::check_board;
    use pretty_assertions::assert_eq;

    fn sample_board() -> Board {
        let mut board = Board::new("board-1", "Test", Utc::now());
        board.columns = vec![Column::new("todo", "To Do"), Column::new("done", "Done")];
        board
    }

    fn ids(board: &Board, column_id: &str) -> Vec<String> {
        board.column(column_id).unwrap().task_ids.clone()
    }

    fn assert_consistent(board: &Board) {
        let result = check_board(board);
        assert!(result.valid, "index broken: {:?}", result.errors);
    }

    // --- add ---

    #[test]
    fn add_task_fills_defaults_and_appends_to_column() {
        let mut board = sample_board();
        let now = Utc::now();
        let first = add_task(&mut board, TaskDraft::new("First", "todo"), now).unwrap();
        let second = add_task(&mut board, TaskDraft::new("Second", "todo"), now).unwrap();

        assert_eq!(ids(&board, "todo"), vec![first.clone(), second]);
        let task = board.task(&first).unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.category, "General");
        assert_eq!(task.priority, Priority::Low);
        assert!(!task.completed);
        assert_eq!(task.created_at, now);
        assert_consistent(&board);
    }

    #[test]
    fn add_task_keeps_given_fields() {
        let mut board = sample_board();
        let draft = TaskDraft::new("Pay rent", "done")
            .priority(Priority::High)
            .category("Finance")
            .completed(true);
        let id = add_task(&mut board, draft, Utc::now()).unwrap();
        let task = board.task(&id).unwrap();
        assert_eq!(task.category, "Finance");
        assert_eq!(task.priority, Priority::High);
        assert!(task.completed);
        assert_eq!(ids(&board, "done"), vec![id]);
    }

    #[test]
    fn add_task_blank_category_becomes_general() {
        let mut board = sample_board();
        let id = add_task(&mut board, TaskDraft::new("x", "todo").category("  "), Utc::now()).unwrap();
        assert_eq!(board.task(&id).unwrap().category, "General");
    }

    #[test]
    fn add_task_rejects_empty_title() {
        let mut board = sample_board();
        let before = board.clone();
        let err = add_task(&mut board, TaskDraft::new("   ", "todo"), Utc::now()).unwrap_err();
        assert_eq!(err, BoardError::Validation("task title"));
        assert_eq!(board, before);
    }

    #[test]
    fn add_task_rejects_unknown_column() {
        let mut board = sample_board();
        let before = board.clone();
        let err = add_task(&mut board, TaskDraft::new("x", "nope"), Utc::now()).unwrap_err();
        assert_eq!(err, BoardError::UnknownColumn("nope".into()));
        assert_eq!(board, before);
    }

    // --- update ---

    #[test]
    fn update_task_merges_fields_without_touching_index() {
        let mut board = sample_board();
        let id = add_task(&mut board, TaskDraft::new("Old", "todo"), Utc::now()).unwrap();
        let patch = TaskPatch {
            title: Some("New".into()),
            priority: Some(Priority::Medium),
            ..Default::default()
        };
        update_task(&mut board, &id, &patch).unwrap();
        let task = board.task(&id).unwrap();
        assert_eq!(task.title, "New");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(ids(&board, "todo"), vec![id]);
    }

    #[test]
    fn update_task_empty_patch_is_noop() {
        let mut board = sample_board();
        let id = add_task(&mut board, TaskDraft::new("Same", "todo"), Utc::now()).unwrap();
        let before = board.clone();
        update_task(&mut board, &id, &TaskPatch::default()).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn update_task_unknown_id() {
        let mut board = sample_board();
        let err = update_task(&mut board, "missing", &TaskPatch::completed(true)).unwrap_err();
        assert_eq!(err, BoardError::task("missing"));
    }

    #[test]
    fn update_task_rejects_blank_title() {
        let mut board = sample_board();
        let id = add_task(&mut board, TaskDraft::new("Keep", "todo"), Utc::now()).unwrap();
        assert!(update_task(&mut board, &id, &TaskPatch::title("")).is_err());
        assert_eq!(board.task(&id).unwrap().title, "Keep");
    }

    // --- delete ---

    #[test]
    fn delete_task_removes_from_tasks_and_index() {
        let mut board = sample_board();
        let a = add_task(&mut board, TaskDraft::new("a", "todo"), Utc::now()).unwrap();
        let b = add_task(&mut board, TaskDraft::new("b", "todo"), Utc::now()).unwrap();
        let removed = delete_task(&mut board, &a).unwrap();
        assert_eq!(removed.id, a);
        assert!(board.task(&a).is_none());
        assert_eq!(ids(&board, "todo"), vec![b]);
        assert_consistent(&board);
    }

    #[test]
    fn delete_task_clears_corrupt_duplicate_index() {
        let mut board = sample_board();
        let a = add_task(&mut board, TaskDraft::new("a", "todo"), Utc::now()).unwrap();
        board.column_mut("done").unwrap().task_ids.push(a.clone());
        delete_task(&mut board, &a).unwrap();
        assert!(ids(&board, "todo").is_empty());
        assert!(ids(&board, "done").is_empty());
    }

    // --- move ---

    #[test]
    fn move_task_between_columns() {
        let mut board = sample_board();
        let t = add_task(&mut board, TaskDraft::new("T", "todo"), Utc::now()).unwrap();
        move_task(&mut board, &t, "done", 0).unwrap();
        assert!(ids(&board, "todo").is_empty());
        assert_eq!(ids(&board, "done"), vec![t.clone()]);
        assert_eq!(board.task(&t).unwrap().column_id, "done");
        assert_consistent(&board);
    }

    #[test]
    fn move_task_inserts_at_index_in_target() {
        let mut board = sample_board();
        let x = add_task(&mut board, TaskDraft::new("x", "done"), Utc::now()).unwrap();
        let y = add_task(&mut board, TaskDraft::new("y", "done"), Utc::now()).unwrap();
        let t = add_task(&mut board, TaskDraft::new("t", "todo"), Utc::now()).unwrap();
        move_task(&mut board, &t, "done", 1).unwrap();
        assert_eq!(ids(&board, "done"), vec![x, t.clone(), y]);
        assert_eq!(task_position(&board, &t), Some(("done".to_string(), 1)));
    }

    #[test]
    fn move_task_same_column_to_later_index() {
        let mut board = sample_board();
        let a = add_task(&mut board, TaskDraft::new("a", "todo"), Utc::now()).unwrap();
        let b = add_task(&mut board, TaskDraft::new("b", "todo"), Utc::now()).unwrap();
        let c = add_task(&mut board, TaskDraft::new("c", "todo"), Utc::now()).unwrap();

        move_task(&mut board, &a, "todo", 1).unwrap();
        assert_eq!(ids(&board, "todo"), vec![b.clone(), a.clone(), c.clone()]);

        move_task(&mut board, &b, "todo", 2).unwrap();
        assert_eq!(ids(&board, "todo"), vec![a, c, b.clone()]);
        assert_eq!(board.column("todo").unwrap().task_ids[2], b);
        assert_consistent(&board);
    }

    #[test]
    fn move_task_same_column_to_earlier_index() {
        let mut board = sample_board();
        let a = add_task(&mut board, TaskDraft::new("a", "todo"), Utc::now()).unwrap();
        let b = add_task(&mut board, TaskDraft::new("b", "todo"), Utc::now()).unwrap();
        let c = add_task(&mut board, TaskDraft::new("c", "todo"), Utc::now()).unwrap();
        move_task(&mut board, &c, "todo", 0).unwrap();
        assert_eq!(ids(&board, "todo"), vec![c, a, b]);
    }

    #[test]
    fn move_task_clamps_index() {
        let mut board = sample_board();
        let a = add_task(&mut board, TaskDraft::new("a", "todo"), Utc::now()).unwrap();
        let b = add_task(&mut board, TaskDraft::new("b", "todo"), Utc::now()).unwrap();
        move_task(&mut board, &a, "todo", 99).unwrap();
        assert_eq!(ids(&board, "todo"), vec![b, a]);
    }

    #[test]
    fn move_task_unknown_target_leaves_board() {
        let mut board = sample_board();
        let a = add_task(&mut board, TaskDraft::new("a", "todo"), Utc::now()).unwrap();
        let before = board.clone();
        let err = move_task(&mut board, &a, "archive", 0).unwrap_err();
        assert_eq!(err, BoardError::UnknownColumn("archive".into()));
        assert_eq!(board, before);
    }
}
