use super::{BoardError, require_non_empty};
use crate::model::board::{Board, Column};
use crate::util::ids::generate_id;

/// Append a new empty column. Returns the assigned ID.
pub fn add_column(board: &mut Board, title: &str) -> Result<String, BoardError> {
    require_non_empty(title, "column title")?;
    let id = generate_id("column");
    board.columns.push(Column::new(id.clone(), title));
    Ok(id)
}

/// Rename a column.
pub fn update_column(board: &mut Board, column_id: &str, title: &str) -> Result<(), BoardError> {
    require_non_empty(title, "column title")?;
    let column = board
        .column_mut(column_id)
        .ok_or_else(|| BoardError::column(column_id))?;
    column.title = title.to_string();
    Ok(())
}

/// Reposition a column. `new_index` is clamped to the last position.
pub fn move_column(board: &mut Board, column_id: &str, new_index: usize) -> Result<(), BoardError> {
    let idx = board
        .column_index(column_id)
        .ok_or_else(|| BoardError::column(column_id))?;
    let column = board.columns.remove(idx);
    let target = new_index.min(board.columns.len());
    board.columns.insert(target, column);
    Ok(())
}

/// Delete a column, moving its tasks to the end of the first remaining column.
/// Returns the IDs of the tasks that moved.
pub fn delete_column(board: &mut Board, column_id: &str) -> Result<Vec<String>, BoardError> {
    let idx = board
        .column_index(column_id)
        .ok_or_else(|| BoardError::column(column_id))?;
    if board.columns.len() <= 1 {
        return Err(BoardError::LastColumn);
    }

    let removed = board.columns.remove(idx);
    // Display order first, then anything that claims the column without being indexed.
    let mut moved: Vec<String> = removed
        .task_ids
        .into_iter()
        .filter(|id| board.task(id).is_some_and(|t| t.column_id == column_id))
        .collect();
    for task in &board.tasks {
        if task.column_id == column_id && !moved.contains(&task.id) {
            moved.push(task.id.clone());
        }
    }

    let target = &mut board.columns[0];
    let target_id = target.id.clone();
    for id in &moved {
        if !target.task_ids.contains(id) {
            target.task_ids.push(id.clone());
        }
    }
    for task in &mut board.tasks {
        if task.column_id == column_id {
            task.column_id = target_id.clone();
        }
    }
    Ok(moved)
}
