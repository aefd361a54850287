use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;

use super::{BoardError, require_non_empty};
use crate::model::board::{Board, BoardPatch, Column};
use crate::model::task::{Priority, Task};
use crate::util::ids::generate_id;

/// The board a fresh install (or an unreadable save file) starts with.
pub fn seed_board(now: DateTime<Utc>) -> Board {
    let mut board = Board::new("board-1", "My First Board", now);
    board.columns = vec![
        Column {
            id: "todo".into(),
            title: "To Do".into(),
            task_ids: vec!["task-1".into()],
        },
        Column::new("in-progress", "In Progress"),
        Column::new("review", "Review"),
        Column::new("done", "Done"),
    ];
    board.tasks = vec![Task {
        id: "task-1".into(),
        title: "Create Your First Task".into(),
        description: "Press add task to get started".into(),
        column_id: "todo".into(),
        category: "General".into(),
        priority: Priority::High,
        due_date: Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).single(),
        due_time: None,
        created_at: now,
        completed: false,
    }];
    board
}

/// All boards plus the current-board pointer.
///
/// Boards keep their creation order; "first remaining board" means first in
/// that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStore {
    boards: IndexMap<String, Board>,
    current_board_id: Option<String>,
}

impl BoardStore {
    /// Build a store over `boards`, selecting the first one.
    pub fn new(boards: Vec<Board>) -> Self {
        let current_board_id = boards.first().map(|b| b.id.clone());
        let boards = boards.into_iter().map(|b| (b.id.clone(), b)).collect();
        BoardStore {
            boards,
            current_board_id,
        }
    }

    /// A store holding only the seeded starter board.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self::new(vec![seed_board(now)])
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.values()
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.get(board_id)
    }

    pub fn current_board_id(&self) -> Option<&str> {
        self.current_board_id.as_deref()
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.current_board_id.as_deref().and_then(|id| self.boards.get(id))
    }

    /// Every task on every board.
    pub fn all_tasks(&self) -> Vec<Task> {
        self.boards.values().flat_map(|b| b.tasks.iter().cloned()).collect()
    }

    // -----------------------------------------------------------------------
    // Board operations
    // -----------------------------------------------------------------------

    /// Create a board with the default columns and make it current.
    /// Returns the assigned ID.
    pub fn create_board(&mut self, name: &str, now: DateTime<Utc>) -> Result<String, BoardError> {
        require_non_empty(name, "board name")?;
        let id = generate_id("board");
        self.boards.insert(id.clone(), Board::new(id.clone(), name, now));
        self.current_board_id = Some(id.clone());
        tracing::debug!(board_id = %id, "board created");
        Ok(id)
    }

    /// Delete a board. The last remaining board cannot be deleted.
    /// If the deleted board was current, the first remaining board is selected.
    pub fn delete_board(&mut self, board_id: &str) -> Result<Board, BoardError> {
        if !self.boards.contains_key(board_id) {
            return Err(BoardError::board(board_id));
        }
        if self.boards.len() <= 1 {
            return Err(BoardError::MinimumBoard);
        }
        let removed = self
            .boards
            .shift_remove(board_id)
            .ok_or_else(|| BoardError::board(board_id))?;
        if self.current_board_id.as_deref() == Some(board_id) {
            self.current_board_id = self.boards.keys().next().cloned();
        }
        tracing::debug!(board_id, "board deleted");
        Ok(removed)
    }

    pub fn select_board(&mut self, board_id: &str) -> Result<(), BoardError> {
        if !self.boards.contains_key(board_id) {
            return Err(BoardError::board(board_id));
        }
        self.current_board_id = Some(board_id.to_string());
        Ok(())
    }

    pub fn rename_board(&mut self, board_id: &str, name: &str) -> Result<(), BoardError> {
        require_non_empty(name, "board name")?;
        self.update_board(
            board_id,
            BoardPatch {
                name: Some(name.to_string()),
                ..Default::default()
            },
        )
    }

    /// Merge `patch` into a board.
    pub fn update_board(&mut self, board_id: &str, patch: BoardPatch) -> Result<(), BoardError> {
        let board = self
            .boards
            .get_mut(board_id)
            .ok_or_else(|| BoardError::board(board_id))?;
        patch.apply(board);
        Ok(())
    }

    /// Run a task/column operation against a copy of the current board and
    /// commit the result through [`BoardStore::update_board`] only if it
    /// succeeds.
    pub fn apply_to_current<T>(
        &mut self,
        op: impl FnOnce(&mut Board) -> Result<T, BoardError>,
    ) -> Result<T, BoardError> {
        let mut draft = self.current_board().cloned().ok_or(BoardError::NoCurrentBoard)?;
        let value = op(&mut draft)?;
        let board_id = draft.id.clone();
        self.update_board(&board_id, draft.into())?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskDraft;
    use crate::ops::task_ops;
    use pretty_assertions::assert_eq;

    fn store_with(names: &[&str]) -> (BoardStore, Vec<String>) {
        let mut store = BoardStore::seeded(Utc::now());
        let ids = names
            .iter()
            .map(|n| store.create_board(n, Utc::now()).unwrap())
            .collect();
        (store, ids)
    }

    #[test]
    fn seeded_store_is_consistent() {
        let store = BoardStore::seeded(Utc::now());
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_board_id(), Some("board-1"));
        let board = store.current_board().unwrap();
        assert!(crate::ops::check::check_board(board).valid);
        assert_eq!(board.tasks.len(), 1);
    }

    #[test]
    fn create_board_becomes_current_with_template() {
        let (store, ids) = store_with(&["Work"]);
        assert_eq!(store.current_board_id(), Some(ids[0].as_str()));
        let board = store.current_board().unwrap();
        assert_eq!(board.name, "Work");
        assert_eq!(board.columns.len(), 4);
        assert!(board.tasks.is_empty());
    }

    #[test]
    fn create_board_rejects_blank_name() {
        let mut store = BoardStore::seeded(Utc::now());
        assert_eq!(
            store.create_board(" ", Utc::now()).unwrap_err(),
            BoardError::Validation("board name")
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deleting_last_board_is_rejected() {
        let mut store = BoardStore::seeded(Utc::now());
        let before = store.clone();
        assert_eq!(store.delete_board("board-1").unwrap_err(), BoardError::MinimumBoard);
        assert_eq!(store, before);
    }

    #[test]
    fn deleting_current_board_selects_first_remaining() {
        let (mut store, ids) = store_with(&["Work", "Home"]);
        store.select_board("board-1").unwrap();
        store.delete_board("board-1").unwrap();
        assert_eq!(store.current_board_id(), Some(ids[0].as_str()));
        let names: Vec<&str> = store.boards().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Work", "Home"]);
    }

    #[test]
    fn deleting_other_board_keeps_selection() {
        let (mut store, ids) = store_with(&["Work", "Home"]);
        store.delete_board(&ids[0]).unwrap();
        assert_eq!(store.current_board_id(), Some(ids[1].as_str()));
    }

    #[test]
    fn select_and_rename() {
        let (mut store, _) = store_with(&["Work"]);
        store.select_board("board-1").unwrap();
        store.rename_board("board-1", "Inbox").unwrap();
        assert_eq!(store.current_board().unwrap().name, "Inbox");
        assert!(store.select_board("nope").is_err());
    }

    #[test]
    fn apply_to_current_commits_on_success_only() {
        let mut store = BoardStore::seeded(Utc::now());
        let id = store
            .apply_to_current(|b| task_ops::add_task(b, TaskDraft::new("New", "done"), Utc::now()))
            .unwrap();
        assert!(store.current_board().unwrap().task(&id).is_some());

        let before = store.clone();
        let err = store
            .apply_to_current(|b| {
                task_ops::delete_task(b, &id)?;
                task_ops::move_task(b, "task-1", "nowhere", 0)
            })
            .unwrap_err();
        assert_eq!(err, BoardError::UnknownColumn("nowhere".into()));
        assert_eq!(store, before);
    }
}
