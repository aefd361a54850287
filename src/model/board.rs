use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::util::dates::lenient_datetime;

/// A kanban lane. `task_ids` is the display order of the tasks in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Column {
            id: id.into(),
            title: title.into(),
            task_ids: Vec::new(),
        }
    }
}

/// The lanes every new board starts with
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("todo", "To Do"),
        Column::new("in-progress", "In Progress"),
        Column::new("review", "Review"),
        Column::new("done", "Done"),
    ]
}

/// A board: ordered columns plus the tasks they index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_datetime::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Board {
    /// An empty board with the default column template.
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Board {
            id: id.into(),
            name: name.into(),
            created_at,
            columns: default_columns(),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Tasks of one column in display order. Ids without a task are skipped.
    pub fn column_tasks(&self, column_id: &str) -> Vec<&Task> {
        self.column(column_id)
            .map(|col| col.task_ids.iter().filter_map(|id| self.task(id)).collect())
            .unwrap_or_default()
    }
}

/// Field-level update for a board, used to commit the result of a
/// task/column operation or a rename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPatch {
    pub name: Option<String>,
    pub columns: Option<Vec<Column>>,
    pub tasks: Option<Vec<Task>>,
}

impl BoardPatch {
    pub fn apply(self, board: &mut Board) {
        if let Some(name) = self.name {
            board.name = name;
        }
        if let Some(columns) = self.columns {
            board.columns = columns;
        }
        if let Some(tasks) = self.tasks {
            board.tasks = tasks;
        }
    }
}

impl From<Board> for BoardPatch {
    fn from(board: Board) -> Self {
        BoardPatch {
            name: Some(board.name),
            columns: Some(board.columns),
            tasks: Some(board.tasks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_has_four_default_columns() {
        let board = Board::new("b", "Home", Utc::now());
        let titles: Vec<&str> = board.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Review", "Done"]);
        assert!(board.tasks.is_empty());
    }

    #[test]
    fn missing_columns_deserialize_to_template() {
        let board: Board = serde_json::from_str(r#"{"id":"b","name":"Home"}"#).unwrap();
        assert_eq!(board.columns, default_columns());
        assert!(board.tasks.is_empty());
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut board = Board::new("b", "Home", Utc::now());
        let before = board.clone();
        BoardPatch {
            name: Some("Work".into()),
            ..Default::default()
        }
        .apply(&mut board);
        assert_eq!(board.name, "Work");
        assert_eq!(board.columns, before.columns);
    }
}
