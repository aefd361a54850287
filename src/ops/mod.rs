pub mod board_ops;
pub mod check;
pub mod column_ops;
pub mod query;
pub mod task_ops;

/// Error type for board, column and task operations.
///
/// Every operation that returns one of these has left the board untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("{0} must not be empty")]
    Validation(&'static str),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("no board is selected")]
    NoCurrentBoard,
    #[error("you must have at least one board")]
    MinimumBoard,
    #[error("a board must keep at least one column")]
    LastColumn,
    #[error("column does not exist on this board: {0}")]
    UnknownColumn(String),
}

impl BoardError {
    pub(crate) fn task(id: &str) -> Self {
        BoardError::NotFound {
            kind: "task",
            id: id.to_string(),
        }
    }

    pub(crate) fn column(id: &str) -> Self {
        BoardError::NotFound {
            kind: "column",
            id: id.to_string(),
        }
    }

    pub(crate) fn board(id: &str) -> Self {
        BoardError::NotFound {
            kind: "board",
            id: id.to_string(),
        }
    }
}

/// Reject blank titles and names.
pub(crate) fn require_non_empty(value: &str, what: &'static str) -> Result<(), BoardError> {
    if value.trim().is_empty() {
        return Err(BoardError::Validation(what));
    }
    Ok(())
}
