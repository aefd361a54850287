use chrono::{DateTime, Utc};
use serde_json::Value;

use super::storage::{Storage, StorageKey, write_json};
use super::PersistenceError;
use crate::model::board::{Board, Column};
use crate::model::task::Task;
use crate::ops::board_ops::seed_board;

/// Parse a serialized board list.
///
/// The outer document must be a JSON array. Records without a string `id` and
/// `name`, or that otherwise fail to deserialize, are skipped with a warning.
/// Inside a kept board, `columns` or `tasks` that are not arrays fall back to
/// their defaults and single unreadable columns or tasks are dropped.
/// Missing optional fields get their defaults.
pub fn parse_boards(text: &str) -> Result<Vec<Board>, PersistenceError> {
    let key = StorageKey::Boards;
    let value: Value = serde_json::from_str(text).map_err(|source| PersistenceError::Parse { key, source })?;
    let Value::Array(records) = value else {
        return Err(PersistenceError::Invalid {
            key,
            reason: "expected an array of boards",
        });
    };

    let mut boards = Vec::with_capacity(records.len());
    for (index, mut record) in records.into_iter().enumerate() {
        let has_identity = record.get("id").is_some_and(Value::is_string)
            && record.get("name").is_some_and(Value::is_string);
        if !has_identity {
            tracing::warn!(index, "skipping board record without id or name");
            continue;
        }
        if let Value::Object(fields) = &mut record {
            retain_readable::<Column>(fields, "columns", index);
            retain_readable::<Task>(fields, "tasks", index);
        }
        match serde_json::from_value::<Board>(record) {
            Ok(board) => boards.push(board),
            Err(e) => tracing::warn!(index, error = %e, "skipping unreadable board record"),
        }
    }
    Ok(boards)
}

/// Keep only the entries of `fields[name]` that deserialize as `T`. A value
/// that is not an array, or an array with nothing readable left, is removed
/// so the field default applies.
fn retain_readable<T: serde::de::DeserializeOwned>(
    fields: &mut serde_json::Map<String, Value>,
    name: &'static str,
    board_index: usize,
) {
    let Some(Value::Array(items)) = fields.remove(name) else {
        return;
    };
    let total = items.len();
    let kept: Vec<Value> = items
        .into_iter()
        .filter(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(board_index, field = name, error = %e, "skipping unreadable entry");
                false
            }
        })
        .collect();
    if total > 0 && kept.is_empty() {
        return;
    }
    fields.insert(name.to_string(), Value::Array(kept));
}

/// Load the board list, falling back to the seeded starter board when
/// nothing usable is stored. Never fails.
pub fn load_boards(storage: &impl Storage, now: DateTime<Utc>) -> Vec<Board> {
    let text = match storage.read(StorageKey::Boards) {
        Ok(Some(text)) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::debug!("no saved boards, starting from the seed board");
            return vec![seed_board(now)];
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not read boards, starting from the seed board");
            return vec![seed_board(now)];
        }
    };

    match parse_boards(&text) {
        Ok(boards) if !boards.is_empty() => {
            tracing::debug!(count = boards.len(), "boards loaded");
            boards
        }
        Ok(_) => vec![seed_board(now)],
        Err(e) => {
            tracing::warn!(error = %e, "saved boards are unreadable, starting from the seed board");
            vec![seed_board(now)]
        }
    }
}

/// Serialize `boards` in order and store them.
pub fn save_boards<'a>(
    storage: &impl Storage,
    boards: impl IntoIterator<Item = &'a Board>,
) -> Result<(), PersistenceError> {
    let boards: Vec<&Board> = boards.into_iter().collect();
    write_json(storage, StorageKey::Boards, &boards)
}
