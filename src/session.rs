//! The top-level controller: one board store, one scoring state, one timer,
//! all persisted through a single [`Storage`].
//!
//! Every successful mutation is committed in memory first and then saved.
//! A failed save does not roll anything back; it is logged and kept as a
//! pending warning for the caller to surface.

use chrono::{DateTime, Utc};

use crate::gamification::challenge::generate_daily_challenge;
use crate::gamification::{AwardOutcome, Gamification};
use crate::io::board_io::{load_boards, save_boards};
use crate::io::state_io::{
    load_gamification_state, load_pomodoro_settings, save_gamification_state, save_pomodoro_settings,
};
use crate::io::{PersistenceError, Storage};
use crate::model::board::Board;
use crate::model::config::{AppConfig, PomodoroSettings};
use crate::model::gamification::{DailyChallenge, UserStats};
use crate::model::task::{Task, TaskDraft, TaskPatch};
use crate::ops::board_ops::BoardStore;
use crate::ops::check::repair_board;
use crate::ops::{BoardError, column_ops, task_ops};
use crate::pomodoro::{Pomodoro, PomodoroError, validate_settings};
use crate::util::clock::Clock;

pub struct Session<S: Storage, C: Clock> {
    store: BoardStore,
    gamification: Gamification,
    pomodoro: Pomodoro,
    storage: S,
    clock: C,
    save_warning: Option<PersistenceError>,
}

impl<S: Storage, C: Clock> Session<S, C> {
    /// Load everything from `storage`. Missing or unreadable documents fall
    /// back to defaults, and every loaded board is repaired so that its
    /// column index is consistent.
    pub fn open(storage: S, clock: C, config: &AppConfig) -> Self {
        let now = clock.now().with_timezone(&Utc);
        let mut boards = load_boards(&storage, now);
        for board in &mut boards {
            let fixes = repair_board(board);
            if fixes > 0 {
                tracing::warn!(board_id = %board.id, fixes, "repaired inconsistent board on load");
            }
        }

        let configured = match validate_settings(&config.pomodoro) {
            Ok(()) => config.pomodoro,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring configured pomodoro durations");
                PomodoroSettings::default()
            }
        };

        let mut session = Session {
            store: BoardStore::new(boards),
            gamification: load_gamification_state(&storage, config.gamification.weekly_goal),
            pomodoro: Pomodoro::new(load_pomodoro_settings(&storage, configured)),
            storage,
            clock,
            save_warning: None,
        };
        session.sync_stats();
        session
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.store.boards()
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.store.current_board()
    }

    pub fn gamification(&self) -> &Gamification {
        &self.gamification
    }

    pub fn user_stats(&self) -> &UserStats {
        self.gamification.user_stats()
    }

    pub fn pomodoro(&self) -> &Pomodoro {
        &self.pomodoro
    }

    /// The timer, for start/pause/tick. Use
    /// [`Session::update_pomodoro_settings`] to change durations so they are
    /// saved.
    pub fn pomodoro_mut(&mut self) -> &mut Pomodoro {
        &mut self.pomodoro
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Today's challenge over the tasks of every board. Recomputed on each call.
    pub fn daily_challenge(&self) -> DailyChallenge {
        let tasks = self.store.boards().flat_map(|b| b.tasks.iter());
        generate_daily_challenge(tasks, self.clock.now().date_naive())
    }

    /// The most recent save failure, if any, clearing it.
    pub fn take_save_warning(&mut self) -> Option<PersistenceError> {
        self.save_warning.take()
    }

    // -----------------------------------------------------------------------
    // Boards
    // -----------------------------------------------------------------------

    pub fn create_board(&mut self, name: &str) -> Result<String, BoardError> {
        let now = self.now_utc();
        let id = self.store.create_board(name, now)?;
        tracing::info!(board_id = %id, "board created");
        self.persist_boards();
        Ok(id)
    }

    pub fn delete_board(&mut self, board_id: &str) -> Result<Board, BoardError> {
        let removed = self.store.delete_board(board_id).inspect_err(|e| {
            tracing::debug!(board_id, error = %e, "board not deleted");
        })?;
        tracing::info!(board_id, tasks = removed.tasks.len(), "board deleted");
        self.persist_boards();
        self.sync_stats();
        Ok(removed)
    }

    /// Switch the current board. The selection is not persisted; a reload
    /// starts on the first board.
    pub fn select_board(&mut self, board_id: &str) -> Result<(), BoardError> {
        self.store.select_board(board_id)
    }

    pub fn rename_board(&mut self, board_id: &str, name: &str) -> Result<(), BoardError> {
        self.store.rename_board(board_id, name)?;
        self.persist_boards();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tasks (current board)
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<String, BoardError> {
        let id = self.on_current_board(|board, now| task_ops::add_task(board, draft, now))?;
        self.sync_stats();
        Ok(id)
    }

    /// Apply `patch` to a task. When it moves the task from incomplete to
    /// completed, the completion is scored and the outcome returned; a task
    /// is only ever scored once.
    pub fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> Result<Option<AwardOutcome>, BoardError> {
        let was_completed = self
            .store
            .current_board()
            .and_then(|b| b.task(task_id))
            .is_some_and(|t| t.completed);
        self.on_current_board(|board, _| task_ops::update_task(board, task_id, patch))?;

        let completed_task = self
            .store
            .current_board()
            .and_then(|b| b.task(task_id))
            .filter(|t| t.completed && !was_completed)
            .cloned();
        let outcome = completed_task.and_then(|task| self.award(&task));
        self.sync_stats();
        Ok(outcome)
    }

    /// Flip a task's completion flag.
    pub fn toggle_task(&mut self, task_id: &str) -> Result<Option<AwardOutcome>, BoardError> {
        let completed = self
            .store
            .current_board()
            .ok_or(BoardError::NoCurrentBoard)?
            .task(task_id)
            .ok_or_else(|| BoardError::task(task_id))?
            .completed;
        self.update_task(task_id, &TaskPatch::completed(!completed))
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<Task, BoardError> {
        let task = self.on_current_board(|board, _| task_ops::delete_task(board, task_id))?;
        self.sync_stats();
        Ok(task)
    }

    pub fn move_task(&mut self, task_id: &str, target_column_id: &str, target_index: usize) -> Result<(), BoardError> {
        self.on_current_board(|board, _| task_ops::move_task(board, task_id, target_column_id, target_index))
    }

    // -----------------------------------------------------------------------
    // Columns (current board)
    // -----------------------------------------------------------------------

    pub fn add_column(&mut self, title: &str) -> Result<String, BoardError> {
        self.on_current_board(|board, _| column_ops::add_column(board, title))
    }

    pub fn update_column(&mut self, column_id: &str, title: &str) -> Result<(), BoardError> {
        self.on_current_board(|board, _| column_ops::update_column(board, column_id, title))
    }

    pub fn move_column(&mut self, column_id: &str, new_index: usize) -> Result<(), BoardError> {
        self.on_current_board(|board, _| column_ops::move_column(board, column_id, new_index))
    }

    /// Delete a column, moving its tasks to the first remaining column.
    /// Returns the ids of the moved tasks.
    pub fn delete_column(&mut self, column_id: &str) -> Result<Vec<String>, BoardError> {
        self.on_current_board(|board, _| column_ops::delete_column(board, column_id))
    }

    // -----------------------------------------------------------------------
    // Gamification and timer settings
    // -----------------------------------------------------------------------

    pub fn update_weekly_goal(&mut self, goal: u32) {
        self.gamification.update_weekly_goal(goal);
        self.persist_gamification();
    }

    /// Clear all scoring and start over. Boards are untouched.
    pub fn reset_gamification(&mut self) {
        self.gamification.reset();
        self.sync_stats();
        self.persist_gamification();
    }

    pub fn update_pomodoro_settings(&mut self, settings: PomodoroSettings) -> Result<(), PomodoroError> {
        self.pomodoro.update_settings(settings)?;
        if let Err(e) = save_pomodoro_settings(&self.storage, &settings) {
            self.record_save_failure(e);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    /// Run a task/column operation on the current board, then save.
    fn on_current_board<T>(
        &mut self,
        op: impl FnOnce(&mut Board, DateTime<Utc>) -> Result<T, BoardError>,
    ) -> Result<T, BoardError> {
        let now = self.now_utc();
        let value = self.store.apply_to_current(|board| op(board, now)).inspect_err(|e| {
            tracing::debug!(error = %e, "board operation rejected");
        })?;
        self.persist_boards();
        Ok(value)
    }

    fn award(&mut self, task: &Task) -> Option<AwardOutcome> {
        let boards: Vec<&Board> = self.store.boards().collect();
        let outcome = self
            .gamification
            .handle_task_completion(task, &boards, self.clock.now())?;
        self.persist_gamification();
        Some(outcome)
    }

    /// Refresh task-derived counters, saving only when they changed.
    fn sync_stats(&mut self) {
        let boards: Vec<&Board> = self.store.boards().collect();
        if self.gamification.sync_with_tasks(&boards, self.clock.now()) {
            self.persist_gamification();
        }
    }

    fn persist_boards(&mut self) {
        if let Err(e) = save_boards(&self.storage, self.store.boards()) {
            self.record_save_failure(e);
        }
    }

    fn persist_gamification(&mut self) {
        if let Err(e) = save_gamification_state(&self.storage, &self.gamification) {
            self.record_save_failure(e);
        }
    }

    fn record_save_failure(&mut self, error: PersistenceError) {
        tracing::warn!(error = %error, "save failed, keeping in-memory state");
        self.save_warning = Some(error);
    }
}
