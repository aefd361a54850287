use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::achievements::{check_achievements, merge_catalog, seed_achievements};
use super::activity::{calculate_streak, calculate_weekly_progress};
use super::levels::{level_for, points_to_next_level};
use super::points::calculate_task_points;
use crate::model::board::Board;
use crate::model::config::DEFAULT_WEEKLY_GOAL;
use crate::model::gamification::{Achievement, PointsTransaction, TransactionType, UserStats};
use crate::model::task::Task;
use crate::util::ids::generate_id;

/// Points history keeps this many entries, newest first.
pub const HISTORY_LIMIT: usize = 100;

/// Fresh stats: level 1, no points, every achievement locked.
pub fn default_user_stats(weekly_goal: u32) -> UserStats {
    UserStats {
        total_points: 0,
        level: level_for(0).level,
        current_level_progress: 0,
        next_level_threshold: points_to_next_level(0),
        tasks_completed: 0,
        current_streak: 0,
        longest_streak: 0,
        last_activity_date: None,
        achievements: seed_achievements(),
        weekly_goal,
        weekly_progress: 0,
    }
}

fn default_stats() -> UserStats {
    default_user_stats(DEFAULT_WEEKLY_GOAL)
}

fn refresh_level(stats: &mut UserStats) {
    let level = level_for(stats.total_points);
    stats.level = level.level;
    stats.current_level_progress = stats.total_points - level.min_points;
    stats.next_level_threshold = points_to_next_level(stats.total_points);
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Result of awarding a completed task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardOutcome {
    /// Base task points plus the points of every newly unlocked achievement
    pub points_earned: u32,
    pub new_achievements: Vec<Achievement>,
    pub previous_level: u32,
    pub level: u32,
    pub leveled_up: bool,
}

/// Scoring state shared by all boards: stats, points history and the set of
/// task ids that have already been awarded. Serializes to the persisted
/// `{userStats, pointsHistory, awardedTaskIds}` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gamification {
    #[serde(default = "default_stats")]
    user_stats: UserStats,
    #[serde(default)]
    points_history: VecDeque<PointsTransaction>,
    #[serde(default)]
    awarded_task_ids: BTreeSet<String>,
}

impl Default for Gamification {
    fn default() -> Self {
        Gamification::new(DEFAULT_WEEKLY_GOAL)
    }
}

impl Gamification {
    pub fn new(weekly_goal: u32) -> Self {
        Gamification {
            user_stats: default_user_stats(weekly_goal.max(1)),
            points_history: VecDeque::new(),
            awarded_task_ids: BTreeSet::new(),
        }
    }

    /// Bring a loaded state in line with the current catalog and level table.
    pub fn normalize(&mut self) {
        let added = merge_catalog(&mut self.user_stats.achievements);
        if added > 0 {
            tracing::debug!(added, "achievement catalog extended");
        }
        refresh_level(&mut self.user_stats);
        self.points_history.truncate(HISTORY_LIMIT);
        self.user_stats.weekly_goal = self.user_stats.weekly_goal.max(1);
    }

    pub fn user_stats(&self) -> &UserStats {
        &self.user_stats
    }

    pub fn points_history(&self) -> impl Iterator<Item = &PointsTransaction> {
        self.points_history.iter()
    }

    pub fn is_awarded(&self, task_id: &str) -> bool {
        self.awarded_task_ids.contains(task_id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.user_stats.achievements.iter().find(|a| a.id == id)
    }

    pub fn unlocked_achievements(&self) -> Vec<&Achievement> {
        self.user_stats.achievements.iter().filter(|a| a.is_unlocked).collect()
    }

    pub fn locked_achievements(&self) -> Vec<&Achievement> {
        self.user_stats.achievements.iter().filter(|a| !a.is_unlocked).collect()
    }

    /// The `limit` most recent transactions, newest first.
    pub fn recent_history(&self, limit: usize) -> Vec<&PointsTransaction> {
        self.points_history.iter().take(limit).collect()
    }

    /// Recompute the task-derived counters from every board. Returns whether
    /// anything changed. The longest streak never decreases.
    pub fn sync_with_tasks(&mut self, boards: &[&Board], now: DateTime<Local>) -> bool {
        let today = now.date_naive();
        let tasks = || boards.iter().flat_map(|b| b.tasks.iter());
        let streak = calculate_streak(tasks(), today);
        let weekly = calculate_weekly_progress(tasks(), today);
        let completed = count(tasks().filter(|t| t.completed).count());

        let stats = &mut self.user_stats;
        let longest = stats.longest_streak.max(streak.longest);
        let unchanged = stats.current_streak == streak.current
            && stats.longest_streak == longest
            && stats.weekly_progress == weekly
            && stats.tasks_completed == completed;
        if unchanged {
            return false;
        }
        stats.current_streak = streak.current;
        stats.longest_streak = longest;
        stats.weekly_progress = weekly;
        stats.tasks_completed = completed;
        true
    }

    /// Award a task that has just been completed.
    ///
    /// `boards` must already contain the completed task. Returns `None` when
    /// the task is not completed or was awarded before; a task id is awarded
    /// at most once, even across un-complete/re-complete toggles.
    pub fn handle_task_completion(
        &mut self,
        task: &Task,
        boards: &[&Board],
        now: DateTime<Local>,
    ) -> Option<AwardOutcome> {
        if !task.completed {
            return None;
        }
        if self.awarded_task_ids.contains(&task.id) {
            tracing::debug!(task_id = %task.id, "task already awarded");
            return None;
        }

        let now_utc = now.with_timezone(&Utc);
        let today = now.date_naive();
        let tasks = || boards.iter().flat_map(|b| b.tasks.iter());
        let streak = calculate_streak(tasks(), today);
        let weekly = calculate_weekly_progress(tasks(), today);
        let completed = count(tasks().filter(|t| t.completed).count());

        let stats = &mut self.user_stats;
        let previous_level = stats.level;
        let base = calculate_task_points(task, now_utc);
        stats.total_points = stats.total_points.saturating_add(base);
        refresh_level(stats);
        stats.tasks_completed = completed;
        stats.current_streak = streak.current;
        stats.longest_streak = stats.longest_streak.max(streak.longest);
        stats.last_activity_date = Some(now_utc);
        stats.weekly_progress = weekly;

        let new_achievements = check_achievements(stats, boards, now);
        let bonus: u32 = new_achievements.iter().map(|a| a.points).sum();
        stats.total_points = stats.total_points.saturating_add(bonus);
        refresh_level(stats);
        let level = stats.level;
        let points_earned = base + bonus;

        self.points_history.push_front(PointsTransaction {
            id: generate_id("transaction"),
            kind: TransactionType::TaskCompleted,
            points: points_earned,
            description: format!("Completed: {}", task.title),
            timestamp: now_utc,
            task_id: Some(task.id.clone()),
            achievement_id: None,
        });
        self.points_history.truncate(HISTORY_LIMIT);
        self.awarded_task_ids.insert(task.id.clone());

        tracing::info!(task_id = %task.id, points = points_earned, total = self.user_stats.total_points, "points awarded");
        for achievement in &new_achievements {
            tracing::info!(achievement_id = %achievement.id, points = achievement.points, "achievement unlocked");
        }
        let leveled_up = level > previous_level;
        if leveled_up {
            tracing::info!(previous_level, level, "level up");
        }

        Some(AwardOutcome {
            points_earned,
            new_achievements,
            previous_level,
            level,
            leveled_up,
        })
    }

    /// Set the weekly target. Zero is raised to one.
    pub fn update_weekly_goal(&mut self, goal: u32) {
        self.user_stats.weekly_goal = goal.max(1);
    }

    /// Drop all points, achievements, history and award records. The weekly
    /// goal is kept.
    pub fn reset(&mut self) {
        *self = Gamification::new(self.user_stats.weekly_goal);
        tracing::info!("gamification reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 8, 14, 0, 0).unwrap()
    }

    fn task(id: &str, completed: bool) -> Task {
        Task {
            id: id.into(),
            title: format!("Task {id}"),
            description: String::new(),
            column_id: "todo".into(),
            category: "General".into(),
            priority: Priority::Low,
            due_date: None,
            due_time: None,
            created_at: now().with_timezone(&Utc),
            completed,
        }
    }

    /// Board with one completed task plus an open one, so that the
    /// perfectionist rule stays locked.
    fn board(done: &[&str]) -> Board {
        let mut board = Board::new("b", "B", now().with_timezone(&Utc));
        board.tasks = done.iter().map(|id| task(id, true)).collect();
        board.tasks.push(task("open", false));
        board.column_mut("todo").unwrap().task_ids = board.tasks.iter().map(|t| t.id.clone()).collect();
        board
    }

    #[test]
    fn default_stats_are_level_one_with_locked_catalog() {
        let engine = Gamification::default();
        let stats = engine.user_stats();
        assert_eq!(stats.level, 1);
        assert_eq!(stats.next_level_threshold, 100);
        assert_eq!(stats.weekly_goal, 10);
        assert_eq!(engine.locked_achievements().len(), 15);
        assert!(engine.unlocked_achievements().is_empty());
    }

    #[test]
    fn first_completion_awards_base_plus_first_task() {
        let mut engine = Gamification::default();
        let board = board(&["a"]);
        let outcome = engine
            .handle_task_completion(&board.tasks[0], &[&board], now())
            .unwrap();
        assert_eq!(outcome.points_earned, 10 + 50);
        assert_eq!(
            outcome.new_achievements.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["first_task"]
        );
        let stats = engine.user_stats();
        assert_eq!(stats.total_points, 60);
        assert_eq!(stats.current_level_progress, 60);
        assert_eq!(stats.next_level_threshold, 40);
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.last_activity_date, Some(now().with_timezone(&Utc)));

        let history = engine.recent_history(10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionType::TaskCompleted);
        assert_eq!(history[0].points, 60);
        assert_eq!(history[0].task_id.as_deref(), Some("a"));
        assert_eq!(history[0].description, "Completed: Task a");
    }

    #[test]
    fn task_is_awarded_only_once() {
        let mut engine = Gamification::default();
        let mut board = board(&["a"]);
        assert!(engine.handle_task_completion(&board.tasks[0], &[&board], now()).is_some());
        let snapshot = engine.clone();

        // toggle off and back on
        board.tasks[0].completed = false;
        assert!(engine.handle_task_completion(&board.tasks[0], &[&board], now()).is_none());
        board.tasks[0].completed = true;
        assert!(engine.handle_task_completion(&board.tasks[0], &[&board], now()).is_none());
        assert_eq!(engine, snapshot);
        assert!(engine.is_awarded("a"));
    }

    #[test]
    fn level_is_recomputed_after_achievement_bonus() {
        let mut engine = Gamification::default();
        engine.user_stats.total_points = 45;
        refresh_level(&mut engine.user_stats);
        let board = board(&["a"]);
        let outcome = engine
            .handle_task_completion(&board.tasks[0], &[&board], now())
            .unwrap();
        // 45 + 10 stays on level 1; the first_task bonus reaches 105
        assert_eq!(outcome.points_earned, 60);
        assert_eq!(outcome.previous_level, 1);
        assert_eq!(outcome.level, 2);
        assert!(outcome.leveled_up);
        let stats = engine.user_stats();
        assert_eq!(stats.total_points, 105);
        assert_eq!(stats.current_level_progress, 5);
        assert_eq!(stats.next_level_threshold, 145);
    }

    #[test]
    fn history_is_capped_newest_first() {
        let mut engine = Gamification::default();
        let ids: Vec<String> = (0..HISTORY_LIMIT + 5).map(|i| format!("t{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let board = board(&id_refs);
        for t in board.tasks.iter().filter(|t| t.completed) {
            engine.handle_task_completion(t, &[&board], now());
        }
        assert_eq!(engine.points_history().count(), HISTORY_LIMIT);
        let newest = engine.recent_history(1)[0];
        assert_eq!(newest.task_id.as_deref(), Some(ids.last().unwrap().as_str()));
    }

    #[test]
    fn sync_updates_counters_and_keeps_longest_streak() {
        let mut engine = Gamification::default();
        engine.user_stats.longest_streak = 9;
        let board = board(&["a", "b"]);
        assert!(engine.sync_with_tasks(&[&board], now()));
        let stats = engine.user_stats();
        assert_eq!(stats.tasks_completed, 2);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 9);
        assert_eq!(stats.weekly_progress, 2);
        assert!(!engine.sync_with_tasks(&[&board], now()));
    }

    #[test]
    fn sync_drops_stale_streak() {
        let mut engine = Gamification::default();
        let board = board(&["a"]);
        engine.sync_with_tasks(&[&board], now());
        engine.sync_with_tasks(&[&board], now() + Duration::days(3));
        assert_eq!(engine.user_stats().current_streak, 0);
        assert_eq!(engine.user_stats().longest_streak, 1);
    }

    #[test]
    fn reset_keeps_weekly_goal() {
        let mut engine = Gamification::new(4);
        let board = board(&["a"]);
        engine.handle_task_completion(&board.tasks[0], &[&board], now());
        engine.update_weekly_goal(7);
        engine.reset();
        assert_eq!(engine, Gamification::new(7));
        assert!(!engine.is_awarded("a"));
    }

    #[test]
    fn persisted_shape_round_trips_and_normalizes() {
        let mut engine = Gamification::default();
        let board = board(&["a"]);
        engine.handle_task_completion(&board.tasks[0], &[&board], now());
        let json = serde_json::to_value(&engine).unwrap();
        assert!(json.get("userStats").is_some());
        assert!(json.get("pointsHistory").is_some());
        assert_eq!(json["awardedTaskIds"], serde_json::json!(["a"]));

        let mut loaded: Gamification = serde_json::from_value(json).unwrap();
        loaded.normalize();
        assert_eq!(loaded, engine);
    }

    #[test]
    fn normalize_fixes_level_and_catalog() {
        let mut engine = Gamification::default();
        engine.user_stats.total_points = 1200;
        engine.user_stats.achievements.truncate(3);
        engine.normalize();
        assert_eq!(engine.user_stats().level, 5);
        assert_eq!(engine.user_stats().current_level_progress, 200);
        assert_eq!(engine.user_stats().achievements.len(), 15);
        assert!(engine.achievement("category_explorer").is_some());
    }
}
