use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Achievement grouping shown in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Productivity,
    Consistency,
    Milestone,
    Special,
}

/// A one-shot milestone. Seeded locked from the catalog; unlocks at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Aggregate scoring state, shared across all boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_points: u32,
    pub level: u32,
    pub current_level_progress: u32,
    /// Points still needed to reach the next level (0 at the top level)
    pub next_level_threshold: u32,
    pub tasks_completed: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<DateTime<Utc>>,
    pub achievements: Vec<Achievement>,
    pub weekly_goal: u32,
    pub weekly_progress: u32,
}

/// What a points entry was awarded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    TaskCompleted,
    StreakBonus,
    Achievement,
    DailyGoal,
}

/// One entry of the points history (newest first, capped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub points: u32,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievement_id: Option<String>,
}

/// The goal measured by a daily challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    CompleteTasks,
    HighPriority,
    CategoryFocus,
}

/// Today's challenge. Derived from the task list on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub target: u32,
    /// Clamped to `target`
    pub progress: u32,
    pub points: u32,
    pub is_completed: bool,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: ChallengeType,
}
