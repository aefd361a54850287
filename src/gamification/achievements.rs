use std::collections::HashSet;

use chrono::{DateTime, Local, Timelike, Utc};

use crate::model::board::Board;
use crate::model::gamification::{Achievement, AchievementCategory, UserStats};
use crate::model::task::{Priority, Task};
use crate::util::dates::local_date;

/// Every achievement the app knows about. Each variant has exactly one
/// progress rule in [`AchievementKind::progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    FirstTask,
    Tasks10,
    Tasks50,
    Tasks100,
    HighPriorityMaster,
    Streak3,
    Streak7,
    Streak30,
    EarlyBird,
    NightOwl,
    Level5,
    Level10,
    Perfectionist,
    SpeedDemon,
    CategoryExplorer,
}

/// Static description of a catalog entry
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub kind: AchievementKind,
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub points: u32,
    /// Progress needed to unlock
    pub max_progress: u32,
}

#[allow(clippy::too_many_arguments)]
const fn def(
    kind: AchievementKind,
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    category: AchievementCategory,
    points: u32,
    max_progress: u32,
) -> AchievementDef {
    AchievementDef {
        kind,
        id,
        title,
        description,
        icon,
        category,
        points,
        max_progress,
    }
}

use AchievementCategory::{Consistency, Milestone, Productivity, Special};
use AchievementKind as K;

pub const CATALOG: [AchievementDef; 15] = [
    def(K::FirstTask, "first_task", "Getting Started", "Complete your first task", "🎉", Productivity, 50, 1),
    def(K::Tasks10, "task_10", "Task Warrior", "Complete 10 tasks", "⚔️", Productivity, 100, 10),
    def(K::Tasks50, "task_50", "Productivity Machine", "Complete 50 tasks", "🤖", Productivity, 200, 50),
    def(K::Tasks100, "task_100", "Century Club", "Complete 100 tasks", "💯", Milestone, 500, 100),
    def(K::HighPriorityMaster, "high_priority_master", "Priority Master", "Complete 20 high-priority tasks", "🔥", Productivity, 150, 20),
    def(K::Streak3, "streak_3", "Getting Consistent", "Maintain a 3-day streak", "🔥", Consistency, 75, 3),
    def(K::Streak7, "streak_7", "Week Warrior", "Maintain a 7-day streak", "📅", Consistency, 150, 7),
    def(K::Streak30, "streak_30", "Monthly Master", "Maintain a 30-day streak", "🗓️", Consistency, 300, 30),
    def(K::EarlyBird, "early_bird", "Early Bird", "Complete a task before 9 AM", "🌅", Special, 25, 1),
    def(K::NightOwl, "night_owl", "Night Owl", "Complete a task after 10 PM", "🦉", Special, 25, 1),
    def(K::Level5, "level_5", "Rising Star", "Reach level 5", "⭐", Milestone, 250, 1),
    def(K::Level10, "level_10", "Legendary Status", "Reach the maximum level", "👑", Milestone, 1000, 1),
    def(K::Perfectionist, "perfectionist", "Perfectionist", "Complete all tasks in a board", "✨", Special, 100, 1),
    def(K::SpeedDemon, "speed_demon", "Speed Demon", "Complete 5 tasks in one day", "💨", Productivity, 75, 5),
    def(K::CategoryExplorer, "category_explorer", "Category Explorer", "Complete tasks in 5 different categories", "🗂️", Special, 100, 5),
];

impl AchievementKind {
    pub fn def(self) -> &'static AchievementDef {
        // CATALOG has one entry per variant.
        CATALOG.iter().find(|d| d.kind == self).unwrap_or(&CATALOG[0])
    }

    pub fn from_id(id: &str) -> Option<Self> {
        CATALOG.iter().find(|d| d.id == id).map(|d| d.kind)
    }

    /// Raw (unclamped) progress towards this achievement.
    fn progress(self, ctx: &EvalContext<'_>) -> u32 {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let flag = |b: bool| u32::from(b);
        let completed = ctx.completed.len();
        match self {
            K::FirstTask | K::Tasks10 | K::Tasks50 | K::Tasks100 => count(completed),
            K::HighPriorityMaster => count(
                ctx.completed
                    .iter()
                    .filter(|t| t.priority == Priority::High)
                    .count(),
            ),
            K::Streak3 | K::Streak7 | K::Streak30 => ctx.stats.current_streak,
            K::EarlyBird => flag(ctx.completed.iter().any(|t| local_hour(t.created_at) < 9)),
            K::NightOwl => flag(ctx.completed.iter().any(|t| local_hour(t.created_at) >= 22)),
            K::Level5 => flag(ctx.stats.level >= 5),
            K::Level10 => flag(ctx.stats.level >= 10),
            K::Perfectionist => flag(
                ctx.boards
                    .iter()
                    .any(|b| !b.tasks.is_empty() && b.tasks.iter().all(|t| t.completed)),
            ),
            K::SpeedDemon => count(
                ctx.completed
                    .iter()
                    .filter(|t| local_date(t.created_at) == ctx.now.date_naive())
                    .count(),
            ),
            K::CategoryExplorer => count(
                ctx.completed
                    .iter()
                    .map(|t| t.category.as_str())
                    .collect::<HashSet<_>>()
                    .len(),
            ),
        }
    }
}

fn local_hour(instant: DateTime<Utc>) -> u32 {
    instant.with_timezone(&Local).hour()
}

struct EvalContext<'a> {
    completed: Vec<&'a Task>,
    boards: &'a [&'a Board],
    stats: &'a UserStats,
    now: DateTime<Local>,
}

/// Locked achievements for every catalog entry.
pub fn seed_achievements() -> Vec<Achievement> {
    CATALOG.iter().map(locked).collect()
}

fn locked(def: &AchievementDef) -> Achievement {
    Achievement {
        id: def.id.to_string(),
        title: def.title.to_string(),
        description: def.description.to_string(),
        icon: def.icon.to_string(),
        category: def.category,
        points: def.points,
        max_progress: Some(def.max_progress),
        progress: Some(0),
        is_unlocked: false,
        unlocked_at: None,
    }
}

/// Append catalog entries missing from a saved list (e.g. added in a newer
/// release). Existing entries are left as they are.
pub fn merge_catalog(achievements: &mut Vec<Achievement>) -> usize {
    let missing: Vec<Achievement> = CATALOG
        .iter()
        .filter(|d| !achievements.iter().any(|a| a.id == d.id))
        .map(locked)
        .collect();
    let added = missing.len();
    achievements.extend(missing);
    added
}

/// Update progress on every locked achievement in `stats` and unlock the ones
/// whose rule is now met. Unlocked achievements are never touched again.
///
/// Returns copies of the newly unlocked achievements; their points are not
/// added here.
pub fn check_achievements(stats: &mut UserStats, boards: &[&Board], now: DateTime<Local>) -> Vec<Achievement> {
    let updates: Vec<(usize, u32, bool)> = {
        let ctx = EvalContext {
            completed: boards
                .iter()
                .flat_map(|b| b.tasks.iter())
                .filter(|t| t.completed)
                .collect(),
            boards,
            stats,
            now,
        };
        stats
            .achievements
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.is_unlocked)
            .filter_map(|(idx, a)| {
                let def = AchievementKind::from_id(&a.id)?.def();
                let progress = def.kind.progress(&ctx);
                Some((idx, progress.min(def.max_progress), progress >= def.max_progress))
            })
            .collect()
    };

    let mut unlocked = Vec::new();
    for (idx, progress, unlock) in updates {
        let achievement = &mut stats.achievements[idx];
        achievement.progress = Some(progress);
        if unlock {
            achievement.is_unlocked = true;
            achievement.unlocked_at = Some(now.with_timezone(&Utc));
            achievement.progress = achievement.max_progress;
            unlocked.push(achievement.clone());
        }
    }
    unlocked
}
