/// One row of the level table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    pub title: &'static str,
    pub min_points: u32,
    /// Inclusive upper bound; `None` for the top level
    pub max_points: Option<u32>,
    pub color: &'static str,
    pub icon: &'static str,
}

pub const LEVELS: [LevelInfo; 10] = [
    LevelInfo { level: 1, title: "Beginner", min_points: 0, max_points: Some(99), color: "#94a3b8", icon: "🌱" },
    LevelInfo { level: 2, title: "Organizer", min_points: 100, max_points: Some(249), color: "#60a5fa", icon: "📋" },
    LevelInfo { level: 3, title: "Achiever", min_points: 250, max_points: Some(499), color: "#34d399", icon: "🎯" },
    LevelInfo { level: 4, title: "Productivity Pro", min_points: 500, max_points: Some(999), color: "#fbbf24", icon: "⚡" },
    LevelInfo { level: 5, title: "Task Master", min_points: 1000, max_points: Some(1999), color: "#f97316", icon: "🏆" },
    LevelInfo { level: 6, title: "Efficiency Expert", min_points: 2000, max_points: Some(3999), color: "#ef4444", icon: "🚀" },
    LevelInfo { level: 7, title: "Legendary Planner", min_points: 4000, max_points: Some(7999), color: "#8b5cf6", icon: "👑" },
    LevelInfo { level: 8, title: "Productivity Guru", min_points: 8000, max_points: Some(15999), color: "#ec4899", icon: "🧙" },
    LevelInfo { level: 9, title: "Task Deity", min_points: 16000, max_points: Some(31999), color: "#06b6d4", icon: "⭐" },
    LevelInfo { level: 10, title: "Ultimate Organizer", min_points: 32000, max_points: None, color: "#d946ef", icon: "💎" },
];

/// The level whose range contains `points`.
pub fn level_for(points: u32) -> &'static LevelInfo {
    LEVELS
        .iter()
        .rev()
        .find(|l| points >= l.min_points)
        .unwrap_or(&LEVELS[0])
}

/// Points still needed to reach the next level; 0 at the top.
pub fn points_to_next_level(points: u32) -> u32 {
    let current = level_for(points);
    LEVELS
        .iter()
        .find(|l| l.level == current.level + 1)
        .map_or(0, |next| next.min_points.saturating_sub(points))
}
