use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration from taskboard.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub gamification: GamificationConfig,
    #[serde(default)]
    pub pomodoro: PomodoroSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where board and scoring files live. When unset, the XDG data dir is used.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationConfig {
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal: u32,
}

impl Default for GamificationConfig {
    fn default() -> Self {
        GamificationConfig {
            weekly_goal: default_weekly_goal(),
        }
    }
}

/// Default weekly completion goal
pub const DEFAULT_WEEKLY_GOAL: u32 = 10;

fn default_weekly_goal() -> u32 {
    DEFAULT_WEEKLY_GOAL
}

/// Pomodoro durations in minutes. Also the shape persisted under the
/// pomodoro storage key, which historically used `workDuration`/`breakDuration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    #[serde(default = "default_work_minutes", alias = "workDuration")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes", alias = "breakDuration")]
    pub break_minutes: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        PomodoroSettings {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

fn default_work_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}
