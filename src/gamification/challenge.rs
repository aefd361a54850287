use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::model::gamification::{ChallengeType, DailyChallenge};
use crate::model::task::{Priority, Task};
use crate::util::dates::local_date;

struct ChallengeDef {
    kind: ChallengeType,
    title: &'static str,
    description: &'static str,
    target: u32,
    points: u32,
}

const CHALLENGES: [ChallengeDef; 3] = [
    ChallengeDef {
        kind: ChallengeType::CompleteTasks,
        title: "Task Crusher",
        description: "Complete 3 tasks today",
        target: 3,
        points: 30,
    },
    ChallengeDef {
        kind: ChallengeType::HighPriority,
        title: "Priority Focus",
        description: "Complete 2 high-priority tasks",
        target: 2,
        points: 40,
    },
    ChallengeDef {
        kind: ChallengeType::CategoryFocus,
        title: "Category Master",
        description: "Complete tasks in 3 different categories",
        target: 3,
        points: 35,
    },
];

/// The challenge for `date`, with progress measured over the tasks completed
/// that day. Picked by day of month, so the same date always gets the same
/// challenge.
pub fn generate_daily_challenge<'a>(tasks: impl IntoIterator<Item = &'a Task>, date: NaiveDate) -> DailyChallenge {
    let def = &CHALLENGES[date.day() as usize % CHALLENGES.len()];
    let today: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| t.completed && local_date(t.created_at) == date)
        .collect();

    let raw = match def.kind {
        ChallengeType::CompleteTasks => today.len(),
        ChallengeType::HighPriority => today.iter().filter(|t| t.priority == Priority::High).count(),
        ChallengeType::CategoryFocus => today
            .iter()
            .map(|t| t.category.as_str())
            .collect::<HashSet<_>>()
            .len(),
    };
    let progress = u32::try_from(raw).unwrap_or(u32::MAX);

    DailyChallenge {
        id: format!("challenge-{}", date.format("%Y-%m-%d")),
        title: def.title.to_string(),
        description: def.description.to_string(),
        target: def.target,
        progress: progress.min(def.target),
        points: def.points,
        is_completed: progress >= def.target,
        date,
        kind: def.kind,
    }
}
