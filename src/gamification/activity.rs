use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::model::task::Task;
use crate::util::dates::local_date;

/// Consecutive-day counts of completed tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

/// Local calendar days on which at least one completed task was created.
fn completed_days<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> BTreeSet<NaiveDate> {
    tasks
        .into_iter()
        .filter(|t| t.completed)
        .map(|t| local_date(t.created_at))
        .collect()
}

/// Current and longest streaks, by calendar day of `created_at`.
///
/// The current streak is anchored on `today` if it has activity, else on
/// yesterday, else it is zero; from the anchor it walks back day by day.
/// The longest streak is the longest run of consecutive active days, and is
/// never less than the current one.
pub fn calculate_streak<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> Streak {
    let days = completed_days(tasks);
    if days.is_empty() {
        return Streak::default();
    }

    let yesterday = today.pred_opt();
    let anchor = if days.contains(&today) {
        Some(today)
    } else {
        yesterday.filter(|d| days.contains(d))
    };
    let mut current = 0;
    let mut day = anchor;
    while let Some(d) = day.filter(|d| days.contains(d)) {
        current += 1;
        day = d.pred_opt();
    }

    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &d in days.iter().rev() {
        run = match prev {
            Some(p) if p.pred_opt() == Some(d) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(d);
    }

    Streak {
        current,
        longest: longest.max(current),
    }
}

/// Completed tasks created in the ISO week (Monday to Sunday) containing `today`.
pub fn calculate_weekly_progress<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> u32 {
    let week = today.iso_week();
    let count = tasks
        .into_iter()
        .filter(|t| t.completed && local_date(t.created_at).iso_week() == week)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
