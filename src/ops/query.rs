use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use regex::RegexBuilder;

use crate::model::task::Task;

/// List-view sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    DueDate,
    Priority,
    Category,
    Title,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// How far ahead "due soon" looks
pub const DUE_SOON_DAYS: i64 = 3;

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Case-insensitive substring match on title, description and category.
/// A blank query matches everything.
pub fn filter_tasks_by_search<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let query = query.trim();
    if query.is_empty() {
        return tasks.iter().collect();
    }
    let Ok(re) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return Vec::new();
    };
    tasks
        .iter()
        .filter(|t| re.is_match(&t.title) || re.is_match(&t.description) || re.is_match(&t.category))
        .collect()
}

pub fn filter_tasks_by_column<'a>(tasks: &'a [Task], column_id: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.column_id == column_id).collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort a copy of `tasks`. In ascending order, priority runs high to low and
/// creation date newest first; tasks without a due date always come last
/// when sorting by due date.
pub fn sort_tasks(tasks: &[Task], sort_by: SortOption, order: SortOrder) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        if sort_by == SortOption::DueDate {
            match (a.due_date, b.due_date) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Less,
                (Some(_), Some(_)) => {}
            }
        }
        let result = match sort_by {
            SortOption::DueDate => a.due_date.cmp(&b.due_date),
            SortOption::Priority => b.priority.rank().cmp(&a.priority.rank()),
            SortOption::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
            SortOption::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOption::CreatedAt => b.created_at.cmp(&a.created_at),
        };
        match order {
            SortOrder::Asc => result,
            SortOrder::Desc => result.reverse(),
        }
    });
    sorted
}

// ---------------------------------------------------------------------------
// Due dates
// ---------------------------------------------------------------------------

pub fn is_task_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.due_date.is_some_and(|due| now > due)
}

pub fn overdue_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    tasks.iter().filter(|t| is_task_overdue(t, now)).collect()
}

/// Tasks due between now and [`DUE_SOON_DAYS`] from now.
pub fn tasks_due_soon(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    let horizon = now + Duration::days(DUE_SOON_DAYS);
    tasks
        .iter()
        .filter(|t| t.due_date.is_some_and(|due| due >= now && due <= horizon))
        .collect()
}
