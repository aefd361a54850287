use chrono::{DateTime, Local, TimeZone, Utc};

use crate::model::task::{Priority, Task};

/// Points for completing any task
pub const TASK_COMPLETED: u32 = 10;
/// Points for completing a high-priority task (replaces [`TASK_COMPLETED`])
pub const HIGH_PRIORITY_TASK: u32 = 15;
/// Bonus for finishing by the due date
pub const TASK_ON_TIME: u32 = 5;

/// Points earned by a completed task, evaluated at `now`.
///
/// High priority replaces the base award; a due date that has not yet passed
/// adds the on-time bonus. Incomplete tasks never get the bonus.
pub fn calculate_task_points(task: &Task, now: DateTime<Utc>) -> u32 {
    let mut points = match task.priority {
        Priority::High => HIGH_PRIORITY_TASK,
        Priority::Low | Priority::Medium => TASK_COMPLETED,
    };
    if task.completed && deadline(task).is_some_and(|due| now <= due) {
        points += TASK_ON_TIME;
    }
    points
}

/// The instant a task is due: its due date, moved to `due_time` on the same
/// local day when one is set.
pub fn deadline(task: &Task) -> Option<DateTime<Utc>> {
    let due = task.due_date?;
    let Some(time) = task.due_time else {
        return Some(due);
    };
    let local_day = due.with_timezone(&Local).date_naive();
    Local
        .from_local_datetime(&local_day.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .or(Some(due))
}
