//! Due-date rules.

use chrono::NaiveDate;

use super::{Frequency, Task};

/// Days between validations of a weekly task.
pub const WEEKLY_INTERVAL_DAYS: i64 = 7;

/// Whether a task with `frequency`, last validated on `last_validated`, is
/// due on `reference`.
///
/// `once` and `daily` tasks are always due. A weekly task is due when it
/// was never validated or at least seven days have passed.
pub fn is_due(frequency: Frequency, last_validated: Option<NaiveDate>, reference: NaiveDate) -> bool {
    match frequency {
        Frequency::Once | Frequency::Daily => true,
        Frequency::Weekly => match last_validated {
            None => true,
            Some(last) => (reference - last).num_days() >= WEEKLY_INTERVAL_DAYS,
        },
    }
}

/// Whether a task still needs doing in the period containing `today`.
///
/// `is_due` alone would keep a finished one-off task and a daily task
/// validated this morning on the list.
pub fn is_open_on(task: &Task, today: NaiveDate) -> bool {
    if !task.is_due_on(today) {
        return false;
    }
    match task.frequency {
        Frequency::Once => !task.completed,
        Frequency::Daily => task.last_validated != Some(today),
        Frequency::Weekly => true,
    }
}

/// Tasks to show on the "due today" list, in file order.
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    tasks.iter().filter(|t| is_open_on(t, today)).cloned().collect()
}

/// Split tasks into (open today, not open today).
pub fn partition_due(tasks: Vec<Task>, today: NaiveDate) -> (Vec<Task>, Vec<Task>) {
    tasks.into_iter().partition(|t| is_open_on(t, today))
}
