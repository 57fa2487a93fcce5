use chrono::{NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::clock::Clock;
use crate::date::CanonicalDate;
use crate::error::NextDateError;
use crate::next_date::next_date;
use crate::task::Task;

pub fn normalize<C: Clock + ?Sized>(task: &mut Task, clock: &C) -> Result<(), NextDateError> {
    check_date(task, clock.now())
}

/// Fills in or refreshes the stored date of `task` relative to `now`.
pub fn check_date(task: &mut Task, now: NaiveDateTime) -> Result<(), NextDateError> {
    let today = CanonicalDate::new(now.date())?.to_string();
    if task.date.is_empty() {
        task.date = today;
        return Ok(());
    }

    let stored = CanonicalDate::parse(&task.date)?;
    let stored_start = stored.date().and_time(NaiveTime::MIN);
    if now <= stored_start || task.date == today {
        return Ok(());
    }

    let refreshed = if task.repeat.is_empty() {
        today
    } else {
        next_date(now, &task.date, &task.repeat)?
    };
    debug!(from = %task.date, to = %refreshed, repeat = %task.repeat, "normalized past task date");
    task.date = refreshed;
    Ok(())
}
