// src/streak.rs

use crate::db;
use crate::error::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::debug;

/// Upper bound on the number of days walked.
pub const MAX_STREAK_DAYS: u32 = 365;

/// A day counts when it has any log entry or a task that is currently done.
pub fn is_qualifying_day(conn: &Connection, day: NaiveDate) -> Result<bool> {
    Ok(db::log_exists_on_day(conn, day)? || db::done_task_exists_on_day(conn, day)?)
}

/// 从参考日期（含）向前逐日统计连续有记录的天数
///
/// Always recomputed: toggling a task can add or remove a day after the fact.
pub fn current_streak(conn: &Connection, reference: NaiveDate) -> Result<u32> {
    let mut streak = 0;
    let mut day = reference;

    while streak < MAX_STREAK_DAYS && is_qualifying_day(conn, day)? {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    debug!(%reference, streak, "streak computed");
    Ok(streak)
}
