// src/db.rs

use crate::error::Result;
use crate::models::{Impact, LogEntry, NewLogEntry, NewTask, Task};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS log_entries (
        id INTEGER PRIMARY KEY,
        log_date TEXT NOT NULL,
        ts TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'General',
        text TEXT NOT NULL,
        outcome TEXT DEFAULT '',
        duration_min INTEGER DEFAULT 0,
        impact TEXT DEFAULT 'Low'
    );
    CREATE INDEX IF NOT EXISTS idx_log_entries_date ON log_entries (log_date, ts);
    CREATE INDEX IF NOT EXISTS idx_log_entries_category ON log_entries (category);

    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY,
        log_date TEXT NOT NULL,
        ts TEXT NOT NULL,
        title TEXT NOT NULL,
        done INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks (log_date, ts);
";

const LOG_COLUMNS: &str = "id, log_date, ts, category, text, outcome, duration_min, impact";
const TASK_COLUMNS: &str = "id, log_date, ts, title, done";

/// 打开数据库连接，必要时创建目录和表
pub fn open_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    initialize_schema(&conn)?;
    debug!(path = %db_path.display(), "opened database");
    Ok(conn)
}

/// 如果表不存在则创建
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn timestamp_key(ts: DateTime<Utc>) -> String {
    // Fixed-width UTC form so lexical order in SQL equals chronological order.
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn day_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| conversion_error(idx, e))
}

fn log_from_row(row: &Row) -> rusqlite::Result<LogEntry> {
    let impact: Option<String> = row.get(7)?;
    Ok(LogEntry {
        id: row.get(0)?,
        log_date: day_column(row, 1)?,
        ts: timestamp_column(row, 2)?,
        category: row.get(3)?,
        text: row.get(4)?,
        outcome: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        duration_min: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
        impact: Impact::from_column(impact.as_deref()),
    })
}

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        log_date: day_column(row, 1)?,
        ts: timestamp_column(row, 2)?,
        title: row.get(3)?,
        done: row.get(4)?,
    })
}

/// 插入一条新的日志，时间戳为当前时间
pub fn add_log(conn: &Connection, entry: &NewLogEntry) -> Result<i64> {
    add_log_at(conn, entry, Utc::now())
}

pub fn add_log_at(conn: &Connection, entry: &NewLogEntry, ts: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO log_entries (log_date, ts, category, text, outcome, duration_min, impact)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            day_key(entry.log_date),
            timestamp_key(ts),
            entry.category,
            entry.text,
            entry.outcome,
            entry.duration_min,
            entry.impact.as_str(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, day = %entry.log_date, category = %entry.category, "log entry recorded");
    Ok(id)
}

/// 插入一条新的任务
pub fn add_task(conn: &Connection, task: &NewTask) -> Result<i64> {
    add_task_at(conn, task, Utc::now())
}

pub fn add_task_at(conn: &Connection, task: &NewTask, ts: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO tasks (log_date, ts, title, done) VALUES (?1, ?2, ?3, 0)",
        params![day_key(task.log_date), timestamp_key(ts), task.title],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, day = %task.log_date, "task recorded");
    Ok(id)
}

/// 根据ID获取单个任务
pub fn get_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let query = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
    let task = conn.query_row(&query, [id], task_from_row).optional()?;
    Ok(task)
}

/// 切换任务的完成状态。返回 false 表示该ID不存在
pub fn toggle_task(conn: &Connection, id: i64) -> Result<bool> {
    let count = conn.execute("UPDATE tasks SET done = NOT done WHERE id = ?", [id])?;
    if count == 0 {
        debug!(id, "toggle ignored, no such task");
    } else {
        info!(id, "task toggled");
    }
    Ok(count > 0)
}

pub fn logs_by_day(conn: &Connection, day: NaiveDate) -> Result<Vec<LogEntry>> {
    logs_by_range(conn, day, day)
}

pub fn tasks_by_day(conn: &Connection, day: NaiveDate) -> Result<Vec<Task>> {
    tasks_by_range(conn, day, day)
}

/// 查询日期范围内（含两端）的日志，按日期、时间排序
pub fn logs_by_range(conn: &Connection, start: NaiveDate, end: NaiveDate) -> Result<Vec<LogEntry>> {
    let query = format!(
        "SELECT {} FROM log_entries WHERE log_date BETWEEN ?1 AND ?2 ORDER BY log_date, ts, id",
        LOG_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let logs = stmt
        .query_map(params![day_key(start), day_key(end)], log_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(%start, %end, count = logs.len(), "fetched log entries");
    Ok(logs)
}

pub fn tasks_by_range(conn: &Connection, start: NaiveDate, end: NaiveDate) -> Result<Vec<Task>> {
    let query = format!(
        "SELECT {} FROM tasks WHERE log_date BETWEEN ?1 AND ?2 ORDER BY log_date, ts, id",
        TASK_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let tasks = stmt
        .query_map(params![day_key(start), day_key(end)], task_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(%start, %end, count = tasks.len(), "fetched tasks");
    Ok(tasks)
}

pub fn log_exists_on_day(conn: &Connection, day: NaiveDate) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM log_entries WHERE log_date = ?)",
        [day_key(day)],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn done_task_exists_on_day(conn: &Connection, day: NaiveDate) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM tasks WHERE log_date = ? AND done = 1)",
        [day_key(day)],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// 统计日志与任务总数 (logs, tasks)
pub fn count_rows(conn: &Connection) -> Result<(i64, i64)> {
    let logs = conn.query_row("SELECT COUNT(*) FROM log_entries", [], |row| row.get(0))?;
    let tasks = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
    Ok((logs, tasks))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn
    }

    pub fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn at(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&day.and_hms_opt(hour, minute, 0).unwrap())
    }

    pub fn log(d: NaiveDate, category: &str, text: &str, minutes: i64, impact: Impact) -> NewLogEntry {
        NewLogEntry::new(d, Some(category), text, None, minutes, impact).unwrap()
    }

    #[test]
    fn stores_and_reads_back_a_log_entry() {
        let conn = memory_db();
        let d = day("2024-05-01");
        let entry = NewLogEntry::new(d, Some("Code"), "parser", Some("merged"), 45, Impact::High).unwrap();
        let id = add_log_at(&conn, &entry, at(d, 9, 30)).unwrap();

        let logs = logs_by_day(&conn, d).unwrap();
        assert_eq!(logs.len(), 1);
        let got = &logs[0];
        assert_eq!(got.id, id);
        assert_eq!(got.log_date, d);
        assert_eq!(got.ts, at(d, 9, 30));
        assert_eq!(got.category, "Code");
        assert_eq!(got.outcome, "merged");
        assert_eq!(got.duration_min, 45);
        assert_eq!(got.impact, Impact::High);
    }

    #[test]
    fn null_columns_read_as_defaults() {
        let conn = memory_db();
        conn.execute(
            "INSERT INTO log_entries (log_date, ts, category, text, outcome, duration_min, impact)
             VALUES ('2024-05-01', '2024-05-01T08:00:00.000000Z', 'General', 'legacy', NULL, NULL, NULL)",
            [],
        )
        .unwrap();

        let logs = logs_by_day(&conn, day("2024-05-01")).unwrap();
        assert_eq!(logs[0].duration_min, 0);
        assert_eq!(logs[0].impact, Impact::Low);
        assert_eq!(logs[0].outcome, "");
    }

    #[test]
    fn day_queries_sort_by_timestamp() {
        let conn = memory_db();
        let d = day("2024-05-01");
        add_log_at(&conn, &log(d, "A", "late", 0, Impact::Low), at(d, 18, 0)).unwrap();
        add_log_at(&conn, &log(d, "A", "early", 0, Impact::Low), at(d, 7, 0)).unwrap();
        add_log_at(&conn, &log(day("2024-05-02"), "A", "other day", 0, Impact::Low), at(d, 6, 0))
            .unwrap();

        let texts: Vec<_> = logs_by_day(&conn, d).unwrap().into_iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["early", "late"]);
    }

    #[test]
    fn range_queries_are_inclusive_and_sorted_by_day_then_time() {
        let conn = memory_db();
        let start = day("2024-05-01");
        for offset in (0..4).rev() {
            let d = start + Duration::days(offset);
            add_log_at(&conn, &log(d, "A", &format!("d{}", offset), 0, Impact::Low), at(d, 12, 0))
                .unwrap();
            add_task_at(&conn, &NewTask::new(d, &format!("t{}", offset)).unwrap(), at(d, 12, 0))
                .unwrap();
        }

        let logs = logs_by_range(&conn, start, start + Duration::days(2)).unwrap();
        let texts: Vec<_> = logs.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["d0", "d1", "d2"]);

        let tasks = tasks_by_range(&conn, start + Duration::days(1), start + Duration::days(3)).unwrap();
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn toggle_flips_and_tolerates_unknown_ids() {
        let conn = memory_db();
        let d = day("2024-05-01");
        let id = add_task(&conn, &NewTask::new(d, "review").unwrap()).unwrap();

        assert!(!get_task(&conn, id).unwrap().unwrap().done);
        assert!(toggle_task(&conn, id).unwrap());
        assert!(get_task(&conn, id).unwrap().unwrap().done);
        assert!(toggle_task(&conn, id).unwrap());
        assert!(!get_task(&conn, id).unwrap().unwrap().done);

        assert!(!toggle_task(&conn, 9999).unwrap());
        assert!(get_task(&conn, 9999).unwrap().is_none());
    }

    #[test]
    fn existence_checks() {
        let conn = memory_db();
        let d = day("2024-05-01");
        assert!(!log_exists_on_day(&conn, d).unwrap());
        assert!(!done_task_exists_on_day(&conn, d).unwrap());

        let id = add_task(&conn, &NewTask::new(d, "open").unwrap()).unwrap();
        assert!(!done_task_exists_on_day(&conn, d).unwrap());
        toggle_task(&conn, id).unwrap();
        assert!(done_task_exists_on_day(&conn, d).unwrap());

        add_log(&conn, &log(d, "A", "x", 0, Impact::Low)).unwrap();
        assert!(log_exists_on_day(&conn, d).unwrap());
        assert_eq!(count_rows(&conn).unwrap(), (1, 1));
    }

    #[test]
    fn open_connection_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/mission_log.db");
        let conn = open_connection(&path).unwrap();
        assert!(path.exists());
        assert_eq!(count_rows(&conn).unwrap(), (0, 0));
    }
}
