// src/report.rs

use crate::db;
use crate::error::{MlogError, Result};
use crate::models::{Impact, LogEntry, Task};
use crate::stats::{self, hours, Summary};
use crate::streak;
use chrono::{Days, NaiveDate, SecondsFormat};
use rusqlite::Connection;
use std::io;

pub const CSV_MIME: &str = "text/csv";
pub const CSV_HEADER: [&str; 7] = [
    "Type",
    "Timestamp",
    "Category",
    "Text",
    "Outcome/Status",
    "Duration",
    "Impact",
];

/// Days covered by a weekly report, end day included.
pub const WEEK_DAYS: u64 = 7;

/// A rendered CSV export of one day.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub mime: &'static str,
    pub body: String,
}

pub fn csv_filename(day: NaiveDate) -> String {
    format!("mission_log_{}.csv", day.format("%Y-%m-%d"))
}

/// 导出某一天的日志与任务为 CSV
pub fn export_day_csv(conn: &Connection, day: NaiveDate) -> Result<CsvExport> {
    let logs = db::logs_by_day(conn, day)?;
    let tasks = db::tasks_by_day(conn, day)?;
    Ok(CsvExport {
        filename: csv_filename(day),
        mime: CSV_MIME,
        body: render_csv(&logs, &tasks)?,
    })
}

/// All logs in query order, then all tasks in query order.
pub fn render_csv(logs: &[LogEntry], tasks: &[Task]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for log in logs {
        let duration = log.duration_min.to_string();
        let ts = log.ts.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        wtr.write_record([
            "Log",
            ts.as_str(),
            log.category.as_str(),
            log.text.as_str(),
            log.outcome.as_str(),
            duration.as_str(),
            log.impact.as_str(),
        ])?;
    }

    for task in tasks {
        let ts = task.ts.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let status = if task.done { "Done" } else { "Pending" };
        wtr.write_record(["Task", ts.as_str(), "-", task.title.as_str(), status, "-", "-"])?;
    }

    let bytes = wtr.into_inner().map_err(|e| MlogError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| MlogError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// First day of the weekly window ending at `end`. Fails when the window
/// would start before the earliest date chrono can represent.
pub fn week_start(end: NaiveDate) -> Result<NaiveDate> {
    end.checked_sub_days(Days::new(WEEK_DAYS - 1))
        .ok_or_else(|| MlogError::InvalidDate(end.to_string()))
}

/// 生成以 `end` 结尾的七天周报。连续天数以 `today` 为参考日
pub fn weekly_report(conn: &Connection, end: NaiveDate, today: NaiveDate) -> Result<String> {
    let start = week_start(end)?;
    let logs = db::logs_by_range(conn, start, end)?;
    let tasks = db::tasks_by_range(conn, start, end)?;
    let summary = stats::summarize(&logs, &tasks);
    let streak = streak::current_streak(conn, today)?;
    Ok(render_weekly(start, end, &logs, &summary, streak))
}

/// Renders the weekly Markdown document.
///
/// `logs` must be sorted by day and then by timestamp, otherwise a day's
/// heading is repeated.
pub fn render_weekly(
    start: NaiveDate,
    end: NaiveDate,
    logs: &[LogEntry],
    summary: &Summary,
    streak: u32,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# Weekly Report: {} to {}\n\n",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    ));

    out.push_str("## Summary\n\n");
    out.push_str(&format!(
        "- **Total time:** {} min ({} h)\n",
        summary.total_minutes,
        hours(summary.total_minutes)
    ));
    out.push_str(&format!(
        "- **High impact:** {} min ({} h)\n",
        summary.high_impact_minutes,
        hours(summary.high_impact_minutes)
    ));
    out.push_str(&format!(
        "- **Med impact:** {} min ({} h)\n",
        summary.med_impact_minutes,
        hours(summary.med_impact_minutes)
    ));
    out.push_str(&format!("- **Tasks completed:** {}\n", summary.completion()));
    out.push_str(&format!(
        "- **Current streak:** {} day{}\n\n",
        streak,
        if streak == 1 { "" } else { "s" }
    ));

    out.push_str("## Time by Category\n\n");
    if summary.by_category.is_empty() {
        out.push_str("_No time logged._\n");
    }
    for (category, minutes) in &summary.by_category {
        out.push_str(&format!("- **{}**: {} min ({} h)\n", category, minutes, hours(*minutes)));
    }
    out.push('\n');

    out.push_str("## Daily Notes\n");
    if logs.is_empty() {
        out.push_str("\n_No entries this week._\n");
    }
    let mut current_day: Option<NaiveDate> = None;
    for log in logs {
        if current_day != Some(log.log_date) {
            out.push_str(&format!("\n### {}\n\n", log.log_date.format("%Y-%m-%d")));
            current_day = Some(log.log_date);
        }
        out.push_str(&note_line(log));
        out.push('\n');
    }

    out
}

/// Folds multi-line input into one line so every note stays a single bullet
/// and no line of user text can start a heading of its own.
fn single_line(s: &str) -> String {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn note_line(log: &LogEntry) -> String {
    let mut line = format!("- **{}**", log.category);
    if log.duration_min > 0 {
        line.push_str(&format!(" ({} min)", log.duration_min));
    }
    if log.impact != Impact::Low {
        line.push_str(&format!(" [{}]", log.impact));
    }
    line.push_str(&format!(": {}", single_line(&log.text)));
    let outcome = single_line(&log.outcome);
    if !outcome.is_empty() {
        line.push_str(&format!(" — _{}_", outcome));
    }
    line
}
