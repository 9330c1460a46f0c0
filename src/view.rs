// src/view.rs

use crate::db;
use crate::error::Result;
use crate::models::{Impact, LogEntry, Task};
use crate::stats::{self, hours, Summary};
use crate::streak;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Everything shown for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayView {
    pub day: NaiveDate,
    pub logs: Vec<LogEntry>,
    pub tasks: Vec<Task>,
    pub summary: Summary,
    /// Current streak, counted back from `today` rather than from `day`.
    pub streak: u32,
}

pub fn compute_day_view(conn: &Connection, day: NaiveDate, today: NaiveDate) -> Result<DayView> {
    let logs = db::logs_by_day(conn, day)?;
    let tasks = db::tasks_by_day(conn, day)?;
    let summary = stats::summarize(&logs, &tasks);
    let streak = streak::current_streak(conn, today)?;
    Ok(DayView {
        day,
        logs,
        tasks,
        summary,
        streak,
    })
}

/// Width of the "HH:MM  " prefix; continuation lines line up under the text.
const CONTINUATION_INDENT: &str = "       ";

fn indent_continuation(s: &str) -> String {
    s.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(&format!("\n{}", CONTINUATION_INDENT))
}

/// Plain-text listing for the terminal.
pub fn render_day(view: &DayView) -> String {
    let mut out = format!("Mission Log · {}\n", view.day.format("%A, %Y-%m-%d"));
    out.push_str(&"─".repeat(40));
    out.push('\n');

    if view.logs.is_empty() {
        out.push_str("No log entries.\n");
    }
    for log in &view.logs {
        let mut line = format!("{}  [{}]", log.ts.format("%H:%M"), log.category);
        if log.duration_min > 0 {
            line.push_str(&format!(" {}m", log.duration_min));
        }
        if log.impact != Impact::Low {
            line.push_str(&format!(" ({})", log.impact));
        }
        line.push_str(&format!(" {}", indent_continuation(&log.text)));
        if !log.outcome.is_empty() {
            line.push_str(&format!(" → {}", indent_continuation(&log.outcome)));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out.push('\n');
    if view.tasks.is_empty() {
        out.push_str("No tasks.\n");
    }
    for task in &view.tasks {
        let mark = if task.done { "x" } else { " " };
        out.push_str(&format!("[{}] #{} {}\n", mark, task.id, task.title));
    }

    let s = &view.summary;
    out.push('\n');
    out.push_str(&format!("Total: {} min ({} h)\n", s.total_minutes, hours(s.total_minutes)));
    out.push_str(&format!(
        "High impact: {} min · Med impact: {} min\n",
        s.high_impact_minutes, s.med_impact_minutes
    ));
    if !s.by_category.is_empty() {
        let parts: Vec<String> = s
            .by_category
            .iter()
            .map(|(category, minutes)| format!("{} {}m", category, minutes))
            .collect();
        out.push_str(&format!("By category: {}\n", parts.join(", ")));
    }
    out.push_str(&format!("Tasks: {} done\n", s.completion()));
    out.push_str(&format!("Streak: {} day(s)\n", view.streak));
    out
}
