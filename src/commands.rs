// src/commands.rs

use crate::config::{config_dir, Config};
use crate::db;
use crate::error::{MlogError, Result};
use crate::models::{Impact, NewLogEntry, NewTask};
use crate::report;
use crate::view::{self, DayView};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Parses a `YYYY-MM-DD` day argument, falling back to `today` when absent.
pub fn parse_day(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match input {
        None => Ok(today),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| MlogError::InvalidDate(raw.to_string())),
    }
}

fn open(config: &Config) -> Result<Connection> {
    db::open_connection(&config.database_path()?)
}

/// 处理 'init' 命令
pub fn handle_init(config: &Config) -> Result<()> {
    std::fs::create_dir_all(config_dir()?)?;
    let db_path = config.database_path()?;
    let conn = db::open_connection(&db_path)?;
    let (logs, tasks) = db::count_rows(&conn)?;
    info!(path = %db_path.display(), "database initialized");
    println!("✓ Database initialized successfully at: {:?}", db_path);
    if logs + tasks > 0 {
        println!("  It already holds {} log entries and {} tasks.", logs, tasks);
    }
    Ok(())
}

/// 打开编辑器让用户输入日志内容
fn read_from_editor() -> Result<String> {
    let temp_file = tempfile::NamedTempFile::new()?;
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor).arg(temp_file.path()).status()?;

    if !status.success() {
        return Err(MlogError::EditorError);
    }
    let mut buf = String::new();
    temp_file.reopen()?.read_to_string(&mut buf)?;
    Ok(buf)
}

pub struct LogArgs {
    pub message: Option<String>,
    pub category: Option<String>,
    pub outcome: Option<String>,
    pub duration: i64,
    pub impact: Option<String>,
    pub day: Option<String>,
}

/// Validates everything before the editor opens or anything is stored.
fn build_log_entry(config: &Config, args: &LogArgs, text: &str) -> Result<NewLogEntry> {
    let log_date = parse_day(args.day.as_deref(), config.today())?;
    let impact = match args.impact.as_deref() {
        Some(raw) => raw.parse::<Impact>()?,
        None => Impact::default(),
    };
    let category = args
        .category
        .as_deref()
        .unwrap_or(config.default_category.as_str());
    NewLogEntry::new(
        log_date,
        Some(category),
        text,
        args.outcome.as_deref(),
        args.duration,
        impact,
    )
}

/// 处理 'log' 命令
pub fn handle_log(config: &Config, args: LogArgs) -> Result<()> {
    let text = match &args.message {
        Some(msg) => msg.clone(),
        None => {
            // Catch a bad --day or --impact before the user writes anything.
            build_log_entry(config, &args, "-")?;
            read_from_editor()?
        }
    };
    let entry = build_log_entry(config, &args, &text)?;

    let conn = open(config)?;
    let id = db::add_log(&conn, &entry)?;
    println!("✓ Log #{} recorded for {}.", id, entry.log_date);
    Ok(())
}

/// 处理 'task' 命令
pub fn handle_task(config: &Config, title: &str, day: Option<&str>) -> Result<()> {
    let log_date = parse_day(day, config.today())?;
    let task = NewTask::new(log_date, title)?;

    let conn = open(config)?;
    let id = db::add_task(&conn, &task)?;
    println!("✓ Task #{} added for {}.", id, log_date);
    Ok(())
}

/// Flips a task and returns the view of `day`. An unknown id changes nothing.
pub fn toggle(conn: &Connection, id: i64, day: NaiveDate, today: NaiveDate) -> Result<DayView> {
    if !db::toggle_task(conn, id)? {
        debug!(id, "no task with this id, showing the day unchanged");
    }
    view::compute_day_view(conn, day, today)
}

/// 处理 'toggle' 命令
pub fn handle_toggle(config: &Config, id: i64, day: Option<&str>) -> Result<()> {
    let today = config.today();
    let day = parse_day(day, today)?;
    let conn = open(config)?;
    let view = toggle(&conn, id, day, today)?;
    match db::get_task(&conn, id)? {
        Some(task) => {
            let state = if task.done { "done" } else { "pending" };
            println!("✓ Task #{} is now {}.\n", id, state);
        }
        None => println!("No task #{}, nothing changed.\n", id),
    }
    print!("{}", view::render_day(&view));
    Ok(())
}

/// 处理 'show' 命令
pub fn handle_show(config: &Config, day: Option<&str>) -> Result<()> {
    let today = config.today();
    let day = parse_day(day, today)?;
    let conn = open(config)?;
    let view = view::compute_day_view(&conn, day, today)?;
    print!("{}", view::render_day(&view));
    Ok(())
}

/// A directory gets the suggested file name appended.
fn export_target(output: &Path, filename: &str) -> PathBuf {
    if output.is_dir() {
        output.join(filename)
    } else {
        output.to_path_buf()
    }
}

/// 处理 'export' 命令
pub fn handle_export(config: &Config, day: Option<&str>, output: Option<PathBuf>) -> Result<()> {
    let day = parse_day(day, config.today())?;
    let conn = open(config)?;
    let export = report::export_day_csv(&conn, day)?;

    match output {
        Some(path) => {
            let target = export_target(&path, &export.filename);
            std::fs::write(&target, &export.body)?;
            info!(path = %target.display(), mime = export.mime, "csv exported");
            eprintln!("✓ Exported {} to {}", day, target.display());
        }
        None => print!("{}", export.body),
    }
    Ok(())
}

/// 处理 'weekly' 命令
pub fn handle_weekly(config: &Config, end: Option<&str>, output: Option<PathBuf>) -> Result<()> {
    let today = config.today();
    let end = parse_day(end, today)?;
    let conn = open(config)?;
    let markdown = report::weekly_report(&conn, end, today)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &markdown)?;
            info!(path = %path.display(), "weekly report written");
            eprintln!("✓ Weekly report written to {}", path.display());
        }
        None => print!("{}", markdown),
    }
    Ok(())
}

/// 处理 'status' 命令
pub fn handle_status(config: &Config) -> Result<()> {
    let db_path = config.database_path()?;
    let conn = open(config)?;
    let (logs, tasks) = db::count_rows(&conn)?;
    println!("status: ok");
    println!("database: {}", db_path.display());
    println!("log entries: {}", logs);
    println!("tasks: {}", tasks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{day, log, memory_db};

    fn config() -> Config {
        Config {
            default_category: "Work".to_string(),
            ..Config::default()
        }
    }

    fn args(day: Option<&str>) -> LogArgs {
        LogArgs {
            message: Some("x".to_string()),
            category: None,
            outcome: None,
            duration: 0,
            impact: None,
            day: day.map(String::from),
        }
    }

    #[test]
    fn parse_day_defaults_and_validates() {
        let today = day("2024-03-15");
        assert_eq!(parse_day(None, today).unwrap(), today);
        assert_eq!(parse_day(Some("2024-02-29"), today).unwrap(), day("2024-02-29"));

        for bad in ["2024-13-01", "yesterday", "", "2023-02-29", "15/03/2024"] {
            let err = parse_day(Some(bad), today).unwrap_err();
            assert!(matches!(err, MlogError::InvalidDate(_)), "{} should be rejected", bad);
            assert!(err.is_bad_request());
        }
    }

    #[test]
    fn log_entry_uses_configured_default_category() {
        let entry = build_log_entry(&config(), &args(Some("2024-01-02")), "notes").unwrap();
        assert_eq!(entry.category, "Work");
        assert_eq!(entry.log_date, day("2024-01-02"));
        assert_eq!(entry.impact, Impact::Low);
    }

    #[test]
    fn log_entry_rejects_bad_input_before_storage() {
        let err = build_log_entry(&config(), &args(Some("2024-1-32")), "notes").unwrap_err();
        assert!(matches!(err, MlogError::InvalidDate(_)));

        let mut bad_impact = args(None);
        bad_impact.impact = Some("critical".to_string());
        assert!(matches!(
            build_log_entry(&config(), &bad_impact, "notes").unwrap_err(),
            MlogError::Validation(_)
        ));

        let mut negative = args(None);
        negative.duration = -1;
        assert!(matches!(
            build_log_entry(&config(), &negative, "notes").unwrap_err(),
            MlogError::Validation(_)
        ));

        assert!(matches!(
            build_log_entry(&config(), &args(None), " \n").unwrap_err(),
            MlogError::Validation(_)
        ));
    }

    #[test]
    fn toggling_twice_restores_state() {
        let conn = memory_db();
        let d = day("2024-03-15");
        let id = db::add_task(&conn, &NewTask::new(d, "file taxes").unwrap()).unwrap();

        let view = toggle(&conn, id, d, d).unwrap();
        assert!(view.tasks[0].done);
        assert_eq!(view.streak, 1);

        let view = toggle(&conn, id, d, d).unwrap();
        assert!(!view.tasks[0].done);
        assert_eq!(view.streak, 0);
    }

    #[test]
    fn toggling_unknown_id_returns_unchanged_view() {
        let conn = memory_db();
        let d = day("2024-03-15");
        db::add_log(&conn, &log(d, "Code", "a", 15, Impact::Med)).unwrap();
        db::add_task(&conn, &NewTask::new(d, "t").unwrap()).unwrap();

        let before = view::compute_day_view(&conn, d, d).unwrap();
        let after = toggle(&conn, 424242, d, d).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn export_into_directory_uses_suggested_name() {
        let dir = tempfile::tempdir().unwrap();
        let target = export_target(dir.path(), "mission_log_2024-03-15.csv");
        assert_eq!(target, dir.path().join("mission_log_2024-03-15.csv"));

        let file = dir.path().join("custom.csv");
        assert_eq!(export_target(&file, "mission_log_2024-03-15.csv"), file);
    }
}
