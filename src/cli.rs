// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "mlog - a daily mission log for the command line",
    long_about = "mlog records what you did each day as timestamped log entries and checkbox tasks, keeps a running activity streak, and exports a day as CSV or a week as a Markdown report. Data lives in a local SQLite database."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates the config directory and the database tables.
    Init,

    /// Adds a log entry.
    /// If no message is provided via -m, it opens the default editor.
    Log {
        #[arg(short, long, help = "A short, one-line text for the log entry")]
        message: Option<String>,
        #[arg(short, long, help = "Category label (default: General)")]
        category: Option<String>,
        #[arg(short, long, help = "What came out of it")]
        outcome: Option<String>,
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true, help = "Time spent, in minutes")]
        duration: i64,
        #[arg(short, long, help = "Impact: low, med or high (default: low)")]
        impact: Option<String>,
        #[arg(long, help = "Day to log under (format: YYYY-MM-DD, default: today)")]
        day: Option<String>,
    },

    /// Adds a task to a day's checklist.
    Task {
        #[arg(help = "Task title")]
        title: String,
        #[arg(long, help = "Day the task belongs to (format: YYYY-MM-DD, default: today)")]
        day: Option<String>,
    },

    /// Marks a task done, or undone if it already was.
    /// Unknown IDs are ignored.
    Toggle {
        #[arg(help = "The numeric ID of the task")]
        id: i64,
        #[arg(long, help = "Day to show afterwards (format: YYYY-MM-DD, default: today)")]
        day: Option<String>,
    },

    /// Shows a day's entries, tasks, totals and the current streak.
    Show {
        #[arg(long, help = "Day to show (format: YYYY-MM-DD, default: today)")]
        day: Option<String>,
    },

    /// Exports a day's entries and tasks as CSV.
    Export {
        #[arg(long, help = "Day to export (format: YYYY-MM-DD, default: today)")]
        day: Option<String>,
        #[arg(short, long, help = "Write to this file, or into this directory as mission_log_<day>.csv")]
        output: Option<PathBuf>,
    },

    /// Writes a Markdown report of the seven days ending at --end.
    Weekly {
        #[arg(long, help = "Last day of the week (format: YYYY-MM-DD, default: today)")]
        end: Option<String>,
        #[arg(short, long, help = "Write the report to this file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Checks that the database is reachable and prints row counts.
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_flags() {
        let cli = Cli::try_parse_from([
            "mlog", "log", "-m", "wrote docs", "-c", "Docs", "-d", "25", "-i", "high", "--day", "2024-01-02",
        ])
        .unwrap();
        match cli.command {
            Commands::Log {
                message,
                category,
                duration,
                impact,
                day,
                outcome,
            } => {
                assert_eq!(message.as_deref(), Some("wrote docs"));
                assert_eq!(category.as_deref(), Some("Docs"));
                assert_eq!(duration, 25);
                assert_eq!(impact.as_deref(), Some("high"));
                assert_eq!(day.as_deref(), Some("2024-01-02"));
                assert!(outcome.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn toggle_requires_numeric_id() {
        assert!(Cli::try_parse_from(["mlog", "toggle", "abc"]).is_err());
        assert!(Cli::try_parse_from(["mlog", "toggle", "3"]).is_ok());
    }

    #[test]
    fn definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
