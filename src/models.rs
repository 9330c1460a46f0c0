// src/models.rs

use crate::error::{MlogError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CATEGORY: &str = "General";

/// Priority tag on a log entry. Stored in the database as "Low", "Med" or "High".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Impact {
    #[default]
    Low,
    Med,
    High,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "Low",
            Impact::Med => "Med",
            Impact::High => "High",
        }
    }

    /// Reads the stored column value. NULL and anything unrecognised count as Low.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("High") => Impact::High,
            Some("Med") => Impact::Med,
            _ => Impact::Low,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Impact {
    type Err = MlogError;

    /// Case-insensitive parse of user input ("low", "med"/"medium", "high").
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Impact::Low),
            "med" | "medium" => Ok(Impact::Med),
            "high" => Ok(Impact::High),
            other => Err(MlogError::Validation(format!(
                "unknown impact '{}', expected low, med or high",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: i64,
    pub log_date: NaiveDate,
    pub ts: DateTime<Utc>,
    pub category: String,
    pub text: String,
    pub outcome: String,
    pub duration_min: i64,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub log_date: NaiveDate,
    pub ts: DateTime<Utc>,
    pub title: String,
    pub done: bool,
}

/// A log entry that passed intake validation and is ready to be stored.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub log_date: NaiveDate,
    pub category: String,
    pub text: String,
    pub outcome: String,
    pub duration_min: i64,
    pub impact: Impact,
}

impl NewLogEntry {
    pub fn new(
        log_date: NaiveDate,
        category: Option<&str>,
        text: &str,
        outcome: Option<&str>,
        duration_min: i64,
        impact: Impact,
    ) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MlogError::Validation("log text must not be empty".to_string()));
        }
        if duration_min < 0 {
            return Err(MlogError::Validation(format!(
                "duration must be zero or more minutes, got {}",
                duration_min
            )));
        }
        let category = match category.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        };

        Ok(NewLogEntry {
            log_date,
            category,
            text: text.to_string(),
            outcome: outcome.map(|o| o.trim().to_string()).unwrap_or_default(),
            duration_min,
            impact,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub log_date: NaiveDate,
    pub title: String,
}

impl NewTask {
    pub fn new(log_date: NaiveDate, title: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MlogError::Validation("task title must not be empty".to_string()));
        }
        Ok(NewTask {
            log_date,
            title: title.to_string(),
        })
    }
}
