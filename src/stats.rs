// src/stats.rs

use crate::models::{Impact, LogEntry, Task};
use std::collections::HashMap;

/// Derived statistics for a day or an inclusive date range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_minutes: i64,
    pub high_impact_minutes: i64,
    pub med_impact_minutes: i64,
    /// Category totals, largest first. Ties keep the order in which the
    /// category first appeared in the input.
    pub by_category: Vec<(String, i64)>,
    pub done_tasks: usize,
    pub total_tasks: usize,
}

/// Aggregates already-validated logs and tasks of one scope.
pub fn summarize(logs: &[LogEntry], tasks: &[Task]) -> Summary {
    let mut summary = Summary::default();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for log in logs {
        let minutes = log.duration_min;
        summary.total_minutes += minutes;
        match log.impact {
            Impact::High => summary.high_impact_minutes += minutes,
            Impact::Med => summary.med_impact_minutes += minutes,
            Impact::Low => {}
        }

        match slots.get(log.category.as_str()) {
            Some(&i) => summary.by_category[i].1 += minutes,
            None => {
                slots.insert(log.category.as_str(), summary.by_category.len());
                summary.by_category.push((log.category.clone(), minutes));
            }
        }
    }
    // sort_by is stable, so equal totals stay in first-seen order
    summary.by_category.sort_by(|a, b| b.1.cmp(&a.1));

    summary.total_tasks = tasks.len();
    summary.done_tasks = tasks.iter().filter(|t| t.done).count();
    summary
}

pub fn hours(minutes: i64) -> String {
    format!("{:.2}", minutes as f64 / 60.0)
}

impl Summary {
    #[cfg(test)]
    pub fn category_minutes(&self, category: &str) -> Option<i64> {
        self.by_category
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, minutes)| *minutes)
    }

    /// "done/total", e.g. "3/5"
    pub fn completion(&self) -> String {
        format!("{}/{}", self.done_tasks, self.total_tasks)
    }
}
