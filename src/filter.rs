//! Client-side task filtering.
//!
//! A `TaskFilters` value describes the active dimensions; `filter_tasks`
//! returns the tasks matching all of them, in input order. Every dimension is
//! optional and an absent dimension matches everything, so an empty filter is
//! the identity.
//!
//! Date-range comparisons are fail-open: an unparseable date on either side
//! of a comparison makes that comparison pass rather than dropping the task.

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::task::{date_part, Task};

/// Priority dimension of a filter.
///
/// Matching is by normalized label because priorities reach the client both
/// as enumeration values and as free-text labels depending on the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityFilter {
    High,
    Medium,
    Low,
}

impl PriorityFilter {
    /// Accepted spellings, compared after trimming and lowercasing.
    fn synonyms(self) -> &'static [&'static str] {
        match self {
            PriorityFilter::High => &["alta", "high", "high_priority", "highpriority"],
            PriorityFilter::Medium => &["media", "medium", "medium_priority", "mediumpriority"],
            PriorityFilter::Low => &["baja", "low", "low_priority", "lowpriority"],
        }
    }
}

/// Status dimension of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    ToDo,
    InProgress,
    Done,
}

impl StatusFilter {
    /// Accepted labels (localized and raw spellings), compared case-insensitively.
    fn labels(self) -> &'static [&'static str] {
        match self {
            StatusFilter::ToDo => &["Por hacer", "To Do", "TO_DO"],
            StatusFilter::InProgress => &["En progreso", "IN_PROGRESS", "In Progress"],
            StatusFilter::Done => &["Completada", "Done", "DONE"],
        }
    }
}

/// The full filter specification. Dimensions combine with logical AND.
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    /// Case-insensitive substring of title or description. Blank matches all.
    pub query: String,
    pub priority: Option<PriorityFilter>,
    pub status: Option<StatusFilter>,
    pub member_id: Option<i64>,
    /// Inclusive lower bound on the task end date, ISO date string.
    pub date_from: Option<String>,
    /// Inclusive upper bound on the task end date, ISO date string.
    pub date_to: Option<String>,
}

/// Tasks matching every active dimension, in input order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filters: &TaskFilters) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| matches_query(t, &filters.query))
        .filter(|t| matches_priority(t, filters.priority))
        .filter(|t| matches_status(t, filters.status))
        .filter(|t| matches_member(t, filters.member_id))
        .filter(|t| matches_date_range(t, filters.date_from.as_deref(), filters.date_to.as_deref()))
        .collect()
}

fn matches_query(task: &Task, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    task.title.to_lowercase().contains(&q) || task.description.to_lowercase().contains(&q)
}

fn matches_priority(task: &Task, filter: Option<PriorityFilter>) -> bool {
    match filter {
        None => true,
        Some(pf) => {
            let p = task.priority.wire_label().trim().to_lowercase();
            pf.synonyms().contains(&p.as_str())
        }
    }
}

fn matches_status(task: &Task, filter: Option<StatusFilter>) -> bool {
    match filter {
        None => true,
        Some(sf) => {
            let st = task.status.wire_label().to_uppercase();
            sf.labels().iter().any(|label| st == label.to_uppercase())
        }
    }
}

fn matches_member(task: &Task, member_id: Option<i64>) -> bool {
    match member_id {
        None => true,
        Some(uid) => task.assigned_user_ids.contains(&uid),
    }
}

fn matches_date_range(task: &Task, from: Option<&str>, to: Option<&str>) -> bool {
    let from_ok = match from {
        Some(bound) => end_date_cmp(&task.end_date, bound, |end, b| end >= b),
        None => true,
    };
    let to_ok = match to {
        Some(bound) => end_date_cmp(&task.end_date, bound, |end, b| end <= b),
        None => true,
    };
    from_ok && to_ok
}

/// Compare the task end date against one bound; a blank or unparseable date
/// on either side makes the comparison pass.
fn end_date_cmp(task_end: &str, bound: &str, cmp: impl Fn(NaiveDate, NaiveDate) -> bool) -> bool {
    if bound.trim().is_empty() || task_end.trim().is_empty() {
        return true;
    }
    match (parse_day(task_end), parse_day(bound)) {
        (Some(end), Some(b)) => cmp(end, b),
        _ => true,
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_part(s), "%Y-%m-%d").ok()
}
