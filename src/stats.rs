//! Aggregate statistics over a project's tasks.
//!
//! Everything here is a pure transformation: the caller supplies the task
//! list, the member directory for name resolution, and the current instant.
//! Nothing reads the clock, so results are reproducible in tests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::fields::{TaskPriority, TaskStatus};
use crate::task::Task;
use crate::user::User;

/// Fixed figures shown on the statistics card while the backend has no spend
/// tracking. TODO: replace with real numbers once the API exposes used budget.
pub const PLACEHOLDER_BUDGET: f64 = 15_000.0;
pub const PLACEHOLDER_USED_BUDGET: f64 = 4_500.0;

/// Label used when no member qualifies for a ranking.
pub const NO_MEMBER: &str = "Ninguno";

/// The statistics card for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStats {
    pub total_tasks: usize,
    pub overdue_tasks: usize,
    pub best_member: String,
    pub worst_member: String,
    pub todo_tasks: usize,
    pub in_progress_tasks: usize,
    pub done_tasks: usize,
    pub high_priority_tasks: usize,
    pub medium_priority_tasks: usize,
    pub low_priority_tasks: usize,
    pub budget: f64,
    pub used_budget: f64,
}

/// Per-user task overview shown on the personal statistics screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTaskStats {
    pub total_tasks: usize,
    pub todo_tasks: usize,
    pub in_progress_tasks: usize,
    pub done_tasks: usize,
    pub high_priority_tasks: usize,
    pub medium_priority_tasks: usize,
    pub low_priority_tasks: usize,
}

/// Compute the statistics card for one project's tasks.
///
/// `users` is the directory used to resolve the best member's display name;
/// a missing entry degrades to the "Usuario {id}" label. `now` decides
/// overdue status and must come from the caller.
pub fn compute_project_stats(tasks: &[Task], users: &[User], now: DateTime<Utc>) -> ProjectStats {
    let overdue_tasks = tasks
        .iter()
        .filter(|t| is_overdue(t, now))
        .count();

    let count_status = |s: TaskStatus| tasks.iter().filter(|t| t.status == s).count();
    let count_priority = |p: TaskPriority| tasks.iter().filter(|t| t.priority == p).count();

    ProjectStats {
        total_tasks: tasks.len(),
        overdue_tasks,
        best_member: best_member_label(tasks, users),
        worst_member: worst_member_label(tasks),
        todo_tasks: count_status(TaskStatus::ToDo),
        in_progress_tasks: count_status(TaskStatus::InProgress),
        done_tasks: count_status(TaskStatus::Done),
        high_priority_tasks: count_priority(TaskPriority::High),
        medium_priority_tasks: count_priority(TaskPriority::Medium),
        low_priority_tasks: count_priority(TaskPriority::Low),
        budget: PLACEHOLDER_BUDGET,
        used_budget: PLACEHOLDER_USED_BUDGET,
    }
}

/// Compute the per-user overview for a task list already scoped to one user.
pub fn compute_user_stats(tasks: &[Task]) -> UserTaskStats {
    UserTaskStats {
        total_tasks: tasks.len(),
        todo_tasks: tasks.iter().filter(|t| t.status == TaskStatus::ToDo).count(),
        in_progress_tasks: tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count(),
        done_tasks: tasks.iter().filter(|t| t.status == TaskStatus::Done).count(),
        high_priority_tasks: tasks
            .iter()
            .filter(|t| t.priority == TaskPriority::High)
            .count(),
        medium_priority_tasks: tasks
            .iter()
            .filter(|t| t.priority == TaskPriority::Medium)
            .count(),
        low_priority_tasks: tasks
            .iter()
            .filter(|t| t.priority == TaskPriority::Low)
            .count(),
    }
}

/// Overdue means the end date is strictly before `now` and the task is not
/// done. Unparseable end dates never count as overdue, unlike the filter's
/// fail-open rule; the asymmetry is deliberate.
fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    match parse_instant(&task.end_date) {
        Some(end) => end < now && task.status != TaskStatus::Done,
        None => false,
    }
}

/// Parse a backend timestamp, trying the known formats in priority order:
/// RFC 3339 with offset, `T`-separated without offset, space-separated with
/// fractional seconds, plain date. Naive forms are taken as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Completion counts per assignee over the tasks selected by `pick`, in
/// first-seen order. A task counts once per assignee.
fn assignee_counts(tasks: &[Task], pick: impl Fn(TaskStatus) -> bool) -> Vec<(i64, usize)> {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for task in tasks.iter().filter(|t| pick(t.status)) {
        for &uid in &task.assigned_user_ids {
            match counts.iter_mut().find(|(id, _)| *id == uid) {
                Some((_, n)) => *n += 1,
                None => counts.push((uid, 1)),
            }
        }
    }
    counts
}

/// Maximum by count; on ties the assignee seen earliest in the input wins.
fn top_assignee(counts: &[(i64, usize)]) -> Option<i64> {
    let mut best: Option<(i64, usize)> = None;
    for &(id, n) in counts {
        match best {
            Some((_, best_n)) if n <= best_n => {}
            _ => best = Some((id, n)),
        }
    }
    best.map(|(id, _)| id)
}

fn best_member_label(tasks: &[Task], users: &[User]) -> String {
    let counts = assignee_counts(tasks, |s| s == TaskStatus::Done);
    match top_assignee(&counts) {
        Some(id) => match users.iter().find(|u| u.id == id) {
            Some(user) => user.display_name(),
            None => format!("Usuario {id}"),
        },
        None => NO_MEMBER.to_string(),
    }
}

// Unlike the best member, the worst member is never resolved to a name.
fn worst_member_label(tasks: &[Task]) -> String {
    let counts = assignee_counts(tasks, |s| {
        s == TaskStatus::ToDo || s == TaskStatus::InProgress
    });
    match top_assignee(&counts) {
        Some(id) => format!("Usuario {id}"),
        None => NO_MEMBER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: i64, status: TaskStatus, priority: TaskPriority, assignees: &[i64]) -> Task {
        Task {
            id,
            task_id: id,
            project_id: 1,
            title: format!("task {id}"),
            description: String::new(),
            start_date: "2024-03-01".to_string(),
            end_date: "2024-03-10".to_string(),
            status,
            priority,
            assigned_user_ids: assignees.to_vec(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn user(id: i64, name: &str, last: &str) -> User {
        serde_json::from_str(&format!(
            r#"{{"id":{id},"email":"u{id}@x","roles":["ROLE_MEMBER"],"name":"{name}",
                "lastName":"{last}","imageUrl":null,"salary":null,"projectIds":[1]}}"#
        ))
        .unwrap()
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_gives_zeroes_and_ninguno() {
        let stats = compute_project_stats(&[], &[], noon(2024, 3, 15));
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.overdue_tasks, 0);
        assert_eq!(stats.todo_tasks + stats.in_progress_tasks + stats.done_tasks, 0);
        assert_eq!(stats.best_member, NO_MEMBER);
        assert_eq!(stats.worst_member, NO_MEMBER);
        assert_eq!(stats.budget, PLACEHOLDER_BUDGET);
        assert_eq!(stats.used_budget, PLACEHOLDER_USED_BUDGET);
    }

    #[test]
    fn status_counts_partition_the_total() {
        let tasks = vec![
            task(1, TaskStatus::ToDo, TaskPriority::Low, &[]),
            task(2, TaskStatus::InProgress, TaskPriority::Low, &[]),
            task(3, TaskStatus::Done, TaskPriority::Low, &[]),
            task(4, TaskStatus::Canceled, TaskPriority::Low, &[]),
            task(5, TaskStatus::Done, TaskPriority::High, &[]),
        ];
        let stats = compute_project_stats(&tasks, &[], noon(2024, 3, 15));
        let canceled = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Canceled)
            .count();
        assert_eq!(
            stats.total_tasks,
            stats.todo_tasks + stats.in_progress_tasks + stats.done_tasks + canceled
        );
        assert_eq!(stats.high_priority_tasks, 1);
        assert_eq!(stats.low_priority_tasks, 4);
    }

    #[test]
    fn overdue_counts_past_unfinished_tasks_only() {
        let mut past_open = task(1, TaskStatus::ToDo, TaskPriority::Low, &[]);
        past_open.end_date = "2024-03-10".to_string();
        let mut past_done = task(2, TaskStatus::Done, TaskPriority::Low, &[]);
        past_done.end_date = "2024-03-10".to_string();
        let mut future_open = task(3, TaskStatus::ToDo, TaskPriority::Low, &[]);
        future_open.end_date = "2024-04-01".to_string();
        let stats = compute_project_stats(
            &[past_open, past_done, future_open],
            &[],
            noon(2024, 3, 15),
        );
        assert_eq!(stats.overdue_tasks, 1);
    }

    #[test]
    fn unparseable_end_date_is_never_overdue() {
        let mut t = task(1, TaskStatus::ToDo, TaskPriority::Low, &[]);
        t.end_date = "soon".to_string();
        let stats = compute_project_stats(&[t], &[], noon(2024, 3, 15));
        assert_eq!(stats.overdue_tasks, 0);
    }

    #[test]
    fn parse_instant_tries_formats_in_order() {
        assert_eq!(
            parse_instant("2024-03-10T08:30:00+01:00"),
            Some(noon(2024, 3, 10) - chrono::Duration::minutes(270))
        );
        assert_eq!(
            parse_instant("2024-03-10T08:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap())
        );
        assert_eq!(
            parse_instant("2024-03-10 08:30:00.250"),
            Some(
                Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap()
                    + chrono::Duration::milliseconds(250)
            )
        );
        assert_eq!(
            parse_instant("2024-03-10"),
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_instant("10/03/2024"), None);
    }

    #[test]
    fn best_member_is_the_top_completer() {
        let tasks = vec![
            task(1, TaskStatus::Done, TaskPriority::Low, &[5]),
            task(2, TaskStatus::Done, TaskPriority::Low, &[5]),
            task(3, TaskStatus::Done, TaskPriority::Low, &[7]),
        ];
        let users = vec![user(5, "Ana", "García"), user(7, "Luis", "Pérez")];
        let stats = compute_project_stats(&tasks, &users, noon(2024, 3, 15));
        assert_eq!(stats.best_member, "Ana García");
    }

    #[test]
    fn best_member_falls_back_to_generic_label_without_directory_entry() {
        let tasks = vec![task(1, TaskStatus::Done, TaskPriority::Low, &[9])];
        let stats = compute_project_stats(&tasks, &[], noon(2024, 3, 15));
        assert_eq!(stats.best_member, "Usuario 9");
    }

    #[test]
    fn worst_member_is_never_name_resolved() {
        let tasks = vec![
            task(1, TaskStatus::ToDo, TaskPriority::Low, &[5]),
            task(2, TaskStatus::InProgress, TaskPriority::Low, &[5]),
            task(3, TaskStatus::ToDo, TaskPriority::Low, &[7]),
        ];
        let users = vec![user(5, "Ana", "García")];
        let stats = compute_project_stats(&tasks, &users, noon(2024, 3, 15));
        assert_eq!(stats.worst_member, "Usuario 5");
    }

    #[test]
    fn ranking_ties_resolve_to_first_seen_assignee() {
        let tasks = vec![
            task(1, TaskStatus::Done, TaskPriority::Low, &[7]),
            task(2, TaskStatus::Done, TaskPriority::Low, &[5]),
            task(3, TaskStatus::Done, TaskPriority::Low, &[5, 7]),
        ];
        // 7 and 5 both end at two completions; 7 appeared first.
        let stats = compute_project_stats(&tasks, &[], noon(2024, 3, 15));
        assert_eq!(stats.best_member, "Usuario 7");
    }

    #[test]
    fn done_tasks_without_assignees_leave_no_best_member() {
        let tasks = vec![task(1, TaskStatus::Done, TaskPriority::Low, &[])];
        let stats = compute_project_stats(&tasks, &[], noon(2024, 3, 15));
        assert_eq!(stats.best_member, NO_MEMBER);
    }

    #[test]
    fn user_stats_count_by_status_and_priority() {
        let tasks = vec![
            task(1, TaskStatus::ToDo, TaskPriority::High, &[]),
            task(2, TaskStatus::Done, TaskPriority::High, &[]),
            task(3, TaskStatus::InProgress, TaskPriority::Medium, &[]),
        ];
        let stats = compute_user_stats(&tasks);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.todo_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.done_tasks, 1);
        assert_eq!(stats.high_priority_tasks, 2);
        assert_eq!(stats.medium_priority_tasks, 1);
        assert_eq!(stats.low_priority_tasks, 0);
    }
}
