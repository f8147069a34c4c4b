//! Month-grid calendar bucketing.
//!
//! The grid is always 6 full weeks (42 days) starting on the most recent
//! Sunday on or before the first of the month, so every month renders with
//! the same shape. A task lands in every bucket whose date falls inside the
//! task's [start, end] date range, bounds inclusive.

use chrono::{Datelike, Duration, NaiveDate};

use crate::task::{date_part, Task};

/// One day slot in the 42-day grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub tasks: Vec<Task>,
}

/// Build the 42-day grid for the month containing `month_anchor`.
pub fn calendar_days(month_anchor: NaiveDate, tasks: &[Task]) -> Vec<CalendarDay> {
    let first = month_anchor.with_day(1).unwrap_or(month_anchor);
    let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);

    (0..42)
        .map(|offset| {
            let date = start + Duration::days(offset);
            CalendarDay {
                day: date.day(),
                date,
                is_current_month: date.month() == first.month() && date.year() == first.year(),
                tasks: tasks
                    .iter()
                    .filter(|t| range_contains(t, date))
                    .cloned()
                    .collect(),
            }
        })
        .collect()
}

/// Tasks active on one chosen date, over the full collection.
///
/// This consumer compares the zero-padded ISO date lexicographically against
/// the raw date strings instead of parsing; both containment checks agree on
/// edge dates.
pub fn tasks_on_date(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    let date_str = date.format("%Y-%m-%d").to_string();
    tasks
        .iter()
        .filter(|t| {
            let start = date_part(&t.start_date);
            let end = date_part(&t.end_date);
            date_str.as_str() >= start && date_str.as_str() <= end
        })
        .cloned()
        .collect()
}

/// Date-only containment with inclusive bounds. A bound that does not parse
/// is treated as unbounded, so malformed dates fall back to inclusion.
fn range_contains(task: &Task, date: NaiveDate) -> bool {
    let start_ok = parse_day(&task.start_date).map_or(true, |s| date >= s);
    let end_ok = parse_day(&task.end_date).map_or(true, |e| date <= e);
    start_ok && end_ok
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_part(s), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{TaskPriority, TaskStatus};
    use chrono::Weekday;

    fn task(id: i64, start: &str, end: &str) -> Task {
        Task {
            id,
            task_id: id,
            project_id: 1,
            title: format!("task {id}"),
            description: String::new(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assigned_user_ids: vec![],
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grid_is_42_contiguous_days_starting_sunday() {
        let days = calendar_days(day(2024, 3, 15), &[]);
        assert_eq!(days.len(), 42);
        assert_eq!(days[0].date.weekday(), Weekday::Sun);
        for pair in days.windows(2) {
            assert_eq!(pair[1].date, pair[0].date + Duration::days(1));
        }
        // March 1, 2024 is a Friday, so the grid opens on Sunday Feb 25.
        assert_eq!(days[0].date, day(2024, 2, 25));
    }

    #[test]
    fn month_starting_on_sunday_opens_with_its_first_day() {
        let days = calendar_days(day(2024, 9, 1), &[]);
        assert_eq!(days[0].date, day(2024, 9, 1));
        assert!(days[0].is_current_month);
    }

    #[test]
    fn current_month_flag_covers_exactly_the_month() {
        let days = calendar_days(day(2024, 3, 1), &[]);
        let in_month = days.iter().filter(|d| d.is_current_month).count();
        assert_eq!(in_month, 31);
    }

    #[test]
    fn year_boundary_keeps_neighbouring_months_flagged_out() {
        let days = calendar_days(day(2024, 1, 10), &[]);
        assert_eq!(days[0].date, day(2023, 12, 31));
        assert!(!days[0].is_current_month);
        assert!(days.iter().any(|d| d.is_current_month));
    }

    #[test]
    fn task_appears_in_every_bucket_of_its_range_inclusive() {
        let t = task(1, "2024-03-10", "2024-03-12");
        let days = calendar_days(day(2024, 3, 1), &[t]);
        let busy: Vec<NaiveDate> = days
            .iter()
            .filter(|d| !d.tasks.is_empty())
            .map(|d| d.date)
            .collect();
        assert_eq!(busy, vec![day(2024, 3, 10), day(2024, 3, 11), day(2024, 3, 12)]);
    }

    #[test]
    fn single_day_task_lands_in_one_bucket() {
        let t = task(1, "2024-03-05", "2024-03-05");
        let days = calendar_days(day(2024, 3, 1), &[t]);
        let busy: Vec<NaiveDate> = days
            .iter()
            .filter(|d| !d.tasks.is_empty())
            .map(|d| d.date)
            .collect();
        assert_eq!(busy, vec![day(2024, 3, 5)]);
    }

    #[test]
    fn timestamps_are_truncated_to_their_date() {
        let t = task(1, "2024-03-10T09:00:00Z", "2024-03-11T17:30:00Z");
        let days = calendar_days(day(2024, 3, 1), &[t]);
        let busy: Vec<NaiveDate> = days
            .iter()
            .filter(|d| !d.tasks.is_empty())
            .map(|d| d.date)
            .collect();
        assert_eq!(busy, vec![day(2024, 3, 10), day(2024, 3, 11)]);
    }

    #[test]
    fn malformed_start_bound_falls_back_to_inclusion() {
        let t = task(1, "whenever", "2024-03-02");
        let days = calendar_days(day(2024, 3, 1), &[t]);
        // Unbounded start: every grid day up to the end date is busy.
        let busy = days.iter().filter(|d| !d.tasks.is_empty()).count();
        let expected = days.iter().filter(|d| d.date <= day(2024, 3, 2)).count();
        assert_eq!(busy, expected);
        assert!(busy > 0);
    }

    #[test]
    fn empty_input_still_yields_42_empty_buckets() {
        let days = calendar_days(day(2024, 6, 30), &[]);
        assert_eq!(days.len(), 42);
        assert!(days.iter().all(|d| d.tasks.is_empty()));
    }

    #[test]
    fn selected_day_view_includes_edge_dates() {
        let tasks = vec![task(1, "2024-03-10", "2024-03-12")];
        assert_eq!(tasks_on_date(&tasks, day(2024, 3, 10)).len(), 1);
        assert_eq!(tasks_on_date(&tasks, day(2024, 3, 12)).len(), 1);
        assert!(tasks_on_date(&tasks, day(2024, 3, 13)).is_empty());
        assert!(tasks_on_date(&tasks, day(2024, 3, 9)).is_empty());
    }

    #[test]
    fn selected_day_view_agrees_with_bucket_containment_on_edges() {
        let tasks = vec![task(1, "2024-03-10T00:00:00Z", "2024-03-12T23:00:00Z")];
        let days = calendar_days(day(2024, 3, 1), &tasks);
        for d in &days {
            let bucketed = !d.tasks.is_empty();
            let selected = !tasks_on_date(&tasks, d.date).is_empty();
            assert_eq!(bucketed, selected, "disagreement on {}", d.date);
        }
    }
}
