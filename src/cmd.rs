//! Subcommand definitions and handlers.
//!
//! Handlers fetch through the API client, run the pure helpers (filtering,
//! statistics, calendar bucketing) on the fetched collections, and print
//! fixed-width tables. They return errors; process exit codes are decided in
//! `main`.

use std::io;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use log::warn;

use crate::api::ApiClient;
use crate::calendar::{calendar_days, tasks_on_date, CalendarDay};
use crate::cli::Cli;
use crate::fields::{format_priority, format_status, TaskPriority, TaskStatus};
use crate::filter::{filter_tasks, PriorityFilter, StatusFilter, TaskFilters};
use crate::project::{Project, ProjectCreateRequest, ProjectUpdateRequest};
use crate::session::{CredentialStore, Credentials};
use crate::stats::{compute_project_stats, compute_user_stats, ProjectStats, UserTaskStats};
use crate::task::{date_part, Task, TaskCreateRequest, TaskUpdateRequest};
use crate::user::{members_of_project, split_username, Notification, SignUpRequest, User, UserUpdateRequest};

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token.
    Login {
        email: String,
        password: String,
    },

    /// Drop the stored session token.
    Logout {
        /// Also forget the stored email and password.
        #[arg(long)]
        forget: bool,
    },

    /// Register a new leader account.
    Register {
        /// Full name; the first word becomes the name, the rest the last name.
        username: String,
        email: String,
        password: String,
    },

    /// Show or update the signed-in profile.
    Me {
        /// New full name.
        #[arg(long)]
        name: Option<String>,
        /// New avatar URL.
        #[arg(long)]
        image_url: Option<String>,
        /// New hourly salary.
        #[arg(long)]
        salary: Option<f64>,
    },

    /// Project operations.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Task operations.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Statistics card for one project.
    Stats {
        project_id: i64,
    },

    /// Task overview for one user.
    UserStats {
        user_id: i64,
        /// Restrict to one project.
        #[arg(long)]
        project: Option<i64>,
    },

    /// Month calendar of task date ranges.
    Calendar {
        /// Month to render, YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        /// Restrict to one project.
        #[arg(long)]
        project: Option<i64>,
        /// List the tasks active on one date, YYYY-MM-DD.
        #[arg(long)]
        date: Option<String>,
    },

    /// List my notifications.
    Notifications,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects, optionally scoped to a member or leader.
    List {
        #[arg(long)]
        member: Option<i64>,
        #[arg(long)]
        leader: Option<i64>,
    },
    /// Show one project.
    View { id: i64 },
    /// Create a project.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        desc: String,
        #[arg(long, default_value = "")]
        image_url: String,
        #[arg(long, default_value_t = 0.0)]
        budget: f64,
        /// End date, YYYY-MM-DD.
        #[arg(long)]
        end: String,
    },
    /// Update fields on a project; omitted fields keep their value.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete a project.
    Delete { id: i64 },
    /// Join a project by its key.
    Join { key: String },
    /// Set the join code of a project.
    SetCode { id: i64, code: String },
    /// List the member-role users of a project.
    Members { id: i64 },
    /// Remove a member from a project.
    RemoveMember { id: i64, member_id: i64 },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks with optional scope and filters.
    List {
        /// Scope to one project.
        #[arg(long)]
        project: Option<i64>,
        /// Scope to one user.
        #[arg(long)]
        user: Option<i64>,
        /// Text to look for in title or description.
        #[arg(long)]
        query: Option<String>,
        /// Priority filter: high | medium | low.
        #[arg(long, value_enum)]
        priority: Option<PriorityFilter>,
        /// Status filter: to-do | in-progress | done.
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
        /// Only tasks assigned to this member.
        #[arg(long)]
        member: Option<i64>,
        /// Only tasks ending on or after this date, YYYY-MM-DD.
        #[arg(long)]
        from: Option<String>,
        /// Only tasks ending on or before this date, YYYY-MM-DD.
        #[arg(long)]
        to: Option<String>,
    },
    /// Show one task.
    View { id: i64 },
    /// Create a task.
    Add {
        title: String,
        #[arg(long)]
        project: i64,
        #[arg(long, default_value = "")]
        desc: String,
        /// Start date, YYYY-MM-DD.
        #[arg(long)]
        start: String,
        /// End date, YYYY-MM-DD.
        #[arg(long)]
        end: String,
        #[arg(long, value_enum, default_value_t = TaskStatus::ToDo)]
        status: TaskStatus,
        #[arg(long, value_enum, default_value_t = TaskPriority::Medium)]
        priority: TaskPriority,
        /// Assignee user id. May be repeated.
        #[arg(long = "assign")]
        assignees: Vec<i64>,
    },
    /// Update fields on a task; omitted fields keep their value.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(long, value_enum)]
        priority: Option<TaskPriority>,
    },
    /// Delete a task.
    Delete { id: i64 },
    /// Assign a user to a task.
    Assign { id: i64, user_id: i64 },
    /// Remove a user from a task.
    Unassign { id: i64, user_id: i64 },
    /// Change the status of a task.
    Status {
        id: i64,
        #[arg(value_enum)]
        status: TaskStatus,
    },
}

// ---- auth ----

pub async fn cmd_login(
    api: &mut ApiClient,
    store: &dyn CredentialStore,
    email: String,
    password: String,
) -> Result<()> {
    let res = api.sign_in(&email, &password).await?;
    api.set_token(res.token.clone());
    store.save(&Credentials {
        email: email.clone(),
        password,
        token: Some(res.token),
    })?;
    println!("Signed in as {email}");
    Ok(())
}

pub fn cmd_logout(store: &dyn CredentialStore, forget: bool) -> Result<()> {
    if forget {
        store.clear()?;
        println!("Signed out and forgot stored credentials");
    } else {
        store.clear_token()?;
        println!("Signed out");
    }
    Ok(())
}

pub async fn cmd_register(
    api: &ApiClient,
    store: &dyn CredentialStore,
    username: String,
    email: String,
    password: String,
) -> Result<()> {
    let (name, last_name) = split_username(&username);
    let user = api
        .sign_up(&SignUpRequest::new_leader(name, last_name, email.clone(), password.clone()))
        .await?;
    store.save(&Credentials {
        email,
        password,
        token: None,
    })?;
    println!("Registered {} (user {}). Run `tm login` to sign in.", user.display_name(), user.id);
    Ok(())
}

pub async fn cmd_me(
    api: &ApiClient,
    store: &dyn CredentialStore,
    name: Option<String>,
    image_url: Option<String>,
    salary: Option<f64>,
) -> Result<()> {
    let creds = store
        .load()
        .context("not signed in; run `tm login` first")?;
    let current = api.user_by_email(&creds.email).await?;

    if name.is_none() && image_url.is_none() && salary.is_none() {
        print_user_detail(&current);
        return Ok(());
    }

    let (first, last) = match &name {
        Some(full) => split_username(full),
        None => (current.name.clone(), current.last_name.clone()),
    };
    let updated = api
        .update_user(&UserUpdateRequest {
            name: first,
            last_name: last,
            image_url: image_url.or(current.image_url),
            salary: salary.or(current.salary),
        })
        .await?;
    print_user_detail(&updated);
    Ok(())
}

// ---- projects ----

pub async fn cmd_project(api: &ApiClient, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List { member, leader } => {
            let projects = match (member, leader) {
                (Some(m), _) => api.projects_by_member(m).await?,
                (None, Some(l)) => api.projects_by_leader(l).await?,
                (None, None) => api.projects().await?,
            };
            print_project_table(&projects);
            println!("{} project(s)", projects.len());
        }
        ProjectAction::View { id } => {
            let project = api.project(id).await?;
            print_project_detail(&project);
        }
        ProjectAction::Add { name, desc, image_url, budget, end } => {
            let project = api
                .create_project(&ProjectCreateRequest {
                    name,
                    description: desc,
                    image_url,
                    budget,
                    end_date: end,
                })
                .await?;
            println!("Created project {} (key {})", project.project_id, project.key);
        }
        ProjectAction::Update { id, name, desc, image_url, budget, status, end } => {
            let current = api.project(id).await?;
            let project = api
                .update_project(
                    id,
                    &ProjectUpdateRequest {
                        name: name.unwrap_or(current.name),
                        description: desc.unwrap_or(current.description),
                        image_url: image_url.or(current.image_url).unwrap_or_default(),
                        budget: budget.unwrap_or(current.budget),
                        status: status.unwrap_or(current.status),
                        end_date: end.unwrap_or(current.end_date),
                    },
                )
                .await?;
            println!("Updated project {}", project.project_id);
        }
        ProjectAction::Delete { id } => {
            api.delete_project(id).await?;
            println!("Deleted project {id}");
        }
        ProjectAction::Join { key } => {
            let project = api.join_project(&key).await?;
            println!("Joined project {} ({})", project.project_id, project.name);
        }
        ProjectAction::SetCode { id, code } => {
            let project = api.set_project_code(id, &code).await?;
            println!("Project {} key is now {}", project.project_id, project.key);
        }
        ProjectAction::Members { id } => {
            let users = api.users().await?;
            let members = members_of_project(&users, id);
            print_member_table(&members);
            println!("{} member(s)", members.len());
        }
        ProjectAction::RemoveMember { id, member_id } => {
            api.remove_member(id, member_id).await?;
            println!("Removed user {member_id} from project {id}");
        }
    }
    Ok(())
}

// ---- tasks ----

pub async fn cmd_task(api: &ApiClient, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::List { project, user, query, priority, status, member, from, to } => {
            // Use the server-side scoped queries where one exists for the
            // requested shape; the client-side filter is applied either way.
            let tasks = match (project, user, status, priority) {
                (Some(p), Some(u), _, _) => api.tasks_by_project_and_user(p, u).await?,
                (Some(p), None, Some(sf), None) => {
                    api.tasks_by_project_and_status(p, scope_status(sf)).await?
                }
                (Some(p), None, None, Some(pf)) => {
                    api.tasks_by_project_and_priority(p, scope_priority(pf)).await?
                }
                (Some(p), None, _, _) => api.tasks_by_project(p).await?,
                (None, Some(u), _, _) => api.tasks_by_user(u).await?,
                (None, None, _, _) => api.tasks().await?,
            };
            let filters = TaskFilters {
                query: query.unwrap_or_default(),
                priority,
                status,
                member_id: member,
                date_from: from,
                date_to: to,
            };
            let filtered = filter_tasks(&tasks, &filters);
            print_task_table(&filtered);
            println!("{} task(s)", filtered.len());
        }
        TaskAction::View { id } => {
            let task = api.task(id).await?;
            print_task_detail(&task);
        }
        TaskAction::Add { title, project, desc, start, end, status, priority, assignees } => {
            let task = api
                .create_task(&TaskCreateRequest {
                    project_id: project,
                    title,
                    description: desc,
                    start_date: start,
                    end_date: end,
                    status: status.wire_label().to_string(),
                    priority: priority.wire_label().to_string(),
                    assigned_user_ids: assignees,
                })
                .await?;
            println!("Created task {}", task.task_id);
        }
        TaskAction::Update { id, title, desc, start, end, status, priority } => {
            let current = api.task(id).await?;
            let task = api
                .update_task(
                    id,
                    &TaskUpdateRequest {
                        title: title.unwrap_or(current.title),
                        description: desc.unwrap_or(current.description),
                        start_date: start.unwrap_or(current.start_date),
                        end_date: end.unwrap_or(current.end_date),
                        priority: priority.unwrap_or(current.priority),
                        status: status.unwrap_or(current.status),
                    },
                )
                .await?;
            println!("Updated task {}", task.task_id);
        }
        TaskAction::Delete { id } => {
            api.delete_task(id).await?;
            println!("Deleted task {id}");
        }
        TaskAction::Assign { id, user_id } => {
            let task = api.assign_task(id, user_id).await?;
            println!("Task {} assignees: {:?}", task.task_id, task.assigned_user_ids);
        }
        TaskAction::Unassign { id, user_id } => {
            let task = api.unassign_task(id, user_id).await?;
            println!("Task {} assignees: {:?}", task.task_id, task.assigned_user_ids);
        }
        TaskAction::Status { id, status } => {
            let task = api.update_task_status(id, status).await?;
            println!("Task {} is now {}", task.task_id, format_status(task.status));
        }
    }
    Ok(())
}

/// Server-side scope value for a status filter dimension.
fn scope_status(sf: StatusFilter) -> TaskStatus {
    match sf {
        StatusFilter::ToDo => TaskStatus::ToDo,
        StatusFilter::InProgress => TaskStatus::InProgress,
        StatusFilter::Done => TaskStatus::Done,
    }
}

/// Server-side scope value for a priority filter dimension.
fn scope_priority(pf: PriorityFilter) -> TaskPriority {
    match pf {
        PriorityFilter::High => TaskPriority::High,
        PriorityFilter::Medium => TaskPriority::Medium,
        PriorityFilter::Low => TaskPriority::Low,
    }
}

// ---- statistics ----

pub async fn cmd_stats(api: &ApiClient, project_id: i64) -> Result<()> {
    let tasks = api.tasks_by_project(project_id).await?;
    // A failed directory fetch degrades the best-member label, nothing more.
    let users = match api.users().await {
        Ok(users) => users,
        Err(e) => {
            warn!("member lookup failed, falling back to id labels: {e}");
            Vec::new()
        }
    };
    let stats = compute_project_stats(&tasks, &users, Utc::now());
    print_stats(project_id, &stats);
    Ok(())
}

pub async fn cmd_user_stats(api: &ApiClient, user_id: i64, project: Option<i64>) -> Result<()> {
    let tasks = match project {
        Some(p) => api.tasks_by_project_and_user(p, user_id).await?,
        None => api.tasks_by_user(user_id).await?,
    };
    let stats = compute_user_stats(&tasks);
    print_user_stats(user_id, &stats);
    Ok(())
}

// ---- calendar ----

pub async fn cmd_calendar(
    api: &ApiClient,
    month: Option<String>,
    project: Option<i64>,
    date: Option<String>,
) -> Result<()> {
    let tasks = match project {
        Some(p) => api.tasks_by_project(p).await?,
        None => api.tasks().await?,
    };

    if let Some(d) = date {
        let day = NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .context("invalid --date, expected YYYY-MM-DD")?;
        let active = tasks_on_date(&tasks, day);
        println!("Tasks active on {day}:");
        let refs: Vec<&Task> = active.iter().collect();
        print_task_table(&refs);
        println!("{} task(s)", refs.len());
        return Ok(());
    }

    let anchor = match month {
        Some(m) => NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d")
            .context("invalid --month, expected YYYY-MM")?,
        None => Local::now().date_naive(),
    };
    let days = calendar_days(anchor, &tasks);
    print_calendar(anchor, &days);
    Ok(())
}

// ---- notifications ----

pub async fn cmd_notifications(api: &ApiClient) -> Result<()> {
    let notifications = api.my_notifications().await?;
    print_notification_table(&notifications);
    println!("{} notification(s)", notifications.len());
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    generate(shell, &mut Cli::command(), "tm", &mut io::stdout());
}

// ---- rendering ----

fn print_task_table(tasks: &[&Task]) {
    println!(
        "{:<6} {:<6} {:<12} {:<8} {:<11} {:<11} {}",
        "ID", "Proj", "Status", "Pri", "Start", "End", "Title"
    );
    for t in tasks {
        println!(
            "{:<6} {:<6} {:<12} {:<8} {:<11} {:<11} {}",
            t.task_id,
            t.project_id,
            format_status(t.status),
            format_priority(t.priority),
            date_part(&t.start_date),
            date_part(&t.end_date),
            truncate(&t.title, 48)
        );
    }
}

fn print_task_detail(t: &Task) {
    println!("Task {} ({})", t.task_id, format_status(t.status));
    println!("  title:     {}", t.title);
    if !t.description.is_empty() {
        println!("  desc:      {}", t.description);
    }
    println!("  project:   {}", t.project_id);
    println!("  priority:  {}", format_priority(t.priority));
    println!("  dates:     {} .. {}", date_part(&t.start_date), date_part(&t.end_date));
    match t.primary_assignee() {
        None => println!("  assignees: -"),
        Some(primary) => {
            let ids: Vec<String> = t.assigned_user_ids.iter().map(|id| id.to_string()).collect();
            println!("  assignees: {} (primary {})", ids.join(", "), primary);
        }
    }
}

fn print_project_table(projects: &[Project]) {
    println!(
        "{:<6} {:<10} {:<6} {:<12} {:<11} {}",
        "ID", "Key", "Lead", "Status", "End", "Name"
    );
    for p in projects {
        println!(
            "{:<6} {:<10} {:<6} {:<12} {:<11} {}",
            p.project_id,
            truncate(&p.key, 10),
            p.leader_id,
            truncate(&p.status, 12),
            date_part(&p.end_date),
            truncate(&p.name, 40)
        );
    }
}

fn print_project_detail(p: &Project) {
    println!("Project {} ({})", p.project_id, p.name);
    println!("  key:     {}", p.key);
    println!("  leader:  {}", p.leader_id);
    println!("  status:  {}", p.status);
    println!("  budget:  {:.2}", p.budget);
    println!("  dates:   {} .. {}", date_part(&p.start_date), date_part(&p.end_date));
    if !p.description.is_empty() {
        println!("  desc:    {}", p.description);
    }
}

fn print_member_table(members: &[&User]) {
    println!("{:<6} {:<28} {}", "ID", "Name", "Email");
    for u in members {
        println!("{:<6} {:<28} {}", u.id, truncate(&u.display_name(), 28), u.email);
    }
}

fn print_user_detail(u: &User) {
    println!("User {} ({})", u.id, u.email);
    println!("  name:     {}", u.display_name());
    println!("  roles:    {}", u.roles.join(", "));
    if let Some(url) = &u.image_url {
        println!("  avatar:   {url}");
    }
    if let Some(salary) = u.salary {
        println!("  salary:   {salary:.2}");
    }
    if !u.project_ids.is_empty() {
        let ids: Vec<String> = u.project_ids.iter().map(|id| id.to_string()).collect();
        println!("  projects: {}", ids.join(", "));
    }
}

fn print_notification_table(notifications: &[Notification]) {
    println!("{:<6} {:<20} {:<28} {}", "ID", "Sent", "Title", "Message");
    for n in notifications {
        println!(
            "{:<6} {:<20} {:<28} {}",
            n.id,
            truncate(&n.sent_at, 20),
            truncate(&n.title, 28),
            truncate(&n.message, 60)
        );
    }
}

fn print_stats(project_id: i64, stats: &ProjectStats) {
    println!("Statistics for project {project_id}");
    println!("  total tasks:   {} ({} overdue)", stats.total_tasks, stats.overdue_tasks);
    println!(
        "  by status:     to do {} | in progress {} | done {}",
        stats.todo_tasks, stats.in_progress_tasks, stats.done_tasks
    );
    println!(
        "  by priority:   high {} | medium {} | low {}",
        stats.high_priority_tasks, stats.medium_priority_tasks, stats.low_priority_tasks
    );
    println!("  best member:   {}", stats.best_member);
    println!("  worst member:  {}", stats.worst_member);
    println!("  budget:        {:.2} used of {:.2}", stats.used_budget, stats.budget);
}

fn print_user_stats(user_id: i64, stats: &UserTaskStats) {
    println!("Task overview for user {user_id}");
    println!("  total tasks:   {}", stats.total_tasks);
    println!(
        "  by status:     to do {} | in progress {} | done {}",
        stats.todo_tasks, stats.in_progress_tasks, stats.done_tasks
    );
    println!(
        "  by priority:   high {} | medium {} | low {}",
        stats.high_priority_tasks, stats.medium_priority_tasks, stats.low_priority_tasks
    );
}

fn print_calendar(anchor: NaiveDate, days: &[CalendarDay]) {
    println!("{:^28}", anchor.format("%B %Y").to_string());
    println!(" Sun Mon Tue Wed Thu Fri Sat");
    for week in days.chunks(7) {
        let mut line = String::new();
        for d in week {
            let marker = if d.tasks.is_empty() { ' ' } else { '*' };
            line.push_str(&format!(" {:>2}{}", d.day, marker));
        }
        println!("{line}");
    }
    println!(" * task active that day");
}

/// Truncate a string to a maximum width, adding an ellipsis if needed.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_width_and_marks_cuts() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("much longer than that", 10), "much long…");
    }

    #[test]
    fn scope_mappings_line_up() {
        assert_eq!(scope_status(StatusFilter::ToDo), TaskStatus::ToDo);
        assert_eq!(scope_status(StatusFilter::Done), TaskStatus::Done);
        assert_eq!(scope_priority(PriorityFilter::High), TaskPriority::High);
    }
}
