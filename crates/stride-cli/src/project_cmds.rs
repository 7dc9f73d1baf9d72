//! Operator CLI handlers for project commands.
//!
//! Implements:
//! - `stride new <idea> --description <text>` -- generate and persist a plan
//! - `stride show [project-id] [--all]`       -- show one project (latest by
//!   default) or list all
//! - `stride toggle <project-id> <day>`       -- flip a task's completed flag
//! - `stride delete <project-id>`             -- remove a project

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use stride_core::model::OpenRouterModel;
use stride_core::plan::generate_plan;
use stride_core::store::PgProjectStore;
use stride_core::sync::{SyncError, toggle_task};
use stride_db::models::Plan;
use stride_db::queries::projects;

use crate::config::StrideConfig;

// -----------------------------------------------------------------------
// stride new
// -----------------------------------------------------------------------

/// Generate a plan for the idea, persist it, and print a summary.
pub async fn cmd_new(
    pool: &PgPool,
    config: &StrideConfig,
    idea: &str,
    description: &str,
    title: Option<&str>,
) -> Result<()> {
    let idea = idea.trim();
    let description = description.trim();
    if idea.is_empty() {
        bail!("idea must not be empty");
    }
    if description.is_empty() {
        bail!("description must not be empty");
    }
    let title = match title.map(str::trim) {
        Some("") => bail!("title must not be empty"),
        Some(t) => t,
        None => idea,
    };

    let model = OpenRouterModel::new(config.model_config()?);

    println!("Generating plan for \"{idea}\"...");
    let plan = generate_plan(&model, idea, description)
        .await
        .context("plan generation failed")?;

    let project =
        projects::insert_project(pool, config.user_id, title, idea, description, &plan).await?;

    println!("Project created.");
    println!();
    println!("  Project ID: {}", project.id);
    println!("  Title:      {}", project.title);
    println!("  Status:     {}", project.status);
    println!("  Steps:      {}", plan.steps.len());
    let first = plan.steps.first().and_then(|s| s.tasks.first());
    let last = plan.steps.last().and_then(|s| s.tasks.last());
    println!("  Tasks:      {} ({})", plan.task_count(), day_range(first, last));
    println!();
    for step in &plan.steps {
        let days = day_range(step.tasks.first(), step.tasks.last());
        println!("  {}. {} ({days})", step.step, step.title);
    }
    println!();
    println!("Run `stride show {}` to see the full plan.", project.id);

    Ok(())
}

// -----------------------------------------------------------------------
// stride show (list all)
// -----------------------------------------------------------------------

/// List the user's projects with summary info.
pub async fn cmd_show_all(pool: &PgPool, user_id: Uuid) -> Result<()> {
    let listed = projects::list_projects_for_user(pool, user_id).await?;

    if listed.is_empty() {
        println!("No projects found. Use `stride new <idea> --description <text>` to create one.");
        return Ok(());
    }

    // ID is always 36 chars (UUID). Status max is 8 (planning/building).
    let id_w = 36;
    let title_w = listed
        .iter()
        .map(|p| p.title.len())
        .max()
        .unwrap_or(5)
        .max(5);
    let status_w = 8;
    let done_w = 7;

    println!(
        "{:<id_w$}  {:<title_w$}  {:<status_w$}  {:>done_w$}  CREATED",
        "ID", "TITLE", "STATUS", "DONE",
    );

    for project in &listed {
        let plan = &project.build_steps.0;
        let done = format!("{}/{}", plan.completed_count(), plan.task_count());
        let created = project.created_at.format("%Y-%m-%d %H:%M");
        println!(
            "{:<id_w$}  {:<title_w$}  {:<status_w$}  {:>done_w$}  {}",
            project.id, project.title, project.status, done, created,
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// stride show <project-id>
// -----------------------------------------------------------------------

/// Show one project: header, then every step with its task checklist.
pub async fn cmd_show_one(pool: &PgPool, project_id: Uuid) -> Result<()> {
    let project = projects::get_project(pool, project_id)
        .await?
        .with_context(|| format!("project {project_id} not found"))?;
    print_project(&project);
    Ok(())
}

/// Show the user's most recently created project (the default for
/// `stride show` with no id).
pub async fn cmd_show_latest(pool: &PgPool, user_id: Uuid) -> Result<()> {
    match projects::latest_project_for_user(pool, user_id).await? {
        Some(project) => print_project(&project),
        None => {
            println!(
                "No projects found. Use `stride new <idea> --description <text>` to create one."
            );
        }
    }
    Ok(())
}

fn print_project(project: &stride_db::models::Project) {
    let plan = &project.build_steps.0;

    println!("Project: {}", project.title);
    println!("  ID:          {}", project.id);
    println!("  Status:      {}", project.status);
    println!("  Idea:        {}", project.raw_idea);
    println!("  Description: {}", project.mvp_description);
    println!(
        "  Created:     {}",
        project.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Progress:    {}", progress_summary(plan));

    for step in &plan.steps {
        println!();
        println!("Step {}: {}", step.step, step.title);
        for task in &step.tasks {
            println!("  {} day {:>2}: {}", checkbox(task.completed), task.day, task.task);
        }
    }
}

// -----------------------------------------------------------------------
// stride toggle <project-id> <day>
// -----------------------------------------------------------------------

/// Flip one task's completed flag, keeping the local view and the store in
/// sync. A failed refresh after a successful commit is reported as a
/// warning, not an error.
pub async fn cmd_toggle(pool: &PgPool, project_id: Uuid, day: u32, completed: bool) -> Result<()> {
    let store = PgProjectStore::new(pool.clone());

    let mut plan = projects::get_build_steps(pool, project_id)
        .await?
        .with_context(|| format!("project {project_id} not found"))?;

    match toggle_task(&store, project_id, &mut plan, day, completed).await {
        Ok(()) => {}
        Err(SyncError::RefreshFailed(e)) => {
            eprintln!("warning: update saved, but refreshing the plan failed: {e:#}");
        }
        Err(e) => return Err(e.into()),
    }

    let verb = if completed { "done" } else { "not done" };
    let task = plan
        .find_task(day)
        .with_context(|| format!("no task with day {day}"))?;
    println!("Day {day} marked {verb}: {}", task.task);
    println!("Progress: {}", progress_summary(&plan));

    Ok(())
}

// -----------------------------------------------------------------------
// stride delete <project-id>
// -----------------------------------------------------------------------

pub async fn cmd_delete(pool: &PgPool, project_id: Uuid) -> Result<()> {
    projects::delete_project(pool, project_id).await?;
    println!("Project {project_id} deleted.");
    Ok(())
}

// -----------------------------------------------------------------------
// Formatting helpers
// -----------------------------------------------------------------------

fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// "3/12 tasks (25%)"
fn progress_summary(plan: &Plan) -> String {
    let total = plan.task_count();
    let done = plan.completed_count();
    let percent = if total == 0 { 0 } else { done * 100 / total };
    format!("{done}/{total} tasks ({percent}%)")
}

/// "days 1-4", or "day 3" for a single task.
fn day_range(
    first: Option<&stride_db::models::Task>,
    last: Option<&stride_db::models::Task>,
) -> String {
    match (first, last) {
        (Some(a), Some(b)) if a.day != b.day => format!("days {}-{}", a.day, b.day),
        (Some(a), _) => format!("day {}", a.day),
        _ => "no tasks".to_string(),
    }
}
