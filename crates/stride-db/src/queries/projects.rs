//! Database query functions for the `projects` table.

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Plan, Project};

/// Insert a new project row. Returns the inserted project with
/// server-generated defaults (id, status, created_at).
pub async fn insert_project(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    raw_idea: &str,
    mvp_description: &str,
    plan: &Plan,
) -> Result<Project> {
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (user_id, title, raw_idea, mvp_description, build_steps) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .bind(raw_idea)
    .bind(mvp_description)
    .bind(Json(plan))
    .fetch_one(pool)
    .await
    .context("failed to insert project")?;

    debug!(project_id = %project.id, tasks = plan.task_count(), "project inserted");
    Ok(project)
}

/// Fetch a project by its ID.
pub async fn get_project(pool: &PgPool, id: Uuid) -> Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch project")?;

    Ok(project)
}

/// Point lookup of a project's plan, used by the reconciling refresh after
/// a committed task update.
pub async fn get_build_steps(pool: &PgPool, id: Uuid) -> Result<Option<Plan>> {
    let row: Option<(Json<Plan>,)> =
        sqlx::query_as("SELECT build_steps FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch build steps")?;

    Ok(row.map(|(Json(plan),)| plan))
}

/// List a user's projects, ordered by creation time (newest first).
pub async fn list_projects_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list projects")?;

    Ok(projects)
}

/// Fetch a user's most recently created project, if any.
pub async fn latest_project_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch latest project")?;

    Ok(project)
}

/// Flip one task's `completed` flag, keyed by its plan-wide `day` number.
///
/// Runs inside a transaction: the row is locked with `FOR UPDATE`, exactly
/// one task is mutated, and the derived `status` column is recomputed from
/// the new completion counts. Fails without writing anything if the project
/// or the day does not exist.
///
/// Returns the updated plan.
pub async fn set_task_completed(
    pool: &PgPool,
    id: Uuid,
    day: u32,
    completed: bool,
) -> Result<Plan> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let row: Option<(Json<Plan>,)> =
        sqlx::query_as("SELECT build_steps FROM projects WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("failed to lock project row")?;

    let Some((Json(mut plan),)) = row else {
        bail!("project {id} not found");
    };

    let Some(task) = plan.find_task_mut(day) else {
        bail!("project {id} has no task with day {day}");
    };
    task.completed = completed;

    let status = plan.derive_status();
    sqlx::query("UPDATE projects SET build_steps = $1, status = $2 WHERE id = $3")
        .bind(Json(&plan))
        .bind(status)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to update build steps")?;

    tx.commit().await.context("failed to commit transaction")?;

    debug!(project_id = %id, day, completed, status = %status, "task flag updated");
    Ok(plan)
}

/// Total number of project rows. Used by the init command's success
/// message.
pub async fn count_projects(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await
        .context("failed to count projects")?;
    Ok(count)
}

/// Delete a project by ID. Fails if no row matched.
pub async fn delete_project(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete project")?;

    if result.rows_affected() == 0 {
        bail!("project {id} not found");
    }

    Ok(())
}
