//! PostgreSQL-backed [`ProjectStore`] over the stride-db queries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use stride_db::models::Plan;
use stride_db::queries::projects;

use super::trait_def::{NewProject, ProjectStore};

/// Adapter from [`ProjectStore`] to the stride-db query layer.
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create_project(&self, new: NewProject) -> Result<Uuid> {
        let project = projects::insert_project(
            &self.pool,
            new.user_id,
            &new.title,
            &new.raw_idea,
            &new.mvp_description,
            &new.plan,
        )
        .await?;
        Ok(project.id)
    }

    async fn fetch_plan(&self, project_id: Uuid) -> Result<Plan> {
        projects::get_build_steps(&self.pool, project_id)
            .await?
            .with_context(|| format!("project {project_id} not found"))
    }

    async fn set_task_completed(&self, project_id: Uuid, day: u32, completed: bool) -> Result<()> {
        projects::set_task_completed(&self.pool, project_id, day, completed).await?;
        Ok(())
    }
}
