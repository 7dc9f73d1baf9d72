//! The `ProjectStore` trait -- what the engine needs from persistence.

use anyhow::Result;
use async_trait::async_trait;
use stride_db::models::Plan;
use uuid::Uuid;

/// A project about to be persisted. Carries no id: identity is assigned by
/// the store at insert time.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: Uuid,
    pub title: String,
    pub raw_idea: String,
    pub mvp_description: String,
    pub plan: Plan,
}

/// Persistence seam for projects and their plans.
///
/// Object-safe so the sync flow takes `&dyn ProjectStore` and tests can
/// substitute scripted implementations.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Persist a new project, returning its store-assigned identity.
    async fn create_project(&self, new: NewProject) -> Result<Uuid>;

    /// Authoritative lookup of a project's current plan.
    async fn fetch_plan(&self, project_id: Uuid) -> Result<Plan>;

    /// Set one task's completed flag, keyed by day. Fails when the project
    /// or the day does not exist; on failure nothing is written.
    async fn set_task_completed(&self, project_id: Uuid, day: u32, completed: bool) -> Result<()>;
}

// Compile-time assertion: ProjectStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ProjectStore) {}
};
