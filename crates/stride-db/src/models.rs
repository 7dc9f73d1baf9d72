//! Row models and the plan wire types.
//!
//! The plan (`steps` -> `tasks`) is the exact JSON shape produced by the
//! generation model and stored in the `build_steps` JSONB column. All three
//! structs reject unknown keys so a document either matches the contract or
//! fails to decode.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Status of a project, derived from its task completion counts.
///
/// The database is the sole owner of this field: it is recomputed on every
/// targeted task update, never written directly by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Building,
    Shipped,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Planning => "planning",
            Self::Building => "building",
            Self::Shipped => "shipped",
        };
        f.write_str(s)
    }
}

impl FromStr for ProjectStatus {
    type Err = ProjectStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(Self::Planning),
            "building" => Ok(Self::Building),
            "shipped" => Ok(Self::Shipped),
            other => Err(ProjectStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProjectStatus`] string.
#[derive(Debug, Clone)]
pub struct ProjectStatusParseError(pub String);

impl fmt::Display for ProjectStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid project status: {:?}", self.0)
    }
}

impl std::error::Error for ProjectStatusParseError {}

// ---------------------------------------------------------------------------
// Plan wire types
// ---------------------------------------------------------------------------

/// The full build roadmap for one idea: ordered steps, each with ordered
/// daily tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Ordered build phases, frontend-to-backend progression.
    pub steps: Vec<Step>,
}

/// One ordered phase of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Position within the plan, contiguous from 1.
    pub step: u32,
    /// Short human-readable label.
    pub title: String,
    /// Daily tasks within this step.
    pub tasks: Vec<Task>,
}

/// The smallest unit of work, identified by a plan-wide `day` number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// Day number, contiguous from 1 across the whole plan. This is the
    /// stable identity used for targeted updates.
    pub day: u32,
    /// Description of the unit of work.
    pub task: String,
    /// Completion flag. The only field that mutates after creation.
    pub completed: bool,
}

impl Plan {
    /// Total number of tasks across all steps.
    pub fn task_count(&self) -> usize {
        self.steps.iter().map(|s| s.tasks.len()).sum()
    }

    /// Number of completed tasks across all steps.
    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .flat_map(|s| &s.tasks)
            .filter(|t| t.completed)
            .count()
    }

    /// Find the task with the given day number.
    pub fn find_task(&self, day: u32) -> Option<&Task> {
        self.steps
            .iter()
            .flat_map(|s| &s.tasks)
            .find(|t| t.day == day)
    }

    /// Find the task with the given day number, mutably.
    pub fn find_task_mut(&mut self, day: u32) -> Option<&mut Task> {
        self.steps
            .iter_mut()
            .flat_map(|s| &mut s.tasks)
            .find(|t| t.day == day)
    }

    /// Derive the project status from completion counts: no tasks done is
    /// `planning`, all done is `shipped`, anything in between is `building`.
    pub fn derive_status(&self) -> ProjectStatus {
        let total = self.task_count();
        match self.completed_count() {
            0 => ProjectStatus::Planning,
            done if done == total => ProjectStatus::Shipped,
            _ => ProjectStatus::Building,
        }
    }
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A project -- one idea and its generated plan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub raw_idea: String,
    pub mvp_description: String,
    pub build_steps: Json<Plan>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
