//! Task-state synchronization: optimistic update with compensating
//! rollback.
//!
//! [`toggle_task`] mutates the caller's in-memory plan first, commits the
//! change to the store, then either reconciles the local view against the
//! authoritative plan (commit succeeded) or restores the recorded previous
//! value (commit failed). Each invocation walks
//! `Idle -> OptimisticallyApplied -> {Committed | RolledBack}`; no phase
//! is skipped or reordered, and a commit in flight is never cancelled.
//!
//! Concurrent toggles against the same project are not serialized here:
//! commits race at the store and the last writer wins, with the
//! reconciling refresh converging each caller's local view afterwards.

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use stride_db::models::Plan;

use crate::store::ProjectStore;

/// Why a toggle did not complete cleanly.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No task in the local plan carries the requested day number. Nothing
    /// was mutated and nothing was sent to the store.
    #[error("no task with day {day}")]
    UnknownTask { day: u32 },

    /// The store rejected the commit. The optimistic mutation has been
    /// rolled back; the local plan matches its pre-call state.
    #[error("remote store rejected the update: {0}")]
    RemoteRejected(#[source] anyhow::Error),

    /// The commit is durable but the reconciling refresh failed. Advisory:
    /// the local plan keeps the committed value and a later fetch will
    /// converge it.
    #[error("update committed, but refreshing the plan failed: {0}")]
    RefreshFailed(#[source] anyhow::Error),
}

/// Phase of a single toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Idle,
    OptimisticallyApplied,
    Committed,
    RolledBack,
}

/// An applied-but-uncommitted mutation of one task's completed flag.
///
/// Records the value observed at apply time so rollback restores exactly
/// that recording rather than recomputing an inverse.
#[derive(Debug)]
struct OptimisticToggle {
    day: u32,
    previous: bool,
}

impl OptimisticToggle {
    /// Set the flag on the task with the given day, recording the previous
    /// value. Fails without mutating anything when no task matches.
    fn apply(plan: &mut Plan, day: u32, completed: bool) -> Result<Self, SyncError> {
        let task = plan
            .find_task_mut(day)
            .ok_or(SyncError::UnknownTask { day })?;
        let previous = task.completed;
        task.completed = completed;
        Ok(Self { day, previous })
    }

    /// Restore the recorded previous value.
    fn rollback(self, plan: &mut Plan) {
        if let Some(task) = plan.find_task_mut(self.day) {
            task.completed = self.previous;
        }
    }
}

/// Synchronize one task's completed flag between the local plan and the
/// store.
///
/// On success the local plan is replaced wholesale by the store's
/// authoritative copy, so store-side derivations arrive with the same
/// refresh. On [`SyncError::RemoteRejected`] the plan is byte-for-byte what
/// it was before the call. On [`SyncError::RefreshFailed`] the plan keeps
/// the committed value.
pub async fn toggle_task(
    store: &dyn ProjectStore,
    project_id: Uuid,
    plan: &mut Plan,
    day: u32,
    completed: bool,
) -> Result<(), SyncError> {
    let applied = OptimisticToggle::apply(plan, day, completed)?;
    let mut state = ToggleState::OptimisticallyApplied;
    debug!(%project_id, day, completed, previous = applied.previous, ?state, "applied locally");

    if let Err(e) = store.set_task_completed(project_id, day, completed).await {
        applied.rollback(plan);
        state = ToggleState::RolledBack;
        debug!(%project_id, day, ?state, "commit failed, restored previous value");
        return Err(SyncError::RemoteRejected(e));
    }
    state = ToggleState::Committed;
    debug!(%project_id, day, ?state, "commit confirmed");

    match store.fetch_plan(project_id).await {
        Ok(fresh) => {
            *plan = fresh;
            Ok(())
        }
        Err(e) => {
            // Durable commit; the local plan already carries the committed
            // value, so nothing is rolled back.
            warn!(%project_id, day, "reconciling refresh failed");
            Err(SyncError::RefreshFailed(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_db::models::{Step, Task};

    fn two_step_plan() -> Plan {
        let mut day = 0u32;
        let steps = (1..=2)
            .map(|n| Step {
                step: n,
                title: format!("Step {n}"),
                tasks: (0..2)
                    .map(|_| {
                        day += 1;
                        Task {
                            day,
                            task: format!("Task {day}"),
                            completed: false,
                        }
                    })
                    .collect(),
            })
            .collect();
        Plan { steps }
    }

    #[test]
    fn apply_records_previous_value() {
        let mut plan = two_step_plan();
        let applied = OptimisticToggle::apply(&mut plan, 3, true).unwrap();
        assert!(plan.find_task(3).unwrap().completed);
        assert_eq!(applied.previous, false);
    }

    #[test]
    fn apply_unknown_day_mutates_nothing() {
        let mut plan = two_step_plan();
        let before = plan.clone();
        let err = OptimisticToggle::apply(&mut plan, 42, true).unwrap_err();
        assert!(matches!(err, SyncError::UnknownTask { day: 42 }));
        assert_eq!(plan, before);
    }

    #[test]
    fn rollback_restores_recording() {
        let mut plan = two_step_plan();
        plan.find_task_mut(2).unwrap().completed = true;
        let before = plan.clone();

        // Un-complete day 2, then roll back: the original true returns.
        let applied = OptimisticToggle::apply(&mut plan, 2, false).unwrap();
        assert!(!plan.find_task(2).unwrap().completed);
        applied.rollback(&mut plan);
        assert_eq!(plan, before);
    }

    #[test]
    fn redundant_apply_rolls_back_to_same_value() {
        // Setting a flag to its current value still records and restores it.
        let mut plan = two_step_plan();
        let applied = OptimisticToggle::apply(&mut plan, 1, false).unwrap();
        assert_eq!(applied.previous, false);
        applied.rollback(&mut plan);
        assert!(!plan.find_task(1).unwrap().completed);
    }
}
