//! Structural validation of decoded plans.
//!
//! Decoding (serde) guarantees the wire shape; this module enforces the
//! numbering and sizing rules that shape alone cannot express. Validation
//! never mutates or repairs a plan: a violation rejects the whole plan.

use stride_db::models::Plan;
use thiserror::Error;

pub const MIN_STEPS: usize = 3;
pub const MAX_STEPS: usize = 6;
pub const MIN_TASKS_PER_STEP: usize = 4;
pub const MAX_TASKS_PER_STEP: usize = 6;

/// A structural rule the decoded plan violates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanSchemaError {
    #[error("plan has {count} steps (expected {MIN_STEPS} to {MAX_STEPS})")]
    StepCountOutOfRange { count: usize },

    #[error("step {step} has {count} tasks (expected {MIN_TASKS_PER_STEP} to {MAX_TASKS_PER_STEP})")]
    TaskCountOutOfRange { step: u32, count: usize },

    #[error("step numbers must run 1, 2, 3, ...: expected {expected}, found {found}")]
    NonContiguousStep { expected: u32, found: u32 },

    #[error("day numbers must be contiguous from 1 across all steps: expected {expected}, found {found}")]
    NonContiguousDay { expected: u32, found: u32 },

    #[error("task for day {day} is already marked completed")]
    TaskAlreadyCompleted { day: u32 },
}

/// Check every structural invariant of a freshly generated plan.
///
/// Day numbering is global: the first task of step N continues from the
/// last task of step N-1, so every day from 1 to the total task count
/// appears exactly once.
pub fn validate_plan(plan: &Plan) -> Result<(), PlanSchemaError> {
    let step_count = plan.steps.len();
    if !(MIN_STEPS..=MAX_STEPS).contains(&step_count) {
        return Err(PlanSchemaError::StepCountOutOfRange { count: step_count });
    }

    let mut next_day = 1u32;
    for (idx, step) in plan.steps.iter().enumerate() {
        let expected_step = idx as u32 + 1;
        if step.step != expected_step {
            return Err(PlanSchemaError::NonContiguousStep {
                expected: expected_step,
                found: step.step,
            });
        }

        let task_count = step.tasks.len();
        if !(MIN_TASKS_PER_STEP..=MAX_TASKS_PER_STEP).contains(&task_count) {
            return Err(PlanSchemaError::TaskCountOutOfRange {
                step: step.step,
                count: task_count,
            });
        }

        for task in &step.tasks {
            if task.day != next_day {
                return Err(PlanSchemaError::NonContiguousDay {
                    expected: next_day,
                    found: task.day,
                });
            }
            if task.completed {
                return Err(PlanSchemaError::TaskAlreadyCompleted { day: task.day });
            }
            next_day += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_db::models::{Step, Task};

    fn build_plan(step_count: usize, tasks_per_step: usize) -> Plan {
        let mut day = 0u32;
        let steps = (1..=step_count as u32)
            .map(|n| Step {
                step: n,
                title: format!("Step {n}"),
                tasks: (0..tasks_per_step)
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
    fn accepts_minimal_and_maximal_shapes() {
        assert_eq!(validate_plan(&build_plan(3, 4)), Ok(()));
        assert_eq!(validate_plan(&build_plan(6, 6)), Ok(()));
        assert_eq!(validate_plan(&build_plan(4, 5)), Ok(()));
    }

    #[test]
    fn rejects_step_count_out_of_range() {
        assert_eq!(
            validate_plan(&build_plan(2, 4)),
            Err(PlanSchemaError::StepCountOutOfRange { count: 2 })
        );
        assert_eq!(
            validate_plan(&build_plan(7, 4)),
            Err(PlanSchemaError::StepCountOutOfRange { count: 7 })
        );
        assert_eq!(
            validate_plan(&Plan { steps: vec![] }),
            Err(PlanSchemaError::StepCountOutOfRange { count: 0 })
        );
    }

    #[test]
    fn rejects_task_count_out_of_range() {
        assert_eq!(
            validate_plan(&build_plan(3, 3)),
            Err(PlanSchemaError::TaskCountOutOfRange { step: 1, count: 3 })
        );
        assert_eq!(
            validate_plan(&build_plan(3, 7)),
            Err(PlanSchemaError::TaskCountOutOfRange { step: 1, count: 7 })
        );
    }

    #[test]
    fn rejects_non_contiguous_steps() {
        let mut plan = build_plan(3, 4);
        plan.steps[1].step = 5;
        assert_eq!(
            validate_plan(&plan),
            Err(PlanSchemaError::NonContiguousStep {
                expected: 2,
                found: 5
            })
        );
    }

    #[test]
    fn rejects_steps_not_starting_at_one() {
        let mut plan = build_plan(3, 4);
        plan.steps[0].step = 0;
        assert_eq!(
            validate_plan(&plan),
            Err(PlanSchemaError::NonContiguousStep {
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn rejects_day_gap() {
        let mut plan = build_plan(3, 4);
        plan.steps[2].tasks[3].day = 13; // should be 12
        assert_eq!(
            validate_plan(&plan),
            Err(PlanSchemaError::NonContiguousDay {
                expected: 12,
                found: 13
            })
        );
    }

    #[test]
    fn rejects_days_restarting_per_step() {
        // A common model failure: each step numbers its own days from 1.
        let mut plan = build_plan(3, 4);
        for step in &mut plan.steps {
            for (i, task) in step.tasks.iter_mut().enumerate() {
                task.day = i as u32 + 1;
            }
        }
        assert_eq!(
            validate_plan(&plan),
            Err(PlanSchemaError::NonContiguousDay {
                expected: 5,
                found: 1
            })
        );
    }

    #[test]
    fn rejects_duplicate_day() {
        let mut plan = build_plan(3, 4);
        plan.steps[0].tasks[2].day = 2;
        assert_eq!(
            validate_plan(&plan),
            Err(PlanSchemaError::NonContiguousDay {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn rejects_pre_completed_task() {
        let mut plan = build_plan(3, 4);
        plan.steps[1].tasks[0].completed = true;
        assert_eq!(
            validate_plan(&plan),
            Err(PlanSchemaError::TaskAlreadyCompleted { day: 5 })
        );
    }
}
