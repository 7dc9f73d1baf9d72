//! The generation flow: one completion call, strict decode, validation.
//!
//! There are no retries and no partial results. Any failure surfaces as a
//! [`GenerationError`] and the caller decides whether to try again with the
//! same or edited inputs.

use stride_db::models::Plan;
use thiserror::Error;
use tracing::info;

use crate::model::TextModel;
use crate::plan::prompt;
use crate::plan::validate::{PlanSchemaError, validate_plan};

/// Why a generation attempt produced no plan.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model's output was not the expected JSON document. Covers
    /// non-JSON prose, truncated output, wrong field types, and unknown
    /// keys.
    #[error("model output is not a valid plan document: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    /// The output decoded cleanly but violates a structural rule.
    #[error("generated plan violates the schema: {0}")]
    SchemaViolation(#[from] PlanSchemaError),

    /// The backend could not be reached, rejected the request, or returned
    /// an empty completion.
    #[error("text-generation backend unavailable: {0}")]
    UpstreamUnavailable(#[source] anyhow::Error),
}

/// Decode raw model output into a validated [`Plan`].
///
/// Decoding is strict: unknown keys anywhere in the document are rejected,
/// so the model cannot smuggle extra fields past the schema.
pub fn decode_plan(raw: &str) -> Result<Plan, GenerationError> {
    let plan: Plan = serde_json::from_str(raw)?;
    validate_plan(&plan)?;
    Ok(plan)
}

/// Generate a validated plan for an idea/description pair.
///
/// Exactly one completion request is made per call.
pub async fn generate_plan(
    model: &dyn TextModel,
    idea: &str,
    description: &str,
) -> Result<Plan, GenerationError> {
    let request = prompt::build_request(idea, description);

    info!(model = model.name(), idea, "generating plan");
    let raw = model
        .complete(&request)
        .await
        .map_err(GenerationError::UpstreamUnavailable)?;
    if raw.trim().is_empty() {
        return Err(GenerationError::UpstreamUnavailable(anyhow::anyhow!(
            "model returned an empty completion"
        )));
    }

    let plan = decode_plan(&raw)?;
    info!(
        steps = plan.steps.len(),
        tasks = plan.task_count(),
        "plan generated"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use stride_db::models::{Step, Task};

    use crate::model::CompletionRequest;

    /// Returns a fixed string for every request.
    struct StaticModel(String);

    #[async_trait]
    impl TextModel for StaticModel {
        fn name(&self) -> &str {
            "static"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    /// Fails every request.
    struct FailingModel;

    #[async_trait]
    impl TextModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    fn valid_plan_json() -> String {
        let mut day = 0u32;
        let steps: Vec<Step> = (1..=3)
            .map(|n| Step {
                step: n,
                title: format!("Step {n}"),
                tasks: (0..4)
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
        serde_json::to_string(&Plan { steps }).unwrap()
    }

    #[tokio::test]
    async fn generates_valid_plan() {
        let model = StaticModel(valid_plan_json());
        let plan = generate_plan(&model, "Habit tracker", "Track habits")
            .await
            .expect("generation should succeed");
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.task_count(), 12);
        assert_eq!(plan.completed_count(), 0);
    }

    #[tokio::test]
    async fn prose_output_is_malformed() {
        let model = StaticModel("Sure! Here is your plan:\n1. Build the UI".into());
        let err = generate_plan(&model, "i", "d").await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn unknown_key_is_malformed() {
        let raw = valid_plan_json().replacen(
            "\"steps\":",
            "\"notes\":\"extra\",\"steps\":",
            1,
        );
        let model = StaticModel(raw);
        let err = generate_plan(&model, "i", "d").await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn structural_violation_is_schema_error() {
        // Well-formed JSON, but only two steps.
        let raw = r#"{"steps":[
            {"step":1,"title":"A","tasks":[
                {"day":1,"task":"t","completed":false},
                {"day":2,"task":"t","completed":false},
                {"day":3,"task":"t","completed":false},
                {"day":4,"task":"t","completed":false}]},
            {"step":2,"title":"B","tasks":[
                {"day":5,"task":"t","completed":false},
                {"day":6,"task":"t","completed":false},
                {"day":7,"task":"t","completed":false},
                {"day":8,"task":"t","completed":false}]}
        ]}"#;
        let model = StaticModel(raw.into());
        let err = generate_plan(&model, "i", "d").await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::SchemaViolation(PlanSchemaError::StepCountOutOfRange { count: 2 })
        ));
    }

    #[tokio::test]
    async fn backend_failure_is_upstream_unavailable() {
        let err = generate_plan(&FailingModel, "i", "d").await.unwrap_err();
        assert!(matches!(err, GenerationError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_completion_is_upstream_unavailable() {
        let model = StaticModel("  \n".into());
        let err = generate_plan(&model, "i", "d").await.unwrap_err();
        assert!(matches!(err, GenerationError::UpstreamUnavailable(_)));
    }

    #[test]
    fn decode_rejects_markdown_fenced_output() {
        let fenced = format!("```json\n{}\n```", valid_plan_json());
        let err = decode_plan(&fenced).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[test]
    fn decode_accepts_surrounding_whitespace() {
        let padded = format!("\n  {}  \n", valid_plan_json());
        let plan = decode_plan(&padded).expect("whitespace is not prose");
        assert_eq!(plan.steps.len(), 3);
    }
}
