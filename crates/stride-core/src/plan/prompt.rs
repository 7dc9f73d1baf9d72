//! Prompt construction for plan generation.
//!
//! The system prompt is the only schema description the model ever sees,
//! so it states the JSON shape and the structural rules exactly as
//! `validate` enforces them. Keep the two in lockstep.

use crate::model::{ChatMessage, CompletionRequest};
use crate::plan::validate::{MAX_STEPS, MAX_TASKS_PER_STEP, MIN_STEPS, MIN_TASKS_PER_STEP};

/// Sampling temperature used for every generation request.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// The wire shape shown to the model, verbatim.
const SCHEMA_REFERENCE: &str = r#"{
  "steps": [
    {
      "step": number,
      "title": string,
      "tasks": [
        { "day": number, "task": string, "completed": false }
      ]
    }
  ]
}"#;

/// Build the system prompt: role, schema, and structural rules.
pub fn build_system_prompt() -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str("You are an expert product strategist helping founders ship an MVP. ");
    prompt.push_str("The user gives you an idea name and a description. ");
    prompt.push_str("Break the build into sequential steps of daily tasks.\n\n");
    prompt.push_str("Respond ONLY with valid JSON matching this exact schema:\n\n");
    prompt.push_str(SCHEMA_REFERENCE);
    prompt.push_str("\n\nRules:\n");
    prompt.push_str("- Base every step and task on the idea and description provided.\n");
    prompt.push_str(&format!("- Include {MIN_STEPS} to {MAX_STEPS} steps.\n"));
    prompt.push_str(&format!(
        "- Each step has {MIN_TASKS_PER_STEP} to {MAX_TASKS_PER_STEP} daily tasks.\n"
    ));
    prompt.push_str("- \"step\" numbers run 1, 2, 3, ... in order.\n");
    prompt.push_str(
        "- \"day\" numbers are continuous across the whole plan, starting at 1; \
         do not restart numbering in each step.\n",
    );
    prompt.push_str("- \"completed\" is always false.\n");
    prompt.push_str("- Output nothing outside the JSON object: no prose, no markdown fences.");
    prompt
}

/// Build the user message carrying the idea and its description.
pub fn build_user_message(idea: &str, description: &str) -> String {
    format!("Idea: {idea}\nDescription: {description}")
}

/// Assemble the full completion request for one idea/description pair.
pub fn build_request(idea: &str, description: &str) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system(build_system_prompt()),
            ChatMessage::user(build_user_message(idea, description)),
        ],
        temperature: GENERATION_TEMPERATURE,
    }
}
