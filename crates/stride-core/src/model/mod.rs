//! Text-generation seam: the `TextModel` trait and its HTTP-backed adapter.

pub mod openrouter;
pub mod trait_def;

pub use openrouter::{OpenRouterConfig, OpenRouterModel};
pub use trait_def::{ChatMessage, ChatRole, CompletionRequest, TextModel};
