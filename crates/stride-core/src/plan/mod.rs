//! Plan generation: prompt construction, strict decoding, and structural
//! validation.

pub mod generate;
pub mod prompt;
pub mod validate;

pub use generate::{GenerationError, decode_plan, generate_plan};
pub use validate::{PlanSchemaError, validate_plan};
