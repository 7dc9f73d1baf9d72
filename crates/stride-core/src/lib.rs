//! Domain engine for stride: plan generation and task-state synchronization.
//!
//! Two flows share the plan data structure but never call each other:
//! [`plan::generate_plan`] turns an idea/description pair into a validated
//! plan via a [`model::TextModel`], and [`sync::toggle_task`] keeps one
//! task's completion flag consistent between an in-memory plan and a
//! [`store::ProjectStore`].

pub mod model;
pub mod plan;
pub mod store;
pub mod sync;
