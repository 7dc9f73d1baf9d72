//! PostgreSQL persistence layer for stride.
//!
//! Owns the connection pool, embedded migrations, row models, and all SQL.
//! Higher layers (stride-core, stride-cli) never write SQL themselves.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
