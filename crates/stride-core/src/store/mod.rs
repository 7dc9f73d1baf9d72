//! The `ProjectStore` seam: the narrow interface the sync flow needs from
//! the remote store, plus its PostgreSQL implementation.

pub mod postgres;
pub mod trait_def;

pub use postgres::PgProjectStore;
pub use trait_def::{NewProject, ProjectStore};
