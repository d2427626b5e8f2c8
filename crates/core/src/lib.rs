pub mod backup;
pub mod engine;
pub mod health;
pub mod parse;
pub mod types;

pub use backup::list_backups;
pub use engine::Maintainer;
pub use health::{HealthCheck, HealthGrade, HealthReport};
pub use types::*;
