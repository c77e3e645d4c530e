pub mod activity;
pub mod comment;
pub mod config;
pub mod duration;
pub mod failure;
pub mod supervision;
pub mod verify;

pub use activity::ActivityStatistics;
pub use comment::{Comment, CommentFile};
pub use config::{Config, DatabaseConfig, LoggingConfig};
pub use duration::format_duration;
pub use failure::Failure;
pub use supervision::Supervision;
pub use verify::Verifiable;
