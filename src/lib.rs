//! Shiftwatch - Supervision & Work-Activity Tracking
//!
//! Shiftwatch records supervision sessions: a supervisor observes a worker
//! running through a sequence of timed activities, logging downtime windows
//! (failures) that may span several activities, free-form comments, and an
//! independent verification mark on sessions and activity records.
//!
//! # Architecture
//!
//! The crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): entity models, error taxonomy, port traits
//! - **Service Layer** (`services`): lifecycle coordination (the state machine)
//! - **Adapters** (`adapters`): SQLite and in-memory implementations of the ports
//! - **Infrastructure** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    ActivityStatistics, Comment, CommentFile, Config, DatabaseConfig, Failure, LoggingConfig,
    Supervision, Verifiable,
};
pub use domain::ports::{
    ActivityStatisticsRepository, Clock, CommentRepository, FailureRepository, SupervisionFilter,
    SupervisionRepository, SystemClock,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ActivityService, CommentService, FailureService, SupervisionService};
