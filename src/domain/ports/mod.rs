//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that infrastructure adapters must implement:
//! - `SupervisionRepository`, `ActivityStatisticsRepository`,
//!   `FailureRepository`, `CommentRepository`: entity store operations
//! - `Clock`: timestamp source
//!
//! These contracts keep the lifecycle engine independent of the concrete
//! store.

pub mod clock;
pub mod comment_repository;
pub mod failure_repository;
pub mod statistics_repository;
pub mod supervision_repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use comment_repository::CommentRepository;
pub use failure_repository::FailureRepository;
pub use statistics_repository::{ActivityClose, ActivityStatisticsRepository};
pub use supervision_repository::{SupervisionFilter, SupervisionRepository};
