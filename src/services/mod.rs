//! Service layer: lifecycle coordination over the repository ports.

pub mod activity_service;
pub mod comment_service;
pub mod failure_service;
pub mod supervision_service;

pub use activity_service::ActivityService;
pub use comment_service::CommentService;
pub use failure_service::FailureService;
pub use supervision_service::SupervisionService;
