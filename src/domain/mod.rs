//! Domain layer for the shiftwatch tracking core
//!
//! This module contains the entity models, the error taxonomy, and the port
//! traits the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
