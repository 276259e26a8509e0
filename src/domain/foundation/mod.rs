//! Foundation module - Shared domain primitives.
//!
//! Identifiers and validation errors shared by the rest of the domain.

mod errors;
mod ids;

pub use errors::ValidationError;
pub use ids::{MessageId, ThreadId};
