//! Domain layer - pure types and rules, no I/O.

pub mod compliance;
pub mod foundation;
pub mod tools;
