//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories.
//! This layer contains all external dependencies and platform-specific code.

pub mod image;
pub mod persistence;
