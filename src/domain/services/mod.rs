//! Domain services
//!
//! Core business logic services that operate on domain entities.

mod carver;
pub mod ntfs;
mod pattern_search;
mod signature_registry;

pub use carver::{CarverError, CarvingEngine};
pub use pattern_search::search;
pub use signature_registry::SignatureRegistry;
