//! Domain entities
//!
//! Core business objects that represent the fundamental concepts
//! in the file recovery domain.

mod deleted_entry;
mod file_signature;
mod mft_segment;
mod reports;

pub use deleted_entry::DeletedEntry;
pub use file_signature::FileSignature;
pub use mft_segment::MftSegment;
pub use reports::{CarveReport, NtfsRecoveryReport};
