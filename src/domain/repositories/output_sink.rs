//! Output sink trait
//!
//! Defines the interface the carver uses to create and write recovered
//! files. Kept deliberately narrow — write, current length, and truncate —
//! so any backing store (plain files, an in-memory buffer for tests) can
//! implement it.

use thiserror::Error;

/// Errors that can occur when creating or writing recovered output files.
#[derive(Error, Debug)]
pub enum OutputSinkError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single open recovered-file output, created by [`OutputSink::create`].
///
/// Exactly one `OutputHandle` is live at a time during carving, matching the
/// `isExtracting` invariant: a new file is opened only after the previous one
/// is finalized.
pub trait OutputHandle {
    /// Appends `data` to the output.
    fn write_all(&mut self, data: &[u8]) -> Result<(), OutputSinkError>;

    /// Current length of the output in bytes.
    fn len(&self) -> u64;

    /// Whether the output is currently empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Truncates the output to `len` bytes. Used by incremental finalization
    /// to roll back to the last valid footer candidate.
    fn truncate(&mut self, len: u64) -> Result<(), OutputSinkError>;
}

/// Creates [`OutputHandle`]s for recovered files.
pub trait OutputSink {
    /// Creates (or truncates) an output file named `recovered_<offset>.<ext>`
    /// and returns a handle to it, open for writing.
    fn create(&self, name: &str) -> Result<Box<dyn OutputHandle>, OutputSinkError>;
}
