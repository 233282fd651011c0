//! Image reader trait
//!
//! Defines the interface for random-access byte reads against a disk image.
//! This is the one seam the carving and NTFS pipelines both depend on.

use std::io;
use thiserror::Error;

/// Errors that can occur when reading from a disk image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("offset {offset} is beyond image size {size}")]
    OffsetOutOfRange { offset: u64, size: u64 },

    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },
}

/// Random-access, read-only view over a disk image.
///
/// Implementations own the underlying file handle for the full session;
/// the carver and the NTFS pipeline borrow it serially, never concurrently,
/// per the single-threaded concurrency model.
pub trait ImageReader: Send + Sync {
    /// Opens the image at `path`, determining its total size up front.
    fn open(path: &str) -> Result<Self, ImageError>
    where
        Self: Sized;

    /// Total size of the image in bytes.
    fn size(&self) -> u64;

    /// Reads up to `buf.len()` bytes starting at `offset`, returning the
    /// number of bytes actually read. A short read is only an error
    /// condition for callers that require exact-size semantics; this method
    /// itself returns short reads at EOF truthfully rather than failing.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, ImageError>;

    /// Reads exactly `buf.len()` bytes starting at `offset`, failing with
    /// [`ImageError::ShortRead`] if fewer are available.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), ImageError> {
        let n = self.read_at(offset, buf)?;
        if n != buf.len() {
            return Err(ImageError::ShortRead {
                offset,
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }
}
