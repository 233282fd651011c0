//! Use-case result entities
//!
//! Summaries returned by the two top-level use cases. These are thin
//! orchestration-layer results, not on-disk structures.

use std::time::Duration;

/// Summary of a single carving pass over an image.
#[derive(Debug, Clone)]
pub struct CarveReport {
    /// Total bytes scanned (sum of buffer reads).
    pub bytes_scanned: u64,
    /// Number of output files created, in header-offset order.
    pub files_recovered: usize,
    /// Number of outputs that were force-finalized (collision or size cap)
    /// rather than closed on a clean footer match.
    pub force_finalized: usize,
    /// Wall-clock duration of the scan.
    pub duration: Duration,
}

impl CarveReport {
    pub fn new() -> Self {
        Self {
            bytes_scanned: 0,
            files_recovered: 0,
            force_finalized: 0,
            duration: Duration::default(),
        }
    }
}

impl Default for CarveReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of an NTFS deleted-entry recovery pass.
#[derive(Debug, Clone)]
pub struct NtfsRecoveryReport {
    /// Number of MFT runs (extents) scanned.
    pub segments_scanned: usize,
    /// Total MFT entries inspected across all runs.
    pub entries_scanned: u64,
    /// Number of entries flagged deleted (`flags & 0x01 == 0`).
    pub deleted_entries_found: usize,
    /// Wall-clock duration of the scan.
    pub duration: Duration,
}

impl NtfsRecoveryReport {
    pub fn new() -> Self {
        Self {
            segments_scanned: 0,
            entries_scanned: 0,
            deleted_entries_found: 0,
            duration: Duration::default(),
        }
    }
}

impl Default for NtfsRecoveryReport {
    fn default() -> Self {
        Self::new()
    }
}
