//! Recover NTFS use case
//!
//! Orchestrates locating the NTFS partition, walking the $MFT, and
//! reporting every deleted entry (and its recovered name, if any).

use crate::domain::entities::NtfsRecoveryReport;
use crate::domain::repositories::ImageReader;
use crate::domain::services::ntfs::{MftScanner, NtfsError, NtfsLocator};
use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the MBR -> VBR -> $MFT -> attribute-parser pipeline against a
/// disk image and logs each deleted entry as it is found.
pub struct RecoverNtfsUseCase;

impl RecoverNtfsUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Executes the NTFS recovery pass.
    ///
    /// An image with no NTFS partition or a malformed MBR/VBR is not a
    /// fatal error: this path is skipped and an empty report is returned
    /// so carving results are still reported.
    pub fn execute(&self, image: &dyn ImageReader) -> Result<NtfsRecoveryReport> {
        let start = Instant::now();

        let partition_offset = match NtfsLocator::find_ntfs_partition_offset(image) {
            Ok(offset) => offset,
            Err(e @ (NtfsError::NoNtfsPartition | NtfsError::InvalidMbrSignature)) => {
                warn!(error = %e, "skipping NTFS recovery");
                return Ok(NtfsRecoveryReport::new());
            }
            Err(e) => return Err(e.into()),
        };

        let geometry = match NtfsLocator::read_geometry(image, partition_offset) {
            Ok(geometry) => geometry,
            Err(e @ NtfsError::InvalidVbrSignature) => {
                warn!(error = %e, "skipping NTFS recovery");
                return Ok(NtfsRecoveryReport::new());
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            partition_offset,
            mft_offset = geometry.mft_offset(),
            entry_size = geometry.entry_size(),
            "located NTFS partition"
        );

        let (entries, mut report) = MftScanner::scan_all_segments(
            image,
            partition_offset,
            geometry.mft_offset(),
            geometry.bytes_per_cluster(),
            geometry.entry_size(),
        )?;

        report.duration = start.elapsed();

        for entry in &entries {
            let kind = if entry.is_directory {
                "(Directory)"
            } else {
                "(File)"
            };
            info!("[Found Deleted File] MFT Index: {} {kind}", entry.mft_index);
            for name in &entry.names {
                info!(" - File Name: {name}");
            }
        }

        info!(
            deleted_entries_found = report.deleted_entries_found,
            duration_secs = report.duration.as_secs_f64(),
            "NTFS recovery complete"
        );

        Ok(report)
    }
}

impl Default for RecoverNtfsUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::ImageError;

    struct NoPartitionImage;

    impl ImageReader for NoPartitionImage {
        fn open(_path: &str) -> Result<Self, ImageError> {
            unimplemented!()
        }
        fn size(&self) -> u64 {
            512
        }
        fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, ImageError> {
            if offset >= 512 {
                return Ok(0);
            }
            let n = buf.len().min(512 - offset as usize);
            buf[..n].fill(0);
            Ok(n)
        }
    }

    #[test]
    fn missing_ntfs_partition_is_not_fatal() {
        let image = NoPartitionImage;
        let report = RecoverNtfsUseCase::new().execute(&image).unwrap();
        assert_eq!(report.deleted_entries_found, 0);
        assert_eq!(report.segments_scanned, 0);
    }
}
