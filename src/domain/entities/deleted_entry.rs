//! Deleted-file discovery entity
//!
//! Represents an NTFS MFT record flagged as deleted, as reported by the
//! `MFTScanner`/`AttributeParser` pipeline.

/// A deleted MFT entry discovered during a scan.
#[derive(Debug, Clone)]
pub struct DeletedEntry {
    /// Absolute byte offset of the MFT record on disk, reported as the
    /// "MFT Index" in the discovery log line.
    pub mft_index: u64,
    /// Whether the `flags` field had bit 1 set (directory, not a plain file).
    pub is_directory: bool,
    /// File names recovered from `$FILE_NAME` (type `0x30`) attributes.
    /// A record may carry more than one name (e.g. long name + DOS 8.3 alias).
    pub names: Vec<String>,
}

impl DeletedEntry {
    pub fn new(mft_index: u64, is_directory: bool) -> Self {
        Self {
            mft_index,
            is_directory,
            names: Vec::new(),
        }
    }
}
