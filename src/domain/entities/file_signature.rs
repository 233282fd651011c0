//! File signature entity
//!
//! Represents the magic bytes (header and optional footer) that identify
//! a specific file type. This is the foundation of file carving.

/// A byte-signature recognized by the carving engine.
///
/// Signatures are loaded once into a [`crate::domain::services::SignatureRegistry`]
/// and never mutated afterward.
#[derive(Debug, Clone)]
pub struct FileSignature {
    /// Short identifier used when naming recovered files, e.g. `"jpg"`.
    pub extension: &'static str,
    /// Non-empty byte sequence that opens a file of this type.
    pub header: Vec<u8>,
    /// Byte sequence that closes a file of this type. Empty iff `!has_footer`.
    pub footer: Vec<u8>,
    /// Whether this signature defines a footer at all.
    pub has_footer: bool,
    /// If true, a footer match is only a *candidate* end: extraction keeps
    /// scanning past it, and forced termination truncates to the most
    /// recent candidate rather than closing at full buffer length.
    pub is_incremental: bool,
    /// Per-output size cap in bytes, enforced while this signature is active.
    pub max_size: u64,
}

impl FileSignature {
    /// Builds a signature with a footer that ends extraction on first match.
    pub fn new(extension: &'static str, header: Vec<u8>, footer: Vec<u8>, max_size: u64) -> Self {
        debug_assert!(!header.is_empty());
        Self {
            extension,
            has_footer: !footer.is_empty(),
            is_incremental: false,
            footer,
            header,
            max_size,
        }
    }

    /// Builds an incremental signature: the footer may recur legitimately and
    /// only the last occurrence before forced termination is kept.
    pub fn incremental(
        extension: &'static str,
        header: Vec<u8>,
        footer: Vec<u8>,
        max_size: u64,
    ) -> Self {
        let mut sig = Self::new(extension, header, footer, max_size);
        sig.is_incremental = true;
        sig
    }
}
