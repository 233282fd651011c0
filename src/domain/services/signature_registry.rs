//! Signature registry service
//!
//! Holds the immutable, priority-ordered catalog of file signatures the
//! carver scans for. Registry order is the tie-break order when multiple
//! headers match at the same buffer position: first-listed wins.

use crate::domain::entities::FileSignature;

/// Priority-ordered catalog of file signatures.
///
/// # Example
///
/// ```
/// use salvager::domain::services::SignatureRegistry;
///
/// let registry = SignatureRegistry::default_signatures();
/// assert_eq!(registry.signatures()[0].extension, "jpg");
/// ```
#[derive(Debug)]
pub struct SignatureRegistry {
    signatures: Vec<FileSignature>,
}

/// Default per-output size cap, applied when a signature does not specify
/// its own.
pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

impl SignatureRegistry {
    /// Builds a registry from an explicit, already priority-ordered list.
    pub fn new(signatures: Vec<FileSignature>) -> Self {
        Self { signatures }
    }

    /// The catalog entries required by the recovery engine: jpg, png, pdf,
    /// in that priority order.
    pub fn default_signatures() -> Self {
        Self::new(vec![
            FileSignature::new(
                "jpg",
                vec![0xFF, 0xD8, 0xFF],
                vec![0xFF, 0xD9],
                DEFAULT_MAX_SIZE,
            ),
            FileSignature::new(
                "png",
                vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
                vec![0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82],
                DEFAULT_MAX_SIZE,
            ),
            FileSignature::incremental(
                "pdf",
                vec![0x25, 0x50, 0x44, 0x46, 0x2D],
                vec![0x25, 0x25, 0x45, 0x4F, 0x46],
                DEFAULT_MAX_SIZE,
            ),
        ])
    }

    /// All registered signatures, in priority order.
    pub fn signatures(&self) -> &[FileSignature] {
        &self.signatures
    }

    /// Whether a header match for `candidate_ext` should be treated as a
    /// collision while `active_ext` is being extracted.
    ///
    /// PDF extraction ignores embedded JPEG headers (PDFs commonly embed
    /// JPEG image streams) but not PNG headers; every other header,
    /// including a second occurrence of the active signature's own header,
    /// is treated as a collision.
    pub fn is_collision(active_ext: &str, candidate_ext: &str) -> bool {
        !(active_ext == "pdf" && candidate_ext == "jpg")
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::default_signatures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_jpg_png_pdf() {
        let registry = SignatureRegistry::default_signatures();
        let exts: Vec<_> = registry.signatures().iter().map(|s| s.extension).collect();
        assert_eq!(exts, ["jpg", "png", "pdf"]);
    }

    #[test]
    fn pdf_ignores_jpg_but_not_png() {
        assert!(!SignatureRegistry::is_collision("pdf", "jpg"));
        assert!(SignatureRegistry::is_collision("pdf", "png"));
    }

    #[test]
    fn non_pdf_active_collides_with_everything_foreign() {
        assert!(SignatureRegistry::is_collision("jpg", "pdf"));
        assert!(SignatureRegistry::is_collision("png", "jpg"));
    }

    #[test]
    fn same_extension_recurrence_is_a_collision() {
        assert!(SignatureRegistry::is_collision("jpg", "jpg"));
        assert!(SignatureRegistry::is_collision("png", "png"));
        assert!(SignatureRegistry::is_collision("pdf", "pdf"));
    }
}
