//! NTFS metadata recovery pipeline
//!
//! MBR -> VBR -> $MFT's own record -> data runs -> per-extent batch scan ->
//! attribute parsing, assembled from four independently testable stages.

mod attribute_parser;
mod data_run;
mod locator;
mod mft_scanner;

pub use attribute_parser::AttributeParser;
pub use data_run::DataRunDecoder;
pub use locator::{NtfsError, NtfsGeometry, NtfsLocator};
pub use mft_scanner::MftScanner;
