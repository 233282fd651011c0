//! Salvager - disk image file-recovery tool
//!
//! Combines signature-based file carving with NTFS metadata recovery to pull
//! deleted files out of a raw disk image.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
