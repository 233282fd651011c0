//! CLI argument parsing
//!
//! A single positional argument: the path to the disk image to recover.
//! Both the carving pass and the NTFS recovery pass run unconditionally,
//! in sequence, against that one image.

use clap::Parser;
use std::path::PathBuf;

/// Recovers deleted files from a raw disk image.
#[derive(Parser)]
#[command(name = "salvager")]
#[command(version)]
#[command(about = "Recover deleted files from a disk image", long_about = None)]
pub struct Cli {
    /// Path to the disk image to scan
    pub image_path: PathBuf,
}
