//! Salvager - disk image file-recovery tool
//!
//! Runs signature-based file carving and NTFS metadata recovery against a
//! single disk image, in sequence, and reports everything it finds.

use anyhow::{Context, Result};
use clap::Parser;
use salvager::application::{CarveImageUseCase, RecoverNtfsUseCase};
use salvager::domain::repositories::ImageReader;
use salvager::infrastructure::image::FileImageReader;
use salvager::infrastructure::persistence::LocalOutputSink;
use salvager::presentation::cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let image_path = cli.image_path.to_string_lossy().into_owned();
    let image = FileImageReader::open(&image_path)
        .with_context(|| format!("failed to open disk image '{image_path}'"))?;

    let output_dir = cli
        .image_path
        .file_stem()
        .map(|stem| format!("{}_recovered", stem.to_string_lossy()))
        .unwrap_or_else(|| "recovered".to_string());
    let sink = LocalOutputSink::new(&output_dir)
        .with_context(|| format!("failed to create output directory '{output_dir}'"))?;

    let carve_report = CarveImageUseCase::with_default_signatures().execute(&image, &sink)?;
    println!(
        "carving: {} file(s) recovered into {output_dir} ({} bytes scanned, force-finalized: {})",
        carve_report.files_recovered, carve_report.bytes_scanned, carve_report.force_finalized
    );

    let ntfs_report = RecoverNtfsUseCase::new().execute(&image)?;
    println!(
        "ntfs recovery: {} deleted entr{} found across {} $MFT segment(s)",
        ntfs_report.deleted_entries_found,
        if ntfs_report.deleted_entries_found == 1 {
            "y"
        } else {
            "ies"
        },
        ntfs_report.segments_scanned,
    );

    Ok(())
}
