//! Carve image use case
//!
//! Orchestrates a full signature-carving pass over a disk image.

use crate::domain::entities::CarveReport;
use crate::domain::repositories::{ImageReader, OutputSink};
use crate::domain::services::{CarvingEngine, SignatureRegistry};
use anyhow::Result;
use std::time::Instant;
use tracing::info;

/// Runs the streaming carving engine against a disk image.
pub struct CarveImageUseCase {
    engine: CarvingEngine,
}

impl CarveImageUseCase {
    pub fn new(registry: SignatureRegistry) -> Self {
        Self {
            engine: CarvingEngine::new(registry),
        }
    }

    pub fn with_default_signatures() -> Self {
        Self::new(SignatureRegistry::default_signatures())
    }

    /// Executes the carving pass, returning a summary of what was found.
    pub fn execute(
        &self,
        image: &dyn ImageReader,
        sink: &dyn OutputSink,
    ) -> Result<CarveReport> {
        let start = Instant::now();
        info!(size = image.size(), "starting file carving");

        let mut report = self.engine.carve(image, sink)?;
        report.duration = start.elapsed();

        info!(
            files_recovered = report.files_recovered,
            force_finalized = report.force_finalized,
            duration_secs = report.duration.as_secs_f64(),
            "carving complete"
        );

        Ok(report)
    }
}
