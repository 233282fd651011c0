//! Carving engine
//!
//! Streaming scan over a disk image: buffered reads with cross-buffer
//! overlap, a per-buffer state machine that opens an output file on a
//! header match and closes it on a footer match (or forces it closed on a
//! collision or size cap), and an incremental-finalization policy for
//! signatures whose footer may legitimately recur.

use crate::domain::entities::{CarveReport, FileSignature};
use crate::domain::repositories::{ImageError, ImageReader, OutputHandle, OutputSink};
use crate::domain::services::pattern_search;
use crate::domain::services::signature_registry::SignatureRegistry;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during carving.
#[derive(Error, Debug)]
pub enum CarverError {
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("output sink error: {0}")]
    Output(#[from] crate::domain::repositories::OutputSinkError),
}

const BUFFER_SIZE: usize = 1024 * 1024;
const OVERLAP: usize = 16;

/// Per-image mutable carving state.
struct ExtractState<'a> {
    signature: &'a FileSignature,
    handle: Box<dyn OutputHandle>,
    /// Absolute position within the output file of the last valid
    /// incremental footer candidate, if any.
    last_valid_footer_offset: Option<u64>,
}

/// Streaming signature carver: the only stateful piece of the carving
/// pipeline. One engine processes one image from start to finish.
pub struct CarvingEngine {
    registry: SignatureRegistry,
}

impl CarvingEngine {
    pub fn new(registry: SignatureRegistry) -> Self {
        Self { registry }
    }

    /// Runs the full streaming scan over `image`, creating outputs through
    /// `sink` as signatures are found.
    pub fn carve(
        &self,
        image: &dyn ImageReader,
        sink: &dyn OutputSink,
    ) -> Result<CarveReport, CarverError> {
        let mut report = CarveReport::new();
        let size = image.size();
        let mut current_offset: u64 = 0;
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut state: Option<ExtractState> = None;

        while current_offset < size {
            let read_len = BUFFER_SIZE.min((size - current_offset) as usize);
            let n = image.read_at(current_offset, &mut buffer[..read_len])?;
            if n == 0 {
                break;
            }
            let chunk = &buffer[..n];
            report.bytes_scanned += n as u64;

            self.scan_buffer(chunk, current_offset, &mut state, sink, &mut report)?;

            let more_data_remains = current_offset + n as u64 < size;
            if state.is_some() {
                current_offset += n as u64;
            } else if more_data_remains {
                current_offset += (n - OVERLAP) as u64;
            } else {
                current_offset += n as u64;
            }
        }

        // Anything still open at EOF never saw a footer or collision; close
        // it out like any other forced termination.
        if let Some(active) = state.take() {
            self.force_finalize(active, &mut report)?;
        }

        Ok(report)
    }

    fn scan_buffer<'a>(
        &'a self,
        buffer: &[u8],
        buffer_base: u64,
        state: &mut Option<ExtractState<'a>>,
        sink: &dyn OutputSink,
        report: &mut CarveReport,
    ) -> Result<(), CarverError> {
        let mut idx = 0usize;
        let len = buffer.len();

        while idx < len {
            match state {
                None => match self.find_header(buffer, idx) {
                    Some((header_pos, sig)) => {
                        let absolute_offset = buffer_base + header_pos as u64;
                        let name = format!("recovered_{absolute_offset}.{}", sig.extension);
                        debug!(offset = absolute_offset, ext = sig.extension, "carving header match");
                        let mut handle = sink.create(&name)?;
                        idx = header_pos + sig.header.len();

                        if let Err(e) = handle.write_all(&sig.header) {
                            warn!(offset = absolute_offset, ext = sig.extension, error = %e, "write failed, dropping extraction");
                            continue;
                        }
                        *state = Some(ExtractState {
                            signature: sig,
                            handle,
                            last_valid_footer_offset: None,
                        });
                    }
                    None => break,
                },
                Some(active) => {
                    let collision = self.find_collision(buffer, idx, active.signature.extension);
                    let footer = if active.signature.has_footer {
                        pattern_search::search(buffer, &active.signature.footer, idx)
                    } else {
                        None
                    };

                    let collision_wins = match (collision, footer) {
                        (Some(c), Some(f)) => c <= f,
                        (Some(_), None) => true,
                        _ => false,
                    };

                    if collision_wins {
                        let collision_pos = collision.unwrap();
                        if let Err(e) = active.handle.write_all(&buffer[idx..collision_pos]) {
                            warn!(ext = active.signature.extension, error = %e, "write failed, dropping extraction");
                            *state = None;
                            idx = collision_pos;
                            continue;
                        }
                        self.force_finalize(state.take().unwrap(), report)?;
                        idx = collision_pos;
                        continue;
                    }

                    if let Some(footer_pos) = footer {
                        let footer_end = footer_pos + active.signature.footer.len();

                        if let Err(e) = active.handle.write_all(&buffer[idx..footer_pos]) {
                            warn!(ext = active.signature.extension, error = %e, "write failed, dropping extraction");
                            *state = None;
                            idx = footer_end;
                            continue;
                        }
                        if let Err(e) = active.handle.write_all(&active.signature.footer) {
                            warn!(ext = active.signature.extension, error = %e, "write failed, dropping extraction");
                            *state = None;
                            idx = footer_end;
                            continue;
                        }
                        idx = footer_end;

                        if active.signature.is_incremental {
                            active.last_valid_footer_offset = Some(active.handle.len());
                            if active.handle.len() > active.signature.max_size {
                                self.force_finalize(state.take().unwrap(), report)?;
                            }
                            continue;
                        } else {
                            report.files_recovered += 1;
                            *state = None;
                            continue;
                        }
                    }

                    // Neither collision nor footer found in the rest of this buffer.
                    if let Err(e) = active.handle.write_all(&buffer[idx..]) {
                        warn!(ext = active.signature.extension, error = %e, "write failed, dropping extraction");
                        *state = None;
                        break;
                    }
                    if active.handle.len() > active.signature.max_size {
                        warn!(ext = active.signature.extension, "carved file exceeded size cap");
                        self.force_finalize(state.take().unwrap(), report)?;
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    fn find_header<'a>(
        &'a self,
        buffer: &[u8],
        from: usize,
    ) -> Option<(usize, &'a FileSignature)> {
        let mut best: Option<(usize, &FileSignature)> = None;
        for sig in self.registry.signatures() {
            if let Some(pos) = pattern_search::search(buffer, &sig.header, from) {
                best = match best {
                    Some((best_pos, _)) if best_pos <= pos => best,
                    _ => Some((pos, sig)),
                };
            }
        }
        best
    }

    fn find_collision(&self, buffer: &[u8], from: usize, active_ext: &str) -> Option<usize> {
        let mut best: Option<usize> = None;
        for sig in self.registry.signatures() {
            if !SignatureRegistry::is_collision(active_ext, sig.extension) {
                continue;
            }
            if let Some(pos) = pattern_search::search(buffer, &sig.header, from) {
                best = match best {
                    Some(b) if b <= pos => best,
                    _ => Some(pos),
                };
            }
        }
        best
    }

    fn force_finalize(
        &self,
        mut active: ExtractState<'_>,
        report: &mut CarveReport,
    ) -> Result<(), CarverError> {
        if active.signature.is_incremental {
            if let Some(valid_len) = active.last_valid_footer_offset {
                active.handle.truncate(valid_len)?;
            }
        }
        report.files_recovered += 1;
        report.force_finalized += 1;
        Ok(())
    }
}
