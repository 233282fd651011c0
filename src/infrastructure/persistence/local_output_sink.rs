//! Local filesystem output sink
//!
//! Creates one file per recovered object in a fixed output directory, named
//! `recovered_<offset>.<ext>` by the carver.

use crate::domain::repositories::{OutputHandle, OutputSink, OutputSinkError};
use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;

/// Writes recovered files into a single output directory.
pub struct LocalOutputSink {
    output_dir: PathBuf,
}

impl LocalOutputSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, OutputSinkError> {
        let output_dir = output_dir.into();
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir).map_err(|e| {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    OutputSinkError::PermissionDenied(output_dir.display().to_string())
                } else {
                    OutputSinkError::Io(e)
                }
            })?;
        }
        Ok(Self { output_dir })
    }
}

impl OutputSink for LocalOutputSink {
    fn create(&self, name: &str) -> Result<Box<dyn OutputHandle>, OutputSinkError> {
        let path = self.output_dir.join(name);
        if !self.output_dir.exists() {
            return Err(OutputSinkError::DirectoryNotFound(
                self.output_dir.display().to_string(),
            ));
        }
        let file = File::create(&path)?;
        Ok(Box::new(LocalOutputHandle { file, len: 0 }))
    }
}

struct LocalOutputHandle {
    file: File,
    len: u64,
}

impl OutputHandle for LocalOutputHandle {
    fn write_all(&mut self, data: &[u8]) -> Result<(), OutputSinkError> {
        self.file.write_all(data)?;
        self.len += data.len() as u64;
        Ok(())
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn truncate(&mut self, len: u64) -> Result<(), OutputSinkError> {
        self.file.set_len(len)?;
        self.file.seek(SeekFrom::Start(len))?;
        self.len = len;
        Ok(())
    }
}
