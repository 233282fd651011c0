//! File-backed image reader
//!
//! Provides random-access read access to a disk image file. Generalizes the
//! block-device reader this project started from away from a `/dev/sdX`
//! target down to a plain, seekable image file.

use crate::domain::repositories::{ImageError, ImageReader};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

/// Read-only, file-backed [`ImageReader`].
pub struct FileImageReader {
    file: Mutex<File>,
    size: u64,
}

impl ImageReader for FileImageReader {
    fn open(path: &str) -> Result<Self, ImageError> {
        let path_obj = Path::new(path);

        if !path_obj.exists() {
            return Err(ImageError::NotFound(path.to_string()));
        }

        let file = OpenOptions::new().read(true).open(path_obj).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                ImageError::PermissionDenied(path.to_string())
            } else {
                ImageError::Io(e)
            }
        })?;

        let size = file.metadata()?.len();

        Ok(Self {
            file: Mutex::new(file),
            size,
        })
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, ImageError> {
        if offset >= self.size {
            return Ok(0);
        }

        let mut file = self
            .file
            .lock()
            .map_err(|_| ImageError::Io(std::io::Error::other("image lock poisoned")))?;

        file.seek(SeekFrom::Start(offset))?;

        let available = (self.size - offset) as usize;
        let to_read = buf.len().min(available);

        let mut read_total = 0;
        while read_total < to_read {
            let n = file.read(&mut buf[read_total..to_read])?;
            if n == 0 {
                break;
            }
            read_total += n;
        }

        Ok(read_total)
    }
}
