//! NTFS partition and volume geometry location
//!
//! Finds the NTFS partition via the MBR, reads its Volume Boot Record, and
//! derives the geometry (cluster size, $MFT offset, MFT record size) the
//! rest of the NTFS pipeline needs.

use crate::domain::repositories::{ImageError, ImageReader};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use thiserror::Error;

/// Errors from MBR/VBR parsing.
#[derive(Error, Debug)]
pub enum NtfsError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("invalid MBR signature (expected 0xAA55)")]
    InvalidMbrSignature,

    #[error("no NTFS partition found in the MBR partition table")]
    NoNtfsPartition,

    #[error("invalid VBR signature (expected 0xAA55)")]
    InvalidVbrSignature,

    #[error("I/O error reading VBR fields: {0}")]
    Io(#[from] std::io::Error),
}

const SECTOR_SIZE: u64 = 512;
const NTFS_PARTITION_TYPE: u8 = 0x07;
const MBR_SIGNATURE: u16 = 0xAA55;

/// Derived volume geometry needed to walk the $MFT.
#[derive(Debug, Clone, Copy)]
pub struct NtfsGeometry {
    /// Absolute byte offset of the NTFS partition on the image.
    pub partition_offset: u64,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub mft_lcn: u64,
    pub mft_record_size_raw: i8,
}

impl NtfsGeometry {
    pub fn bytes_per_cluster(&self) -> u64 {
        self.sectors_per_cluster as u64 * self.bytes_per_sector as u64
    }

    pub fn mft_offset(&self) -> u64 {
        self.partition_offset + self.mft_lcn * self.bytes_per_cluster()
    }

    /// Size in bytes of a single MFT record.
    pub fn entry_size(&self) -> u64 {
        if self.mft_record_size_raw < 0 {
            1u64 << (-self.mft_record_size_raw as u64)
        } else {
            self.mft_record_size_raw as u64 * self.bytes_per_cluster()
        }
    }
}

/// Locates the NTFS partition and reads its boot sector.
pub struct NtfsLocator;

impl NtfsLocator {
    /// Reads 512 bytes at offset 0, validates the MBR signature, and
    /// returns the byte offset of the first `fs_type == 0x07` partition.
    pub fn find_ntfs_partition_offset(image: &dyn ImageReader) -> Result<u64, NtfsError> {
        let mut mbr = [0u8; 512];
        image.read_exact_at(0, &mut mbr)?;

        let signature = u16::from_le_bytes([mbr[510], mbr[511]]);
        if signature != MBR_SIGNATURE {
            return Err(NtfsError::InvalidMbrSignature);
        }

        for i in 0..4 {
            let entry = &mbr[0x1BE + i * 16..0x1BE + (i + 1) * 16];
            let fs_type = entry[0x04];
            if fs_type == NTFS_PARTITION_TYPE {
                let start_lba = u32::from_le_bytes(entry[0x08..0x0C].try_into().unwrap());
                return Ok(start_lba as u64 * SECTOR_SIZE);
            }
        }

        Err(NtfsError::NoNtfsPartition)
    }

    /// Reads the VBR at `partition_offset` and returns the derived geometry.
    pub fn read_geometry(
        image: &dyn ImageReader,
        partition_offset: u64,
    ) -> Result<NtfsGeometry, NtfsError> {
        let mut vbr = [0u8; 512];
        image.read_exact_at(partition_offset, &mut vbr)?;

        let signature = u16::from_le_bytes([vbr[0x1FE], vbr[0x1FF]]);
        if signature != MBR_SIGNATURE {
            return Err(NtfsError::InvalidVbrSignature);
        }

        let mut cursor = Cursor::new(&vbr[..]);
        cursor.set_position(0x0B);
        let bytes_per_sector = cursor.read_u16::<LittleEndian>()?;
        let sectors_per_cluster = cursor.read_u8()?;

        cursor.set_position(0x30);
        let mft_lcn = cursor.read_u64::<LittleEndian>()?;

        cursor.set_position(0x40);
        let mft_record_size_raw = cursor.read_i8()?;

        Ok(NtfsGeometry {
            partition_offset,
            bytes_per_sector,
            sectors_per_cluster,
            mft_lcn,
            mft_record_size_raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FixedImage {
        data: RefCell<Vec<u8>>,
    }

    impl ImageReader for FixedImage {
        fn open(_path: &str) -> Result<Self, ImageError> {
            unimplemented!()
        }
        fn size(&self) -> u64 {
            self.data.borrow().len() as u64
        }
        fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, ImageError> {
            let data = self.data.borrow();
            let offset = offset as usize;
            if offset >= data.len() {
                return Ok(0);
            }
            let n = buf.len().min(data.len() - offset);
            buf[..n].copy_from_slice(&data[offset..offset + n]);
            Ok(n)
        }
    }

    fn synthetic_image() -> FixedImage {
        let mut data = vec![0u8; 1_048_576 + 512];

        data[0x1BE + 0x04] = 0x07;
        let start_lba: u32 = 2048;
        data[0x1BE + 0x08..0x1BE + 0x0C].copy_from_slice(&start_lba.to_le_bytes());
        data[510] = 0x55;
        data[511] = 0xAA;

        let vbr_off = 1_048_576usize;
        data[vbr_off + 0x0B..vbr_off + 0x0D].copy_from_slice(&512u16.to_le_bytes());
        data[vbr_off + 0x0D] = 8;
        data[vbr_off + 0x30..vbr_off + 0x38].copy_from_slice(&4u64.to_le_bytes());
        data[vbr_off + 0x40] = (-10i8) as u8;
        data[vbr_off + 0x1FE] = 0x55;
        data[vbr_off + 0x1FF] = 0xAA;

        FixedImage {
            data: RefCell::new(data),
        }
    }

    #[test]
    fn finds_partition_offset_from_mbr() {
        let image = synthetic_image();
        let offset = NtfsLocator::find_ntfs_partition_offset(&image).unwrap();
        assert_eq!(offset, 1_048_576);
    }

    #[test]
    fn derives_geometry_from_vbr() {
        let image = synthetic_image();
        let partition_offset = NtfsLocator::find_ntfs_partition_offset(&image).unwrap();
        let geometry = NtfsLocator::read_geometry(&image, partition_offset).unwrap();
        assert_eq!(geometry.entry_size(), 1024);
        assert_eq!(geometry.mft_offset(), 1_048_576 + 4 * 4096);
    }

    #[test]
    fn positive_record_size_is_clusters_times_cluster_size() {
        let geometry = NtfsGeometry {
            partition_offset: 0,
            bytes_per_sector: 512,
            sectors_per_cluster: 8,
            mft_lcn: 0,
            mft_record_size_raw: 2,
        };
        assert_eq!(geometry.entry_size(), 8192);
    }

    #[test]
    fn missing_mbr_signature_is_an_error() {
        let image = FixedImage {
            data: RefCell::new(vec![0u8; 512]),
        };
        assert!(matches!(
            NtfsLocator::find_ntfs_partition_offset(&image),
            Err(NtfsError::InvalidMbrSignature)
        ));
    }
}
