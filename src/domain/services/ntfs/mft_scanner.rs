//! MFT batch scanner
//!
//! Batches MFT records across every $MFT extent, filters for entries
//! flagged deleted, and dispatches attribute parsing for each one found.

use crate::domain::entities::{DeletedEntry, MftSegment, NtfsRecoveryReport};
use crate::domain::repositories::{ImageError, ImageReader};
use crate::domain::services::ntfs::attribute_parser::AttributeParser;
use crate::domain::services::ntfs::data_run::DataRunDecoder;
use tracing::{debug, info};

const ENTRIES_PER_BATCH: u64 = 1024;
const DEFAULT_ENTRY_COUNT: u64 = 10_000;
const EMPTY_BATCH_STREAK_LIMIT: u32 = 5;
const ATTR_TYPE_DATA: u32 = 0x80;
const ATTR_END_MARKER: u32 = 0xFFFF_FFFF;
const MFT_SIGNATURE: [u8; 4] = *b"FILE";

/// Fixed offsets into an `MFT_ENTRY_HEADER`.
mod entry_header {
    pub const FIRST_ATTR_OFFSET: usize = 0x14;
    pub const FLAGS: usize = 0x16;
    pub const USED_SIZE: usize = 0x18;
}

pub struct MftScanner;

impl MftScanner {
    /// Reads the $MFT's own record at `mft_base_offset`, decodes its
    /// $DATA run-list, and batch-scans every resulting extent.
    pub fn scan_all_segments(
        image: &dyn ImageReader,
        partition_offset: u64,
        mft_base_offset: u64,
        bytes_per_cluster: u64,
        entry_size: u64,
    ) -> Result<(Vec<DeletedEntry>, NtfsRecoveryReport), ImageError> {
        let mut report = NtfsRecoveryReport::new();
        let mut discoveries = Vec::new();

        let mut header = vec![0u8; entry_size as usize];
        image.read_exact_at(mft_base_offset, &mut header)?;
        let first_attr_offset =
            u16::from_le_bytes([header[entry_header::FIRST_ATTR_OFFSET], header[entry_header::FIRST_ATTR_OFFSET + 1]]);
        let used_size = u32::from_le_bytes(
            header[entry_header::USED_SIZE..entry_header::USED_SIZE + 4]
                .try_into()
                .unwrap(),
        );

        let segments = Self::find_data_runs(image, mft_base_offset, first_attr_offset, used_size)?;

        for segment in segments {
            let run_start = partition_offset + segment.lcn * bytes_per_cluster;
            let run_total_entries = (segment.length * bytes_per_cluster) / entry_size;
            info!(
                lcn = segment.lcn,
                entries = run_total_entries,
                "scanning MFT run"
            );
            report.segments_scanned += 1;
            let found = Self::scan_batch(image, run_start, run_total_entries, entry_size)?;
            report.entries_scanned += run_total_entries;
            report.deleted_entries_found += found.len();
            discoveries.extend(found);
        }

        Ok((discoveries, report))
    }

    /// Scans a single run of `total_entries` starting at `mft_offset`,
    /// applying the default/safety-limit policy described in the design
    /// notes. Useful on its own for scanning just the $MFT's base extent.
    pub fn scan_segment(
        image: &dyn ImageReader,
        mft_offset: u64,
        entry_size: u64,
    ) -> Result<(Vec<DeletedEntry>, NtfsRecoveryReport), ImageError> {
        let mut header = vec![0u8; entry_size as usize];
        image.read_exact_at(mft_offset, &mut header)?;
        let first_attr_offset =
            u16::from_le_bytes([header[entry_header::FIRST_ATTR_OFFSET], header[entry_header::FIRST_ATTR_OFFSET + 1]]);
        let used_size = u32::from_le_bytes(
            header[entry_header::USED_SIZE..entry_header::USED_SIZE + 4]
                .try_into()
                .unwrap(),
        );

        let real_mft_size =
            Self::find_data_size(image, mft_offset, first_attr_offset, used_size)?;
        let total_entries = if real_mft_size > 0 {
            real_mft_size / entry_size
        } else {
            DEFAULT_ENTRY_COUNT
        };
        let safety_limit = total_entries + total_entries / 10;

        info!(total_entries, safety_limit, "scanning MFT for deleted files");

        let mut report = NtfsRecoveryReport::new();
        report.segments_scanned = 1;
        let mut discoveries = Vec::new();
        let mut empty_batch_streak = 0u32;

        let mut i = 0u64;
        while i < total_entries {
            let current_batch_cnt = ENTRIES_PER_BATCH.min(safety_limit.saturating_sub(i));
            if current_batch_cnt == 0 {
                break;
            }
            let batch_offset = mft_offset + i * entry_size;
            let found = Self::scan_batch(image, batch_offset, current_batch_cnt, entry_size)?;
            report.entries_scanned += current_batch_cnt;

            if found.is_empty() {
                empty_batch_streak += 1;
            } else {
                empty_batch_streak = 0;
            }
            report.deleted_entries_found += found.len();
            discoveries.extend(found);

            if empty_batch_streak >= EMPTY_BATCH_STREAK_LIMIT {
                debug!("reached end of valid MFT data");
                break;
            }
            i += ENTRIES_PER_BATCH;
        }

        Ok((discoveries, report))
    }

    fn scan_batch(
        image: &dyn ImageReader,
        start_offset: u64,
        total_entries: u64,
        entry_size: u64,
    ) -> Result<Vec<DeletedEntry>, ImageError> {
        let mut discoveries = Vec::new();
        let mut i = 0u64;

        while i < total_entries {
            let batch_cnt = ENTRIES_PER_BATCH.min(total_entries - i);
            let batch_size = (batch_cnt * entry_size) as usize;
            let batch_offset = start_offset + i * entry_size;

            let mut buffer = vec![0u8; batch_size];
            let n = image.read_at(batch_offset, &mut buffer)?;
            if n < batch_size {
                i += ENTRIES_PER_BATCH;
                continue;
            }

            for j in 0..batch_cnt {
                let record = &buffer[(j * entry_size) as usize..((j + 1) * entry_size) as usize];
                if record.len() < 4 || record[0..4] != MFT_SIGNATURE {
                    continue;
                }

                let flags = u16::from_le_bytes([record[entry_header::FLAGS], record[entry_header::FLAGS + 1]]);
                if flags & 0x01 != 0 {
                    continue; // in-use, not deleted
                }

                let global_pos = batch_offset + j * entry_size;
                let is_directory = flags & 0x02 != 0;
                info!(
                    mft_index = global_pos,
                    directory = is_directory,
                    "found deleted MFT entry"
                );

                let first_attr_offset = u16::from_le_bytes([
                    record[entry_header::FIRST_ATTR_OFFSET],
                    record[entry_header::FIRST_ATTR_OFFSET + 1],
                ]);
                let used_size = u32::from_le_bytes(
                    record[entry_header::USED_SIZE..entry_header::USED_SIZE + 4]
                        .try_into()
                        .unwrap(),
                );

                let mut entry = DeletedEntry::new(global_pos, is_directory);
                entry.names = AttributeParser::parse_file_names(
                    image,
                    global_pos,
                    first_attr_offset,
                    used_size,
                )?;
                for name in &entry.names {
                    info!(name = %name, "recovered file name");
                }
                discoveries.push(entry);
            }

            i += ENTRIES_PER_BATCH;
        }

        Ok(discoveries)
    }

    fn find_data_runs(
        image: &dyn ImageReader,
        entry_pos: u64,
        first_attr_offset: u16,
        used_size: u32,
    ) -> Result<Vec<MftSegment>, ImageError> {
        let mut offset = first_attr_offset as u32;

        while offset + 8 <= used_size {
            let mut common = [0u8; 8];
            image.read_exact_at(entry_pos + offset as u64, &mut common)?;
            let attr_type = u32::from_le_bytes(common[0..4].try_into().unwrap());
            let attr_length = u32::from_le_bytes(common[4..8].try_into().unwrap());

            if attr_type == ATTR_END_MARKER {
                break;
            }

            if attr_type == ATTR_TYPE_DATA {
                let mut data_run_offset_bytes = [0u8; 2];
                image.read_exact_at(
                    entry_pos + offset as u64 + 0x20,
                    &mut data_run_offset_bytes,
                )?;
                let data_run_offset = u16::from_le_bytes(data_run_offset_bytes) as u32;

                let run_len = attr_length.saturating_sub(data_run_offset) as usize;
                let mut run_data = vec![0u8; run_len];
                image.read_exact_at(entry_pos + offset as u64 + data_run_offset as u64, &mut run_data)?;

                return Ok(DataRunDecoder::decode(&run_data));
            }

            if attr_length == 0 {
                break;
            }
            offset += attr_length;
        }

        Ok(Vec::new())
    }

    fn find_data_size(
        image: &dyn ImageReader,
        entry_pos: u64,
        first_attr_offset: u16,
        used_size: u32,
    ) -> Result<u64, ImageError> {
        let mut offset = first_attr_offset as u32;

        while offset + 8 <= used_size {
            let mut common = [0u8; 8];
            image.read_exact_at(entry_pos + offset as u64, &mut common)?;
            let attr_type = u32::from_le_bytes(common[0..4].try_into().unwrap());
            let attr_length = u32::from_le_bytes(common[4..8].try_into().unwrap());

            if attr_type == ATTR_END_MARKER {
                break;
            }

            if attr_type == ATTR_TYPE_DATA {
                let mut data_size_bytes = [0u8; 8];
                image.read_exact_at(entry_pos + offset as u64 + 0x30, &mut data_size_bytes)?;
                return Ok(u64::from_le_bytes(data_size_bytes));
            }

            if attr_length == 0 {
                break;
            }
            offset += attr_length;
        }

        Ok(0)
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

    fn write_file_name_attr(record: &mut [u8], attr_offset: usize, name: &str) {
        let units: Vec<u16> = name.encode_utf16().collect();
        let value_offset: u16 = 0x18; // arbitrary resident-header size
        let value_len = 0x42 + units.len() * 2;
        let attr_total_len = value_offset as usize + value_len;

        record[attr_offset..attr_offset + 4].copy_from_slice(&0x30u32.to_le_bytes());
        record[attr_offset + 4..attr_offset + 8]
            .copy_from_slice(&(attr_total_len as u32).to_le_bytes());
        record[attr_offset + 0x14..attr_offset + 0x16].copy_from_slice(&value_offset.to_le_bytes());

        let value_pos = attr_offset + value_offset as usize;
        record[value_pos + 0x40] = units.len() as u8;
        for (i, unit) in units.iter().enumerate() {
            let p = value_pos + 0x42 + i * 2;
            record[p..p + 2].copy_from_slice(&unit.to_le_bytes());
        }
    }

    #[test]
    fn single_deleted_entry_is_found_with_its_name() {
        let entry_size = 1024usize;
        let mut record = vec![0u8; entry_size];
        record[0..4].copy_from_slice(b"FILE");
        record[entry_header::FLAGS] = 0x00; // deleted, not a directory
        let first_attr_offset = 0x38u16;
        record[entry_header::FIRST_ATTR_OFFSET..entry_header::FIRST_ATTR_OFFSET + 2]
            .copy_from_slice(&first_attr_offset.to_le_bytes());

        write_file_name_attr(&mut record, first_attr_offset as usize, "deleted.txt");
        let used_size = (first_attr_offset as usize + 0x18 + 0x42 + "deleted.txt".len() * 2 + 8) as u32;
        record[entry_header::USED_SIZE..entry_header::USED_SIZE + 4]
            .copy_from_slice(&used_size.to_le_bytes());
        record[first_attr_offset as usize + 0x18 + 0x42 + "deleted.txt".len() * 2
            ..first_attr_offset as usize + 0x18 + 0x42 + "deleted.txt".len() * 2 + 4]
            .copy_from_slice(&ATTR_END_MARKER.to_le_bytes());

        let image = FixedImage {
            data: RefCell::new(record),
        };

        let discoveries =
            MftScanner::scan_batch(&image, 0, 1, entry_size as u64).expect("scan succeeds");
        assert_eq!(discoveries.len(), 1);
        assert!(!discoveries[0].is_directory);
        assert_eq!(discoveries[0].names, vec!["deleted.txt".to_string()]);
    }

    #[test]
    fn in_use_entries_are_skipped() {
        let entry_size = 1024usize;
        let mut record = vec![0u8; entry_size];
        record[0..4].copy_from_slice(b"FILE");
        record[entry_header::FLAGS] = 0x01; // in use

        let image = FixedImage {
            data: RefCell::new(record),
        };
        let discoveries =
            MftScanner::scan_batch(&image, 0, 1, entry_size as u64).expect("scan succeeds");
        assert!(discoveries.is_empty());
    }
}
