//! NTFS data-run decoder
//!
//! Decodes a non-resident attribute's run-list into an ordered list of
//! `(lcn, length)` segments. Each run is a nibble-encoded header followed
//! by a little-endian cluster count and a little-endian, sign-extended,
//! LCN offset relative to the previous run.

use crate::domain::entities::MftSegment;

pub struct DataRunDecoder;

impl DataRunDecoder {
    /// Decodes `runlist` into its constituent segments. Stops at the first
    /// `0x00` header byte or when the slice is exhausted, whichever comes
    /// first.
    pub fn decode(runlist: &[u8]) -> Vec<MftSegment> {
        let mut segments = Vec::new();
        let mut i = 0usize;
        let mut last_lcn: i64 = 0;

        while i < runlist.len() && runlist[i] != 0x00 {
            let header = runlist[i];
            i += 1;
            let len_size = (header & 0x0F) as usize;
            let offset_size = ((header >> 4) & 0x0F) as usize;

            if i + len_size + offset_size > runlist.len() {
                break;
            }

            let mut cluster_count: u64 = 0;
            for j in 0..len_size {
                cluster_count |= (runlist[i + j] as u64) << (j * 8);
            }
            i += len_size;

            let mut offset: i64 = 0;
            for j in 0..offset_size {
                offset |= (runlist[i + j] as i64) << (j * 8);
            }
            if offset_size > 0 && (offset & (1i64 << (offset_size * 8 - 1))) != 0 {
                for j in offset_size..8 {
                    offset |= 0xFFi64 << (j * 8);
                }
            }
            i += offset_size;

            last_lcn += offset;
            segments.push(MftSegment {
                lcn: last_lcn as u64,
                length: cluster_count,
            });
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_single_positive_run() {
        // header 0x21: len_size=1, offset_size=2; count=0x18; offset=0x5634
        let runlist = [0x21, 0x18, 0x34, 0x56, 0x00];
        let segments = DataRunDecoder::decode(&runlist);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].length, 0x18);
        assert_eq!(segments[0].lcn, 0x5634);
    }

    #[test]
    fn accumulates_relative_lcn_across_runs() {
        // First run: offset +100. Second run: offset -20 -> lcn = 80.
        let mut runlist = Vec::new();
        runlist.push(0x11); // len=1 offset=1
        runlist.push(10); // count
        runlist.push(100); // +100
        runlist.push(0x11);
        runlist.push(5); // count
        runlist.push((-20i8) as u8); // -20
        runlist.push(0x00);

        let segments = DataRunDecoder::decode(&runlist);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].lcn, 100);
        assert_eq!(segments[1].lcn, 80);
    }

    #[test]
    fn sparse_run_leaves_lcn_unchanged() {
        let mut runlist = Vec::new();
        runlist.push(0x01); // len=1 offset=0 (sparse)
        runlist.push(42);
        runlist.push(0x00);

        let segments = DataRunDecoder::decode(&runlist);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].lcn, 0);
        assert_eq!(segments[0].length, 42);
    }

    #[test]
    fn stops_at_terminator_or_end_of_slice() {
        assert!(DataRunDecoder::decode(&[]).is_empty());
        assert!(DataRunDecoder::decode(&[0x00, 0xFF, 0xFF]).is_empty());
    }

    proptest::proptest! {
        #[test]
        fn never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(0u8..=255, 0..64)) {
            let _ = DataRunDecoder::decode(&bytes);
        }
    }
}
