//! MFT attribute walker
//!
//! Walks the attribute list of a single MFT record, extracting
//! `$FILE_NAME` (type `0x30`) values and converting their UTF-16LE names
//! to UTF-8.

use crate::domain::repositories::{ImageError, ImageReader};

const ATTR_END_MARKER: u32 = 0xFFFF_FFFF;
const ATTR_TYPE_FILE_NAME: u32 = 0x30;

pub struct AttributeParser;

impl AttributeParser {
    /// Walks the attributes of the record at `entry_pos`, starting at
    /// `first_attr_offset` and bounded by `used_size`, returning every name
    /// found in a `$FILE_NAME` attribute.
    pub fn parse_file_names(
        image: &dyn ImageReader,
        entry_pos: u64,
        first_attr_offset: u16,
        used_size: u32,
    ) -> Result<Vec<String>, ImageError> {
        let mut names = Vec::new();
        let mut offset = first_attr_offset as u32;

        while offset + 8 <= used_size {
            let mut header = [0u8; 8];
            image.read_exact_at(entry_pos + offset as u64, &mut header)?;
            let attr_type = u32::from_le_bytes(header[0..4].try_into().unwrap());
            let attr_length = u32::from_le_bytes(header[4..8].try_into().unwrap());

            if attr_type == ATTR_END_MARKER {
                break;
            }
            if attr_length == 0 {
                break;
            }

            if attr_type == ATTR_TYPE_FILE_NAME {
                if let Some(name) = Self::read_file_name(image, entry_pos, offset)? {
                    names.push(name);
                }
            }

            offset += attr_length;
        }

        Ok(names)
    }

    /// Reads the `$FILE_NAME` value for the resident attribute at
    /// `entry_pos + attr_offset`, returning `None` if the read is
    /// short (truncated/corrupt record).
    fn read_file_name(
        image: &dyn ImageReader,
        entry_pos: u64,
        attr_offset: u32,
    ) -> Result<Option<String>, ImageError> {
        let mut value_offset_bytes = [0u8; 2];
        if image
            .read_at(
                entry_pos + attr_offset as u64 + 0x14,
                &mut value_offset_bytes,
            )?
            != 2
        {
            return Ok(None);
        }
        let value_offset = u16::from_le_bytes(value_offset_bytes);

        let name_info_pos = entry_pos + attr_offset as u64 + value_offset as u64;

        let mut name_length_byte = [0u8; 1];
        if image.read_at(name_info_pos + 0x40, &mut name_length_byte)? != 1 {
            return Ok(None);
        }
        let name_length = name_length_byte[0] as usize;
        if name_length == 0 {
            return Ok(Some(String::new()));
        }

        let mut name_bytes = vec![0u8; name_length * 2];
        if image.read_at(name_info_pos + 0x42, &mut name_bytes)? != name_bytes.len() {
            return Ok(None);
        }

        let units: Vec<u16> = name_bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        Ok(Some(utf16_to_utf8_lossy(&units)))
    }
}

/// Converts UTF-16LE code units to UTF-8, replacing invalid sequences
/// (including unpaired surrogates) with U+FFFD rather than aborting.
fn utf16_to_utf8_lossy(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmp_round_trip() {
        let units: Vec<u16> = "deleted.txt".encode_utf16().collect();
        assert_eq!(utf16_to_utf8_lossy(&units), "deleted.txt");
    }

    #[test]
    fn surrogate_pair_round_trip() {
        let original = "a\u{1F600}b"; // contains an emoji outside the BMP
        let units: Vec<u16> = original.encode_utf16().collect();
        assert_eq!(utf16_to_utf8_lossy(&units), original);
    }

    #[test]
    fn unpaired_surrogate_becomes_replacement_character() {
        let units = vec!['a' as u16, 0xD800, 'b' as u16];
        assert_eq!(utf16_to_utf8_lossy(&units), "a\u{FFFD}b");
    }
}
