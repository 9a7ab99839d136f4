//! Part-range partitioning for multipart uploads.
//!
//! This module contains pure logic for splitting a file into byte ranges.
//! No I/O operations - just decision making.

/// Byte range of a single part within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// Zero-based part index.
    pub index: usize,
    /// Byte offset within the file.
    pub offset: u64,
    /// Length of this part in bytes.
    pub length: u64,
}

impl PartRange {
    /// 1-based part number, as used in acknowledgements.
    pub fn part_number(&self) -> u32 {
        self.index as u32 + 1
    }

    /// Exclusive end offset of this part.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Generate the part ranges for a file.
///
/// Part `i` spans `[i * chunk_size, min((i + 1) * chunk_size, size))`, so
/// the ranges exactly cover `[0, size)` with no gaps or overlaps. Every
/// part except possibly the last has length `chunk_size`.
///
/// A zero `size` or zero `chunk_size` yields no parts.
pub fn generate_parts(size: u64, chunk_size: u64) -> Vec<PartRange> {
    if chunk_size == 0 || size == 0 {
        return Vec::new();
    }

    let mut parts = Vec::with_capacity(expected_part_count(size, chunk_size));
    let mut offset = 0u64;
    let mut index = 0usize;

    while offset < size {
        let length = std::cmp::min(chunk_size, size - offset);
        parts.push(PartRange {
            index,
            offset,
            length,
        });
        offset += length;
        index += 1;
    }

    parts
}

/// Calculate the expected number of parts for a file.
pub fn expected_part_count(size: u64, chunk_size: u64) -> usize {
    if chunk_size == 0 || size == 0 {
        return 0;
    }
    size.div_ceil(chunk_size) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_division() {
        // 5,000,000 bytes at 1,000,000 per chunk: 5 full parts
        let parts = generate_parts(5_000_000, 1_000_000);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[4].length, 1_000_000);
        assert_eq!(parts[4].offset, 4_000_000);
    }

    #[test]
    fn test_short_final_part() {
        // 4,500,000 bytes at 1,000,000 per chunk: 4 full parts + 500,000
        let parts = generate_parts(4_500_000, 1_000_000);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[4].offset, 4_000_000);
        assert_eq!(parts[4].length, 500_000);
        for part in &parts[..4] {
            assert_eq!(part.length, 1_000_000);
        }
    }

    #[test]
    fn test_partition_exactly_covers_file() {
        for size in [1u64, 999, 1_000, 1_001, 4_500_000, 5_000_000] {
            for chunk_size in [1u64, 7, 1_000, 1_000_000] {
                let parts = generate_parts(size, chunk_size);
                assert_eq!(parts.len(), expected_part_count(size, chunk_size));

                // Contiguous, non-overlapping, covering [0, size)
                let mut cursor = 0u64;
                for (i, part) in parts.iter().enumerate() {
                    assert_eq!(part.index, i);
                    assert_eq!(part.offset, cursor);
                    assert!(part.length > 0);
                    if i + 1 < parts.len() {
                        assert_eq!(part.length, chunk_size);
                    } else {
                        assert!(part.length <= chunk_size);
                    }
                    cursor = part.end();
                }
                assert_eq!(cursor, size, "size={size} chunk_size={chunk_size}");
            }
        }
    }

    #[test]
    fn test_empty_inputs_yield_no_parts() {
        assert!(generate_parts(0, 1_000).is_empty());
        assert!(generate_parts(1_000, 0).is_empty());
        assert_eq!(expected_part_count(0, 1_000), 0);
    }

    #[test]
    fn test_part_numbers_are_one_based() {
        let parts = generate_parts(300, 100);
        let numbers: Vec<u32> = parts.iter().map(PartRange::part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
