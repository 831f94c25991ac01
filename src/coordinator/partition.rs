//! Splitting work across workers

use std::ops::Range;

/// Split `total` items across `n` workers as evenly as possible
///
/// Worker `i` receives `total / n + 1` items if `i < total % n`, otherwise
/// `total / n`. Returns an empty vector when `n` is 0.
///
/// ```rust
/// use rust_bounded_buffer::coordinator::partition;
///
/// assert_eq!(partition(10, 3), vec![4, 3, 3]);
/// assert_eq!(partition(2, 4), vec![1, 1, 0, 0]);
/// ```
pub fn partition(total: usize, n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let base = total / n;
    let remainder = total % n;
    (0..n)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Contiguous value ranges covering `1..=total`, sized by [`partition`]
pub fn source_ranges(total: usize, n: usize) -> Vec<Range<u64>> {
    let mut next = 1u64;
    partition(total, n)
        .into_iter()
        .map(|share| {
            let range = next..next + share as u64;
            next = range.end;
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_ten_by_three() {
        assert_eq!(partition(10, 3), vec![4, 3, 3]);
    }

    #[test]
    fn test_partition_even_split() {
        assert_eq!(partition(10, 2), vec![5, 5]);
        assert_eq!(partition(1000, 4), vec![250; 4]);
    }

    #[test]
    fn test_partition_more_workers_than_items() {
        assert_eq!(partition(3, 5), vec![1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_partition_zero_workers() {
        assert!(partition(10, 0).is_empty());
    }

    #[test]
    fn test_source_ranges_are_contiguous() {
        assert_eq!(source_ranges(10, 3), vec![1..5, 5..8, 8..11]);
        assert_eq!(source_ranges(9, 3), vec![1..4, 4..7, 7..10]);
    }
}
