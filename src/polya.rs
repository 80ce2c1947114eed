//! Poly(A) tail detection on the unaligned ends of a cDNA reference.

use crate::config::PolyAConfig;
use crate::types::ReferencePos;
use std::ops::Range;

/// A run of `A` after the aligned 3' end, or of `T` before the aligned 5'
/// end (a reverse-complemented tail). Borders are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyATail {
    pub start: ReferencePos,
    pub end: ReferencePos,
    pub base: u8,
}

impl PolyATail {
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Longest-reaching run of `base` starting at `seq[0]`, allowing one other
/// base inside the run. Returns the run length.
fn run_from(seq: impl Iterator<Item = u8>, base: u8) -> usize {
    let mut mismatches = 0;
    let mut len = 0;
    for (i, b) in seq.enumerate() {
        if b == base {
            len = i + 1;
        } else {
            mismatches += 1;
            if mismatches > 1 {
                break;
            }
        }
    }
    len
}

/// Looks for a tail outside `aligned` (the reference positions covered by
/// the alignment): first an A-run after the 3' end, then a T-run before the
/// 5' end.
pub fn find_poly_a_tail(
    reference: &[u8],
    aligned: Range<ReferencePos>,
    config: &PolyAConfig,
) -> Option<PolyATail> {
    let min_run = config.min_run.max(1);

    let after = aligned.end.min(reference.len())..(aligned.end + config.window).min(reference.len());
    for start in after.clone() {
        if reference[start] != b'A' {
            continue;
        }
        let len = run_from(reference[start..after.end].iter().copied(), b'A');
        if len >= min_run {
            return Some(PolyATail {
                start,
                end: start + len - 1,
                base: b'A',
            });
        }
    }

    let before = aligned.start.saturating_sub(config.window)..aligned.start.min(reference.len());
    for end in before.clone().rev() {
        if reference[end] != b'T' {
            continue;
        }
        let len = run_from(reference[before.start..=end].iter().rev().copied(), b'T');
        if len >= min_run {
            return Some(PolyATail {
                start: end + 1 - len,
                end,
                base: b'T',
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PolyAConfig {
        PolyAConfig { window: 50, min_run: 10 }
    }

    #[test]
    fn finds_a_run_with_one_mismatch() {
        let mut reference = b"ACGTACGTAC".to_vec();
        reference.extend_from_slice(b"GAAAAACAAAAAG");
        let tail = find_poly_a_tail(&reference, 0..10, &config()).unwrap();
        assert_eq!((tail.start, tail.end, tail.base), (11, 21, b'A'));
        assert_eq!(tail.len(), 11);
    }

    #[test]
    fn two_mismatches_break_the_run() {
        let mut reference = b"ACGTACGTAC".to_vec();
        reference.extend_from_slice(b"AAAACAAGAAAA");
        assert_eq!(find_poly_a_tail(&reference, 0..10, &config()), None);
    }

    #[test]
    fn falls_back_to_leading_t_run() {
        let mut reference = b"GTTTTTTTTTTTTC".to_vec();
        reference.extend_from_slice(b"ACGTACGTAC");
        let tail = find_poly_a_tail(&reference, 14..24, &config()).unwrap();
        assert_eq!((tail.start, tail.end, tail.base), (1, 12, b'T'));
    }
}
