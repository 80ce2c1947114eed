//! Intron cutout: excising likely-intronic genomic stretches before the DP
//! and mapping DP coordinates back afterwards.

use crate::error::{AlignError, Result};
use std::ops::Range;

/// Maps positions of an excised ("spliced") sequence back to the original.
///
/// `original[i]` is the original coordinate of spliced base `i`; `borders`
/// lists every spliced index directly preceded by an excised region,
/// together with that region's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceMap {
    original: Vec<usize>,
    borders: Vec<(usize, usize)>,
}

impl SpliceMap {
    #[inline]
    pub fn to_original(&self, spliced: usize) -> usize {
        self.original[spliced]
    }

    pub fn to_spliced(&self, original: usize) -> Option<usize> {
        self.original.binary_search(&original).ok()
    }

    /// Length of the region excised right before spliced base `spliced`.
    #[inline]
    pub fn excised_before(&self, spliced: usize) -> Option<usize> {
        self.borders
            .binary_search_by_key(&spliced, |&(b, _)| b)
            .ok()
            .map(|i| self.borders[i].1)
    }

    pub fn borders(&self) -> &[(usize, usize)] {
        &self.borders
    }

    pub fn total_excised(&self) -> usize {
        self.borders.iter().map(|&(_, len)| len).sum()
    }

    pub fn is_identity(&self) -> bool {
        self.borders.is_empty()
    }
}

/// Genomic window with zero or more regions cut out.
#[derive(Debug, Clone)]
pub struct SplicedSeq {
    seq: Vec<u8>,
    map: SpliceMap,
    window: Range<usize>,
}

impl SplicedSeq {
    pub fn identity(genomic: &[u8], window: Range<usize>) -> Self {
        Self {
            seq: genomic[window.clone()].to_vec(),
            map: SpliceMap {
                original: window.clone().collect(),
                borders: Vec::new(),
            },
            window,
        }
    }

    /// Copies `window` minus `cuts`. Cuts must be sorted, disjoint and strictly
    /// inside the window.
    pub fn excise(genomic: &[u8], window: Range<usize>, cuts: &[Range<usize>]) -> Result<Self> {
        let mut seq = Vec::with_capacity(window.len());
        let mut original = Vec::with_capacity(window.len());
        let mut borders = Vec::with_capacity(cuts.len());
        let mut pos = window.start;
        for cut in cuts {
            if cut.start <= pos || cut.end >= window.end || cut.start >= cut.end {
                return Err(AlignError::InvalidInput(format!(
                    "cut {}..{} is not strictly inside {}..{} after position {pos}",
                    cut.start, cut.end, window.start, window.end
                )));
            }
            seq.extend_from_slice(&genomic[pos..cut.start]);
            original.extend(pos..cut.start);
            borders.push((seq.len(), cut.len()));
            pos = cut.end;
        }
        seq.extend_from_slice(&genomic[pos..window.end]);
        original.extend(pos..window.end);
        Ok(Self {
            seq,
            map: SpliceMap { original, borders },
            window,
        })
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn map(&self) -> &SpliceMap {
        &self.map
    }

    /// Original window this sequence was cut from.
    pub fn window(&self) -> Range<usize> {
        self.window.clone()
    }

    #[inline]
    pub fn to_original(&self, spliced: usize) -> usize {
        self.map.to_original(spliced)
    }
}

/// Sorts and merges overlapping or touching ranges.
pub fn merge_ranges(ranges: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut sorted: Vec<Range<usize>> = ranges.iter().filter(|r| !r.is_empty()).cloned().collect();
    sorted.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(sorted.len());
    for r in sorted {
        match merged.last_mut() {
            Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
            _ => merged.push(r),
        }
    }
    merged
}

/// Regions to excise between consecutive (merged) ranges, keeping `delta`
/// bases next to each range.
pub fn plan_cutout(ranges: &[Range<usize>], delta: usize, min_removed: usize) -> Vec<Range<usize>> {
    merge_ranges(ranges)
        .windows(2)
        .filter_map(|pair| {
            let start = pair[0].end.checked_add(delta)?;
            let end = pair[1].start.checked_sub(delta)?;
            (end > start && end - start >= min_removed.max(1)).then_some(start..end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excise_maps_both_ways() {
        let genomic = b"AAAAACCCCCGGGGGTTTTT";
        let spliced = SplicedSeq::excise(genomic, 0..20, &[5..10, 12..15]).unwrap();
        assert_eq!(spliced.seq(), b"AAAAAGGTTTTT");
        let map = spliced.map();
        assert_eq!(map.to_original(5), 10);
        assert_eq!(map.to_original(7), 15);
        assert_eq!(map.to_spliced(11), Some(6));
        assert_eq!(map.to_spliced(8), None);
        assert_eq!(map.excised_before(5), Some(5));
        assert_eq!(map.excised_before(7), Some(3));
        assert_eq!(map.excised_before(6), None);
        assert_eq!(map.total_excised(), 8);
    }

    #[test]
    fn cuts_keep_delta_next_to_ranges() {
        let cuts = plan_cutout(&[300..400, 0..100, 90..120], 20, 10);
        assert_eq!(cuts, vec![140..280]);
        assert!(plan_cutout(&[0..100, 130..200], 10, 11).is_empty());
    }

    #[test]
    fn cut_touching_window_edge_is_rejected() {
        assert!(SplicedSeq::excise(b"ACGTACGT", 0..8, &[0..2]).is_err());
    }
}
