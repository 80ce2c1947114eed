//! Splice-site models, the per-window DP parameter table, and amino-acid
//! substitution matrices.

use crate::error::{AlignError, Result};
use std::ops::Range;

/// Log probability of an impossible event.
pub const LOG_ZERO: f64 = f64::NEG_INFINITY;

#[inline]
pub(crate) fn log_prob(p: f64) -> f64 {
    if p > 0.0 { p.ln() } else { LOG_ZERO }
}

/// Source of donor/acceptor probabilities for every genomic position.
///
/// `donor_probability(g, i)` is the probability that an intron starts at
/// base `i`. `acceptor_probability(g, i)` is the probability that an intron
/// ends at base `i`.
pub trait SpliceSiteModel: Send + Sync {
    fn donor_probability(&self, genomic: &[u8], pos: usize) -> f64;
    fn acceptor_probability(&self, genomic: &[u8], pos: usize) -> f64;
}

/// Generic model that only looks at the intron's terminal dinucleotides.
#[derive(Debug, Clone, PartialEq)]
pub struct DinucleotideModel {
    pub gt_donor: f64,
    pub gc_donor: f64,
    pub other_donor: f64,
    pub ag_acceptor: f64,
    pub other_acceptor: f64,
}

impl Default for DinucleotideModel {
    fn default() -> Self {
        Self {
            gt_donor: 0.03,
            gc_donor: 0.0003,
            other_donor: 0.00001,
            ag_acceptor: 0.03,
            other_acceptor: 0.00001,
        }
    }
}

impl SpliceSiteModel for DinucleotideModel {
    fn donor_probability(&self, genomic: &[u8], pos: usize) -> f64 {
        match (genomic.get(pos), genomic.get(pos + 1)) {
            (Some(b'G'), Some(b'T')) => self.gt_donor,
            (Some(b'G'), Some(b'C')) => self.gc_donor,
            _ => self.other_donor,
        }
    }

    fn acceptor_probability(&self, genomic: &[u8], pos: usize) -> f64 {
        if pos == 0 {
            return self.other_acceptor;
        }
        match (genomic.get(pos - 1), genomic.get(pos)) {
            (Some(b'A'), Some(b'G')) => self.ag_acceptor,
            _ => self.other_acceptor,
        }
    }
}

/// Donor and acceptor log probabilities materialised for one genomic window.
///
/// Positions are absolute genomic coordinates; anything outside the window
/// reads as [`LOG_ZERO`].
#[derive(Debug, Clone)]
pub struct DpParameters {
    window: Range<usize>,
    donor: Vec<f64>,
    acceptor: Vec<f64>,
}

impl DpParameters {
    pub fn build(model: &dyn SpliceSiteModel, genomic: &[u8], window: Range<usize>) -> Result<Self> {
        if window.end > genomic.len() || window.start > window.end {
            return Err(AlignError::DpParameterAllocationFailed(format!(
                "window {}..{} outside genomic sequence of length {}",
                window.start,
                window.end,
                genomic.len()
            )));
        }
        let len = window.len();
        let mut donor = Vec::new();
        let mut acceptor = Vec::new();
        donor
            .try_reserve_exact(len)
            .and_then(|_| acceptor.try_reserve_exact(len))
            .map_err(|e| {
                AlignError::DpParameterAllocationFailed(format!("{len} positions: {e}"))
            })?;

        for pos in window.clone() {
            let d = model.donor_probability(genomic, pos);
            let a = model.acceptor_probability(genomic, pos);
            for (kind, p) in [("donor", d), ("acceptor", a)] {
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    return Err(AlignError::DpParameterAllocationFailed(format!(
                        "{kind} probability {p} at position {pos} is not in [0, 1]"
                    )));
                }
            }
            donor.push(log_prob(d));
            acceptor.push(log_prob(a));
        }

        Ok(Self {
            window,
            donor,
            acceptor,
        })
    }

    pub fn window(&self) -> Range<usize> {
        self.window.clone()
    }

    pub fn covers(&self, range: &Range<usize>) -> bool {
        self.window.start <= range.start && range.end <= self.window.end
    }

    #[inline]
    pub fn donor_log_prob(&self, pos: usize) -> f64 {
        pos.checked_sub(self.window.start)
            .and_then(|i| self.donor.get(i))
            .copied()
            .unwrap_or(LOG_ZERO)
    }

    #[inline]
    pub fn acceptor_log_prob(&self, pos: usize) -> f64 {
        pos.checked_sub(self.window.start)
            .and_then(|i| self.acceptor.get(i))
            .copied()
            .unwrap_or(LOG_ZERO)
    }
}

/// Amino-acid substitution scores.
pub trait SubstitutionMatrix: Send + Sync {
    fn score(&self, a: u8, b: u8) -> i32;
}

const BLOSUM62_ORDER: &[u8; 24] = b"ARNDCQEGHILKMFPSTWYVBZX*";

// Lower triangle, row by row, in BLOSUM62_ORDER.
#[rustfmt::skip]
const BLOSUM62_LOWER: [i8; 300] = [
    /* A */  4,
    /* R */ -1,  5,
    /* N */ -2,  0,  6,
    /* D */ -2, -2,  1,  6,
    /* C */  0, -3, -3, -3,  9,
    /* Q */ -1,  1,  0,  0, -3,  5,
    /* E */ -1,  0,  0,  2, -4,  2,  5,
    /* G */  0, -2,  0, -1, -3, -2, -2,  6,
    /* H */ -2,  0,  1, -1, -3,  0,  0, -2,  8,
    /* I */ -1, -3, -3, -3, -1, -3, -3, -4, -3,  4,
    /* L */ -1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4,
    /* K */ -1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5,
    /* M */ -1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,
    /* F */ -2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6,
    /* P */ -1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7,
    /* S */  1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,
    /* T */  0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5,
    /* W */ -3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,
    /* Y */ -2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7,
    /* V */  0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4,
    /* B */ -2, -1,  4,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4,
    /* Z */ -1,  0,  0,  1, -3,  4,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -2, -2, -2,  0,  4,
    /* X */ -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* * */ -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1,
];

const BLOSUM62_INDEX: [u8; 256] = {
    // Unknown symbols score like X.
    let mut idx = [22u8; 256];
    let mut i = 0;
    while i < BLOSUM62_ORDER.len() {
        idx[BLOSUM62_ORDER[i] as usize] = i as u8;
        i += 1;
    }
    idx
};

const BLOSUM62_FULL: [[i8; 24]; 24] = {
    let mut full = [[0i8; 24]; 24];
    let mut row = 0;
    let mut offset = 0;
    while row < 24 {
        let mut col = 0;
        while col <= row {
            full[row][col] = BLOSUM62_LOWER[offset + col];
            full[col][row] = BLOSUM62_LOWER[offset + col];
            col += 1;
        }
        offset += row + 1;
        row += 1;
    }
    full
};

/// BLOSUM62 in half-bit units.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blosum62;

impl SubstitutionMatrix for Blosum62 {
    #[inline]
    fn score(&self, a: u8, b: u8) -> i32 {
        let i = BLOSUM62_INDEX[a as usize] as usize;
        let j = BLOSUM62_INDEX[b as usize] as usize;
        BLOSUM62_FULL[i][j] as i32
    }
}
