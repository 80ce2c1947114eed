//! Spliced-alignment dynamic programming.
//!
//! Both modes maximise a log-probability over an exon/intron state machine.
//! Every DP state is filled from a `const` table of transitions; the first
//! transition in table order wins ties, which makes the optimal path unique.
//! Only the backtrace codes are kept for the whole matrix; scores and the
//! exon/intron start positions roll over a few genomic columns.

pub(crate) mod matrix;
pub(crate) mod nucleotide;
pub(crate) mod protein;

use crate::alphabet::GeneticCode;
use crate::config::DpConfig;
use crate::cutout::SplicedSeq;
use crate::params::{DpParameters, LOG_ZERO, SubstitutionMatrix, log_prob};

pub(crate) const UNREACHABLE: f64 = LOG_ZERO;

/// Start marker of the leading-flank intron, or of an exon anchored at the
/// origin. Neither pays a length-dependent cost.
pub(crate) const FLANK: usize = usize::MAX;

/// How the DP may begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartAnchor {
    /// Exon or leading-flank intron.
    Free,
    /// Exon continuing an alignment that ends right before the DP.
    Exon,
}

/// How the DP may end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndAnchor {
    /// Best of all terminal states, exon first on ties.
    Best,
    Exon,
}

/// One way to reach a state: `from` state at `(n - gen_step, m - ref_step)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Transition<S, C> {
    pub code: C,
    pub from: S,
    pub gen_step: usize,
    pub ref_step: usize,
}

impl<S, C> Transition<S, C> {
    #[inline]
    pub(crate) fn source(&self, n: usize, m: usize) -> Option<(usize, usize)> {
        Some((n.checked_sub(self.gen_step)?, m.checked_sub(self.ref_step)?))
    }
}

/// Highest-scoring transition; earlier entries win ties.
#[inline]
pub(crate) fn best_transition<S, C: Copy>(
    table: &[Transition<S, C>],
    mut score: impl FnMut(&Transition<S, C>) -> f64,
) -> (C, f64) {
    let mut best_code = table[0].code;
    let mut best = UNREACHABLE;
    for (i, t) in table.iter().enumerate() {
        let s = score(t);
        if i == 0 || s > best {
            best_code = t.code;
            best = s;
        }
    }
    (best_code, best)
}

/// Scores and start positions for `S` states over the last `depth`
/// genomic positions.
#[derive(Debug)]
pub(crate) struct RollingColumns<const S: usize> {
    depth: usize,
    width: usize,
    score: Vec<[f64; S]>,
    start: Vec<[usize; S]>,
}

impl<const S: usize> RollingColumns<S> {
    pub(crate) fn new(depth: usize, width: usize) -> Self {
        Self {
            depth,
            width,
            score: vec![[UNREACHABLE; S]; depth * width],
            start: vec![[0; S]; depth * width],
        }
    }

    #[inline]
    fn idx(&self, n: usize, m: usize) -> usize {
        (n % self.depth) * self.width + m
    }

    #[inline]
    pub(crate) fn score(&self, n: usize, m: usize, state: usize) -> f64 {
        self.score[self.idx(n, m)][state]
    }

    #[inline]
    pub(crate) fn start(&self, n: usize, m: usize, state: usize) -> usize {
        self.start[self.idx(n, m)][state]
    }

    #[inline]
    pub(crate) fn set(&mut self, n: usize, m: usize, score: [f64; S], start: [usize; S]) {
        let i = self.idx(n, m);
        self.score[i] = score;
        self.start[i] = start;
    }
}

/// Natural-log transition and emission weights of one run.
#[derive(Debug, Clone)]
pub(crate) struct LogWeights {
    pub initial_exon: f64,
    pub initial_intron: f64,
    /// Start marker of the exon at the origin. An anchored exon continues an
    /// exon of the caller and is exempt from the short-exon penalty.
    pub initial_exon_start: usize,
    pub matched: f64,
    pub mismatch: f64,
    pub undetermined: f64,
    pub deletion: f64,
    pub insertion: f64,
    pub short_exon_penalty: f64,
    pub short_intron_penalty: f64,
    pub min_exon_length: usize,
    pub min_intron_length: usize,
    pub substitution_scale: f64,
    pub codon_deletion: f64,
    pub residue_insertion: f64,
    pub frameshift: f64,
}

impl LogWeights {
    pub(crate) fn new(config: &DpConfig, start: StartAnchor) -> Self {
        let (initial_exon, initial_intron, initial_exon_start) = match start {
            StartAnchor::Free => (
                log_prob(config.initial_exon_probability),
                log_prob(1.0 - config.initial_exon_probability),
                0,
            ),
            StartAnchor::Exon => (0.0, UNREACHABLE, FLANK),
        };
        Self {
            initial_exon,
            initial_intron,
            initial_exon_start,
            matched: log_prob(config.match_probability),
            mismatch: log_prob(config.mismatch_probability),
            undetermined: log_prob(config.undetermined_probability),
            deletion: log_prob(config.deletion_probability),
            insertion: log_prob(config.insertion_probability),
            short_exon_penalty: config.short_exon_penalty,
            short_intron_penalty: config.short_intron_penalty,
            min_exon_length: config.min_exon_length,
            min_intron_length: config.min_intron_length,
            substitution_scale: config.substitution_scale,
            codon_deletion: config.codon_deletion_score,
            residue_insertion: config.residue_insertion_score,
            frameshift: config.frameshift_score,
        }
    }
}

/// Everything one DP run reads.
pub(crate) struct DpInput<'a> {
    pub genomic: &'a SplicedSeq,
    pub reference: &'a [u8],
    pub params: &'a DpParameters,
    pub config: &'a DpConfig,
    pub substitution: &'a dyn SubstitutionMatrix,
    pub code: &'a GeneticCode,
    pub start: StartAnchor,
    pub end: EndAnchor,
    pub max_matrix_bytes: usize,
}

impl DpInput<'_> {
    /// Cost of leaving an intron covering spliced indices `start..end`.
    #[inline]
    pub(crate) fn close_intron(&self, w: &LogWeights, start: usize, end: usize) -> f64 {
        if start == FLANK {
            return 0.0;
        }
        let last_orig = self.genomic.to_original(end - 1);
        let len = last_orig + 1 - self.genomic.to_original(start);
        let penalty = if len < w.min_intron_length {
            w.short_intron_penalty
        } else {
            0.0
        };
        self.params.acceptor_log_prob(last_orig) + penalty
    }

    /// Cost of opening an intron at spliced index `first` after an exon that
    /// started at spliced index `exon_start`. The exon covers
    /// `exon_start..first`; [`FLANK`] marks an exon continued from before the
    /// DP, which has no length limit.
    #[inline]
    pub(crate) fn open_intron(&self, w: &LogWeights, exon_start: usize, first: usize) -> f64 {
        let donor = self.params.donor_log_prob(self.genomic.to_original(first));
        if exon_start == FLANK {
            return donor;
        }
        let len = if exon_start < first {
            self.genomic.to_original(first - 1) + 1 - self.genomic.to_original(exon_start)
        } else {
            0
        };
        let penalty = if len < w.min_exon_length {
            w.short_exon_penalty
        } else {
            0.0
        };
        donor + penalty
    }
}
