//! Turns a finished path into exon/intron records, an alignment score and
//! a coverage value.

use crate::alphabet::{GeneticCode, is_undetermined_base};
use crate::config::ScoreWeights;
use crate::editop::EditOp;
use crate::error::{AlignError, Result};
use crate::params::{DpParameters, SubstitutionMatrix};
use crate::path::BacktracePath;
use crate::types::{AlignmentMode, GenomicPos, ReferencePos};

/// One exon. Borders are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ExonRecord {
    pub left_genomic: GenomicPos,
    pub right_genomic: GenomicPos,
    /// For an exon without reference positions both reference borders are
    /// the next reference position.
    pub left_reference: ReferencePos,
    pub right_reference: ReferencePos,
    /// Normalised exon score in `[0, 1]`.
    pub score: f64,
    reference_len: usize,
}

impl ExonRecord {
    pub fn genomic_len(&self) -> usize {
        self.right_genomic + 1 - self.left_genomic
    }

    pub fn reference_len(&self) -> usize {
        self.reference_len
    }
}

/// One intron. Borders are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct IntronRecord {
    pub left_genomic: GenomicPos,
    pub right_genomic: GenomicPos,
    pub donor_probability: f64,
    pub acceptor_probability: f64,
    /// Alignment quality of the exon columns next to the donor (nucleotide
    /// mode only, otherwise 0).
    pub donor_site_score: f64,
    pub acceptor_site_score: f64,
}

impl IntronRecord {
    pub fn genomic_len(&self) -> usize {
        self.right_genomic + 1 - self.left_genomic
    }
}

/// Which side produced the reported coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageSide {
    Genomic,
    Reference,
}

#[derive(Debug, Clone)]
pub struct ScoredAlignment {
    pub exons: Vec<ExonRecord>,
    pub introns: Vec<IntronRecord>,
    pub score: f64,
    pub coverage: f64,
    pub coverage_side: CoverageSide,
}

/// Read-only inputs of [`score_path`].
pub struct ScoringContext<'a> {
    pub genomic: &'a [u8],
    pub reference: &'a [u8],
    pub params: &'a DpParameters,
    pub weights: &'a ScoreWeights,
    pub substitution: &'a dyn SubstitutionMatrix,
    pub code: &'a GeneticCode,
    /// Length of the genomic region searched for this alignment.
    pub genomic_window_len: usize,
}

#[derive(Debug)]
struct OpenExon {
    left_genomic: GenomicPos,
    left_reference: ReferencePos,
    reference_len: usize,
    sum: f64,
    max: f64,
    columns: Vec<f64>,
}

impl OpenExon {
    fn new(left_genomic: GenomicPos, left_reference: ReferencePos) -> Self {
        Self {
            left_genomic,
            left_reference,
            reference_len: 0,
            sum: 0.0,
            max: 0.0,
            columns: Vec::new(),
        }
    }

    fn add(&mut self, weight: f64, max: f64, reference: usize) {
        self.sum += weight;
        self.max += max;
        self.columns.push(weight);
        self.reference_len += reference;
    }
}

struct Scorer<'a, 'b> {
    ctx: &'b ScoringContext<'a>,
    exons: Vec<(ExonRecord, Vec<f64>)>,
    introns: Vec<(GenomicPos, GenomicPos)>,
    total_sum: f64,
    total_max: f64,
}

impl Scorer<'_, '_> {
    fn nucleotide_column(&self, g: GenomicPos, r: ReferencePos, op: EditOp) -> (f64, f64) {
        let w = self.ctx.weights;
        let weight = match op {
            EditOp::Match(_) => w.identity,
            EditOp::Mismatch => {
                let (gb, rb) = (self.ctx.genomic[g], self.ctx.reference[r]);
                if is_undetermined_base(gb) || is_undetermined_base(rb) {
                    w.undetermined
                } else {
                    w.mismatch
                }
            }
            _ => w.deletion,
        };
        (weight, w.identity)
    }

    fn self_score(&self, residue: u8) -> f64 {
        f64::from(self.ctx.substitution.score(residue, residue).max(0))
    }

    fn codon_column(&self, codon: [u8; 3], r: ReferencePos) -> (f64, f64) {
        let residue = self.ctx.reference[r];
        let aa = self.ctx.code.translate(codon);
        (
            f64::from(self.ctx.substitution.score(aa, residue)),
            self.self_score(residue),
        )
    }

    fn codon_at(&self, g: GenomicPos) -> [u8; 3] {
        let s = self.ctx.genomic;
        [s[g], s[g + 1], s[g + 2]]
    }

    fn close(&mut self, exon: OpenExon, end: GenomicPos) -> Result<()> {
        if end <= exon.left_genomic {
            return Err(AlignError::InvariantViolated(format!(
                "exon starting at {} has no genomic bases",
                exon.left_genomic
            )));
        }
        self.total_sum += exon.sum;
        self.total_max += exon.max;
        let score = if exon.max > 0.0 {
            (exon.sum / exon.max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let right_reference = if exon.reference_len > 0 {
            exon.left_reference + exon.reference_len - 1
        } else {
            exon.left_reference
        };
        self.exons.push((
            ExonRecord {
                left_genomic: exon.left_genomic,
                right_genomic: end - 1,
                left_reference: exon.left_reference,
                right_reference,
                score,
                reference_len: exon.reference_len,
            },
            exon.columns,
        ));
        Ok(())
    }

    fn site_score(&self, columns: &[f64]) -> f64 {
        let identity = self.ctx.weights.identity;
        if columns.is_empty() || identity <= 0.0 {
            return 0.0;
        }
        let sum: f64 = columns.iter().sum();
        (sum / (columns.len() as f64 * identity)).clamp(0.0, 1.0)
    }
}

/// Scores `path` (in original genomic coordinates).
pub fn score_path(path: &BacktracePath, ctx: &ScoringContext<'_>) -> Result<ScoredAlignment> {
    let mode = path.mode();
    if !ctx.params.covers(&path.genomic_range()) {
        return Err(AlignError::InvariantViolated(format!(
            "splice parameters {:?} do not cover path {:?}",
            ctx.params.window(),
            path.genomic_range()
        )));
    }
    let mut s = Scorer {
        ctx,
        exons: Vec::new(),
        introns: Vec::new(),
        total_sum: 0.0,
        total_max: 0.0,
    };
    let mut g = path.gen_dp_start();
    let mut r = path.ref_dp_start();
    let mut open: Option<OpenExon> = None;

    for &op in path.ops() {
        match op {
            EditOp::Intron(len) => {
                if let Some(exon) = open.take() {
                    s.close(exon, g)?;
                }
                s.introns.push((g, g + len as usize - 1));
                g += len as usize;
            }
            EditOp::IntronWithBasesLeft { len, bases_left } => {
                let before = 3 - bases_left as usize;
                let after = bases_left as usize;
                let len = len as usize;
                let mut codon = [0u8; 3];
                for (i, base) in codon.iter_mut().enumerate() {
                    let pos = if i < before { g + i } else { g + len + i };
                    *base = ctx.genomic[pos];
                }
                let (weight, max) = s.codon_column(codon, r);
                let mut upstream = open.take().unwrap_or_else(|| OpenExon::new(g, r));
                // The residue goes to the side holding two of its bases.
                if before >= 2 {
                    upstream.add(weight, max, 1);
                }
                s.close(upstream, g + before)?;
                s.introns.push((g + before, g + before + len - 1));
                let mut downstream = OpenExon::new(g + before + len, if before >= 2 { r + 1 } else { r });
                if after >= 2 {
                    downstream.add(weight, max, 1);
                }
                open = Some(downstream);
                g += len + 3;
                r += 1;
            }
            _ => {
                let exon = open.get_or_insert_with(|| OpenExon::new(g, r));
                match mode {
                    AlignmentMode::Nucleotide => {
                        let columns = op.reference_len().max(op.genomic_len(mode));
                        for i in 0..columns {
                            let (weight, max) = s.nucleotide_column(g + i, r + i, op);
                            exon.add(weight, max, op.reference_len().min(1));
                        }
                    }
                    AlignmentMode::Protein => match op {
                        EditOp::Match(n) => {
                            for i in 0..n as usize {
                                let (weight, max) = s.codon_column(s.codon_at(g + 3 * i), r + i);
                                exon.add(weight, max, 1);
                            }
                        }
                        EditOp::Mismatch => {
                            let (weight, max) = s.codon_column(s.codon_at(g), r);
                            exon.add(weight, max, 1);
                        }
                        EditOp::Insertion => {
                            let max = s.self_score(ctx.reference[r]);
                            exon.add(ctx.weights.protein_indel, max, 1);
                        }
                        EditOp::MismatchWithGap(_) => {
                            let max = s.self_score(ctx.reference[r]);
                            exon.add(ctx.weights.protein_frameshift, max, 1);
                        }
                        EditOp::Deletion => exon.add(ctx.weights.protein_indel, 0.0, 0),
                        EditOp::DeletionWithGap(_) => exon.add(ctx.weights.protein_frameshift, 0.0, 0),
                        _ => {}
                    },
                }
                g += op.genomic_len(mode);
                r += op.reference_len();
            }
        }
    }
    if let Some(exon) = open.take() {
        s.close(exon, g)?;
    }

    let window = ctx.weights.splice_site_window;
    let mut introns = Vec::with_capacity(s.introns.len());
    for (i, &(left, right)) in s.introns.iter().enumerate() {
        let (donor_site_score, acceptor_site_score) = match (mode, s.exons.get(i), s.exons.get(i + 1)) {
            (AlignmentMode::Nucleotide, Some((_, up)), Some((_, down))) => (
                s.site_score(&up[up.len().saturating_sub(window)..]),
                s.site_score(&down[..window.min(down.len())]),
            ),
            _ => (0.0, 0.0),
        };
        introns.push(IntronRecord {
            left_genomic: left,
            right_genomic: right,
            donor_probability: ctx.params.donor_log_prob(left).exp(),
            acceptor_probability: ctx.params.acceptor_log_prob(right).exp(),
            donor_site_score,
            acceptor_site_score,
        });
    }
    let exons: Vec<ExonRecord> = s.exons.into_iter().map(|(e, _)| e).collect();

    let score = if s.total_max > 0.0 {
        (s.total_sum / s.total_max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let scored_genomic: usize = exons.iter().map(|e| e.genomic_len()).sum();
    let scored_reference: usize = exons.iter().map(|e| e.reference_len()).sum();
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let genomic_coverage = ratio(scored_genomic, ctx.genomic_window_len);
    let reference_coverage = ratio(scored_reference, ctx.reference.len());
    let (coverage, coverage_side) = if genomic_coverage > reference_coverage {
        (genomic_coverage, CoverageSide::Genomic)
    } else {
        (reference_coverage, CoverageSide::Reference)
    };

    Ok(ScoredAlignment {
        exons,
        introns,
        score,
        coverage: coverage.min(1.0),
        coverage_side,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Blosum62, DinucleotideModel};
    use EditOp::*;

    fn score(genomic: &[u8], reference: &[u8], path: &BacktracePath, window: std::ops::Range<usize>) -> Result<ScoredAlignment> {
        let model = DinucleotideModel::default();
        let params = DpParameters::build(&model, genomic, window)?;
        let weights = ScoreWeights::default();
        let code = GeneticCode::standard();
        let ctx = ScoringContext {
            genomic,
            reference,
            params: &params,
            weights: &weights,
            substitution: &Blosum62,
            code: &code,
            genomic_window_len: genomic.len(),
        };
        score_path(path, &ctx)
    }

    #[test]
    fn mismatch_lowers_exon_score() {
        let path = BacktracePath::from_ops(AlignmentMode::Nucleotide, 0, 0, [Match(4), Mismatch, Match(5)]);
        let scored = score(b"ACGTACGTAC", b"ACGTTCGTAC", &path, 0..10).unwrap();
        assert_eq!(scored.exons.len(), 1);
        assert!((scored.score - 0.8).abs() < 1e-12);
        assert!((scored.exons[0].score - 0.8).abs() < 1e-12);
        assert_eq!(scored.coverage_side, CoverageSide::Reference);

        let undetermined = score(b"ACGTNCGTAC", b"ACGTTCGTAC", &path, 0..10).unwrap();
        assert!((undetermined.score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn intron_records_carry_site_probabilities() {
        let genomic = b"CCCCCGTAAAAAAGTTTTT";
        let path = BacktracePath::from_ops(AlignmentMode::Nucleotide, 0, 0, [Match(5), Intron(9), Match(5)]);
        let scored = score(genomic, b"CCCCCTTTTT", &path, 0..genomic.len()).unwrap();
        assert_eq!(scored.exons.len(), 2);
        let intron = &scored.introns[0];
        assert_eq!((intron.left_genomic, intron.right_genomic), (5, 13));
        assert!((intron.donor_probability - 0.03).abs() < 1e-12);
        assert!((intron.acceptor_probability - 0.03).abs() < 1e-12);
        assert_eq!(intron.donor_site_score, 1.0);
        assert_eq!(intron.acceptor_site_score, 1.0);
        assert_eq!(scored.exons[1].left_reference, 5);
    }

    #[test]
    fn parameters_must_cover_the_path() {
        let path = BacktracePath::from_ops(AlignmentMode::Nucleotide, 0, 0, [Match(10)]);
        let err = score(b"ACGTACGTAC", b"ACGTACGTAC", &path, 2..10).unwrap_err();
        assert!(matches!(err, AlignError::InvariantViolated(_)));
    }
}
