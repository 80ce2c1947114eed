use crate::error::{AlignError, Result};
use crate::path::BacktracePath;
use crate::polya::PolyATail;
use crate::scorer::{CoverageSide, ExonRecord, IntronRecord, ScoredAlignment};
use crate::types::{AlignmentMode, GenomicPos, Strand};
use std::ops::Range;

/// Final outcome of one [`align`](crate::align) call.
///
/// Genomic coordinates refer to the aligned strand; use
/// [`forward_position`](Self::forward_position) to map them onto the forward
/// strand of the input sequence.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    path: BacktracePath,
    exons: Vec<ExonRecord>,
    introns: Vec<IntronRecord>,
    score: f64,
    coverage: f64,
    coverage_side: CoverageSide,
    poly_a: Option<PolyATail>,
    strand: Strand,
    genomic_total_len: usize,
    reference_len: usize,
    genomic_window: Range<GenomicPos>,
}

impl AlignmentResult {
    /// Result without exons, used when there is nothing to align.
    pub(crate) fn empty(
        mode: AlignmentMode,
        strand: Strand,
        genomic_total_len: usize,
        reference_len: usize,
        genomic_window: Range<GenomicPos>,
    ) -> Self {
        Self {
            path: BacktracePath::new(mode, genomic_window.start, 0),
            exons: Vec::new(),
            introns: Vec::new(),
            score: 0.0,
            coverage: 0.0,
            coverage_side: CoverageSide::Reference,
            poly_a: None,
            strand,
            genomic_total_len,
            reference_len,
            genomic_window,
        }
    }

    /// Checks the structural invariants of the scored alignment and wraps it.
    pub(crate) fn assemble(
        path: BacktracePath,
        scored: ScoredAlignment,
        poly_a: Option<PolyATail>,
        strand: Strand,
        genomic_total_len: usize,
        reference_len: usize,
        genomic_window: Range<GenomicPos>,
    ) -> Result<Self> {
        let ScoredAlignment {
            exons,
            introns,
            score,
            coverage,
            coverage_side,
        } = scored;

        if !exons.is_empty() && introns.len() + 1 != exons.len() {
            return Err(invariant(format!(
                "{} exons but {} introns",
                exons.len(),
                introns.len()
            )));
        }
        for pair in exons.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.right_genomic >= b.left_genomic {
                return Err(invariant(format!(
                    "exon borders not increasing: {} >= {}",
                    a.right_genomic, b.left_genomic
                )));
            }
            if a.reference_len() > 0 && b.reference_len() > 0 && a.right_reference >= b.left_reference {
                return Err(invariant(format!(
                    "reference borders not increasing: {} >= {}",
                    a.right_reference, b.left_reference
                )));
            }
        }
        if !(0.0..=1.0).contains(&score) || exons.iter().any(|e| !(0.0..=1.0).contains(&e.score)) {
            return Err(invariant(format!("score {score} outside [0, 1]")));
        }

        Ok(Self {
            path,
            exons,
            introns,
            score,
            coverage,
            coverage_side,
            poly_a,
            strand,
            genomic_total_len,
            reference_len,
            genomic_window,
        })
    }

    pub fn mode(&self) -> AlignmentMode {
        self.path.mode()
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// The trimmed edit-operation path.
    pub fn path(&self) -> &BacktracePath {
        &self.path
    }

    pub fn exons(&self) -> &[ExonRecord] {
        &self.exons
    }

    pub fn exon_count(&self) -> usize {
        self.exons.len()
    }

    pub fn introns(&self) -> &[IntronRecord] {
        &self.introns
    }

    pub fn intron_count(&self) -> usize {
        self.introns.len()
    }

    /// Overall alignment score in `[0, 1]`.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn coverage_side(&self) -> CoverageSide {
        self.coverage_side
    }

    pub fn poly_a(&self) -> Option<&PolyATail> {
        self.poly_a.as_ref()
    }

    pub fn reference_len(&self) -> usize {
        self.reference_len
    }

    pub fn genomic_len(&self) -> usize {
        self.genomic_total_len
    }

    /// Genomic region searched, including rescue windows.
    pub fn genomic_window(&self) -> Range<GenomicPos> {
        self.genomic_window.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.exons.is_empty()
    }

    /// Maps a position on the aligned strand to the forward strand.
    pub fn forward_position(&self, pos: GenomicPos) -> GenomicPos {
        match self.strand {
            Strand::Forward => pos,
            Strand::Reverse => self.genomic_total_len - 1 - pos,
        }
    }
}

fn invariant(msg: String) -> AlignError {
    tracing::error!(%msg, "alignment invariant violated");
    AlignError::InvariantViolated(msg)
}
