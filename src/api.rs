//! Public entry points.
//!
//! # Example
//!
//! ```no_run
//! use spliced_rs::{AlignConfig, AlignParams, AlignmentMode, DinucleotideModel, align};
//!
//! let config = AlignConfig::relaxed();
//! let model = DinucleotideModel::default();
//! let params = AlignParams::new(&config, &model);
//!
//! let mut genomic = b"AAAGTAAAAGT".to_vec();
//! genomic.extend(std::iter::repeat_n(b'N', 50));
//! genomic.extend_from_slice(b"AGCCCCCCCCC");
//! let reference = b"AAAGTAAAACCCCCCCCC";
//! let result = align(&[0..genomic.len()], &genomic, reference, AlignmentMode::Nucleotide, &params)?;
//! for exon in result.exons() {
//!     println!("{}..={}", exon.left_genomic, exon.right_genomic);
//! }
//! # Ok::<(), spliced_rs::AlignError>(())
//! ```

use crate::alphabet::{GeneticCode, normalize_dna, normalize_protein, reverse_complement};
use crate::backtrace::compute_path;
use crate::config::{AlignConfig, CutoutMode, DpConfig};
use crate::cutoffs;
use crate::cutout::{SplicedSeq, merge_ranges, plan_cutout};
use crate::dp::{DpInput, EndAnchor, StartAnchor};
use crate::error::{AlignError, Result};
use crate::params::{Blosum62, DpParameters, SpliceSiteModel, SubstitutionMatrix};
use crate::path::BacktracePath;
use crate::polya::find_poly_a_tail;
use crate::rescue::{rescue_initial, rescue_terminal};
use crate::result::AlignmentResult;
use crate::scorer::{ScoringContext, score_path};
use crate::types::{AlignmentMode, GenomicPos, Strand};
use std::ops::Range;
use std::sync::OnceLock;

static BLOSUM62: Blosum62 = Blosum62;
static STANDARD_CODE: GeneticCode = GeneticCode::standard();

/// Read-only collaborators of an alignment call. Cheap to copy and safe to
/// share between threads.
#[derive(Clone, Copy)]
pub struct AlignParams<'a> {
    pub config: &'a AlignConfig,
    pub splice_model: &'a dyn SpliceSiteModel,
    pub substitution: &'a dyn SubstitutionMatrix,
    pub genetic_code: &'a GeneticCode,
}

impl<'a> AlignParams<'a> {
    /// BLOSUM62 and the standard genetic code.
    pub fn new(config: &'a AlignConfig, splice_model: &'a dyn SpliceSiteModel) -> Self {
        Self {
            config,
            splice_model,
            substitution: &BLOSUM62,
            genetic_code: &STANDARD_CODE,
        }
    }

    pub fn with_substitution(mut self, substitution: &'a dyn SubstitutionMatrix) -> Self {
        self.substitution = substitution;
        self
    }

    pub fn with_genetic_code(mut self, genetic_code: &'a GeneticCode) -> Self {
        self.genetic_code = genetic_code;
        self
    }
}

impl std::fmt::Debug for AlignParams<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignParams")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// Normalised genomic sequence, prepared once and shared by every alignment
/// against it. The reverse complement is built on first use.
#[derive(Debug)]
pub struct PreparedGenomic {
    forward: Vec<u8>,
    reverse: OnceLock<Vec<u8>>,
}

impl PreparedGenomic {
    pub fn new(genomic: &[u8]) -> Self {
        Self {
            forward: normalize_dna(genomic),
            reverse: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Sequence of `strand`, 5' to 3'.
    pub fn strand(&self, strand: Strand) -> &[u8] {
        match strand {
            Strand::Forward => &self.forward,
            Strand::Reverse => self.reverse.get_or_init(|| reverse_complement(&self.forward)),
        }
    }
}

/// One alignment call: normalised sequences on the aligned strand plus the
/// shared parameters.
pub(crate) struct Aligner<'a> {
    genomic: &'a [u8],
    reference: Vec<u8>,
    mode: AlignmentMode,
    params: &'a AlignParams<'a>,
}

impl<'a> Aligner<'a> {
    pub(crate) fn genomic(&self) -> &'a [u8] {
        self.genomic
    }

    pub(crate) fn reference(&self) -> &[u8] {
        &self.reference
    }

    pub(crate) fn config(&self) -> &'a AlignConfig {
        self.params.config
    }

    pub(crate) fn splice_model(&self) -> &'a dyn SpliceSiteModel {
        self.params.splice_model
    }

    /// Runs one DP over `spliced` against `reference` (a range of the full
    /// reference).
    pub(crate) fn run_dp(
        &self,
        params: &DpParameters,
        spliced: &SplicedSeq,
        reference: Range<usize>,
        start: StartAnchor,
        end: EndAnchor,
    ) -> Result<BacktracePath> {
        tracing::debug!(
            genomic = ?spliced.window(),
            spliced_len = spliced.len(),
            excised = spliced.map().total_excised(),
            reference = ?reference,
            "running DP"
        );
        let input = DpInput {
            genomic: spliced,
            reference: &self.reference[reference.clone()],
            params,
            config: &self.config().dp,
            substitution: self.params.substitution,
            code: self.params.genetic_code,
            start,
            end,
            max_matrix_bytes: self.config().max_matrix_bytes,
        };
        compute_path(&input, self.mode, reference.start)
    }

    fn full_window(&self, params: &DpParameters, window: Range<usize>) -> Result<BacktracePath> {
        let spliced = SplicedSeq::identity(self.genomic, window);
        self.run_dp(params, &spliced, 0..self.reference.len(), StartAnchor::Free, EndAnchor::Best)
    }

    /// Retries with excised gaps between `ranges`, widening the kept margin
    /// each time a cut turns out not to be intronic.
    fn with_cutout(
        &self,
        params: &DpParameters,
        ranges: &[Range<usize>],
        window: Range<usize>,
    ) -> Result<BacktracePath> {
        let config = &self.config().cutout;
        let mut delta = config.initial_delta;
        let mut last_error = None;
        for attempt in 0..config.iterations.max(1) {
            let cuts = plan_cutout(ranges, delta, config.min_removed_length);
            if cuts.is_empty() {
                tracing::debug!(attempt, delta, "no gap left to excise, aligning full window");
                return self.full_window(params, window);
            }
            let spliced = SplicedSeq::excise(self.genomic, window.clone(), &cuts)?;
            match self.run_dp(
                params,
                &spliced,
                0..self.reference.len(),
                StartAnchor::Free,
                EndAnchor::Best,
            ) {
                Err(e @ AlignError::CutoutNotInIntron { .. }) => {
                    tracing::warn!(attempt, delta, error = %e, "intron cutout failed");
                    last_error = Some(e);
                }
                other => return other,
            }
            delta = delta.saturating_add(config.delta_increase);
        }
        Err(last_error.unwrap_or_else(|| {
            AlignError::InvariantViolated("intron cutout made no attempt".to_string())
        }))
    }

    fn main_path(
        &self,
        params: &DpParameters,
        ranges: &[Range<usize>],
        window: Range<usize>,
    ) -> Result<BacktracePath> {
        match self.config().cutout.mode {
            CutoutMode::Disabled => self.full_window(params, window),
            CutoutMode::Always => self.with_cutout(params, ranges, window),
            CutoutMode::Auto => match self.full_window(params, window.clone()) {
                Err(AlignError::MatrixAllocationFailed { bytes, budget, .. }) => {
                    tracing::warn!(
                        bytes = bytes as u64,
                        budget,
                        "full matrix does not fit, trying intron cutout"
                    );
                    self.with_cutout(params, ranges, window)
                }
                other => other,
            },
        }
    }

    fn run(&self, ranges: &[Range<usize>], window: Range<usize>, strand: Strand) -> Result<AlignmentResult> {
        let config = self.config();
        let model = self.splice_model();
        let mut params = DpParameters::build(model, self.genomic, window.clone())?;

        let mut path = self.main_path(&params, ranges, window.clone())?;
        path.check_lengths()?;
        cutoffs::trim(&mut path, &config.cutoffs);

        let mut searched = window.clone();
        if config.rescue.enabled {
            let mut rescued = false;
            if let Some(w) = rescue_initial(self, &mut path)? {
                searched.start = searched.start.min(w.start);
                rescued = true;
            }
            if let Some(w) = rescue_terminal(self, &mut path)? {
                searched.end = searched.end.max(w.end);
                rescued = true;
            }
            if rescued {
                path.check_lengths()?;
                cutoffs::trim(&mut path, &config.cutoffs);
            }
        }

        if !params.covers(&path.genomic_range()) {
            params = DpParameters::build(model, self.genomic, searched.clone())?;
        }
        let ctx = ScoringContext {
            genomic: self.genomic,
            reference: &self.reference,
            params: &params,
            weights: &config.weights,
            substitution: self.params.substitution,
            code: self.params.genetic_code,
            genomic_window_len: searched.len(),
        };
        let scored = score_path(&path, &ctx)?;

        let poly_a = match self.mode {
            AlignmentMode::Nucleotide if !path.is_empty() => {
                find_poly_a_tail(&self.reference, path.reference_range(), &config.poly_a)
            }
            _ => None,
        };
        tracing::debug!(
            path = %path,
            exons = scored.exons.len(),
            score = scored.score,
            coverage = scored.coverage,
            "alignment finished"
        );
        AlignmentResult::assemble(
            path,
            scored,
            poly_a,
            strand,
            self.genomic.len(),
            self.reference.len(),
            searched,
        )
    }
}

fn validate_ranges(ranges: &[Range<GenomicPos>], genomic_len: usize) -> Result<()> {
    for r in ranges {
        if r.start > r.end || r.end > genomic_len {
            return Err(AlignError::InvalidInput(format!(
                "genomic range {}..{} invalid for sequence of length {genomic_len}",
                r.start, r.end
            )));
        }
    }
    Ok(())
}

fn validate_dp_config(config: &DpConfig) -> Result<()> {
    let probabilities = [
        ("initial_exon_probability", config.initial_exon_probability),
        ("match_probability", config.match_probability),
        ("mismatch_probability", config.mismatch_probability),
        ("undetermined_probability", config.undetermined_probability),
        ("deletion_probability", config.deletion_probability),
        ("insertion_probability", config.insertion_probability),
    ];
    for (name, p) in probabilities {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(AlignError::InvalidInput(format!("{name} = {p} is not a probability")));
        }
    }
    Ok(())
}

/// Aligns `reference` against the forward strand of `genomic`, restricted to
/// the region spanned by `ranges`.
pub fn align(
    ranges: &[Range<GenomicPos>],
    genomic: &[u8],
    reference: &[u8],
    mode: AlignmentMode,
    params: &AlignParams<'_>,
) -> Result<AlignmentResult> {
    align_strand(ranges, genomic, reference, mode, Strand::Forward, params)
}

/// Like [`align`], on either strand. `ranges` are forward-strand coordinates;
/// the result refers to the aligned strand.
pub fn align_strand(
    ranges: &[Range<GenomicPos>],
    genomic: &[u8],
    reference: &[u8],
    mode: AlignmentMode,
    strand: Strand,
    params: &AlignParams<'_>,
) -> Result<AlignmentResult> {
    align_prepared(ranges, &PreparedGenomic::new(genomic), reference, mode, strand, params)
}

/// Like [`align_strand`], against a genomic sequence prepared once for many
/// references.
pub fn align_prepared(
    ranges: &[Range<GenomicPos>],
    genomic: &PreparedGenomic,
    reference: &[u8],
    mode: AlignmentMode,
    strand: Strand,
    params: &AlignParams<'_>,
) -> Result<AlignmentResult> {
    validate_ranges(ranges, genomic.len())?;
    validate_dp_config(&params.config.dp)?;

    let total = genomic.len();
    let ranges: Vec<Range<usize>> = match strand {
        Strand::Forward => ranges.to_vec(),
        Strand::Reverse => ranges.iter().map(|r| total - r.end..total - r.start).collect(),
    };
    let genomic = genomic.strand(strand);
    let reference = match mode {
        AlignmentMode::Nucleotide => normalize_dna(reference),
        AlignmentMode::Protein => normalize_protein(reference),
    };

    let merged = merge_ranges(&ranges);
    let window = match (merged.first(), merged.last()) {
        (Some(first), Some(last)) => first.start..last.end,
        _ => 0..0,
    };
    if window.is_empty() || reference.is_empty() {
        tracing::debug!(
            genomic = ?window,
            reference_len = reference.len(),
            "nothing to align"
        );
        return Ok(AlignmentResult::empty(mode, strand, total, reference.len(), window));
    }

    let aligner = Aligner {
        genomic,
        reference,
        mode,
        params,
    };
    aligner.run(&merged, window, strand)
}
