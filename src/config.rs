//! Tunable parameters for the spliced aligner.
//!
//! [`AlignConfig`] is plain data; build one from a preset and override the
//! fields you care about.

/// Upper bound for a single backtrace matrix on this target.
#[cfg(target_pointer_width = "64")]
pub const DEFAULT_MAX_MATRIX_BYTES: usize = 2 << 30;
#[cfg(not(target_pointer_width = "64"))]
pub const DEFAULT_MAX_MATRIX_BYTES: usize = 512 << 20;

/// Transition and emission probabilities of the DP, plus the protein scores.
///
/// Probabilities are converted to natural-log space once per DP run.
/// Penalties and protein scores are already in natural-log units.
#[derive(Debug, Clone, PartialEq)]
pub struct DpConfig {
    /// Probability of starting in the exon state (the rest goes to the
    /// leading-flank intron state).
    pub initial_exon_probability: f64,
    pub match_probability: f64,
    pub mismatch_probability: f64,
    /// Used when either base is undetermined (`N`).
    pub undetermined_probability: f64,
    pub deletion_probability: f64,
    pub insertion_probability: f64,
    pub min_exon_length: usize,
    pub min_intron_length: usize,
    pub short_exon_penalty: f64,
    pub short_intron_penalty: f64,
    /// Converts substitution matrix units (half bits for BLOSUM62) to nats.
    pub substitution_scale: f64,
    pub codon_deletion_score: f64,
    pub residue_insertion_score: f64,
    pub frameshift_score: f64,
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            initial_exon_probability: 0.5,
            match_probability: 0.95,
            mismatch_probability: 0.02,
            undetermined_probability: 0.25,
            deletion_probability: 0.01,
            insertion_probability: 0.01,
            min_exon_length: 5,
            min_intron_length: 50,
            short_exon_penalty: -10.0,
            short_intron_penalty: -10.0,
            substitution_scale: std::f64::consts::LN_2 / 2.0,
            codon_deletion_score: -4.0,
            residue_insertion_score: -4.0,
            frameshift_score: -8.0,
        }
    }
}

/// Column weights used by the scorer (independent of the DP model).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    pub identity: f64,
    pub mismatch: f64,
    pub undetermined: f64,
    pub deletion: f64,
    pub protein_indel: f64,
    pub protein_frameshift: f64,
    /// Exon columns next to a splice site that feed its site score.
    pub splice_site_window: usize,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            identity: 2.0,
            mismatch: -2.0,
            undetermined: 0.0,
            deletion: -5.0,
            protein_indel: -4.0,
            protein_frameshift: -6.0,
            splice_site_window: 10,
        }
    }
}

/// How aggressively one end of a path is trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutoffPolicy {
    /// Trim intron and insertion operations only.
    Minimal,
    /// Trim everything up to the first match.
    #[default]
    Relaxed,
    /// Relaxed, then drop short terminal exons.
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CutoffConfig {
    pub start: CutoffPolicy,
    pub end: CutoffPolicy,
    /// Strict mode drops terminal exons with fewer genomic bases than this.
    pub min_terminal_exon_length: usize,
}

impl Default for CutoffConfig {
    fn default() -> Self {
        Self {
            start: CutoffPolicy::Relaxed,
            end: CutoffPolicy::Relaxed,
            min_terminal_exon_length: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutoutMode {
    Disabled,
    Always,
    /// Only after the full matrix failed to allocate.
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntronCutoutConfig {
    pub mode: CutoutMode,
    /// Bases kept on each side of an excised gap.
    pub initial_delta: usize,
    pub delta_increase: usize,
    pub iterations: usize,
    /// Gaps whose excisable interior is shorter than this stay in.
    pub min_removed_length: usize,
}

impl Default for IntronCutoutConfig {
    fn default() -> Self {
        Self {
            mode: CutoutMode::Auto,
            initial_delta: 50,
            delta_increase: 50,
            iterations: 2,
            min_removed_length: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RescueConfig {
    pub enabled: bool,
    /// Genomic bases searched beyond the aligned end.
    pub genomic_window: usize,
    /// Reference positions of the existing alignment re-aligned with the
    /// missing part (at least one).
    pub overlap: usize,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            genomic_window: 100_000,
            overlap: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolyAConfig {
    pub window: usize,
    pub min_run: usize,
}

impl Default for PolyAConfig {
    fn default() -> Self {
        Self {
            window: 50,
            min_run: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    pub dp: DpConfig,
    pub weights: ScoreWeights,
    pub cutoffs: CutoffConfig,
    pub cutout: IntronCutoutConfig,
    pub rescue: RescueConfig,
    pub poly_a: PolyAConfig,
    pub max_matrix_bytes: usize,
}

impl AlignConfig {
    /// Relaxed cutoffs on both ends; keeps short terminal exons.
    pub fn relaxed() -> Self {
        Self {
            dp: DpConfig::default(),
            weights: ScoreWeights::default(),
            cutoffs: CutoffConfig::default(),
            cutout: IntronCutoutConfig::default(),
            rescue: RescueConfig::default(),
            poly_a: PolyAConfig::default(),
            max_matrix_bytes: DEFAULT_MAX_MATRIX_BYTES,
        }
    }

    /// Strict cutoffs on both ends; short terminal exons are dropped.
    pub fn strict() -> Self {
        Self {
            cutoffs: CutoffConfig {
                start: CutoffPolicy::Strict,
                end: CutoffPolicy::Strict,
                ..CutoffConfig::default()
            },
            ..Self::relaxed()
        }
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self::relaxed()
    }
}
