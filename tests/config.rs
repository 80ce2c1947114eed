use spliced_rs::config::{
    DEFAULT_MAX_MATRIX_BYTES, DpConfig, IntronCutoutConfig, PolyAConfig, RescueConfig, ScoreWeights,
};
use spliced_rs::{AlignConfig, CutoffPolicy, CutoutMode};

/// `AlignConfig::relaxed()` keeps short terminal exons on both ends.
#[test]
fn relaxed_preset() {
    let cfg = AlignConfig::relaxed();
    assert_eq!(cfg.cutoffs.start, CutoffPolicy::Relaxed, "start policy");
    assert_eq!(cfg.cutoffs.end,   CutoffPolicy::Relaxed, "end policy");
    assert_eq!(cfg.cutoffs.min_terminal_exon_length, 15, "min_terminal_exon_length");
    assert_eq!(cfg.max_matrix_bytes, DEFAULT_MAX_MATRIX_BYTES, "max_matrix_bytes");
}

/// `AlignConfig::strict()` differs from relaxed only in the cutoff policies.
#[test]
fn strict_preset() {
    let strict  = AlignConfig::strict();
    let relaxed = AlignConfig::relaxed();
    assert_eq!(strict.cutoffs.start, CutoffPolicy::Strict, "start policy");
    assert_eq!(strict.cutoffs.end,   CutoffPolicy::Strict, "end policy");
    assert_eq!(strict.cutoffs.min_terminal_exon_length, relaxed.cutoffs.min_terminal_exon_length);
    assert_eq!(strict.dp,      relaxed.dp,      "dp");
    assert_eq!(strict.weights, relaxed.weights, "weights");
    assert_eq!(strict.cutout,  relaxed.cutout,  "cutout");
    assert_eq!(strict.rescue,  relaxed.rescue,  "rescue");
    assert_eq!(strict.poly_a,  relaxed.poly_a,  "poly_a");
}

/// `Default` should be equivalent to `relaxed()`.
#[test]
fn default_is_relaxed() {
    assert_eq!(AlignConfig::default(), AlignConfig::relaxed());
}

#[test]
fn dp_defaults() {
    let dp = DpConfig::default();
    assert!((dp.initial_exon_probability - 0.5).abs() < 1e-12, "initial_exon_probability");
    assert!((dp.match_probability - 0.95).abs() < 1e-12,       "match_probability");
    assert_eq!(dp.min_exon_length, 5,    "min_exon_length");
    assert_eq!(dp.min_intron_length, 50, "min_intron_length");
    assert!((dp.substitution_scale - std::f64::consts::LN_2 / 2.0).abs() < 1e-12, "half bits");
}

#[test]
fn cutout_rescue_and_poly_a_defaults() {
    let cutout = IntronCutoutConfig::default();
    assert_eq!(cutout.mode, CutoutMode::Auto, "cutout mode");
    assert_eq!(cutout.initial_delta, 50,      "initial_delta");
    assert_eq!(cutout.delta_increase, 50,     "delta_increase");
    assert_eq!(cutout.iterations, 2,          "iterations");
    assert_eq!(cutout.min_removed_length, 10, "min_removed_length");

    let rescue = RescueConfig::default();
    assert!(rescue.enabled,                     "rescue enabled");
    assert_eq!(rescue.genomic_window, 100_000,  "genomic_window");
    assert_eq!(rescue.overlap, 5,               "overlap");

    let poly_a = PolyAConfig::default();
    assert_eq!(poly_a.window, 50,  "window");
    assert_eq!(poly_a.min_run, 10, "min_run");
}

#[test]
fn score_weight_defaults() {
    let w = ScoreWeights::default();
    assert_eq!(w.identity, 2.0,  "identity");
    assert_eq!(w.mismatch, -2.0, "mismatch");
    assert_eq!(w.deletion, -5.0, "deletion");
    assert_eq!(w.splice_site_window, 10, "splice_site_window");
}
