use spliced_rs::config::{CutoffConfig, CutoffPolicy};
use spliced_rs::cutoffs::{determine_cutoffs, trim};
use spliced_rs::{AlignError, AlignmentMode, BacktracePath, EditOp};

use EditOp::*;

// ── helpers ──────────────────────────────────────────────────────────────────

/// Insertion and mismatch before the first match, a 5 bp middle exon, an
/// 8 bp last exon and a deletion plus insertion after the last match.
fn ragged_path() -> BacktracePath {
    BacktracePath::from_ops(
        AlignmentMode::Nucleotide,
        100,
        0,
        [
            Insertion,
            Mismatch,
            Match(20),
            Intron(60),
            Match(5),
            Intron(70),
            Match(8),
            Deletion,
            Insertion,
        ],
    )
}

fn cutoffs(start: CutoffPolicy, end: CutoffPolicy) -> CutoffConfig {
    CutoffConfig {
        start,
        end,
        ..CutoffConfig::default()
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[test]
fn display_is_run_length_encoded() {
    let path = BacktracePath::from_ops(
        AlignmentMode::Protein,
        0,
        0,
        [
            Match(3),
            MismatchWithGap(1),
            MismatchWithGap(2),
            DeletionWithGap(1),
            DeletionWithGap(2),
            Deletion,
            Deletion,
            Insertion,
            IntronWithBasesLeft { len: 90, bases_left: 2 },
            Match(4),
        ],
    );
    assert_eq!(path.to_string(), "3M1F1G1E1H2D1I90N[2]4M");

    let empty = BacktracePath::new(AlignmentMode::Nucleotide, 0, 0);
    assert_eq!(empty.to_string(), "*", "empty path");
}

#[test]
fn op_lengths_depend_on_mode() {
    let split = IntronWithBasesLeft { len: 90, bases_left: 2 };
    assert_eq!(split.genomic_len(AlignmentMode::Protein), 93);
    assert_eq!(split.reference_len(), 1);
    assert_eq!(split.intron_len(), 90);
    assert!(split.is_intron());

    assert_eq!(Match(4).genomic_len(AlignmentMode::Nucleotide), 4);
    assert_eq!(Match(4).genomic_len(AlignmentMode::Protein), 12);
    assert_eq!(Deletion.genomic_len(AlignmentMode::Protein), 3);
    assert_eq!(MismatchWithGap(1).genomic_len(AlignmentMode::Protein), 2);
    assert_eq!(DeletionWithGap(2).genomic_len(AlignmentMode::Protein), 1);
    assert_eq!(DeletionWithGap(2).reference_len(), 0);
    assert_eq!(Insertion.genomic_len(AlignmentMode::Protein), 0);
}

#[test]
fn ragged_path_has_consistent_lengths() {
    let path = ragged_path();
    path.check_lengths().unwrap();
    assert_eq!(path.gen_dp_length(), 165);
    assert_eq!(path.ref_dp_length(), 36);
    assert_eq!(path.intron_count(), 2);
}

/// Relaxed trimming removes everything up to the first and after the last
/// match.
#[test]
fn relaxed_cutoffs_trim_to_matches() {
    let mut path = ragged_path();
    trim(&mut path, &cutoffs(CutoffPolicy::Relaxed, CutoffPolicy::Relaxed));

    assert_eq!(path.to_string(), "20M60N5M70N8M", "ops");
    assert_eq!(path.genomic_range(), 101..264, "genomic range");
    assert_eq!(path.reference_range(), 2..35, "reference range");
    path.check_lengths().unwrap();
}

/// Strict trimming drops terminal exons shorter than the minimum, one after
/// another.
#[test]
fn strict_cutoffs_drop_short_terminal_exons() {
    let mut path = ragged_path();
    trim(&mut path, &cutoffs(CutoffPolicy::Strict, CutoffPolicy::Strict));

    assert_eq!(path.to_string(), "20M", "ops");
    assert_eq!(path.genomic_range(), 101..121, "genomic range");
    assert_eq!(path.reference_range(), 2..22, "reference range");
    path.check_lengths().unwrap();
}

#[test]
fn minimal_cutoffs_trim_insertions_only() {
    let mut path = ragged_path();
    let (start, end) = determine_cutoffs(&path, &cutoffs(CutoffPolicy::Minimal, CutoffPolicy::Minimal));
    assert_eq!((start.ops, start.genomic, start.reference), (1, 0, 1), "leading cutoff");
    assert_eq!((end.ops, end.genomic, end.reference), (1, 0, 1), "trailing cutoff");

    trim(&mut path, &cutoffs(CutoffPolicy::Minimal, CutoffPolicy::Minimal));
    assert_eq!(path.to_string(), "1X20M60N5M70N8M1D");
    assert_eq!(path.genomic_range(), 100..265);
}

/// Policies are chosen per end.
#[test]
fn mixed_policies() {
    let mut path = ragged_path();
    trim(&mut path, &cutoffs(CutoffPolicy::Minimal, CutoffPolicy::Strict));
    assert_eq!(path.to_string(), "1X20M");
}

/// When both cutoffs meet, the whole path goes.
#[test]
fn overlapping_cutoffs_empty_the_path() {
    let mut path = BacktracePath::from_ops(AlignmentMode::Nucleotide, 7, 3, [Mismatch, Deletion, Mismatch]);
    trim(&mut path, &CutoffConfig::default());
    assert!(path.is_empty());
    assert_eq!(path.to_string(), "*");
    assert_eq!(path.gen_dp_length(), 0);
    assert_eq!(path.gen_dp_start(), 10);
    assert_eq!(path.ref_dp_start(), 5);
}

#[test]
fn zero_length_exons_are_merged_into_introns() {
    let mut path = BacktracePath::from_ops(
        AlignmentMode::Nucleotide,
        0,
        0,
        [Match(5), Intron(10), Insertion, Insertion, Intron(20), Match(5)],
    );
    assert_eq!(path.remove_zero_length_exons(), 1, "removed exons");
    assert_eq!(path.to_string(), "5M2I30N5M");
    assert_eq!(path.intron_count(), 1);
    path.check_lengths().unwrap();
}

#[test]
fn append_path_requires_contiguity() {
    let mut head = BacktracePath::from_ops(AlignmentMode::Nucleotide, 0, 0, [Match(5)]);

    let gap = BacktracePath::from_ops(AlignmentMode::Nucleotide, 6, 5, [Match(3)]);
    let err = head.append_path(gap).unwrap_err();
    assert!(matches!(err, AlignError::InvariantViolated(_)), "{err}");

    let other_mode = BacktracePath::from_ops(AlignmentMode::Protein, 5, 5, [Match(3)]);
    assert!(head.append_path(other_mode).is_err());

    let tail = BacktracePath::from_ops(AlignmentMode::Nucleotide, 5, 5, [Match(3), Intron(50), Match(2)]);
    head.append_path(tail).unwrap();
    assert_eq!(head.to_string(), "8M50N2M");
    assert_eq!(head.genomic_range(), 0..60);
    assert_eq!(head.reference_range(), 0..10);
}
