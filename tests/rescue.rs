use spliced_rs::{
    AlignConfig, AlignParams, AlignmentMode, AlignmentResult, CoverageSide, DinucleotideModel, EditOp, align,
};
use std::ops::Range;

// ── helpers ──────────────────────────────────────────────────────────────────

const FLANK5: &str = "GCTAAAGACAATTACATAACATACACGTCA";
const SHORT_EXON: &str = "GCACGAAACTTC";
const INTRON: &str = "GTGTTGGCCCAGTGTGAATCGCTTAAGGGTTAAGTAAGTGTGATGCATACGCCTTTACTTGCTGTGTCCACCCCATCGAG";
const LONG_EXON: &str = "TGACTGGCATTTTTATTACACTCAGAAACAGAACTCGGGTAATTTTGACAGGTCACGCAG";
const FLANK3: &str = "AGGCGCGCCCTCCTGAAGTGCGTGGACACT";

/// Genomic locus whose 12 bp first exon lies outside the searched range
/// `122..212`, and the spliced cDNA.
fn stranded_exon_locus() -> (Vec<u8>, Vec<u8>) {
    let genomic = [FLANK5, SHORT_EXON, INTRON, LONG_EXON, FLANK3].concat().into_bytes();
    let cdna = [SHORT_EXON, LONG_EXON].concat().into_bytes();
    (genomic, cdna)
}

const SEARCHED: Range<usize> = 122..212;

/// The same exons in the other order: the 12 bp exon is now the last one
/// and lies outside the searched range `0..90`.
fn stranded_last_exon_locus() -> (Vec<u8>, Vec<u8>) {
    let genomic = [FLANK5, LONG_EXON, INTRON, SHORT_EXON, FLANK3].concat().into_bytes();
    let cdna = [LONG_EXON, SHORT_EXON].concat().into_bytes();
    (genomic, cdna)
}

const SEARCHED_HEAD: Range<usize> = 0..90;

const PROTEIN_CDS: &str =
    "CCGTGCCTTTCCCTAACAGAGTTTTTCGAACTCGTGTTGTCGAGCGACGGAATTAGATCAGTTAAATGGCAGAAAACTGGCAGGGCTTTT";
const PROTEIN_INTRON: &str =
    "GTAGTCGTGGGATGATCAGTGGGTAAAGGTGGCGCGGGGTAACGCGCGCTAAGGCTCAGCTGCAACGCGGAGCTGGTGTGTTATCCATAG";
const PROTEIN: &[u8] = b"PCLSLTEFFELVLSSDGIRSVKWQKTGRAF";

/// Coding sequence with a 90 bp intron after codon 22, leaving an 8 residue
/// last exon.
fn protein_locus() -> Vec<u8> {
    [&PROTEIN_CDS[..66], PROTEIN_INTRON, &PROTEIN_CDS[66..]].concat().into_bytes()
}

fn align_with(
    ranges: &[Range<usize>],
    genomic: &[u8],
    reference: &[u8],
    mode: AlignmentMode,
    rescue: bool,
) -> AlignmentResult {
    let mut config = AlignConfig::default();
    config.rescue.enabled = rescue;
    let model = DinucleotideModel::default();
    let params = AlignParams::new(&config, &model);
    align(ranges, genomic, reference, mode, &params).unwrap()
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[test]
fn locus_has_expected_layout() {
    let (genomic, cdna) = stranded_exon_locus();
    assert_eq!(genomic.len(), 212, "genomic length");
    assert_eq!(cdna.len(), 72, "cdna length");
    assert_eq!(INTRON.len(), 80, "intron length");

    let (genomic, cdna) = stranded_last_exon_locus();
    assert_eq!(genomic.len(), 212);
    assert_eq!(&genomic[90..92], b"GT", "donor right after the searched range");
    assert_eq!(cdna.len(), 72);

    assert_eq!(protein_locus().len(), 180);
    assert_eq!(PROTEIN_INTRON.len(), 90);
}

/// The initial rescue finds the first exon upstream of the searched range.
#[test]
fn rescue_recovers_stranded_initial_exon() {
    let (genomic, cdna) = stranded_exon_locus();
    let config = AlignConfig::default();
    assert!(config.rescue.enabled);
    let model = DinucleotideModel::default();
    let params = AlignParams::new(&config, &model);

    let result = align(&[SEARCHED], &genomic, &cdna, AlignmentMode::Nucleotide, &params).unwrap();

    assert_eq!(result.path().to_string(), "12M80N60M", "path");
    assert_eq!(result.exon_count(), 2, "exon count");
    let exons = result.exons();
    assert_eq!((exons[0].left_genomic, exons[0].right_genomic), (30, 41), "rescued exon");
    assert_eq!((exons[0].left_reference, exons[0].right_reference), (0, 11));
    assert_eq!((exons[1].left_genomic, exons[1].right_genomic), (122, 181));
    assert_eq!((result.introns()[0].left_genomic, result.introns()[0].right_genomic), (42, 121));
    assert!((result.coverage() - 1.0).abs() < 1e-9, "coverage");
    assert_eq!(result.genomic_window(), 0..212, "searched window includes the rescue");
}

/// Without rescue the same alignment lacks the first exon and covers less of
/// the reference.
#[test]
fn disabled_rescue_drops_initial_exon() {
    let (genomic, cdna) = stranded_exon_locus();
    let mut config = AlignConfig::default();
    config.rescue.enabled = false;
    let model = DinucleotideModel::default();
    let params = AlignParams::new(&config, &model);

    let result = align(&[SEARCHED], &genomic, &cdna, AlignmentMode::Nucleotide, &params).unwrap();

    assert_eq!(result.path().to_string(), "60M", "path");
    assert_eq!(result.exon_count(), 1, "exon count");
    assert_eq!(result.intron_count(), 0, "intron count");
    assert_eq!(result.path().ref_dp_start(), 12);
    assert!((result.coverage() - 60.0 / 72.0).abs() < 1e-9, "coverage");
    assert_eq!(result.coverage_side(), CoverageSide::Reference);
    assert_eq!(result.genomic_window(), SEARCHED);
}

/// Searching the whole locus finds both exons without any rescue.
#[test]
fn full_window_needs_no_rescue() {
    let (genomic, cdna) = stranded_exon_locus();
    let mut config = AlignConfig::default();
    config.rescue.enabled = false;
    let model = DinucleotideModel::default();
    let params = AlignParams::new(&config, &model);

    let result = align(&[0..genomic.len()], &genomic, &cdna, AlignmentMode::Nucleotide, &params).unwrap();
    assert_eq!(result.path().to_string(), "12M80N60M");
}

/// The terminal rescue finds the last exon downstream of the searched range.
/// The main path ends in `59M1I1M`; the gap next to the seam is re-aligned
/// with the overlap, so the joined path has a clean junction.
#[test]
fn rescue_recovers_stranded_last_exon() {
    let (genomic, cdna) = stranded_last_exon_locus();
    let result = align_with(&[SEARCHED_HEAD], &genomic, &cdna, AlignmentMode::Nucleotide, true);

    assert_eq!(result.path().to_string(), "60M80N12M", "path");
    assert!(
        !result.path().ops().contains(&EditOp::Insertion) && !result.path().ops().contains(&EditOp::Deletion),
        "no gap at the seam: {}",
        result.path()
    );
    let exons = result.exons();
    assert_eq!(exons.len(), 2, "exon count");
    assert_eq!((exons[0].left_genomic, exons[0].right_genomic), (30, 89));
    assert_eq!((exons[0].left_reference, exons[0].right_reference), (0, 59));
    assert_eq!((exons[1].left_genomic, exons[1].right_genomic), (170, 181), "rescued exon");
    assert_eq!((exons[1].left_reference, exons[1].right_reference), (60, 71));
    assert_eq!((result.introns()[0].left_genomic, result.introns()[0].right_genomic), (90, 169));
    assert!((result.score() - 1.0).abs() < 1e-9, "score {}", result.score());
    for exon in exons {
        assert!((exon.score - 1.0).abs() < 1e-9, "exon score {}", exon.score);
    }
    assert!((result.coverage() - 1.0).abs() < 1e-9, "coverage");
    assert_eq!(result.genomic_window(), 0..212, "searched window includes the rescue");
}

/// Rescue reproduces what a search of the whole locus finds.
#[test]
fn terminal_rescue_matches_full_window() {
    let (genomic, cdna) = stranded_last_exon_locus();
    let full = align_with(&[0..genomic.len()], &genomic, &cdna, AlignmentMode::Nucleotide, false);
    let rescued = align_with(&[SEARCHED_HEAD], &genomic, &cdna, AlignmentMode::Nucleotide, true);
    assert_eq!(full.path().ops(), rescued.path().ops());
    assert_eq!(full.exons(), rescued.exons());
}

/// Without rescue the alignment stops inside the searched range and covers
/// less of the reference.
#[test]
fn disabled_rescue_drops_last_exon() {
    let (genomic, cdna) = stranded_last_exon_locus();
    let result = align_with(&[SEARCHED_HEAD], &genomic, &cdna, AlignmentMode::Nucleotide, false);

    assert_eq!(result.path().to_string(), "59M1I1M", "path");
    assert_eq!(result.exon_count(), 1, "exon count");
    assert_eq!(result.intron_count(), 0, "intron count");
    assert_eq!(result.path().genomic_range(), 30..90);
    assert_eq!(result.path().reference_range(), 0..61);
    assert!((result.coverage() - 61.0 / 72.0).abs() < 1e-9, "coverage {}", result.coverage());
    assert_eq!(result.coverage_side(), CoverageSide::Reference);
    assert_eq!(result.genomic_window(), SEARCHED_HEAD);
}

/// Protein mode: the main path ends in `21M3I1M` and the rescue turns it
/// into two clean exons.
#[test]
fn protein_rescue_recovers_last_exon() {
    let genomic = protein_locus();

    let plain = align_with(&[0..66], &genomic, PROTEIN, AlignmentMode::Protein, false);
    assert_eq!(plain.path().to_string(), "21M3I1M", "main path");
    assert_eq!(plain.exon_count(), 1);
    assert_eq!(plain.path().reference_range(), 0..25);

    let result = align_with(&[0..66], &genomic, PROTEIN, AlignmentMode::Protein, true);
    assert_eq!(result.path().to_string(), "22M90N8M", "rescued path");
    let exons = result.exons();
    assert_eq!(exons.len(), 2, "exon count");
    assert_eq!((exons[0].left_genomic, exons[0].right_genomic), (0, 65));
    assert_eq!((exons[0].left_reference, exons[0].right_reference), (0, 21));
    assert_eq!((exons[1].left_genomic, exons[1].right_genomic), (156, 179));
    assert_eq!((exons[1].left_reference, exons[1].right_reference), (22, 29));
    assert_eq!((result.introns()[0].left_genomic, result.introns()[0].right_genomic), (66, 155));
    assert!((result.coverage() - 1.0).abs() < 1e-9, "coverage");
    assert_eq!(result.coverage_side(), CoverageSide::Reference);
    assert_eq!(result.genomic_window(), 0..180);
}
