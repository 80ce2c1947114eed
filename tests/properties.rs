//! Structural properties of alignments of random sequences.

use proptest::prelude::*;
use spliced_rs::{AlignConfig, AlignParams, AlignmentMode, AlignmentResult, DinucleotideModel, align};

// ── helpers ──────────────────────────────────────────────────────────────────

fn align_full(genomic: &[u8], reference: &[u8], mode: AlignmentMode, config: &AlignConfig) -> AlignmentResult {
    let model = DinucleotideModel::default();
    let params = AlignParams::new(config, &model);
    align(&[0..genomic.len()], genomic, reference, mode, &params).expect("alignment")
}

fn check_structure(result: &AlignmentResult, genomic_len: usize, reference_len: usize) -> Result<(), TestCaseError> {
    prop_assert!((0.0..=1.0).contains(&result.score()), "score {}", result.score());
    prop_assert!((0.0..=1.0).contains(&result.coverage()), "coverage {}", result.coverage());

    let exons = result.exons();
    if exons.is_empty() {
        prop_assert_eq!(result.intron_count(), 0);
    } else {
        prop_assert_eq!(result.intron_count() + 1, exons.len(), "introns = exons - 1");
    }
    for exon in exons {
        prop_assert!(exon.left_genomic <= exon.right_genomic);
        prop_assert!(exon.right_genomic < genomic_len);
        prop_assert!((0.0..=1.0).contains(&exon.score));
        if exon.reference_len() > 0 {
            prop_assert!(exon.right_reference < reference_len);
        }
    }
    for pair in exons.windows(2) {
        prop_assert!(pair[0].right_genomic < pair[1].left_genomic, "genomic borders increase");
    }
    for (i, intron) in result.introns().iter().enumerate() {
        prop_assert_eq!(intron.left_genomic, exons[i].right_genomic + 1);
        prop_assert_eq!(intron.right_genomic + 1, exons[i + 1].left_genomic);
    }

    let path = result.path();
    prop_assert!(path.check_lengths().is_ok());
    prop_assert!(path.gen_dp_end() <= genomic_len);
    prop_assert!(path.ref_dp_end() <= reference_len);
    Ok(())
}

// ── tests ─────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn nucleotide_alignments_are_well_formed(
        genomic in "[ACGTN]{1,160}",
        cdna in "[ACGT]{1,60}",
    ) {
        let config = AlignConfig::default();
        let result = align_full(genomic.as_bytes(), cdna.as_bytes(), AlignmentMode::Nucleotide, &config);
        check_structure(&result, genomic.len(), cdna.len())?;

        let again = align_full(genomic.as_bytes(), cdna.as_bytes(), AlignmentMode::Nucleotide, &config);
        prop_assert_eq!(result.path().ops(), again.path().ops(), "deterministic");
        prop_assert_eq!(result.score(), again.score());
    }

    #[test]
    fn strict_alignments_are_well_formed(
        genomic in "[ACGT]{1,160}",
        cdna in "[ACGT]{1,60}",
    ) {
        let config = AlignConfig::strict();
        let result = align_full(genomic.as_bytes(), cdna.as_bytes(), AlignmentMode::Nucleotide, &config);
        check_structure(&result, genomic.len(), cdna.len())?;
    }

    #[test]
    fn protein_alignments_are_well_formed(
        genomic in "[ACGT]{3,180}",
        protein in "[ACDEFGHIKLMNPQRSTVWY]{1,30}",
    ) {
        let config = AlignConfig::default();
        let result = align_full(genomic.as_bytes(), protein.as_bytes(), AlignmentMode::Protein, &config);
        check_structure(&result, genomic.len(), protein.len())?;
        prop_assert!(result.poly_a().is_none());
    }
}
