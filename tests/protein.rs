use spliced_rs::params::SubstitutionMatrix;
use spliced_rs::{
    AlignConfig, AlignParams, AlignmentMode, Blosum62, DinucleotideModel, EditOp, GeneticCode, align,
};

// ── helpers ──────────────────────────────────────────────────────────────────

const CDS: &str = "CCGTGCCTTTCCCTAACAGAGTTTTTCGAACTCGTGTTGTCGAGCGACGGAATTAGATCAGTTAAATGGCAGAAAACTGGCAGGGCTTTT";
const INTRON: &str = "GTAGTCGTGGGATGATCAGTGGGTAAAGGTGGCGCGGGGTAACGCGCGCTAAGGCTCAGCTGCAACGCGGAGCTGGTGTGTTATCCATAG";
const PROTEIN: &[u8] = b"PCLSLTEFFELVLSSDGIRSVKWQKTGRAF";

/// CDS interrupted after its 31st base, so the intron splits codon 11 with
/// one base before it and two after.
fn split_codon_locus() -> Vec<u8> {
    [&CDS[..31], INTRON, &CDS[31..]].concat().into_bytes()
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[test]
fn cds_translates_to_protein() {
    let code = GeneticCode::standard();
    assert_eq!(code.translate_seq(CDS.as_bytes()), PROTEIN, "translation");
    assert_eq!(code.translate(*b"ATG"), b'M');
    assert_eq!(code.translate(*b"TAA"), b'*');
    assert_eq!(code.translate(*b"ANG"), b'X', "undetermined codon");
    assert_eq!(GeneticCode::default(), code);
}

#[test]
fn blosum62_scores() {
    let m = Blosum62;
    assert_eq!(m.score(b'W', b'W'), 11);
    assert_eq!(m.score(b'L', b'I'), 2);
    assert_eq!(m.score(b'P', b'W'), -4);
}

/// A protein whose codon 11 is split by a 90 bp intron.
#[test]
fn intron_inside_codon() {
    let genomic = split_codon_locus();
    assert_eq!(genomic.len(), 180);
    let config = AlignConfig::default();
    let model = DinucleotideModel::default();
    let params = AlignParams::new(&config, &model);

    let result = align(&[0..genomic.len()], &genomic, PROTEIN, AlignmentMode::Protein, &params).unwrap();

    assert_eq!(result.path().to_string(), "10M90N[2]19M", "path");
    assert_eq!(
        result.path().ops(),
        &[
            EditOp::Match(10),
            EditOp::IntronWithBasesLeft { len: 90, bases_left: 2 },
            EditOp::Match(19)
        ]
    );
    assert_eq!(result.exon_count(), 2, "exon count");
    let exons = result.exons();
    assert_eq!((exons[0].left_genomic, exons[0].right_genomic), (0, 30), "exon 1 genomic");
    assert_eq!((exons[0].left_reference, exons[0].right_reference), (0, 9), "exon 1 reference");
    assert_eq!((exons[1].left_genomic, exons[1].right_genomic), (121, 179), "exon 2 genomic");
    assert_eq!((exons[1].left_reference, exons[1].right_reference), (10, 29), "exon 2 reference");

    let intron = &result.introns()[0];
    assert_eq!((intron.left_genomic, intron.right_genomic), (31, 120), "intron borders");
    assert_eq!(intron.genomic_len(), 90);

    assert!((result.score() - 1.0).abs() < 1e-9, "score");
    assert!((result.coverage() - 1.0).abs() < 1e-9, "coverage");
    assert!(result.poly_a().is_none(), "poly-A is nucleotide-only");
}

/// The protein path covers whole codons: genomic length is three times the
/// residue count plus the intron.
#[test]
fn protein_path_lengths() {
    let genomic = split_codon_locus();
    let config = AlignConfig::default();
    let model = DinucleotideModel::default();
    let params = AlignParams::new(&config, &model);

    let result = align(&[0..genomic.len()], &genomic, PROTEIN, AlignmentMode::Protein, &params).unwrap();
    let path = result.path();
    path.check_lengths().unwrap();
    assert_eq!(path.gen_dp_length(), 3 * PROTEIN.len() + 90);
    assert_eq!(path.ref_dp_length(), PROTEIN.len());
    assert_eq!(path.intron_count(), 1);
}
