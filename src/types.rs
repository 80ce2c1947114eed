use std::fmt;

/// 0-based position on the genomic sequence being aligned.
pub type GenomicPos = usize;
/// 0-based position on the reference (cDNA/EST or protein) sequence.
pub type ReferencePos = usize;

/// Kind of reference sequence aligned against the genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignmentMode {
    /// cDNA/EST reference; one genomic base per reference base.
    #[default]
    Nucleotide,
    /// Protein reference; one genomic codon per residue.
    Protein,
}

impl AlignmentMode {
    pub fn is_protein(self) -> bool {
        matches!(self, AlignmentMode::Protein)
    }
}

/// Genomic strand an alignment was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
