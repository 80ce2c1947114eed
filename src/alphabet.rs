//! Sequence alphabets: normalisation, reverse complement and translation.

pub const UNDETERMINED_BASE: u8 = b'N';
pub const UNDETERMINED_RESIDUE: u8 = b'X';
pub const STOP_RESIDUE: u8 = b'*';

/// Upper-case `ACGT`; every other symbol becomes `N` (`U` is read as `T`).
#[inline]
pub fn normalize_base(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'A' => b'A',
        b'C' => b'C',
        b'G' => b'G',
        b'T' | b'U' => b'T',
        _ => UNDETERMINED_BASE,
    }
}

pub fn normalize_dna(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| normalize_base(b)).collect()
}

/// Upper-case residues; symbols outside the amino-acid alphabet become `X`.
pub fn normalize_protein(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&b| match b.to_ascii_uppercase() {
            c @ b'A'..=b'Z' => c,
            STOP_RESIDUE => STOP_RESIDUE,
            _ => UNDETERMINED_RESIDUE,
        })
        .collect()
}

#[inline]
pub fn is_undetermined_base(b: u8) -> bool {
    !matches!(b, b'A' | b'C' | b'G' | b'T')
}

#[inline]
pub fn complement(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        other => other,
    }
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

const STANDARD_TABLE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Codon table indexed in TCAG order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneticCode {
    table: [u8; 64],
}

impl GeneticCode {
    pub const fn standard() -> Self {
        Self {
            table: *STANDARD_TABLE,
        }
    }

    /// Builds a code from a 64-letter table in TCAG order (NCBI layout).
    pub fn from_table(table: &[u8; 64]) -> Self {
        Self { table: *table }
    }

    /// Amino acid for a codon; `X` when any base is undetermined.
    #[inline]
    pub fn translate(&self, codon: [u8; 3]) -> u8 {
        let mut idx = 0usize;
        for b in codon {
            idx <<= 2;
            idx |= match b {
                b'T' | b'U' => 0,
                b'C' => 1,
                b'A' => 2,
                b'G' => 3,
                _ => return UNDETERMINED_RESIDUE,
            };
        }
        self.table[idx]
    }

    /// Translates every full codon of `seq` in frame 0.
    pub fn translate_seq(&self, seq: &[u8]) -> Vec<u8> {
        seq.chunks_exact(3)
            .map(|c| self.translate([c[0], c[1], c[2]]))
            .collect()
    }
}

impl Default for GeneticCode {
    fn default() -> Self {
        Self::standard()
    }
}
