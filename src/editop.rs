use crate::types::AlignmentMode;
use std::fmt;

/// One step of a spliced alignment.
///
/// Genomic consumption depends on the mode: in protein mode every
/// reference residue corresponds to a codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// `n` identical columns (codons translating to the residue in protein mode).
    Match(u32),
    Mismatch,
    /// Reference symbol with no genomic counterpart.
    Insertion,
    /// Genomic base (codon in protein mode) with no reference counterpart.
    Deletion,
    Intron(u32),
    /// Residue aligned to `3 - k` genomic bases (frameshift).
    MismatchWithGap(u8),
    /// `3 - k` genomic bases without a residue (frameshift).
    DeletionWithGap(u8),
    /// An intron of `len` bases splitting a codon: `3 - bases_left` codon
    /// bases precede the intron, `bases_left` follow it. The op covers the
    /// whole codon and its residue.
    IntronWithBasesLeft { len: u32, bases_left: u8 },
}

impl EditOp {
    pub fn genomic_len(self, mode: AlignmentMode) -> usize {
        let unit = match mode {
            AlignmentMode::Nucleotide => 1,
            AlignmentMode::Protein => 3,
        };
        match self {
            EditOp::Match(n) => n as usize * unit,
            EditOp::Mismatch | EditOp::Deletion => unit,
            EditOp::Insertion => 0,
            EditOp::Intron(n) => n as usize,
            EditOp::MismatchWithGap(k) | EditOp::DeletionWithGap(k) => 3 - k as usize,
            EditOp::IntronWithBasesLeft { len, .. } => len as usize + 3,
        }
    }

    pub fn reference_len(self) -> usize {
        match self {
            EditOp::Match(n) => n as usize,
            EditOp::Mismatch | EditOp::Insertion | EditOp::MismatchWithGap(_) => 1,
            EditOp::IntronWithBasesLeft { .. } => 1,
            EditOp::Deletion | EditOp::Intron(_) | EditOp::DeletionWithGap(_) => 0,
        }
    }

    /// Intron bases only, excluding any split codon.
    pub fn intron_len(self) -> usize {
        match self {
            EditOp::Intron(n) | EditOp::IntronWithBasesLeft { len: n, .. } => n as usize,
            _ => 0,
        }
    }

    pub fn is_intron(self) -> bool {
        matches!(self, EditOp::Intron(_) | EditOp::IntronWithBasesLeft { .. })
    }

    pub fn is_match(self) -> bool {
        matches!(self, EditOp::Match(_))
    }

    /// Match or mismatch: a column that aligns genomic to reference.
    pub fn is_aligned_column(self) -> bool {
        matches!(self, EditOp::Match(_) | EditOp::Mismatch)
    }

    fn symbol(self) -> &'static str {
        match self {
            EditOp::Match(_) => "M",
            EditOp::Mismatch => "X",
            EditOp::Insertion => "I",
            EditOp::Deletion => "D",
            EditOp::Intron(_) => "N",
            EditOp::MismatchWithGap(1) => "F",
            EditOp::MismatchWithGap(_) => "G",
            EditOp::DeletionWithGap(1) => "E",
            EditOp::DeletionWithGap(_) => "H",
            EditOp::IntronWithBasesLeft { .. } => "N",
        }
    }
}

/// Writes ops in a compact run-length form, e.g. `12M1X54N9M` or `90N[2]`
/// for an intron leaving two codon bases on its 3' side.
pub fn write_ops(f: &mut fmt::Formatter<'_>, ops: &[EditOp]) -> fmt::Result {
    if ops.is_empty() {
        return write!(f, "*");
    }
    let mut i = 0;
    while i < ops.len() {
        let op = ops[i];
        match op {
            EditOp::Match(n) | EditOp::Intron(n) => {
                write!(f, "{n}{}", op.symbol())?;
                i += 1;
            }
            EditOp::IntronWithBasesLeft { len, bases_left } => {
                write!(f, "{len}N[{bases_left}]")?;
                i += 1;
            }
            _ => {
                let run = ops[i..].iter().take_while(|&&o| o == op).count();
                write!(f, "{run}{}", op.symbol())?;
                i += run;
            }
        }
    }
    Ok(())
}
