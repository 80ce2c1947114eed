//! Two-state (exon/intron) DP for cDNA/EST references.

use super::matrix::NucleotideMatrix;
use super::{
    DpInput, EndAnchor, FLANK, LogWeights, RollingColumns, Transition, UNREACHABLE,
    best_transition,
};
use crate::alphabet::is_undetermined_base;
use crate::error::{AlignError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NucState {
    Exon = 0,
    Intron = 1,
}

/// How the exon state of a cell was reached. Three bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum ExonCode {
    MatchFromExon = 0,
    MatchFromIntron,
    DeletionFromExon,
    DeletionFromIntron,
    InsertionFromExon,
    InsertionFromIntron,
}

/// How the intron state of a cell was reached. One bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum IntronCode {
    Stay = 0,
    OpenFromExon,
}

const EXON_CODES: [ExonCode; 6] = [
    ExonCode::MatchFromExon,
    ExonCode::MatchFromIntron,
    ExonCode::DeletionFromExon,
    ExonCode::DeletionFromIntron,
    ExonCode::InsertionFromExon,
    ExonCode::InsertionFromIntron,
];

pub(crate) const EXON_NAMES: [&str; 6] = [
    "E(n-1,m-1) -> E",
    "I(n-1,m-1) -> E",
    "E(n-1,m) -> E",
    "I(n-1,m) -> E",
    "E(n,m-1) -> E",
    "I(n,m-1) -> E",
];

pub(crate) const INTRON_NAMES: [&str; 2] = ["I(n-1,m) -> I", "E(n-1,m) -> I"];

/// Ordered by code value; table order is the tie-break priority.
pub(crate) const EXON_TRANSITIONS: [Transition<NucState, ExonCode>; 6] = [
    Transition { code: ExonCode::MatchFromExon, from: NucState::Exon, gen_step: 1, ref_step: 1 },
    Transition { code: ExonCode::MatchFromIntron, from: NucState::Intron, gen_step: 1, ref_step: 1 },
    Transition { code: ExonCode::DeletionFromExon, from: NucState::Exon, gen_step: 1, ref_step: 0 },
    Transition { code: ExonCode::DeletionFromIntron, from: NucState::Intron, gen_step: 1, ref_step: 0 },
    Transition { code: ExonCode::InsertionFromExon, from: NucState::Exon, gen_step: 0, ref_step: 1 },
    Transition { code: ExonCode::InsertionFromIntron, from: NucState::Intron, gen_step: 0, ref_step: 1 },
];

pub(crate) const INTRON_TRANSITIONS: [Transition<NucState, IntronCode>; 2] = [
    Transition { code: IntronCode::Stay, from: NucState::Intron, gen_step: 1, ref_step: 0 },
    Transition { code: IntronCode::OpenFromExon, from: NucState::Exon, gen_step: 1, ref_step: 0 },
];

impl ExonCode {
    pub(crate) fn name(self) -> &'static str {
        EXON_NAMES[self as usize]
    }

    pub(crate) fn transition(self) -> &'static Transition<NucState, ExonCode> {
        &EXON_TRANSITIONS[self as usize]
    }
}

impl IntronCode {
    pub(crate) fn name(self) -> &'static str {
        INTRON_NAMES[self as usize]
    }
}

#[inline]
fn pack(exon: ExonCode, intron: IntronCode) -> u8 {
    exon as u8 | (intron as u8) << 3
}

#[inline]
pub(crate) fn unpack(nibble: u8) -> Result<(ExonCode, IntronCode)> {
    let exon = EXON_CODES.get((nibble & 0b111) as usize).copied().ok_or_else(|| {
        AlignError::InvariantViolated(format!("corrupt nucleotide backtrace cell {nibble:#06b}"))
    })?;
    let intron = if nibble & 0b1000 == 0 {
        IntronCode::Stay
    } else {
        IntronCode::OpenFromExon
    };
    Ok((exon, intron))
}

#[inline]
fn emission(w: &LogWeights, g: u8, r: u8) -> f64 {
    if is_undetermined_base(g) || is_undetermined_base(r) {
        w.undetermined
    } else if g == r {
        w.matched
    } else {
        w.mismatch
    }
}

#[derive(Debug)]
pub(crate) struct NucleotideTable {
    pub matrix: NucleotideMatrix,
    pub terminal: NucState,
    pub score: f64,
}

pub(crate) fn fill(input: &DpInput<'_>) -> Result<NucleotideTable> {
    let g = input.genomic.seq();
    let r = input.reference;
    let (n_len, m_len) = (g.len(), r.len());
    let mut matrix = NucleotideMatrix::allocate(n_len, m_len, input.max_matrix_bytes)?;
    tracing::debug!(
        genomic = n_len,
        reference = m_len,
        excised = input.genomic.map().total_excised(),
        "nucleotide DP"
    );

    let w = LogWeights::new(input.config, input.start);
    let mut cols: RollingColumns<2> = RollingColumns::new(2, m_len + 1);
    const E: usize = NucState::Exon as usize;
    const I: usize = NucState::Intron as usize;

    for n in 0..=n_len {
        for m in 0..=m_len {
            if n == 0 && m == 0 {
                cols.set(0, 0, [w.initial_exon, w.initial_intron], [w.initial_exon_start, FLANK]);
                matrix.set(0, 0, 0);
                continue;
            }

            let (ecode, escore) = best_transition(&EXON_TRANSITIONS, |t| {
                let Some((pn, pm)) = t.source(n, m) else {
                    return UNREACHABLE;
                };
                let pred = cols.score(pn, pm, t.from as usize);
                if pred == UNREACHABLE {
                    return UNREACHABLE;
                }
                let start = cols.start(pn, pm, t.from as usize);
                pred + match t.code {
                    ExonCode::MatchFromExon => emission(&w, g[n - 1], r[m - 1]),
                    ExonCode::MatchFromIntron => {
                        input.close_intron(&w, start, pn) + emission(&w, g[n - 1], r[m - 1])
                    }
                    ExonCode::DeletionFromExon => w.deletion,
                    ExonCode::DeletionFromIntron => input.close_intron(&w, start, pn) + w.deletion,
                    ExonCode::InsertionFromExon => w.insertion,
                    ExonCode::InsertionFromIntron => {
                        input.close_intron(&w, start, pn) + w.insertion
                    }
                }
            });
            let exon_start = {
                let t = ecode.transition();
                match t.source(n, m) {
                    Some((pn, pm)) if t.from == NucState::Exon => cols.start(pn, pm, E),
                    Some((pn, _)) => pn,
                    None => 0,
                }
            };

            let (icode, iscore) = best_transition(&INTRON_TRANSITIONS, |t| {
                let Some((pn, pm)) = t.source(n, m) else {
                    return UNREACHABLE;
                };
                let pred = cols.score(pn, pm, t.from as usize);
                if pred == UNREACHABLE {
                    return UNREACHABLE;
                }
                match t.code {
                    IntronCode::Stay => pred,
                    IntronCode::OpenFromExon => {
                        pred + input.open_intron(&w, cols.start(pn, pm, E), n - 1)
                    }
                }
            });
            let intron_start = match icode {
                IntronCode::Stay if n > 0 => cols.start(n - 1, m, I),
                _ => n.saturating_sub(1),
            };

            cols.set(n, m, [escore, iscore], [exon_start, intron_start]);
            matrix.set(n, m, pack(ecode, icode));
        }
    }

    let exon = cols.score(n_len, m_len, E);
    let intron = cols.score(n_len, m_len, I);
    let (terminal, score) = match input.end {
        EndAnchor::Exon => (NucState::Exon, exon),
        EndAnchor::Best if exon >= intron => (NucState::Exon, exon),
        EndAnchor::Best => (NucState::Intron, intron),
    };
    if score == UNREACHABLE {
        return Err(AlignError::InvariantViolated(format!(
            "no nucleotide path reaches ({n_len}, {m_len})"
        )));
    }
    Ok(NucleotideTable {
        matrix,
        terminal,
        score,
    })
}
