//! Four-state DP for protein references: one exon state and one intron
//! state per codon phase.
//!
//! `Phase1` introns interrupt a codon after its first base, `Phase2` after
//! its second. The split bases are recovered from the intron start when the
//! intron closes.

use super::matrix::ProteinMatrix;
use super::{
    DpInput, EndAnchor, FLANK, LogWeights, RollingColumns, Transition, UNREACHABLE,
    best_transition,
};
use crate::error::{AlignError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtState {
    Exon = 0,
    Phase0 = 1,
    Phase1 = 2,
    Phase2 = 3,
}

/// How the exon state of a cell was reached. Four bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum ExonCode {
    Codon = 0,
    CodonAfterPhase0,
    SplitAfterPhase1,
    SplitAfterPhase2,
    TwoBases,
    OneBase,
    Insertion,
    CodonDeletion,
    TwoBaseDeletion,
    OneBaseDeletion,
}

/// How one intron phase state was reached. One bit per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum IntronCode {
    Stay = 0,
    OpenFromExon,
}

const EXON_CODES: [ExonCode; 10] = [
    ExonCode::Codon,
    ExonCode::CodonAfterPhase0,
    ExonCode::SplitAfterPhase1,
    ExonCode::SplitAfterPhase2,
    ExonCode::TwoBases,
    ExonCode::OneBase,
    ExonCode::Insertion,
    ExonCode::CodonDeletion,
    ExonCode::TwoBaseDeletion,
    ExonCode::OneBaseDeletion,
];

pub(crate) const EXON_NAMES: [&str; 10] = [
    "E(n-3,m-1) -> E",
    "I0(n-3,m-1) -> E",
    "I1(n-2,m-1) -> E",
    "I2(n-1,m-1) -> E",
    "E(n-2,m-1) -> E",
    "E(n-1,m-1) -> E",
    "E(n,m-1) -> E",
    "E(n-3,m) -> E",
    "E(n-2,m) -> E",
    "E(n-1,m) -> E",
];

pub(crate) const INTRON_NAMES: [[&str; 2]; 3] = [
    ["I0(n-1,m) -> I0", "E(n-1,m) -> I0"],
    ["I1(n-1,m) -> I1", "E(n-2,m) -> I1"],
    ["I2(n-1,m) -> I2", "E(n-3,m) -> I2"],
];

const fn exon(code: ExonCode, from: ProtState, gen_step: usize, ref_step: usize) -> Transition<ProtState, ExonCode> {
    Transition { code, from, gen_step, ref_step }
}

/// Ordered by code value; table order is the tie-break priority.
pub(crate) const EXON_TRANSITIONS: [Transition<ProtState, ExonCode>; 10] = [
    exon(ExonCode::Codon, ProtState::Exon, 3, 1),
    exon(ExonCode::CodonAfterPhase0, ProtState::Phase0, 3, 1),
    exon(ExonCode::SplitAfterPhase1, ProtState::Phase1, 2, 1),
    exon(ExonCode::SplitAfterPhase2, ProtState::Phase2, 1, 1),
    exon(ExonCode::TwoBases, ProtState::Exon, 2, 1),
    exon(ExonCode::OneBase, ProtState::Exon, 1, 1),
    exon(ExonCode::Insertion, ProtState::Exon, 0, 1),
    exon(ExonCode::CodonDeletion, ProtState::Exon, 3, 0),
    exon(ExonCode::TwoBaseDeletion, ProtState::Exon, 2, 0),
    exon(ExonCode::OneBaseDeletion, ProtState::Exon, 1, 0),
];

/// Per phase: stay in the intron, or open it from the exon state. Opening
/// phase `k` leaves `k` codon bases before the intron.
pub(crate) const INTRON_TRANSITIONS: [[Transition<ProtState, IntronCode>; 2]; 3] = [
    [
        Transition { code: IntronCode::Stay, from: ProtState::Phase0, gen_step: 1, ref_step: 0 },
        Transition { code: IntronCode::OpenFromExon, from: ProtState::Exon, gen_step: 1, ref_step: 0 },
    ],
    [
        Transition { code: IntronCode::Stay, from: ProtState::Phase1, gen_step: 1, ref_step: 0 },
        Transition { code: IntronCode::OpenFromExon, from: ProtState::Exon, gen_step: 2, ref_step: 0 },
    ],
    [
        Transition { code: IntronCode::Stay, from: ProtState::Phase2, gen_step: 1, ref_step: 0 },
        Transition { code: IntronCode::OpenFromExon, from: ProtState::Exon, gen_step: 3, ref_step: 0 },
    ],
];

impl ExonCode {
    pub(crate) fn name(self) -> &'static str {
        EXON_NAMES[self as usize]
    }

    pub(crate) fn transition(self) -> &'static Transition<ProtState, ExonCode> {
        &EXON_TRANSITIONS[self as usize]
    }
}

/// Decoded protein backtrace cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProteinCell {
    pub exon: ExonCode,
    pub phases: [IntronCode; 3],
}

impl ProteinCell {
    fn pack(self) -> u8 {
        let mut byte = self.exon as u8;
        for (k, code) in self.phases.iter().enumerate() {
            byte |= (*code as u8) << (4 + k);
        }
        byte
    }

    pub(crate) fn unpack(byte: u8) -> Result<Self> {
        let exon = EXON_CODES.get((byte & 0x0f) as usize).copied().ok_or_else(|| {
            AlignError::InvariantViolated(format!("corrupt protein backtrace cell {byte:#010b}"))
        })?;
        let mut phases = [IntronCode::Stay; 3];
        for (k, phase) in phases.iter_mut().enumerate() {
            if byte & (1 << (4 + k)) != 0 {
                *phase = IntronCode::OpenFromExon;
            }
        }
        Ok(Self { exon, phases })
    }
}

#[derive(Debug)]
pub(crate) struct ProteinTable {
    pub matrix: ProteinMatrix,
    pub terminal: ProtState,
    pub score: f64,
}

pub(crate) fn fill(input: &DpInput<'_>) -> Result<ProteinTable> {
    let g = input.genomic.seq();
    let r = input.reference;
    let (n_len, m_len) = (g.len(), r.len());
    let mut matrix = ProteinMatrix::allocate(n_len, m_len, input.max_matrix_bytes)?;
    tracing::debug!(
        genomic = n_len,
        reference = m_len,
        excised = input.genomic.map().total_excised(),
        "protein DP"
    );

    // Residue encoded by the codon starting at each spliced position.
    let codons: Vec<u8> = g
        .windows(3)
        .map(|c| input.code.translate([c[0], c[1], c[2]]))
        .collect();
    let w = LogWeights::new(input.config, input.start);
    let substitute = |aa: u8, residue: u8| -> f64 {
        w.substitution_scale * f64::from(input.substitution.score(aa, residue))
    };

    let mut cols: RollingColumns<4> = RollingColumns::new(4, m_len + 1);
    const E: usize = ProtState::Exon as usize;

    for n in 0..=n_len {
        for m in 0..=m_len {
            if n == 0 && m == 0 {
                cols.set(
                    0,
                    0,
                    [w.initial_exon, w.initial_intron, UNREACHABLE, UNREACHABLE],
                    [w.initial_exon_start, FLANK, 0, 0],
                );
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
                    ExonCode::Codon => substitute(codons[n - 3], r[m - 1]),
                    ExonCode::CodonAfterPhase0 => {
                        input.close_intron(&w, start, pn) + substitute(codons[n - 3], r[m - 1])
                    }
                    ExonCode::SplitAfterPhase1 => {
                        let aa = input.code.translate([g[start - 1], g[n - 2], g[n - 1]]);
                        input.close_intron(&w, start, pn) + substitute(aa, r[m - 1])
                    }
                    ExonCode::SplitAfterPhase2 => {
                        let aa = input.code.translate([g[start - 2], g[start - 1], g[n - 1]]);
                        input.close_intron(&w, start, pn) + substitute(aa, r[m - 1])
                    }
                    ExonCode::TwoBases | ExonCode::OneBase => w.frameshift,
                    ExonCode::Insertion => w.residue_insertion,
                    ExonCode::CodonDeletion => w.codon_deletion,
                    ExonCode::TwoBaseDeletion | ExonCode::OneBaseDeletion => w.frameshift,
                }
            });
            let exon_start = {
                let t = ecode.transition();
                match t.source(n, m) {
                    Some((pn, pm)) if t.from == ProtState::Exon => cols.start(pn, pm, E),
                    Some((pn, _)) => pn,
                    None => 0,
                }
            };

            let mut scores = [escore, UNREACHABLE, UNREACHABLE, UNREACHABLE];
            let mut starts = [exon_start, 0, 0, 0];
            let mut phases = [IntronCode::Stay; 3];
            for (k, table) in INTRON_TRANSITIONS.iter().enumerate() {
                let state = k + 1;
                // A split codon needs a residue after the intron.
                if k > 0 && m == m_len {
                    continue;
                }
                let (code, score) = best_transition(table, |t| {
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
                phases[k] = code;
                scores[state] = score;
                starts[state] = match code {
                    IntronCode::Stay if n > 0 => cols.start(n - 1, m, state),
                    _ => n.saturating_sub(1),
                };
            }

            cols.set(n, m, scores, starts);
            matrix.set(n, m, ProteinCell { exon: ecode, phases }.pack());
        }
    }

    let exon = cols.score(n_len, m_len, E);
    let intron = cols.score(n_len, m_len, ProtState::Phase0 as usize);
    let (terminal, score) = match input.end {
        EndAnchor::Exon => (ProtState::Exon, exon),
        EndAnchor::Best if exon >= intron => (ProtState::Exon, exon),
        EndAnchor::Best => (ProtState::Phase0, intron),
    };
    if score == UNREACHABLE {
        return Err(AlignError::InvariantViolated(format!(
            "no protein path reaches ({n_len}, {m_len})"
        )));
    }
    Ok(ProteinTable {
        matrix,
        terminal,
        score,
    })
}
