//! Reconstruction of the optimal path from a filled backtrace matrix.
//!
//! The walk starts at the terminal state and follows the stored codes back to
//! `(0, 0)`. Introns are accumulated while walking and emitted when the intron
//! opens. Crossing an excised region is only legal while staying in an
//! intron; the excised length is added back so the returned path is in
//! original genomic coordinates.

use crate::alphabet::{UNDETERMINED_RESIDUE, is_undetermined_base};
use crate::cutout::SpliceMap;
use crate::dp::DpInput;
use crate::dp::nucleotide::{self, INTRON_TRANSITIONS as NUC_INTRON, IntronCode, NucState, NucleotideTable};
use crate::dp::protein::{self, INTRON_TRANSITIONS as PROT_INTRON, ProtState, ProteinCell, ProteinTable};
use crate::editop::EditOp;
use crate::error::{AlignError, Result};
use crate::path::BacktracePath;
use crate::types::{AlignmentMode, ReferencePos};

/// Ops collected from the end of the alignment towards its start.
#[derive(Debug, Default)]
struct ReversedOps {
    ops: Vec<EditOp>,
    intron: usize,
}

impl ReversedOps {
    fn push(&mut self, op: EditOp) {
        match (self.ops.last_mut(), op) {
            (Some(EditOp::Match(a)), EditOp::Match(b)) => *a += b,
            _ => self.ops.push(op),
        }
    }

    fn close_intron(&mut self, bases_left: u8) -> Result<()> {
        let len = u32::try_from(std::mem::take(&mut self.intron)).map_err(|_| {
            AlignError::InvariantViolated("intron longer than u32::MAX".to_string())
        })?;
        if bases_left == 0 {
            self.push(EditOp::Intron(len));
        } else {
            self.push(EditOp::IntronWithBasesLeft { len, bases_left });
        }
        Ok(())
    }

    fn into_forward(mut self) -> Vec<EditOp> {
        self.ops.reverse();
        self.ops
    }
}

/// Fails when spliced base `b` directly follows an excised region.
#[inline]
fn ensure_contiguous(map: &SpliceMap, b: usize) -> Result<()> {
    match map.excised_before(b) {
        Some(len) => Err(AlignError::CutoutNotInIntron {
            position: map.to_original(b) - len,
        }),
        None => Ok(()),
    }
}

fn step_error(name: &str, n: usize, m: usize) -> AlignError {
    AlignError::InvariantViolated(format!("transition {name} leaves the matrix at ({n}, {m})"))
}

fn finish(
    input: &DpInput<'_>,
    mode: AlignmentMode,
    ref_start: ReferencePos,
    ops: ReversedOps,
) -> Result<BacktracePath> {
    let window = input.genomic.window();
    let path = BacktracePath::from_ops(mode, window.start, ref_start, ops.into_forward());
    if path.gen_dp_length() != window.len() || path.ref_dp_length() != input.reference.len() {
        return Err(AlignError::InvariantViolated(format!(
            "backtrace covers {} genomic / {} reference positions, DP window is {} / {}",
            path.gen_dp_length(),
            path.ref_dp_length(),
            window.len(),
            input.reference.len()
        )));
    }
    Ok(path)
}

pub(crate) fn nucleotide_path(
    table: &NucleotideTable,
    input: &DpInput<'_>,
    ref_start: ReferencePos,
) -> Result<BacktracePath> {
    let g = input.genomic.seq();
    let r = input.reference;
    let map = input.genomic.map();
    let mut ops = ReversedOps::default();
    let (mut n, mut m) = (g.len(), r.len());
    let mut state = table.terminal;

    while n > 0 || m > 0 {
        let (ecode, icode) = nucleotide::unpack(table.matrix.get(n, m))?;
        match state {
            NucState::Exon => {
                let t = ecode.transition();
                let (pn, pm) = t.source(n, m).ok_or_else(|| step_error(ecode.name(), n, m))?;
                if pn < n {
                    ensure_contiguous(map, pn)?;
                }
                let op = match (pn < n, pm < m) {
                    (true, true) => {
                        let (gb, rb) = (g[pn], r[pm]);
                        if gb == rb && !is_undetermined_base(gb) {
                            EditOp::Match(1)
                        } else {
                            EditOp::Mismatch
                        }
                    }
                    (true, false) => EditOp::Deletion,
                    _ => EditOp::Insertion,
                };
                ops.push(op);
                state = t.from;
                (n, m) = (pn, pm);
            }
            NucState::Intron => {
                let t = &NUC_INTRON[icode as usize];
                let (pn, pm) = t.source(n, m).ok_or_else(|| step_error(icode.name(), n, m))?;
                ops.intron += 1;
                match icode {
                    IntronCode::Stay => {
                        if let Some(excised) = map.excised_before(pn) {
                            ops.intron += excised;
                        }
                    }
                    IntronCode::OpenFromExon => {
                        ensure_contiguous(map, pn)?;
                        ops.close_intron(0)?;
                    }
                }
                state = t.from;
                (n, m) = (pn, pm);
            }
        }
    }
    if ops.intron > 0 {
        ops.close_intron(0)?;
    }
    finish(input, AlignmentMode::Nucleotide, ref_start, ops)
}

pub(crate) fn protein_path(
    table: &ProteinTable,
    input: &DpInput<'_>,
    ref_start: ReferencePos,
) -> Result<BacktracePath> {
    use protein::ExonCode as C;

    let g = input.genomic.seq();
    let r = input.reference;
    let map = input.genomic.map();
    let mut ops = ReversedOps::default();
    let (mut n, mut m) = (g.len(), r.len());
    let mut state = table.terminal;

    while n > 0 || m > 0 {
        let cell = ProteinCell::unpack(table.matrix.get(n, m))?;
        match state {
            ProtState::Exon => {
                let t = cell.exon.transition();
                let (pn, pm) = t.source(n, m).ok_or_else(|| step_error(cell.exon.name(), n, m))?;
                for b in pn..n {
                    ensure_contiguous(map, b)?;
                }
                match cell.exon {
                    C::Codon | C::CodonAfterPhase0 => {
                        let aa = input.code.translate([g[pn], g[pn + 1], g[pn + 2]]);
                        if aa == r[pm] && aa != UNDETERMINED_RESIDUE {
                            ops.push(EditOp::Match(1));
                        } else {
                            ops.push(EditOp::Mismatch);
                        }
                    }
                    // The split codon is emitted with its intron.
                    C::SplitAfterPhase1 | C::SplitAfterPhase2 => {}
                    C::TwoBases => ops.push(EditOp::MismatchWithGap(1)),
                    C::OneBase => ops.push(EditOp::MismatchWithGap(2)),
                    C::Insertion => ops.push(EditOp::Insertion),
                    C::CodonDeletion => ops.push(EditOp::Deletion),
                    C::TwoBaseDeletion => ops.push(EditOp::DeletionWithGap(1)),
                    C::OneBaseDeletion => ops.push(EditOp::DeletionWithGap(2)),
                }
                state = t.from;
                (n, m) = (pn, pm);
            }
            ProtState::Phase0 | ProtState::Phase1 | ProtState::Phase2 => {
                let k = state as usize - 1;
                let code = cell.phases[k];
                let t = &PROT_INTRON[k][code as usize];
                let (pn, pm) = t
                    .source(n, m)
                    .ok_or_else(|| step_error(protein::INTRON_NAMES[k][code as usize], n, m))?;
                ops.intron += 1;
                match code {
                    protein::IntronCode::Stay => {
                        if let Some(excised) = map.excised_before(pn) {
                            ops.intron += excised;
                        }
                    }
                    protein::IntronCode::OpenFromExon => {
                        for b in pn..n {
                            ensure_contiguous(map, b)?;
                        }
                        // Phase k leaves 3 - k codon bases after the intron.
                        let bases_left = if k == 0 { 0 } else { 3 - k as u8 };
                        ops.close_intron(bases_left)?;
                    }
                }
                state = t.from;
                (n, m) = (pn, pm);
            }
        }
    }
    if ops.intron > 0 {
        ops.close_intron(0)?;
    }
    finish(input, AlignmentMode::Protein, ref_start, ops)
}

/// Fills the DP for `input` and reconstructs its optimal path. `ref_start`
/// is the offset of `input.reference` within the full reference.
pub(crate) fn compute_path(
    input: &DpInput<'_>,
    mode: AlignmentMode,
    ref_start: ReferencePos,
) -> Result<BacktracePath> {
    match mode {
        AlignmentMode::Nucleotide => {
            let table = nucleotide::fill(input)?;
            tracing::trace!(score = table.score, "nucleotide DP filled");
            nucleotide_path(&table, input, ref_start)
        }
        AlignmentMode::Protein => {
            let table = protein::fill(input)?;
            tracing::trace!(score = table.score, "protein DP filled");
            protein_path(&table, input, ref_start)
        }
    }
}
