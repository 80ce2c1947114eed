//! Trimming of unreliable path ends.

use crate::config::{CutoffConfig, CutoffPolicy};
use crate::editop::EditOp;
use crate::path::{BacktracePath, Cutoff};
use crate::types::AlignmentMode;

/// Number of leading ops of `ops` to drop. `ops` is in walking order: for
/// the trailing end pass the reversed path and `forward = false`.
fn ops_to_cut(
    ops: &[EditOp],
    policy: CutoffPolicy,
    config: &CutoffConfig,
    mode: AlignmentMode,
    forward: bool,
) -> usize {
    let up_to_match = |from: usize| from + ops[from..].iter().take_while(|op| !op.is_match()).count();
    match policy {
        CutoffPolicy::Minimal => ops
            .iter()
            .take_while(|op| op.is_intron() || **op == EditOp::Insertion)
            .count(),
        CutoffPolicy::Relaxed => up_to_match(0),
        CutoffPolicy::Strict => {
            let mut idx = up_to_match(0);
            loop {
                let Some(offset) = ops[idx..].iter().position(|op| op.is_intron()) else {
                    break idx;
                };
                let intron = idx + offset;
                let mut exon_len: usize = ops[idx..intron].iter().map(|op| op.genomic_len(mode)).sum();
                if let EditOp::IntronWithBasesLeft { bases_left, .. } = ops[intron] {
                    // Split codon bases on this exon's side of the intron.
                    exon_len += if forward { 3 - bases_left as usize } else { bases_left as usize };
                }
                if exon_len >= config.min_terminal_exon_length {
                    break idx;
                }
                idx = up_to_match(intron);
            }
        }
    }
}

fn cutoff_of<'a>(ops: impl Iterator<Item = &'a EditOp>, mode: AlignmentMode) -> Cutoff {
    ops.fold(Cutoff::default(), |mut cut, op| {
        cut.genomic += op.genomic_len(mode);
        cut.reference += op.reference_len();
        cut.ops += 1;
        cut
    })
}

/// Leading and trailing cutoffs according to the configured policies. When
/// they would overlap, the leading cutoff covers the whole path.
pub fn determine_cutoffs(path: &BacktracePath, config: &CutoffConfig) -> (Cutoff, Cutoff) {
    let ops = path.ops();
    let mode = path.mode();
    let lead = ops_to_cut(ops, config.start, config, mode, true);
    let reversed: Vec<EditOp> = ops.iter().rev().copied().collect();
    let trail = ops_to_cut(&reversed, config.end, config, mode, false);

    if lead + trail >= ops.len() {
        return (cutoff_of(ops.iter(), mode), Cutoff::default());
    }
    (
        cutoff_of(ops[..lead].iter(), mode),
        cutoff_of(ops[ops.len() - trail..].iter(), mode),
    )
}

/// Determines and applies both cutoffs, then removes zero-length exons.
pub fn trim(path: &mut BacktracePath, config: &CutoffConfig) {
    let (start, end) = determine_cutoffs(path, config);
    tracing::trace!(
        start_ops = start.ops,
        end_ops = end.ops,
        "applying cutoffs"
    );
    path.set_cutoffs(start, end);
    path.cutoff_start();
    path.cutoff_end();
    path.remove_zero_length_exons();
}
