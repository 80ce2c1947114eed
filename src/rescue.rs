//! Small-exon rescue.
//!
//! Short terminal exons are easily lost: the main DP prefers leaving the
//! reference ends unaligned over paying for an extra intron. Rescue re-runs
//! the DP on the unaligned reference end plus a few aligned positions
//! against a genomic window beyond the alignment, and splices the result
//! onto the path. Gaps next to the seam are handed back to the rescue DP
//! along with the overlap, so the joined path never keeps a stale indel
//! there.

use crate::api::Aligner;
use crate::cutout::SplicedSeq;
use crate::dp::{EndAnchor, StartAnchor};
use crate::error::{AlignError, Result};
use crate::params::DpParameters;
use crate::path::BacktracePath;
use std::ops::Range;

fn run_rescue_dp(
    aligner: &Aligner<'_>,
    window: Range<usize>,
    reference: Range<usize>,
    start: StartAnchor,
    end: EndAnchor,
) -> Result<Option<BacktracePath>> {
    let params = DpParameters::build(aligner.splice_model(), aligner.genomic(), window.clone())?;
    let spliced = SplicedSeq::identity(aligner.genomic(), window.clone());
    match aligner.run_dp(&params, &spliced, reference.clone(), start, end) {
        Ok(path) => Ok(Some(path)),
        Err(AlignError::MatrixAllocationFailed { bytes, budget, .. }) => {
            tracing::debug!(
                genomic = ?window,
                reference = ?reference,
                bytes = bytes as u64,
                budget,
                "rescue window too large, skipping"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Re-aligns the unaligned reference prefix. Returns the genomic window that
/// was searched when the path was replaced.
pub(crate) fn rescue_initial(
    aligner: &Aligner<'_>,
    path: &mut BacktracePath,
) -> Result<Option<Range<usize>>> {
    let config = &aligner.config().rescue;
    if path.is_empty() || path.ref_dp_start() == 0 {
        return Ok(None);
    }
    let mut rest = path.clone();
    let (genomic, overlap) = rest.strip_leading_columns(config.overlap.max(1));
    if genomic == 0 && overlap == 0 {
        return Ok(None);
    }
    let window = path.gen_dp_start().saturating_sub(config.genomic_window)..rest.gen_dp_start();
    let Some(mut rescued) = run_rescue_dp(
        aligner,
        window.clone(),
        0..rest.ref_dp_start(),
        StartAnchor::Free,
        EndAnchor::Exon,
    )?
    else {
        return Ok(None);
    };
    rescued.append_path(rest)?;
    tracing::debug!(
        before = %path,
        after = %rescued,
        "initial exon rescue"
    );
    *path = rescued;
    Ok(Some(window))
}

/// Re-aligns the unaligned reference suffix.
pub(crate) fn rescue_terminal(
    aligner: &Aligner<'_>,
    path: &mut BacktracePath,
) -> Result<Option<Range<usize>>> {
    let config = &aligner.config().rescue;
    let reference_len = aligner.reference().len();
    if path.is_empty() || path.ref_dp_end() >= reference_len {
        return Ok(None);
    }
    let mut head = path.clone();
    let (genomic, overlap) = head.strip_trailing_columns(config.overlap.max(1));
    if genomic == 0 && overlap == 0 {
        return Ok(None);
    }
    let genomic_end = (path.gen_dp_end() + config.genomic_window).min(aligner.genomic().len());
    let window = head.gen_dp_end()..genomic_end;
    let Some(rescued) = run_rescue_dp(
        aligner,
        window.clone(),
        head.ref_dp_end()..reference_len,
        StartAnchor::Exon,
        EndAnchor::Best,
    )?
    else {
        return Ok(None);
    };
    head.append_path(rescued)?;
    tracing::debug!(
        before = %path,
        after = %head,
        "terminal exon rescue"
    );
    *path = head;
    Ok(Some(window))
}
