use thiserror::Error;

/// Errors produced while computing a spliced alignment.
#[derive(Debug, Error)]
pub enum AlignError {
    /// The bit-packed backtrace matrix does not fit the memory budget, or the
    /// allocator refused it.
    #[error(
        "backtrace matrix for {genomic} genomic x {reference} reference positions needs {bytes} bytes (budget {budget})"
    )]
    MatrixAllocationFailed {
        genomic: usize,
        reference: usize,
        bytes: u128,
        budget: usize,
    },

    /// The optimal path crossed an excised genomic region outside of an intron.
    #[error("excised region at genomic position {position} is not contained in an intron")]
    CutoutNotInIntron { position: usize },

    #[error("cannot build splice-site parameters: {0}")]
    DpParameterAllocationFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal consistency check failed; always a bug.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

impl AlignError {
    /// Whether the caller can retry with other settings (smaller window,
    /// different cutout strategy) instead of giving up on the pair.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AlignError::MatrixAllocationFailed { .. } | AlignError::CutoutNotInIntron { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AlignError>;
