use crate::editop::{EditOp, write_ops};
use crate::error::{AlignError, Result};
use crate::types::{AlignmentMode, GenomicPos, ReferencePos};
use std::fmt;
use std::ops::Range;

/// Leading or trailing part of a path scheduled for removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cutoff {
    pub genomic: usize,
    pub reference: usize,
    pub ops: usize,
}

impl Cutoff {
    pub fn is_empty(&self) -> bool {
        self.ops == 0
    }
}

/// Edit operations of one alignment plus the genomic and reference window
/// they cover. Coordinates are absolute and always refer to the unspliced
/// genomic sequence.
///
/// Invariant: the genomic (reference) lengths of `ops` sum to
/// `gen_dp_length` (`ref_dp_length`).
#[derive(Debug, Clone, PartialEq)]
pub struct BacktracePath {
    mode: AlignmentMode,
    ops: Vec<EditOp>,
    gen_dp_start: GenomicPos,
    gen_dp_length: usize,
    ref_dp_start: ReferencePos,
    ref_dp_length: usize,
    cutoff_start: Cutoff,
    cutoff_end: Cutoff,
}

impl BacktracePath {
    pub fn new(mode: AlignmentMode, gen_dp_start: GenomicPos, ref_dp_start: ReferencePos) -> Self {
        Self {
            mode,
            ops: Vec::new(),
            gen_dp_start,
            gen_dp_length: 0,
            ref_dp_start,
            ref_dp_length: 0,
            cutoff_start: Cutoff::default(),
            cutoff_end: Cutoff::default(),
        }
    }

    pub fn from_ops(
        mode: AlignmentMode,
        gen_dp_start: GenomicPos,
        ref_dp_start: ReferencePos,
        ops: impl IntoIterator<Item = EditOp>,
    ) -> Self {
        let mut path = Self::new(mode, gen_dp_start, ref_dp_start);
        for op in ops {
            path.push(op);
        }
        path
    }

    /// Appends an op, merging `Match` and `Intron` runs.
    pub fn push(&mut self, op: EditOp) {
        self.gen_dp_length += op.genomic_len(self.mode);
        self.ref_dp_length += op.reference_len();
        match (self.ops.last_mut(), op) {
            (Some(EditOp::Match(a)), EditOp::Match(b)) | (Some(EditOp::Intron(a)), EditOp::Intron(b)) => {
                *a += b;
            }
            _ => self.ops.push(op),
        }
    }

    /// Appends a path that starts exactly where this one ends.
    pub fn append_path(&mut self, other: BacktracePath) -> Result<()> {
        if other.mode != self.mode
            || other.gen_dp_start != self.gen_dp_end()
            || other.ref_dp_start != self.ref_dp_end()
        {
            return Err(AlignError::InvariantViolated(format!(
                "cannot join path ending at ({}, {}) with path starting at ({}, {})",
                self.gen_dp_end(),
                self.ref_dp_end(),
                other.gen_dp_start,
                other.ref_dp_start
            )));
        }
        for op in other.ops {
            self.push(op);
        }
        Ok(())
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn gen_dp_start(&self) -> GenomicPos {
        self.gen_dp_start
    }

    pub fn gen_dp_length(&self) -> usize {
        self.gen_dp_length
    }

    pub fn gen_dp_end(&self) -> GenomicPos {
        self.gen_dp_start + self.gen_dp_length
    }

    pub fn ref_dp_start(&self) -> ReferencePos {
        self.ref_dp_start
    }

    pub fn ref_dp_length(&self) -> usize {
        self.ref_dp_length
    }

    pub fn ref_dp_end(&self) -> ReferencePos {
        self.ref_dp_start + self.ref_dp_length
    }

    pub fn genomic_range(&self) -> Range<GenomicPos> {
        self.gen_dp_start..self.gen_dp_end()
    }

    pub fn reference_range(&self) -> Range<ReferencePos> {
        self.ref_dp_start..self.ref_dp_end()
    }

    pub fn intron_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_intron()).count()
    }

    /// Recomputes both length sums and compares them with the stored window.
    pub fn check_lengths(&self) -> Result<()> {
        let genomic: usize = self.ops.iter().map(|op| op.genomic_len(self.mode)).sum();
        let reference: usize = self.ops.iter().map(|op| op.reference_len()).sum();
        if genomic != self.gen_dp_length || reference != self.ref_dp_length {
            return Err(AlignError::InvariantViolated(format!(
                "edit operations cover {genomic} genomic / {reference} reference positions, window is {} / {}",
                self.gen_dp_length, self.ref_dp_length
            )));
        }
        Ok(())
    }

    pub fn set_cutoffs(&mut self, start: Cutoff, end: Cutoff) {
        self.cutoff_start = start;
        self.cutoff_end = end;
    }

    pub fn pending_cutoffs(&self) -> (Cutoff, Cutoff) {
        (self.cutoff_start, self.cutoff_end)
    }

    /// Drops the leading ops recorded by [`set_cutoffs`](Self::set_cutoffs).
    /// A second call is a no-op.
    pub fn cutoff_start(&mut self) {
        let cut = std::mem::take(&mut self.cutoff_start);
        if cut.is_empty() {
            return;
        }
        let n = cut.ops.min(self.ops.len());
        self.ops.drain(..n);
        self.gen_dp_start += cut.genomic;
        self.gen_dp_length -= cut.genomic;
        self.ref_dp_start += cut.reference;
        self.ref_dp_length -= cut.reference;
    }

    /// Drops the trailing ops recorded by [`set_cutoffs`](Self::set_cutoffs).
    pub fn cutoff_end(&mut self) {
        let cut = std::mem::take(&mut self.cutoff_end);
        if cut.is_empty() {
            return;
        }
        let keep = self.ops.len().saturating_sub(cut.ops);
        self.ops.truncate(keep);
        self.gen_dp_length -= cut.genomic;
        self.ref_dp_length -= cut.reference;
    }

    /// Rewrites `Intron(a) Insertion* Intron(b)` as `Insertion* Intron(a + b)`,
    /// removing exons without genomic bases. Returns how many were removed.
    pub fn remove_zero_length_exons(&mut self) -> usize {
        let mut removed = 0;
        let mut out: Vec<EditOp> = Vec::with_capacity(self.ops.len());
        for op in self.ops.drain(..) {
            if let EditOp::Intron(b) = op {
                let insertions = out
                    .iter()
                    .rev()
                    .take_while(|&&o| o == EditOp::Insertion)
                    .count();
                let k = out.len() - insertions;
                if k > 0
                    && let EditOp::Intron(a) = out[k - 1]
                {
                    out.remove(k - 1);
                    out.push(EditOp::Intron(a + b));
                    if insertions > 0 {
                        removed += 1;
                    }
                    continue;
                }
            }
            match (out.last_mut(), op) {
                (Some(EditOp::Match(a)), EditOp::Match(b)) => *a += b,
                _ => out.push(op),
            }
        }
        self.ops = out;
        removed
    }

    /// Removes leading ops covering at least `columns` reference positions,
    /// splitting a Match run if needed, plus any gap ops that would then
    /// lead the path. Never crosses an intron. Returns the `(genomic,
    /// reference)` lengths removed.
    pub fn strip_leading_columns(&mut self, columns: usize) -> (usize, usize) {
        let mut left = columns;
        let mut taken = 0;
        let mut split: Option<u32> = None;
        for op in &self.ops {
            match *op {
                _ if op.is_intron() => break,
                _ if left == 0 && op.is_aligned_column() => break,
                EditOp::Match(n) if n as usize > left && left > 0 => {
                    split = Some(n - left as u32);
                    taken += 1;
                    break;
                }
                _ => {
                    taken += 1;
                    left = left.saturating_sub(op.reference_len());
                }
            }
        }
        let mut drained: Vec<EditOp> = self.ops.drain(..taken).collect();
        if let Some(rest) = split {
            self.ops.insert(0, EditOp::Match(rest));
            if let Some(EditOp::Match(n)) = drained.last_mut() {
                *n -= rest;
            }
        }
        let genomic: usize = drained.iter().map(|op| op.genomic_len(self.mode)).sum();
        let reference: usize = drained.iter().map(|op| op.reference_len()).sum();
        self.gen_dp_start += genomic;
        self.gen_dp_length -= genomic;
        self.ref_dp_start += reference;
        self.ref_dp_length -= reference;
        (genomic, reference)
    }

    /// Trailing counterpart of [`strip_leading_columns`](Self::strip_leading_columns).
    pub fn strip_trailing_columns(&mut self, columns: usize) -> (usize, usize) {
        let mut left = columns;
        let mut genomic = 0;
        let mut reference = 0;
        while let Some(&op) = self.ops.last() {
            if op.is_intron() || (left == 0 && op.is_aligned_column()) {
                break;
            }
            match op {
                EditOp::Match(n) if n as usize > left && left > 0 => {
                    genomic += EditOp::Match(left as u32).genomic_len(self.mode);
                    reference += left;
                    if let Some(last) = self.ops.last_mut() {
                        *last = EditOp::Match(n - left as u32);
                    }
                    left = 0;
                }
                _ => {
                    genomic += op.genomic_len(self.mode);
                    reference += op.reference_len();
                    left = left.saturating_sub(op.reference_len());
                    self.ops.pop();
                }
            }
        }
        self.gen_dp_length -= genomic;
        self.ref_dp_length -= reference;
        (genomic, reference)
    }
}

impl fmt::Display for BacktracePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ops(f, &self.ops)
    }
}
