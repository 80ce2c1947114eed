//! Bit-packed backtrace storage.
//!
//! Nucleotide cells take four bits (three for the exon state, one for the
//! intron state), so two genomic positions share one byte. Protein cells
//! take one byte (four bits exon state, one bit per intron phase).

use crate::error::{AlignError, Result};

/// Which half of a [`PackedPair`] a genomic position lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[inline]
    pub(crate) fn of(n: usize) -> Self {
        if n % 2 == 0 { Parity::Even } else { Parity::Odd }
    }
}

/// Two nibbles: genomic position `2k` in the low half, `2k + 1` in the high half.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct PackedPair(u8);

impl PackedPair {
    #[inline]
    pub(crate) fn get(self, parity: Parity) -> u8 {
        match parity {
            Parity::Even => self.0 & 0x0f,
            Parity::Odd => self.0 >> 4,
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, parity: Parity, nibble: u8) {
        debug_assert!(nibble < 16);
        match parity {
            Parity::Even => self.0 = (self.0 & 0xf0) | nibble,
            Parity::Odd => self.0 = (self.0 & 0x0f) | (nibble << 4),
        }
    }
}

fn reserve<T: Clone + Default>(
    len: usize,
    genomic: usize,
    reference: usize,
    budget: usize,
) -> Result<Vec<T>> {
    let bytes = len as u128 * std::mem::size_of::<T>() as u128;
    let failed = || AlignError::MatrixAllocationFailed {
        genomic,
        reference,
        bytes,
        budget,
    };
    if bytes > budget as u128 {
        return Err(failed());
    }
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| failed())?;
    data.resize(len, T::default());
    Ok(data)
}

/// Nucleotide backtrace matrix, `(N + 1) x (M + 1)` nibbles.
#[derive(Debug)]
pub(crate) struct NucleotideMatrix {
    width: usize,
    data: Vec<PackedPair>,
}

impl NucleotideMatrix {
    pub(crate) fn footprint(genomic: usize, reference: usize) -> Option<usize> {
        (genomic.checked_add(2)? / 2).checked_mul(reference.checked_add(1)?)
    }

    pub(crate) fn allocate(genomic: usize, reference: usize, budget: usize) -> Result<Self> {
        let len = Self::footprint(genomic, reference).ok_or(AlignError::MatrixAllocationFailed {
            genomic,
            reference,
            bytes: (genomic as u128 / 2 + 1) * (reference as u128 + 1),
            budget,
        })?;
        Ok(Self {
            width: reference + 1,
            data: reserve(len, genomic, reference, budget)?,
        })
    }

    #[inline]
    pub(crate) fn get(&self, n: usize, m: usize) -> u8 {
        self.data[(n / 2) * self.width + m].get(Parity::of(n))
    }

    #[inline]
    pub(crate) fn set(&mut self, n: usize, m: usize, nibble: u8) {
        self.data[(n / 2) * self.width + m].set(Parity::of(n), nibble);
    }
}

/// Protein backtrace matrix, one byte per cell.
#[derive(Debug)]
pub(crate) struct ProteinMatrix {
    width: usize,
    data: Vec<u8>,
}

impl ProteinMatrix {
    pub(crate) fn footprint(genomic: usize, reference: usize) -> Option<usize> {
        genomic.checked_add(1)?.checked_mul(reference.checked_add(1)?)
    }

    pub(crate) fn allocate(genomic: usize, reference: usize, budget: usize) -> Result<Self> {
        let len = Self::footprint(genomic, reference).ok_or(AlignError::MatrixAllocationFailed {
            genomic,
            reference,
            bytes: (genomic as u128 + 1) * (reference as u128 + 1),
            budget,
        })?;
        Ok(Self {
            width: reference + 1,
            data: reserve(len, genomic, reference, budget)?,
        })
    }

    #[inline]
    pub(crate) fn get(&self, n: usize, m: usize) -> u8 {
        self.data[n * self.width + m]
    }

    #[inline]
    pub(crate) fn set(&mut self, n: usize, m: usize, cell: u8) {
        self.data[n * self.width + m] = cell;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibbles_do_not_clobber_each_other() {
        let mut pair = PackedPair::default();
        pair.set(Parity::Even, 0b1011);
        pair.set(Parity::Odd, 0b0110);
        assert_eq!(pair.get(Parity::Even), 0b1011);
        assert_eq!(pair.get(Parity::Odd), 0b0110);
        pair.set(Parity::Even, 0b0001);
        assert_eq!(pair.get(Parity::Odd), 0b0110);
    }

    #[test]
    fn nucleotide_matrix_round_trips_every_cell() {
        let (n_len, m_len) = (7, 4);
        let mut matrix = NucleotideMatrix::allocate(n_len, m_len, 1 << 20).unwrap();
        for n in 0..=n_len {
            for m in 0..=m_len {
                matrix.set(n, m, ((n * 3 + m) % 16) as u8);
            }
        }
        for n in 0..=n_len {
            for m in 0..=m_len {
                assert_eq!(matrix.get(n, m), ((n * 3 + m) % 16) as u8, "cell ({n}, {m})");
            }
        }
        assert_eq!(NucleotideMatrix::footprint(7, 4), Some(20));
    }

    #[test]
    fn budget_is_enforced() {
        let err = ProteinMatrix::allocate(99, 9, 999).unwrap_err();
        assert!(matches!(
            err,
            AlignError::MatrixAllocationFailed { bytes: 1000, budget: 999, .. }
        ));
        assert!(ProteinMatrix::allocate(99, 9, 1000).is_ok());
    }

    #[test]
    fn overflowing_dimensions_fail_cleanly() {
        let err = NucleotideMatrix::allocate(usize::MAX - 1, usize::MAX - 1, usize::MAX).unwrap_err();
        assert!(matches!(err, AlignError::MatrixAllocationFailed { .. }));
    }
}
