use crate::error::{DcopError, Result};
use serde::{Deserialize, Serialize};

pub type Cost = u64;

/// Square cost table for one oriented edge. Rows are indexed by the owning
/// agent's value, columns by the neighbor's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostMatrix {
    size: usize,
    entries: Vec<Cost>,
}

impl CostMatrix {
    pub fn new(size: usize, entries: Vec<Cost>) -> Result<Self> {
        if size == 0 {
            return Err(DcopError::EmptyDomain);
        }
        let expected = size * size;
        if entries.len() != expected {
            return Err(DcopError::MatrixSize {
                size,
                expected,
                actual: entries.len(),
            });
        }
        Ok(Self { size, entries })
    }

    pub fn from_rows(rows: &[Vec<Cost>]) -> Result<Self> {
        let size = rows.len();
        let entries: Vec<Cost> = rows.iter().flatten().copied().collect();
        // Ragged rows still sum to size² sometimes, so check each one
        if let Some(bad) = rows.iter().find(|row| row.len() != size) {
            return Err(DcopError::MatrixSize {
                size,
                expected: size * size,
                actual: bad.len() * size,
            });
        }
        Self::new(size, entries)
    }

    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            entries: vec![0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, own: usize, other: usize) -> Cost {
        self.entries[own * self.size + other]
    }

    pub fn transpose(&self) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len());
        for b in 0..self.size {
            for a in 0..self.size {
                entries.push(self.get(a, b));
            }
        }
        Self {
            size: self.size,
            entries,
        }
    }

    pub fn is_transpose_of(&self, other: &CostMatrix) -> bool {
        if self.size != other.size {
            return false;
        }
        (0..self.size).all(|a| (0..self.size).all(|b| self.get(a, b) == other.get(b, a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_wrong_entry_count() {
        let err = CostMatrix::new(2, vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            DcopError::MatrixSize {
                size: 2,
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(CostMatrix::new(0, vec![]).unwrap_err(), DcopError::EmptyDomain);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(CostMatrix::from_rows(&[vec![1, 2], vec![3]]).is_err());
        let m = CostMatrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(m.get(0, 1), 2);
        assert_eq!(m.get(1, 0), 3);
    }

    proptest! {
        #[test]
        fn transpose_is_symmetric(size in 1usize..6, seed in proptest::collection::vec(0u64..100, 36)) {
            let entries: Vec<Cost> = seed.into_iter().take(size * size).collect();
            let m = CostMatrix::new(size, entries).unwrap();
            let t = m.transpose();
            prop_assert!(t.is_transpose_of(&m));
            prop_assert!(m.is_transpose_of(&t));
            for a in 0..size {
                for b in 0..size {
                    prop_assert_eq!(m.get(a, b), t.get(b, a));
                }
            }
            prop_assert_eq!(t.transpose(), m);
        }
    }
}
