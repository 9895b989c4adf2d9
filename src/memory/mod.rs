//! Memory model for the Intcode machine
//!
//! Memory is an unbounded map from non-negative address to `i64`. Any address that
//! has never been written reads as zero.
//!
//! # Layout
//!
//! Programs touch a dense prefix (the program image, scratch space, the region the
//! relative base walks over) and occasionally a far-away address. The store is
//! therefore split in two:
//!
//! ```text
//!   0 ........ dense.len()  ........ DENSE_MEMORY_LIMIT ........ ∞
//!   └── Vec<i64>, grows on write ──┘   └── FxHashMap<usize, i64> ──┘
//! ```
//!
//! Which half holds a cell is invisible to callers: [`Memory::get`] and
//! [`Memory::set`] behave like a single zero-default map, and equality compares
//! logical contents only.

use crate::interpreter::constants::DENSE_MEMORY_LIMIT;
use rustc_hash::FxHashMap;

/// Zero-default, write-growable machine memory
#[derive(Debug, Clone, Default)]
pub struct Memory {
    dense: Vec<i64>,
    sparse: FxHashMap<usize, i64>,
    /// One past the highest address ever populated
    extent: usize,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory holding `program` at addresses `0..program.len()`
    pub fn from_program(program: &[i64]) -> Self {
        Memory {
            dense: program.to_vec(),
            sparse: FxHashMap::default(),
            extent: program.len(),
        }
    }

    /// Read a cell (unwritten cells are zero)
    pub fn get(&self, address: usize) -> i64 {
        if let Some(value) = self.dense.get(address) {
            *value
        } else if address < DENSE_MEMORY_LIMIT {
            0
        } else {
            self.sparse.get(&address).copied().unwrap_or(0)
        }
    }

    /// Write a cell, growing memory as needed
    pub fn set(&mut self, address: usize, value: i64) {
        if address < self.dense.len() {
            self.dense[address] = value;
        } else if address < DENSE_MEMORY_LIMIT {
            self.dense.resize(address + 1, 0);
            self.dense[address] = value;
        } else {
            self.sparse.insert(address, value);
        }
        self.extent = self.extent.max(address.saturating_add(1));
    }

    /// One past the highest address that was loaded or written.
    ///
    /// The machine halts when its program counter reaches this bound.
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Number of cells physically backed by storage
    pub fn len_written(&self) -> usize {
        self.dense.len() + self.sparse.len()
    }

    /// Non-zero cells in ascending address order
    pub fn cells(&self) -> Vec<(usize, i64)> {
        let mut cells: Vec<(usize, i64)> = self
            .dense
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0)
            .map(|(address, value)| (address, *value))
            .collect();

        let mut far: Vec<(usize, i64)> = self
            .sparse
            .iter()
            .filter(|(_, value)| **value != 0)
            .map(|(address, value)| (*address, *value))
            .collect();
        far.sort_unstable_by_key(|(address, _)| *address);

        cells.extend(far);
        cells
    }

    /// Copy of `len` consecutive cells starting at `start`
    pub fn slice(&self, start: usize, len: usize) -> Vec<i64> {
        (start..start.saturating_add(len))
            .map(|address| self.get(address))
            .collect()
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.cells() == other.cells()
    }
}

impl Eq for Memory {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_reads_zero() {
        let memory = Memory::from_program(&[1, 2, 3]);
        assert_eq!(memory.get(2), 3);
        assert_eq!(memory.get(3), 0);
        assert_eq!(memory.get(DENSE_MEMORY_LIMIT * 4), 0);
        assert_eq!(memory.extent(), 3);
    }

    #[test]
    fn test_write_growth() {
        let mut memory = Memory::from_program(&[99]);
        memory.set(1000, 7);
        assert_eq!(memory.get(1000), 7);
        assert_eq!(memory.get(999), 0);
        assert_eq!(memory.extent(), 1001);

        let far = DENSE_MEMORY_LIMIT + 12;
        memory.set(far, -5);
        assert_eq!(memory.get(far), -5);
        assert_eq!(memory.extent(), far + 1);
        // The far write must not have materialised the gap
        assert!(memory.len_written() < 2000);
    }

    #[test]
    fn test_write_at_highest_address() {
        let mut memory = Memory::from_program(&[99]);
        memory.set(usize::MAX, 1);
        assert_eq!(memory.get(usize::MAX), 1);
        assert_eq!(memory.extent(), usize::MAX);
        assert_eq!(memory.cells(), vec![(0, 99), (usize::MAX, 1)]);
    }

    #[test]
    fn test_cells_are_ordered_and_skip_zero() {
        let mut memory = Memory::from_program(&[0, 4, 0]);
        memory.set(DENSE_MEMORY_LIMIT + 1, 9);
        memory.set(DENSE_MEMORY_LIMIT, 8);
        memory.set(10, 0);

        assert_eq!(
            memory.cells(),
            vec![(1, 4), (DENSE_MEMORY_LIMIT, 8), (DENSE_MEMORY_LIMIT + 1, 9)]
        );
    }

    #[test]
    fn test_equality_ignores_explicit_zeros() {
        let mut a = Memory::from_program(&[1, 2]);
        let b = Memory::from_program(&[1, 2]);
        a.set(50, 0);
        assert_eq!(a, b);

        a.set(50, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_slice() {
        let memory = Memory::from_program(&[5, 6, 7]);
        assert_eq!(memory.slice(1, 4), vec![6, 7, 0, 0]);
    }
}
