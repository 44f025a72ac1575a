//! DCPU-16 memory subsystem.
//!
//! A single flat array of 0x10000 words. Every 16-bit value is a valid
//! address, so reads and writes cannot fail. Deserialization rejects any
//! other length.

use crate::cpu::Word;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::warn;

/// The number of words in memory.
pub const MEMORY_SIZE: usize = 0x10000;

/// DCPU-16 memory: 65536 sixteen-bit words.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMemory")]
pub struct Memory {
    cells: Vec<Word>,
}

/// Serialized memory before its length is checked.
#[derive(Deserialize)]
struct RawMemory {
    cells: Vec<Word>,
}

/// A serialized memory did not hold exactly [`MEMORY_SIZE`] words.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("memory must hold 65536 words, got {0}")]
pub struct MemorySizeError(pub usize);

impl TryFrom<RawMemory> for Memory {
    type Error = MemorySizeError;

    fn try_from(raw: RawMemory) -> Result<Self, Self::Error> {
        if raw.cells.len() != MEMORY_SIZE {
            return Err(MemorySizeError(raw.cells.len()));
        }
        Ok(Self { cells: raw.cells })
    }
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell.
    #[inline]
    pub fn read(&self, addr: Word) -> Word {
        self.cells[usize::from(addr)]
    }

    /// Write a cell.
    #[inline]
    pub fn write(&mut self, addr: Word, value: Word) {
        self.cells[usize::from(addr)] = value;
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy a program image into memory starting at address 0.
    ///
    /// Images longer than memory are truncated to [`MEMORY_SIZE`] words.
    /// Returns the number of words copied.
    pub fn load(&mut self, image: &[Word]) -> usize {
        let count = image.len().min(MEMORY_SIZE);
        if count < image.len() {
            warn!(
                size = image.len(),
                kept = count,
                "program image larger than memory, truncating"
            );
        }
        self.cells[..count].copy_from_slice(&image[..count]);
        count
    }

    /// Dump a range of memory (for debugging).
    /// The range is clipped to the end of memory.
    pub fn dump(&self, start: Word, count: usize) -> Vec<(Word, Word)> {
        let start = usize::from(start);
        let end = (start + count).min(MEMORY_SIZE);
        (start..end)
            .map(|i| (i as Word, self.cells[i]))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();
        mem.write(0x8000, 42);
        assert_eq!(mem.read(0x8000), 42);
        assert_eq!(mem.read(0x7FFF), 0);
    }

    #[test]
    fn test_full_address_range() {
        let mut mem = Memory::new();
        mem.write(0xFFFF, 7);
        mem.write(0x0000, 9);
        assert_eq!(mem.read(0xFFFF), 7);
        assert_eq!(mem.read(0x0000), 9);
    }

    #[test]
    fn test_load_program() {
        let mut mem = Memory::new();
        let copied = mem.load(&[1, 2, 3]);

        assert_eq!(copied, 3);
        assert_eq!(mem.read(0), 1);
        assert_eq!(mem.read(1), 2);
        assert_eq!(mem.read(2), 3);
        assert_eq!(mem.read(3), 0);
    }

    #[test]
    fn test_load_truncates_oversized_image() {
        let mut mem = Memory::new();
        let mut image = vec![0xAAAA; MEMORY_SIZE];
        image.extend_from_slice(&[0xBBBB; 16]);

        let copied = mem.load(&image);

        assert_eq!(copied, MEMORY_SIZE);
        assert_eq!(mem.read(0xFFFF), 0xAAAA);
    }

    #[test]
    fn test_dump_clips_to_memory() {
        let mut mem = Memory::new();
        mem.write(0xFFFE, 5);
        let dump = mem.dump(0xFFFE, 10);
        assert_eq!(dump, vec![(0xFFFE, 5), (0xFFFF, 0)]);
    }

    #[test]
    fn test_deserialize_rejects_short_memory() {
        assert!(serde_json::from_str::<Memory>(r#"{"cells":[]}"#).is_err());
        assert!(serde_json::from_str::<Memory>(r#"{"cells":[1,2,3]}"#).is_err());
    }

    #[test]
    fn test_deserialize_rejects_long_memory() {
        let raw = RawMemory { cells: vec![0; MEMORY_SIZE + 1] };
        let err = Memory::try_from(raw).err();
        assert_eq!(err, Some(MemorySizeError(MEMORY_SIZE + 1)));
    }

    #[test]
    fn test_serde_keeps_contents() {
        let mut mem = Memory::new();
        mem.write(0x1234, 0xBEEF);

        let json = serde_json::to_string(&mem).unwrap();
        let back: Memory = serde_json::from_str(&json).unwrap();

        assert_eq!(back, mem);
    }
}
