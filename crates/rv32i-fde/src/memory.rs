//! Instruction memory for the RV32I core.

use alloc::{vec, vec::Vec};

use crate::error::EmulatorError;

/// Words addressable by a 16-bit program counter.
pub const WORD_COUNT: usize = 1 << 16;

/// Word-addressed, read-only view of instruction memory.
pub trait MemoryPort {
    /// Fetch the instruction word at word address `address`.
    fn read_word(&self, address: u16) -> u32;
}

/// Reads past the end of the slice return 0.
impl MemoryPort for [u32] {
    fn read_word(&self, address: u16) -> u32 {
        self.get(address as usize).copied().unwrap_or(0)
    }
}

impl MemoryPort for Vec<u32> {
    fn read_word(&self, address: u16) -> u32 {
        self.as_slice().read_word(address)
    }
}

impl<M: MemoryPort + ?Sized> MemoryPort for &M {
    fn read_word(&self, address: u16) -> u32 {
        (**self).read_word(address)
    }
}

/// Full 2^16-word instruction memory, zero-initialised.
#[derive(Clone, PartialEq, Eq)]
pub struct InstructionMemory {
    words: Vec<u32>,
}

impl InstructionMemory {
    pub fn new() -> Self {
        Self {
            words: vec![0; WORD_COUNT],
        }
    }

    /// Memory with `words` loaded from address 0.
    pub fn from_words(words: &[u32]) -> Result<Self, EmulatorError> {
        let mut memory = Self::new();
        memory.load(0, words)?;
        Ok(memory)
    }

    /// Memory from little-endian code bytes. A trailing partial word is
    /// zero-padded.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, EmulatorError> {
        let words: Vec<u32> = bytes
            .chunks(4)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word[..chunk.len()].copy_from_slice(chunk);
                u32::from_le_bytes(word)
            })
            .collect();
        Self::from_words(&words)
    }

    /// Copy `words` in starting at word address `offset`.
    pub fn load(&mut self, offset: u16, words: &[u32]) -> Result<(), EmulatorError> {
        let start = offset as usize;
        let end = start + words.len();
        if end > WORD_COUNT {
            return Err(EmulatorError::ImageTooLarge {
                offset: start,
                words: words.len(),
                capacity: WORD_COUNT,
            });
        }
        self.words[start..end].copy_from_slice(words);
        Ok(())
    }

    pub fn write_word(&mut self, address: u16, word: u32) {
        self.words[address as usize] = word;
    }

    /// All 2^16 words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

impl Default for InstructionMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPort for InstructionMemory {
    fn read_word(&self, address: u16) -> u32 {
        self.words[address as usize]
    }
}

impl core::fmt::Debug for InstructionMemory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let used = self.words.iter().filter(|word| **word != 0).count();
        f.debug_struct("InstructionMemory")
            .field("words", &WORD_COUNT)
            .field("non_zero", &used)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let memory = InstructionMemory::new();
        assert_eq!(memory.words().len(), WORD_COUNT);
        assert_eq!(memory.read_word(0), 0);
        assert_eq!(memory.read_word(u16::MAX), 0);
    }

    #[test]
    fn test_load_at_offset() {
        let mut memory = InstructionMemory::new();
        memory.load(10, &[1, 2, 3]).unwrap();
        assert_eq!(memory.read_word(9), 0);
        assert_eq!(memory.read_word(10), 1);
        assert_eq!(memory.read_word(12), 3);
    }

    #[test]
    fn test_load_up_to_the_last_word() {
        let mut memory = InstructionMemory::new();
        memory.load(u16::MAX, &[0xabcd]).unwrap();
        assert_eq!(memory.read_word(u16::MAX), 0xabcd);

        let err = memory.load(u16::MAX, &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            EmulatorError::ImageTooLarge {
                offset: WORD_COUNT - 1,
                words: 2,
                capacity: WORD_COUNT,
            }
        );
    }

    #[test]
    fn test_from_le_bytes_pads_partial_word() {
        let memory = InstructionMemory::from_le_bytes(&[0x67, 0x80, 0x00, 0x00, 0x13]).unwrap();
        assert_eq!(memory.read_word(0), 0x8067);
        assert_eq!(memory.read_word(1), 0x13);
    }

    #[test]
    fn test_slice_reads_past_end_are_zero() {
        let words = [7u32, 8];
        assert_eq!(words[..].read_word(1), 8);
        assert_eq!(words[..].read_word(2), 0);
        let words = alloc::vec![5u32];
        assert_eq!(words.read_word(0), 5);
        assert_eq!((&words).read_word(0), 5);
    }
}
