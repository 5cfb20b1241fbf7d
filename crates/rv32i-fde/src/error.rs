//! Error types for the RV32I core.

use alloc::string::String;

/// Errors raised by the core and its loaders.
///
/// Decoding and execution are total; these cover misuse of the core and
/// problems with program images.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmulatorError {
    /// Instruction limit exceeded.
    #[error("instruction limit exceeded: executed {executed} instructions (limit: {limit}) at pc 0x{pc:04x}")]
    InstructionLimitExceeded {
        limit: u64,
        executed: u64,
        pc: u16,
        regs: [i32; 32],
    },

    /// Register index outside 0..=31.
    #[error("invalid register index {index}")]
    InvalidRegister { index: usize },

    /// `step` called on a stopped core.
    #[error("core is stopped at pc 0x{pc:04x}")]
    NotRunning { pc: u16, regs: [i32; 32] },

    /// Program does not fit in the 2^16-word instruction memory.
    #[error("image of {words} words at word offset {offset} exceeds {capacity} words")]
    ImageTooLarge {
        offset: usize,
        words: usize,
        capacity: usize,
    },

    /// Malformed hex image.
    #[error("line {line}: {reason}")]
    ImageParse { line: usize, reason: String },
}

impl EmulatorError {
    /// Word address where the error occurred, if it happened while running.
    pub fn pc(&self) -> Option<u16> {
        match self {
            EmulatorError::InstructionLimitExceeded { pc, .. }
            | EmulatorError::NotRunning { pc, .. } => Some(*pc),
            EmulatorError::InvalidRegister { .. }
            | EmulatorError::ImageTooLarge { .. }
            | EmulatorError::ImageParse { .. } => None,
        }
    }

    /// Get a snapshot of register state at the time of error.
    pub fn regs(&self) -> Option<&[i32; 32]> {
        match self {
            EmulatorError::InstructionLimitExceeded { regs, .. }
            | EmulatorError::NotRunning { regs, .. } => Some(regs),
            EmulatorError::InvalidRegister { .. }
            | EmulatorError::ImageTooLarge { .. }
            | EmulatorError::ImageParse { .. } => None,
        }
    }
}
