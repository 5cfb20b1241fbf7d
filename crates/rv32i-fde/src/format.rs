//! Encoding-format classification.

use core::fmt;

/// Instruction encoding shape, derived from the major opcode alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionFormat {
    Undefined,
    R,
    I,
    S,
    B,
    U,
    J,
    Other,
}

impl InstructionFormat {
    /// Formats whose bits 11:7 name a destination register.
    pub fn writes_rd(self) -> bool {
        matches!(
            self,
            InstructionFormat::R
                | InstructionFormat::I
                | InstructionFormat::U
                | InstructionFormat::J
        )
    }
}

impl fmt::Display for InstructionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstructionFormat::Undefined => "undefined",
            InstructionFormat::R => "R",
            InstructionFormat::I => "I",
            InstructionFormat::S => "S",
            InstructionFormat::B => "B",
            InstructionFormat::U => "U",
            InstructionFormat::J => "J",
            InstructionFormat::Other => "other",
        };
        f.write_str(name)
    }
}

use InstructionFormat::{Other as X, B, I, J, R, S, U};

/// Rows are `opcode >> 3`, columns are `opcode & 0b111`.
const FORMAT_TABLE: [[InstructionFormat; 8]; 4] = [
    [I, X, X, X, I, U, X, X],
    [S, X, X, X, R, U, X, X],
    [X, X, X, X, X, X, X, X],
    [B, I, X, J, X, X, X, X],
];

/// Classify a 5-bit major opcode.
///
/// Values that do not fit in five bits are `Undefined`.
pub fn classify(opcode: u8) -> InstructionFormat {
    let group = (opcode >> 3) as usize;
    let sub = (opcode & 0b111) as usize;
    FORMAT_TABLE
        .get(group)
        .map_or(InstructionFormat::Undefined, |row| row[sub])
}
