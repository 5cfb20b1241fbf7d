//! Field extraction for RV32I instruction words.

use core::fmt;

use rv32i_encoder::Gpr;

use crate::{
    format::{classify, InstructionFormat},
    immediate::build_immediate,
    opcode::Opcode,
};

/// A raw instruction word split into its fields.
///
/// Every field is extracted regardless of format; which ones are meaningful
/// depends on `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub raw: u32,
    pub opcode: Opcode,
    pub rd: Gpr,
    pub func3: u8,
    pub rs1: Gpr,
    pub rs2: Gpr,
    pub func7: u8,
    pub format: InstructionFormat,
    /// Sign-extended immediate, see [`crate::build_immediate`].
    pub imm: i32,
}

/// Decode a 32-bit instruction word. Total: every word decodes.
pub fn decode(raw: u32) -> DecodedInstruction {
    let opcode = Opcode::of(raw);
    let format = classify(opcode.bits());
    DecodedInstruction {
        raw,
        opcode,
        rd: Gpr::from_field(raw >> 7),
        func3: ((raw >> 12) & 0x7) as u8,
        rs1: Gpr::from_field(raw >> 15),
        rs2: Gpr::from_field(raw >> 20),
        func7: ((raw >> 25) & 0x7f) as u8,
        format,
        imm: build_immediate(raw, format),
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:08x} {}/{} rd={} rs1={} rs2={} f3={:03b} f7={:07b} imm={}",
            self.raw,
            self.opcode,
            self.format,
            self.rd,
            self.rs1,
            self.rs2,
            self.func3,
            self.func7,
            self.imm
        )
    }
}
