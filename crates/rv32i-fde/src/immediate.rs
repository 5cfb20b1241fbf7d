//! Immediate reassembly.
//!
//! RV32I scatters immediate bits across the word. Each format picks a subset
//! of the groups below and concatenates them with bit 31 on top, then the
//! result is sign-extended from 12 bits (I/S/B) or 20 bits (U/J).
//!
//! B and J immediates come out pre-halved: the always-zero low bit of the
//! byte offset is not encoded, so the stored value is `byte_offset / 2`.
//! U immediates are the raw upper 20 bits; the `<< 12` happens at execute.

use crate::format::InstructionFormat;

/// Bit groups of a raw instruction word that carry immediate bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImmediateFields {
    pub bit31: u32,
    pub bits30_25: u32,
    pub bits24_21: u32,
    pub bit20: u32,
    pub bits19_12: u32,
    pub bits11_8: u32,
    pub bit7: u32,
}

impl ImmediateFields {
    pub fn from_raw(raw: u32) -> Self {
        Self {
            bit31: (raw >> 31) & 0x1,
            bits30_25: (raw >> 25) & 0x3f,
            bits24_21: (raw >> 21) & 0xf,
            bit20: (raw >> 20) & 0x1,
            bits19_12: (raw >> 12) & 0xff,
            bits11_8: (raw >> 8) & 0xf,
            bit7: (raw >> 7) & 0x1,
        }
    }

    /// Reassemble the immediate for `format`. Formats without one yield 0.
    pub fn assemble(&self, format: InstructionFormat) -> i32 {
        let f = self;
        match format {
            InstructionFormat::I => sign_extend(
                f.bit31 << 11 | f.bits30_25 << 5 | f.bits24_21 << 1 | f.bit20,
                12,
            ),
            InstructionFormat::S => sign_extend(
                f.bit31 << 11 | f.bits30_25 << 5 | f.bits11_8 << 1 | f.bit7,
                12,
            ),
            InstructionFormat::B => sign_extend(
                f.bit31 << 11 | f.bit7 << 10 | f.bits30_25 << 4 | f.bits11_8,
                12,
            ),
            InstructionFormat::U => sign_extend(
                f.bit31 << 19 | f.bits30_25 << 13 | f.bits24_21 << 9 | f.bit20 << 8 | f.bits19_12,
                20,
            ),
            InstructionFormat::J => sign_extend(
                f.bit31 << 19 | f.bits19_12 << 11 | f.bit20 << 10 | f.bits30_25 << 4 | f.bits24_21,
                20,
            ),
            InstructionFormat::R | InstructionFormat::Other | InstructionFormat::Undefined => 0,
        }
    }
}

/// Build the sign-extended immediate of `raw` for `format`.
pub fn build_immediate(raw: u32, format: InstructionFormat) -> i32 {
    ImmediateFields::from_raw(raw).assemble(format)
}

/// Sign-extend the low `width` bits of `value` (1..=32).
pub fn sign_extend(value: u32, width: u32) -> i32 {
    debug_assert!((1..=32).contains(&width));
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}
