//! Major opcode enumeration.

use core::fmt;

/// `addi x0, x0, 0`.
pub const NOP: u32 = rv32i_encoder::NOP_WORD;

/// `jalr x0, 0(x1)`, the halt sentinel.
pub const RET: u32 = rv32i_encoder::RET_WORD;

/// The 5-bit major opcode (bits 6:2 of an instruction word).
///
/// Every 5-bit value has a variant, so conversion from bits is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Load = 0b00_000,
    LoadFp = 0b00_001,
    Custom0 = 0b00_010,
    MiscMem = 0b00_011,
    OpImm = 0b00_100,
    Auipc = 0b00_101,
    OpImm32 = 0b00_110,
    Rv48a = 0b00_111,

    Store = 0b01_000,
    StoreFp = 0b01_001,
    Custom1 = 0b01_010,
    Amo = 0b01_011,
    Op = 0b01_100,
    Lui = 0b01_101,
    Op32 = 0b01_110,
    Rv64 = 0b01_111,

    Madd = 0b10_000,
    Msub = 0b10_001,
    Nmsub = 0b10_010,
    Nmadd = 0b10_011,
    OpFp = 0b10_100,
    Reserved0 = 0b10_101,
    Custom2 = 0b10_110,
    Rv48b = 0b10_111,

    Branch = 0b11_000,
    Jalr = 0b11_001,
    Reserved1 = 0b11_010,
    Jal = 0b11_011,
    System = 0b11_100,
    Reserved2 = 0b11_101,
    Custom3 = 0b11_110,
    Rv80 = 0b11_111,
}

const ALL: [Opcode; 32] = [
    Opcode::Load,
    Opcode::LoadFp,
    Opcode::Custom0,
    Opcode::MiscMem,
    Opcode::OpImm,
    Opcode::Auipc,
    Opcode::OpImm32,
    Opcode::Rv48a,
    Opcode::Store,
    Opcode::StoreFp,
    Opcode::Custom1,
    Opcode::Amo,
    Opcode::Op,
    Opcode::Lui,
    Opcode::Op32,
    Opcode::Rv64,
    Opcode::Madd,
    Opcode::Msub,
    Opcode::Nmsub,
    Opcode::Nmadd,
    Opcode::OpFp,
    Opcode::Reserved0,
    Opcode::Custom2,
    Opcode::Rv48b,
    Opcode::Branch,
    Opcode::Jalr,
    Opcode::Reserved1,
    Opcode::Jal,
    Opcode::System,
    Opcode::Reserved2,
    Opcode::Custom3,
    Opcode::Rv80,
];

impl Opcode {
    /// Opcode for the low five bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        ALL[(bits & 0x1f) as usize]
    }

    /// Opcode of a raw instruction word. Bits 1:0 are not inspected.
    pub const fn of(raw: u32) -> Self {
        Self::from_bits((raw >> 2) as u8)
    }

    /// The 5-bit encoding.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// All 32 opcodes in encoding order.
    pub fn all() -> impl Iterator<Item = Opcode> {
        ALL.into_iter()
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::LoadFp => "LOAD_FP",
            Opcode::Custom0 => "CUSTOM_0",
            Opcode::MiscMem => "MISC_MEM",
            Opcode::OpImm => "OP_IMM",
            Opcode::Auipc => "AUIPC",
            Opcode::OpImm32 => "OP_IMM_32",
            Opcode::Rv48a => "RV48_0",
            Opcode::Store => "STORE",
            Opcode::StoreFp => "STORE_FP",
            Opcode::Custom1 => "CUSTOM_1",
            Opcode::Amo => "AMO",
            Opcode::Op => "OP",
            Opcode::Lui => "LUI",
            Opcode::Op32 => "OP_32",
            Opcode::Rv64 => "RV64",
            Opcode::Madd => "MADD",
            Opcode::Msub => "MSUB",
            Opcode::Nmsub => "NMSUB",
            Opcode::Nmadd => "NMADD",
            Opcode::OpFp => "OP_FP",
            Opcode::Reserved0 => "RESERVED_0",
            Opcode::Custom2 => "CUSTOM_2",
            Opcode::Rv48b => "RV48_1",
            Opcode::Branch => "BRANCH",
            Opcode::Jalr => "JALR",
            Opcode::Reserved1 => "RESERVED_1",
            Opcode::Jal => "JAL",
            Opcode::System => "SYSTEM",
            Opcode::Reserved2 => "RESERVED_2",
            Opcode::Custom3 => "CUSTOM_3",
            Opcode::Rv80 => "RV80",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
