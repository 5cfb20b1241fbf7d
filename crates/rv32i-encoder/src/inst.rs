//! Structured RV32I instruction representation.

use crate::encode;
use crate::regs::Gpr;

/// A single RV32I instruction with its operands.
///
/// Branch and jump offsets are byte offsets relative to the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    // Register-register
    Add { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Sub { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Sll { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Slt { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Sltu { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Xor { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Srl { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Sra { rd: Gpr, rs1: Gpr, rs2: Gpr },
    Or { rd: Gpr, rs1: Gpr, rs2: Gpr },
    And { rd: Gpr, rs1: Gpr, rs2: Gpr },

    // Register-immediate
    Addi { rd: Gpr, rs1: Gpr, imm: i32 },
    Slti { rd: Gpr, rs1: Gpr, imm: i32 },
    Sltiu { rd: Gpr, rs1: Gpr, imm: i32 },
    Xori { rd: Gpr, rs1: Gpr, imm: i32 },
    Ori { rd: Gpr, rs1: Gpr, imm: i32 },
    Andi { rd: Gpr, rs1: Gpr, imm: i32 },
    Slli { rd: Gpr, rs1: Gpr, shamt: u8 },
    Srli { rd: Gpr, rs1: Gpr, shamt: u8 },
    Srai { rd: Gpr, rs1: Gpr, shamt: u8 },

    // Load/Store
    Lb { rd: Gpr, rs1: Gpr, imm: i32 },
    Lh { rd: Gpr, rs1: Gpr, imm: i32 },
    Lw { rd: Gpr, rs1: Gpr, imm: i32 },
    Lbu { rd: Gpr, rs1: Gpr, imm: i32 },
    Lhu { rd: Gpr, rs1: Gpr, imm: i32 },
    Sb { rs1: Gpr, rs2: Gpr, imm: i32 },
    Sh { rs1: Gpr, rs2: Gpr, imm: i32 },
    Sw { rs1: Gpr, rs2: Gpr, imm: i32 },

    // Control flow
    Beq { rs1: Gpr, rs2: Gpr, offset: i32 },
    Bne { rs1: Gpr, rs2: Gpr, offset: i32 },
    Blt { rs1: Gpr, rs2: Gpr, offset: i32 },
    Bge { rs1: Gpr, rs2: Gpr, offset: i32 },
    Bltu { rs1: Gpr, rs2: Gpr, offset: i32 },
    Bgeu { rs1: Gpr, rs2: Gpr, offset: i32 },
    Jal { rd: Gpr, offset: i32 },
    Jalr { rd: Gpr, rs1: Gpr, imm: i32 },

    // Upper immediates
    Lui { rd: Gpr, imm: i32 },
    Auipc { rd: Gpr, imm: i32 },

    // System
    Fence,
    Ecall,
    Ebreak,

    /// Raw data word (`.word`).
    Word(u32),
}

impl Inst {
    /// Encode this instruction into its 32-bit word.
    pub fn encode(&self) -> u32 {
        match *self {
            Inst::Add { rd, rs1, rs2 } => encode::add(rd, rs1, rs2),
            Inst::Sub { rd, rs1, rs2 } => encode::sub(rd, rs1, rs2),
            Inst::Sll { rd, rs1, rs2 } => encode::sll(rd, rs1, rs2),
            Inst::Slt { rd, rs1, rs2 } => encode::slt(rd, rs1, rs2),
            Inst::Sltu { rd, rs1, rs2 } => encode::sltu(rd, rs1, rs2),
            Inst::Xor { rd, rs1, rs2 } => encode::xor(rd, rs1, rs2),
            Inst::Srl { rd, rs1, rs2 } => encode::srl(rd, rs1, rs2),
            Inst::Sra { rd, rs1, rs2 } => encode::sra(rd, rs1, rs2),
            Inst::Or { rd, rs1, rs2 } => encode::or(rd, rs1, rs2),
            Inst::And { rd, rs1, rs2 } => encode::and(rd, rs1, rs2),
            Inst::Addi { rd, rs1, imm } => encode::addi(rd, rs1, imm),
            Inst::Slti { rd, rs1, imm } => encode::slti(rd, rs1, imm),
            Inst::Sltiu { rd, rs1, imm } => encode::sltiu(rd, rs1, imm),
            Inst::Xori { rd, rs1, imm } => encode::xori(rd, rs1, imm),
            Inst::Ori { rd, rs1, imm } => encode::ori(rd, rs1, imm),
            Inst::Andi { rd, rs1, imm } => encode::andi(rd, rs1, imm),
            Inst::Slli { rd, rs1, shamt } => encode::slli(rd, rs1, shamt),
            Inst::Srli { rd, rs1, shamt } => encode::srli(rd, rs1, shamt),
            Inst::Srai { rd, rs1, shamt } => encode::srai(rd, rs1, shamt),
            Inst::Lb { rd, rs1, imm } => encode::lb(rd, rs1, imm),
            Inst::Lh { rd, rs1, imm } => encode::lh(rd, rs1, imm),
            Inst::Lw { rd, rs1, imm } => encode::lw(rd, rs1, imm),
            Inst::Lbu { rd, rs1, imm } => encode::lbu(rd, rs1, imm),
            Inst::Lhu { rd, rs1, imm } => encode::lhu(rd, rs1, imm),
            Inst::Sb { rs1, rs2, imm } => encode::sb(rs1, rs2, imm),
            Inst::Sh { rs1, rs2, imm } => encode::sh(rs1, rs2, imm),
            Inst::Sw { rs1, rs2, imm } => encode::sw(rs1, rs2, imm),
            Inst::Beq { rs1, rs2, offset } => encode::beq(rs1, rs2, offset),
            Inst::Bne { rs1, rs2, offset } => encode::bne(rs1, rs2, offset),
            Inst::Blt { rs1, rs2, offset } => encode::blt(rs1, rs2, offset),
            Inst::Bge { rs1, rs2, offset } => encode::bge(rs1, rs2, offset),
            Inst::Bltu { rs1, rs2, offset } => encode::bltu(rs1, rs2, offset),
            Inst::Bgeu { rs1, rs2, offset } => encode::bgeu(rs1, rs2, offset),
            Inst::Jal { rd, offset } => encode::jal(rd, offset),
            Inst::Jalr { rd, rs1, imm } => encode::jalr(rd, rs1, imm),
            Inst::Lui { rd, imm } => encode::lui(rd, imm),
            Inst::Auipc { rd, imm } => encode::auipc(rd, imm),
            Inst::Fence => encode::fence(),
            Inst::Ecall => encode::ecall(),
            Inst::Ebreak => encode::ebreak(),
            Inst::Word(word) => word,
        }
    }
}
