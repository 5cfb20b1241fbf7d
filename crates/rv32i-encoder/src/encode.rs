//! Instruction word encoders.
//!
//! The `encode_*` functions place fields into a word for one encoding format.
//! The lowercase mnemonic functions (`addi`, `beq`, ...) build complete RV32I
//! instructions on top of them. Branch and jump offsets are byte offsets, as
//! in assembly; bit 0 of the offset is not encodable and is dropped.

use crate::regs::Gpr;

// 7-bit major opcodes (bits 6:0, low two bits always 0b11).
pub const OPCODE_LOAD: u32 = 0b000_0011;
pub const OPCODE_MISC_MEM: u32 = 0b000_1111;
pub const OPCODE_OP_IMM: u32 = 0b001_0011;
pub const OPCODE_AUIPC: u32 = 0b001_0111;
pub const OPCODE_STORE: u32 = 0b010_0011;
pub const OPCODE_OP: u32 = 0b011_0011;
pub const OPCODE_LUI: u32 = 0b011_0111;
pub const OPCODE_BRANCH: u32 = 0b110_0011;
pub const OPCODE_JALR: u32 = 0b110_0111;
pub const OPCODE_JAL: u32 = 0b110_1111;
pub const OPCODE_SYSTEM: u32 = 0b111_0011;

/// `addi x0, x0, 0`
pub const NOP_WORD: u32 = 0x0000_0013;
/// `jalr x0, 0(x1)`
pub const RET_WORD: u32 = 0x0000_8067;

const FUNCT7_BASE: u32 = 0b000_0000;
const FUNCT7_ALT: u32 = 0b010_0000;

fn reg(r: Gpr) -> u32 {
    r.num() as u32
}

/// Encode an R-type instruction.
pub fn encode_r(opcode: u32, rd: Gpr, funct3: u32, rs1: Gpr, rs2: Gpr, funct7: u32) -> u32 {
    ((funct7 & 0x7f) << 25)
        | (reg(rs2) << 20)
        | (reg(rs1) << 15)
        | ((funct3 & 0x7) << 12)
        | (reg(rd) << 7)
        | (opcode & 0x7f)
}

/// Encode an I-type instruction. Only the low 12 bits of `imm` are kept.
pub fn encode_i(opcode: u32, rd: Gpr, funct3: u32, rs1: Gpr, imm: i32) -> u32 {
    (((imm as u32) & 0xfff) << 20)
        | (reg(rs1) << 15)
        | ((funct3 & 0x7) << 12)
        | (reg(rd) << 7)
        | (opcode & 0x7f)
}

/// Encode an S-type instruction. Only the low 12 bits of `imm` are kept.
pub fn encode_s(opcode: u32, funct3: u32, rs1: Gpr, rs2: Gpr, imm: i32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x7f) << 25)
        | (reg(rs2) << 20)
        | (reg(rs1) << 15)
        | ((funct3 & 0x7) << 12)
        | ((imm & 0x1f) << 7)
        | (opcode & 0x7f)
}

/// Encode a B-type instruction from a 13-bit signed byte offset.
pub fn encode_b(funct3: u32, rs1: Gpr, rs2: Gpr, offset: i32) -> u32 {
    let imm = offset as u32;
    let bit_12 = (imm >> 12) & 0x1;
    let bits_10_5 = (imm >> 5) & 0x3f;
    let bits_4_1 = (imm >> 1) & 0xf;
    let bit_11 = (imm >> 11) & 0x1;
    (bit_12 << 31)
        | (bits_10_5 << 25)
        | (reg(rs2) << 20)
        | (reg(rs1) << 15)
        | ((funct3 & 0x7) << 12)
        | (bits_4_1 << 8)
        | (bit_11 << 7)
        | OPCODE_BRANCH
}

/// Encode a U-type instruction. `imm` is the 20-bit upper immediate
/// (the value that ends up in bits 31:12).
pub fn encode_u(opcode: u32, rd: Gpr, imm: i32) -> u32 {
    (((imm as u32) & 0xfffff) << 12) | (reg(rd) << 7) | (opcode & 0x7f)
}

/// Encode a J-type instruction from a 21-bit signed byte offset.
pub fn encode_j(rd: Gpr, offset: i32) -> u32 {
    let imm = offset as u32;
    let bit_20 = (imm >> 20) & 0x1;
    let bits_10_1 = (imm >> 1) & 0x3ff;
    let bit_11 = (imm >> 11) & 0x1;
    let bits_19_12 = (imm >> 12) & 0xff;
    (bit_20 << 31)
        | (bits_10_1 << 21)
        | (bit_11 << 20)
        | (bits_19_12 << 12)
        | (reg(rd) << 7)
        | OPCODE_JAL
}

// Register-register arithmetic

pub fn add(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b000, rs1, rs2, FUNCT7_BASE)
}

pub fn sub(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b000, rs1, rs2, FUNCT7_ALT)
}

pub fn sll(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b001, rs1, rs2, FUNCT7_BASE)
}

pub fn slt(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b010, rs1, rs2, FUNCT7_BASE)
}

pub fn sltu(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b011, rs1, rs2, FUNCT7_BASE)
}

pub fn xor(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b100, rs1, rs2, FUNCT7_BASE)
}

pub fn srl(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b101, rs1, rs2, FUNCT7_BASE)
}

pub fn sra(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b101, rs1, rs2, FUNCT7_ALT)
}

pub fn or(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b110, rs1, rs2, FUNCT7_BASE)
}

pub fn and(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(OPCODE_OP, rd, 0b111, rs1, rs2, FUNCT7_BASE)
}

// Register-immediate arithmetic

pub fn addi(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b000, rs1, imm)
}

pub fn slti(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b010, rs1, imm)
}

pub fn sltiu(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b011, rs1, imm)
}

pub fn xori(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b100, rs1, imm)
}

pub fn ori(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b110, rs1, imm)
}

pub fn andi(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b111, rs1, imm)
}

pub fn slli(rd: Gpr, rs1: Gpr, shamt: u8) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b001, rs1, (shamt & 0x1f) as i32)
}

pub fn srli(rd: Gpr, rs1: Gpr, shamt: u8) -> u32 {
    encode_i(OPCODE_OP_IMM, rd, 0b101, rs1, (shamt & 0x1f) as i32)
}

pub fn srai(rd: Gpr, rs1: Gpr, shamt: u8) -> u32 {
    encode_i(
        OPCODE_OP_IMM,
        rd,
        0b101,
        rs1,
        ((FUNCT7_ALT << 5) | (shamt & 0x1f) as u32) as i32,
    )
}

// Loads and stores

pub fn lb(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_LOAD, rd, 0b000, rs1, imm)
}

pub fn lh(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_LOAD, rd, 0b001, rs1, imm)
}

pub fn lw(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_LOAD, rd, 0b010, rs1, imm)
}

pub fn lbu(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_LOAD, rd, 0b100, rs1, imm)
}

pub fn lhu(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_LOAD, rd, 0b101, rs1, imm)
}

/// `sb rs2, imm(rs1)`
pub fn sb(rs1: Gpr, rs2: Gpr, imm: i32) -> u32 {
    encode_s(OPCODE_STORE, 0b000, rs1, rs2, imm)
}

/// `sh rs2, imm(rs1)`
pub fn sh(rs1: Gpr, rs2: Gpr, imm: i32) -> u32 {
    encode_s(OPCODE_STORE, 0b001, rs1, rs2, imm)
}

/// `sw rs2, imm(rs1)`
pub fn sw(rs1: Gpr, rs2: Gpr, imm: i32) -> u32 {
    encode_s(OPCODE_STORE, 0b010, rs1, rs2, imm)
}

// Control flow

pub fn beq(rs1: Gpr, rs2: Gpr, offset: i32) -> u32 {
    encode_b(0b000, rs1, rs2, offset)
}

pub fn bne(rs1: Gpr, rs2: Gpr, offset: i32) -> u32 {
    encode_b(0b001, rs1, rs2, offset)
}

pub fn blt(rs1: Gpr, rs2: Gpr, offset: i32) -> u32 {
    encode_b(0b100, rs1, rs2, offset)
}

pub fn bge(rs1: Gpr, rs2: Gpr, offset: i32) -> u32 {
    encode_b(0b101, rs1, rs2, offset)
}

pub fn bltu(rs1: Gpr, rs2: Gpr, offset: i32) -> u32 {
    encode_b(0b110, rs1, rs2, offset)
}

pub fn bgeu(rs1: Gpr, rs2: Gpr, offset: i32) -> u32 {
    encode_b(0b111, rs1, rs2, offset)
}

pub fn jal(rd: Gpr, offset: i32) -> u32 {
    encode_j(rd, offset)
}

pub fn jalr(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(OPCODE_JALR, rd, 0b000, rs1, imm)
}

// Upper immediates

pub fn lui(rd: Gpr, imm: i32) -> u32 {
    encode_u(OPCODE_LUI, rd, imm)
}

pub fn auipc(rd: Gpr, imm: i32) -> u32 {
    encode_u(OPCODE_AUIPC, rd, imm)
}

// System

pub fn ecall() -> u32 {
    0x0000_0073
}

pub fn ebreak() -> u32 {
    0x0010_0073
}

pub fn fence() -> u32 {
    encode_i(OPCODE_MISC_MEM, Gpr::ZERO, 0b000, Gpr::ZERO, 0x0ff)
}

// Pseudo-instructions

pub fn nop() -> u32 {
    addi(Gpr::ZERO, Gpr::ZERO, 0)
}

pub fn ret() -> u32 {
    jalr(Gpr::ZERO, Gpr::RA, 0)
}

pub fn mv(rd: Gpr, rs: Gpr) -> u32 {
    addi(rd, rs, 0)
}

pub fn j(offset: i32) -> u32 {
    jal(Gpr::ZERO, offset)
}
