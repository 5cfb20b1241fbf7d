//! Instruction execution.
//!
//! `execute` is pure: it reads the register file and returns what the
//! instruction produces. The caller applies the write-back and moves the pc.

use rv32i_encoder::Gpr;
use tracing::warn;

use crate::{decoder::DecodedInstruction, opcode::Opcode, registers::RegisterFile};

/// Outcome of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// ALU output, link address or upper immediate. 0 for branches.
    pub result: i32,
    /// Branch predicate. Always false outside BRANCH.
    pub branch_taken: bool,
    /// Word address of the next instruction.
    pub next_pc: u16,
    /// Destination and value to store, if the format has a destination.
    pub write_back: Option<(Gpr, i32)>,
    /// The func3/func7 pair has no RV32I meaning; `result` was forced to 0.
    pub unsupported: bool,
}

const FUNCT7_BASE: u8 = 0b000_0000;
const FUNCT7_ALT: u8 = 0b010_0000;

/// Execute a decoded instruction at word address `pc`.
pub fn execute(inst: &DecodedInstruction, regs: &RegisterFile, pc: u16) -> Execution {
    let rs1 = regs.read(inst.rs1);
    let rs2 = regs.read(inst.rs2);
    let imm = inst.imm;
    let fallthrough = pc.wrapping_add(1);

    let mut branch_taken = false;
    let mut unsupported = false;
    let mut next_pc = fallthrough;

    let result = match inst.opcode {
        Opcode::OpImm | Opcode::Op => {
            let b = if inst.opcode == Opcode::OpImm { imm } else { rs2 };
            alu(inst, rs1, b).unwrap_or_else(|| {
                unsupported = true;
                0
            })
        }
        Opcode::Branch => {
            match branch(inst, rs1, rs2) {
                Some(taken) => branch_taken = taken,
                None => unsupported = true,
            }
            if branch_taken {
                next_pc = relative(pc, imm);
            }
            0
        }
        Opcode::Jal => {
            next_pc = relative(pc, imm);
            link(pc)
        }
        Opcode::Jalr => {
            let target = (rs1.wrapping_add(imm) as u32) & !1;
            next_pc = (target >> 2) as u16;
            link(pc)
        }
        Opcode::Lui => upper(imm),
        Opcode::Auipc => ((pc as u32) << 2).wrapping_add(upper(imm) as u32) as i32,
        // Memory access is not modelled.
        Opcode::Load | Opcode::Store => 0,
        _ => 0,
    };

    let write_back = inst.format.writes_rd().then_some((inst.rd, result));

    Execution {
        result,
        branch_taken,
        next_pc,
        write_back,
        unsupported,
    }
}

/// Byte address of the instruction after `pc`.
fn link(pc: u16) -> i32 {
    ((pc as u32 + 1) << 2) as i32
}

/// `pc` moved by a halved byte offset (B/J immediates).
fn relative(pc: u16, imm: i32) -> u16 {
    pc.wrapping_add((imm >> 1) as u16)
}

fn upper(imm: i32) -> i32 {
    ((imm as u32) << 12) as i32
}

/// Shared OP/OP_IMM dispatch. `b` is rs2 or the immediate.
fn alu(inst: &DecodedInstruction, a: i32, b: i32) -> Option<i32> {
    let immediate = inst.opcode == Opcode::OpImm;
    let shamt = (b & 0x1f) as u32;
    let value = match (inst.func3, inst.func7) {
        (0b000, _) if immediate => a.wrapping_add(b),
        (0b000, FUNCT7_BASE) => a.wrapping_add(b),
        (0b000, FUNCT7_ALT) => a.wrapping_sub(b),
        (0b001, FUNCT7_BASE) => ((a as u32) << shamt) as i32,
        (0b010, _) if immediate => (a < b) as i32,
        (0b010, FUNCT7_BASE) => (a < b) as i32,
        (0b011, _) if immediate => ((a as u32) < (b as u32)) as i32,
        (0b011, FUNCT7_BASE) => ((a as u32) < (b as u32)) as i32,
        (0b100, _) if immediate => a ^ b,
        (0b100, FUNCT7_BASE) => a ^ b,
        (0b101, FUNCT7_BASE) => ((a as u32) >> shamt) as i32,
        (0b101, FUNCT7_ALT) => a >> shamt,
        (0b110, _) if immediate => a | b,
        (0b110, FUNCT7_BASE) => a | b,
        (0b111, _) if immediate => a & b,
        (0b111, FUNCT7_BASE) => a & b,
        (func3, func7) => {
            warn!(
                raw = inst.raw,
                opcode = %inst.opcode,
                func3,
                func7,
                "unsupported func3/func7 combination, result forced to 0"
            );
            return None;
        }
    };
    Some(value)
}

fn branch(inst: &DecodedInstruction, a: i32, b: i32) -> Option<bool> {
    let taken = match inst.func3 {
        0b000 => a == b,
        0b001 => a != b,
        0b100 => a < b,
        0b101 => a >= b,
        0b110 => (a as u32) < (b as u32),
        0b111 => (a as u32) >= (b as u32),
        func3 => {
            warn!(raw = inst.raw, func3, "reserved branch condition, not taken");
            return None;
        }
    };
    Some(taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decoder::decode, opcode::NOP};
    use rv32i_encoder as enc;

    fn exec(word: u32, regs: &RegisterFile, pc: u16) -> Execution {
        execute(&decode(word), regs, pc)
    }

    fn regs_with(values: &[(Gpr, i32)]) -> RegisterFile {
        let mut regs = RegisterFile::new();
        for (reg, value) in values {
            regs.write(*reg, *value);
        }
        regs
    }

    #[test]
    fn test_addi() {
        let e = exec(enc::addi(Gpr::RA, Gpr::ZERO, 5), &RegisterFile::new(), 10);
        assert_eq!(e.result, 5);
        assert_eq!(e.next_pc, 11);
        assert_eq!(e.write_back, Some((Gpr::RA, 5)));
        assert!(!e.branch_taken);
        assert!(!e.unsupported);
    }

    #[test]
    fn test_nop_targets_x0() {
        let e = exec(NOP, &RegisterFile::new(), 0);
        assert_eq!(e.write_back, Some((Gpr::ZERO, 0)));
        assert_eq!(e.next_pc, 1);
    }

    #[test]
    fn test_op_imm_compare_and_logic() {
        let regs = regs_with(&[(Gpr::A0, -3)]);
        assert_eq!(exec(enc::slti(Gpr::A1, Gpr::A0, 0), &regs, 0).result, 1);
        // -3 is huge when unsigned
        assert_eq!(exec(enc::sltiu(Gpr::A1, Gpr::A0, 5), &regs, 0).result, 0);
        // sign-extended -1 is the largest unsigned value
        assert_eq!(exec(enc::sltiu(Gpr::A1, Gpr::A0, -1), &regs, 0).result, 1);
        assert_eq!(exec(enc::xori(Gpr::A1, Gpr::A0, -1), &regs, 0).result, 2);
        assert_eq!(exec(enc::ori(Gpr::A1, Gpr::A0, 0x10), &regs, 0).result, -3);
        assert_eq!(exec(enc::andi(Gpr::A1, Gpr::A0, 0xff), &regs, 0).result, 0xfd);
    }

    #[test]
    fn test_op_imm_shifts() {
        let regs = regs_with(&[(Gpr::A0, -16)]);
        assert_eq!(exec(enc::slli(Gpr::A1, Gpr::A0, 2), &regs, 0).result, -64);
        assert_eq!(
            exec(enc::srli(Gpr::A1, Gpr::A0, 28), &regs, 0).result,
            0xf
        );
        assert_eq!(exec(enc::srai(Gpr::A1, Gpr::A0, 2), &regs, 0).result, -4);
    }

    #[test]
    fn test_op_register_register() {
        let regs = regs_with(&[(Gpr::A0, 20), (Gpr::A1, 7), (Gpr::A2, -1), (Gpr::A3, 33)]);
        assert_eq!(exec(enc::add(Gpr::T0, Gpr::A0, Gpr::A1), &regs, 0).result, 27);
        assert_eq!(exec(enc::sub(Gpr::T0, Gpr::A0, Gpr::A1), &regs, 0).result, 13);
        // shift amount uses the low five bits of rs2
        assert_eq!(exec(enc::sll(Gpr::T0, Gpr::A1, Gpr::A3), &regs, 0).result, 14);
        assert_eq!(exec(enc::slt(Gpr::T0, Gpr::A2, Gpr::A1), &regs, 0).result, 1);
        assert_eq!(exec(enc::sltu(Gpr::T0, Gpr::A2, Gpr::A1), &regs, 0).result, 0);
        assert_eq!(exec(enc::xor(Gpr::T0, Gpr::A0, Gpr::A1), &regs, 0).result, 20 ^ 7);
        assert_eq!(exec(enc::srl(Gpr::T0, Gpr::A2, Gpr::A3), &regs, 0).result, 0x7fff_ffff);
        assert_eq!(exec(enc::sra(Gpr::T0, Gpr::A2, Gpr::A3), &regs, 0).result, -1);
        assert_eq!(exec(enc::or(Gpr::T0, Gpr::A0, Gpr::A1), &regs, 0).result, 23);
        assert_eq!(exec(enc::and(Gpr::T0, Gpr::A0, Gpr::A1), &regs, 0).result, 4);
    }

    #[test]
    fn test_add_wraps() {
        let regs = regs_with(&[(Gpr::A0, i32::MAX), (Gpr::A1, 1)]);
        assert_eq!(exec(enc::add(Gpr::T0, Gpr::A0, Gpr::A1), &regs, 0).result, i32::MIN);
    }

    #[test]
    fn test_unsupported_funct7_yields_zero() {
        // add with funct7 = 0000001 (an M-extension mul)
        let word = enc::encode_r(enc::OPCODE_OP, Gpr::A0, 0b000, Gpr::A1, Gpr::A2, 0b000_0001);
        let regs = regs_with(&[(Gpr::A1, 6), (Gpr::A2, 7)]);
        let e = exec(word, &regs, 3);
        assert_eq!(e.result, 0);
        assert_eq!(e.next_pc, 4);
        assert_eq!(e.write_back, Some((Gpr::A0, 0)));
        assert!(e.unsupported);

        // slli with a non-zero funct7
        let word = enc::encode_i(enc::OPCODE_OP_IMM, Gpr::A0, 0b001, Gpr::A1, 0x401);
        assert_eq!(exec(word, &regs, 0).result, 0);
    }

    #[test]
    fn test_branches() {
        let regs = regs_with(&[(Gpr::A0, -1), (Gpr::A1, 1)]);
        let cases = [
            (enc::beq(Gpr::A0, Gpr::A1, 8), false),
            (enc::bne(Gpr::A0, Gpr::A1, 8), true),
            (enc::blt(Gpr::A0, Gpr::A1, 8), true),
            (enc::bge(Gpr::A0, Gpr::A1, 8), false),
            (enc::bltu(Gpr::A0, Gpr::A1, 8), false),
            (enc::bgeu(Gpr::A0, Gpr::A1, 8), true),
        ];
        for (word, taken) in cases {
            let e = exec(word, &regs, 100);
            assert_eq!(e.branch_taken, taken, "word 0x{:08x}", word);
            assert_eq!(e.next_pc, if taken { 102 } else { 101 });
            assert_eq!(e.write_back, None);
            assert_eq!(e.result, 0);
        }
    }

    #[test]
    fn test_backward_branch() {
        let e = exec(enc::beq(Gpr::ZERO, Gpr::ZERO, -8), &RegisterFile::new(), 10);
        assert!(e.branch_taken);
        assert_eq!(e.next_pc, 8);
    }

    #[test]
    fn test_reserved_branch_condition_not_taken() {
        let word = enc::encode_b(0b010, Gpr::ZERO, Gpr::ZERO, 8);
        let e = exec(word, &RegisterFile::new(), 0);
        assert!(!e.branch_taken);
        assert!(e.unsupported);
        assert_eq!(e.next_pc, 1);
    }

    #[test]
    fn test_jal_links_byte_address() {
        let e = exec(enc::jal(Gpr::RA, 0), &RegisterFile::new(), 7);
        assert_eq!(e.write_back, Some((Gpr::RA, 32)));
        assert_eq!(e.next_pc, 7);

        let e = exec(enc::jal(Gpr::RA, -12), &RegisterFile::new(), 7);
        assert_eq!(e.next_pc, 4);
    }

    #[test]
    fn test_jalr_masks_and_converts_to_words() {
        let regs = regs_with(&[(Gpr::T0, 0x101)]);
        let e = exec(enc::jalr(Gpr::RA, Gpr::T0, 3), &regs, 2);
        assert_eq!(e.next_pc, 0x104 >> 2);
        assert_eq!(e.write_back, Some((Gpr::RA, 12)));
    }

    #[test]
    fn test_ret_with_zero_ra_returns_to_zero() {
        let e = exec(crate::opcode::RET, &RegisterFile::new(), 40);
        assert_eq!(e.next_pc, 0);
        assert_eq!(e.write_back, Some((Gpr::ZERO, 164)));
    }

    #[test]
    fn test_lui_and_auipc() {
        let e = exec(enc::lui(Gpr::SP, 0x12345), &RegisterFile::new(), 0);
        assert_eq!(e.write_back, Some((Gpr::SP, 0x1234_5000)));

        let e = exec(enc::lui(Gpr::SP, 0x80000), &RegisterFile::new(), 0);
        assert_eq!(e.result, i32::MIN);

        let e = exec(enc::auipc(Gpr::A0, 1), &RegisterFile::new(), 3);
        assert_eq!(e.result, 0x1000 + 12);
    }

    #[test]
    fn test_load_store_are_stubbed() {
        let regs = regs_with(&[(Gpr::SP, 0x100), (Gpr::A0, 9)]);
        let e = exec(enc::lw(Gpr::A1, Gpr::SP, 4), &regs, 0);
        assert_eq!(e.write_back, Some((Gpr::A1, 0)));
        assert_eq!(e.next_pc, 1);

        let e = exec(enc::sw(Gpr::SP, Gpr::A0, 4), &regs, 0);
        assert_eq!(e.write_back, None);
        assert_eq!(e.next_pc, 1);
    }

    #[test]
    fn test_system_is_a_no_op() {
        let e = exec(enc::ecall(), &RegisterFile::new(), 5);
        assert_eq!(e.result, 0);
        assert_eq!(e.write_back, None);
        assert_eq!(e.next_pc, 6);
    }

    #[test]
    fn test_other_format_leaves_rd_untouched() {
        // csrrs a0, mstatus, x0 and an OP_32 addw a0, a1, a2
        let regs = regs_with(&[(Gpr::A0, 42), (Gpr::A1, 1), (Gpr::A2, 2)]);
        for word in [0x3000_2573, 0x00c5_853b] {
            let e = exec(word, &regs, 0);
            assert_eq!(decode(word).rd, Gpr::A0);
            assert_eq!(e.write_back, None, "word 0x{:08x}", word);
            assert_eq!(e.next_pc, 1);
        }
    }

    #[test]
    fn test_pc_wraps_at_top_of_memory() {
        let e = exec(NOP, &RegisterFile::new(), u16::MAX);
        assert_eq!(e.next_pc, 0);
    }
}
