//! Execution log for the RV32I core.

use core::fmt;

use rv32i_encoder::Gpr;

use crate::{decoder::DecodedInstruction, executor::Execution, opcode::Opcode};

/// Logging verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// No logging.
    #[default]
    None,
    /// Only log instructions with an unsupported func3/func7.
    Errors,
    /// Log each instruction execution.
    Instructions,
    /// Instruction log plus register state in debug dumps.
    Verbose,
}

/// Log entry for a single retired instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstLog {
    /// OP and OP_IMM.
    Arithmetic {
        cycle: u64,
        pc: u16,
        instruction: u32,
        rd: Gpr,
        rs1_val: i32,
        rs2_val: Option<i32>, // None for immediate forms
        rd_old: i32,
        rd_new: i32,
    },
    Branch {
        cycle: u64,
        pc: u16,
        instruction: u32,
        rs1_val: i32,
        rs2_val: i32,
        taken: bool,
        target_pc: Option<u16>, // Some if taken
    },
    /// JAL and JALR.
    Jump {
        cycle: u64,
        pc: u16,
        instruction: u32,
        rd: Gpr,
        rd_old: i32,
        rd_new: Option<i32>, // None if rd is x0
        target_pc: u16,
    },
    /// LUI and AUIPC.
    Immediate {
        cycle: u64,
        pc: u16,
        instruction: u32,
        rd: Gpr,
        rd_old: i32,
        rd_new: i32,
    },
    /// OP/OP_IMM/BRANCH with a func3/func7 pair outside RV32I.
    Unsupported {
        cycle: u64,
        pc: u16,
        instruction: u32,
        opcode: Opcode,
        func3: u8,
        func7: u8,
    },
    /// Everything else, loads and stores included.
    Other {
        cycle: u64,
        pc: u16,
        instruction: u32,
        opcode: Opcode,
    },
}

impl InstLog {
    /// Build the entry for one retired instruction.
    ///
    /// `rs1_val`/`rs2_val`/`rd_old` are the register values before write-back.
    pub fn record(
        cycle: u64,
        pc: u16,
        inst: &DecodedInstruction,
        exec: &Execution,
        (rs1_val, rs2_val, rd_old): (i32, i32, i32),
    ) -> Self {
        let instruction = inst.raw;
        let rd = inst.rd;
        let rd_new = if rd.is_zero() { 0 } else { exec.result };
        if exec.unsupported {
            return InstLog::Unsupported {
                cycle,
                pc,
                instruction,
                opcode: inst.opcode,
                func3: inst.func3,
                func7: inst.func7,
            };
        }
        match inst.opcode {
            Opcode::Op | Opcode::OpImm => InstLog::Arithmetic {
                cycle,
                pc,
                instruction,
                rd,
                rs1_val,
                rs2_val: (inst.opcode == Opcode::Op).then_some(rs2_val),
                rd_old,
                rd_new,
            },
            Opcode::Branch => InstLog::Branch {
                cycle,
                pc,
                instruction,
                rs1_val,
                rs2_val,
                taken: exec.branch_taken,
                target_pc: exec.branch_taken.then_some(exec.next_pc),
            },
            Opcode::Jal | Opcode::Jalr => InstLog::Jump {
                cycle,
                pc,
                instruction,
                rd,
                rd_old,
                rd_new: (!rd.is_zero()).then_some(exec.result),
                target_pc: exec.next_pc,
            },
            Opcode::Lui | Opcode::Auipc => InstLog::Immediate {
                cycle,
                pc,
                instruction,
                rd,
                rd_old,
                rd_new,
            },
            opcode => InstLog::Other {
                cycle,
                pc,
                instruction,
                opcode,
            },
        }
    }

    /// Get the cycle count for this log entry.
    pub fn cycle(&self) -> u64 {
        match self {
            InstLog::Arithmetic { cycle, .. }
            | InstLog::Branch { cycle, .. }
            | InstLog::Jump { cycle, .. }
            | InstLog::Immediate { cycle, .. }
            | InstLog::Unsupported { cycle, .. }
            | InstLog::Other { cycle, .. } => *cycle,
        }
    }

    /// Word address of the instruction.
    pub fn pc(&self) -> u16 {
        match self {
            InstLog::Arithmetic { pc, .. }
            | InstLog::Branch { pc, .. }
            | InstLog::Jump { pc, .. }
            | InstLog::Immediate { pc, .. }
            | InstLog::Unsupported { pc, .. }
            | InstLog::Other { pc, .. } => *pc,
        }
    }

    /// Get the instruction word for this log entry.
    pub fn instruction(&self) -> u32 {
        match self {
            InstLog::Arithmetic { instruction, .. }
            | InstLog::Branch { instruction, .. }
            | InstLog::Jump { instruction, .. }
            | InstLog::Immediate { instruction, .. }
            | InstLog::Unsupported { instruction, .. }
            | InstLog::Other { instruction, .. } => *instruction,
        }
    }
}

impl fmt::Display for InstLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pc = self.pc();
        let instruction = self.instruction();

        write!(
            f,
            "[{:4}] 0x{:04x} (byte 0x{:05x}): 0x{:08x} {}",
            self.cycle(),
            pc,
            (pc as u32) << 2,
            instruction,
            Opcode::of(instruction)
        )?;

        match self {
            InstLog::Arithmetic {
                rd,
                rs1_val,
                rs2_val,
                rd_old,
                rd_new,
                ..
            } => {
                write!(f, "\n    {}: {} -> {}", rd, rd_old, rd_new)?;
                if let Some(rs2_val) = rs2_val {
                    write!(f, " (rs1={}, rs2={})", rs1_val, rs2_val)?;
                } else {
                    write!(f, " (rs1={})", rs1_val)?;
                }
            }
            InstLog::Branch {
                rs1_val,
                rs2_val,
                taken,
                target_pc,
                ..
            } => {
                match (taken, target_pc) {
                    (true, Some(target)) => {
                        write!(f, "\n    branch taken: 0x{:04x} -> 0x{:04x}", pc, target)?
                    }
                    _ => write!(f, "\n    branch not taken")?,
                }
                write!(f, " (rs1={}, rs2={})", rs1_val, rs2_val)?;
            }
            InstLog::Jump {
                rd,
                rd_old,
                rd_new,
                target_pc,
                ..
            } => {
                if let Some(rd_new) = rd_new {
                    write!(f, "\n    {}: {} -> {}", rd, rd_old, rd_new)?;
                }
                write!(f, "\n    jump: 0x{:04x} -> 0x{:04x}", pc, target_pc)?;
            }
            InstLog::Immediate {
                rd, rd_old, rd_new, ..
            } => {
                write!(f, "\n    {}: {} -> {}", rd, rd_old, rd_new)?;
            }
            InstLog::Unsupported { func3, func7, .. } => {
                write!(
                    f,
                    "\n    unsupported func3=0b{:03b} func7=0b{:07b}, result forced to 0",
                    func3, func7
                )?;
            }
            InstLog::Other { opcode, .. } => {
                if matches!(opcode, Opcode::Load | Opcode::Store) {
                    write!(f, "\n    memory access not modelled")?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decoder::decode, executor::execute, registers::RegisterFile};
    use alloc::format;
    use rv32i_encoder as enc;

    fn record(word: u32, regs: &RegisterFile, pc: u16) -> InstLog {
        let inst = decode(word);
        let exec = execute(&inst, regs, pc);
        let before = (regs.read(inst.rs1), regs.read(inst.rs2), regs.read(inst.rd));
        InstLog::record(1, pc, &inst, &exec, before)
    }

    #[test]
    fn test_arithmetic_entry() {
        let mut regs = RegisterFile::new();
        regs.write(Gpr::A0, 3);
        let log = record(enc::addi(Gpr::A0, Gpr::A0, 4), &regs, 2);
        assert_eq!(
            log,
            InstLog::Arithmetic {
                cycle: 1,
                pc: 2,
                instruction: enc::addi(Gpr::A0, Gpr::A0, 4),
                rd: Gpr::A0,
                rs1_val: 3,
                rs2_val: None,
                rd_old: 3,
                rd_new: 7,
            }
        );
        let text = format!("{}", log);
        assert!(text.contains("0x0002 (byte 0x00008)"));
        assert!(text.contains("a0: 3 -> 7 (rs1=3)"));
    }

    #[test]
    fn test_branch_entry() {
        let log = record(enc::beq(Gpr::ZERO, Gpr::ZERO, 8), &RegisterFile::new(), 4);
        assert!(matches!(
            log,
            InstLog::Branch {
                taken: true,
                target_pc: Some(6),
                ..
            }
        ));
        assert!(format!("{}", log).contains("branch taken: 0x0004 -> 0x0006"));
    }

    #[test]
    fn test_ret_entry_has_no_link() {
        let log = record(crate::opcode::RET, &RegisterFile::new(), 9);
        assert!(matches!(
            log,
            InstLog::Jump {
                rd_new: None,
                target_pc: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_store_entry() {
        let log = record(enc::sw(Gpr::SP, Gpr::A0, 0), &RegisterFile::new(), 0);
        assert_eq!(log.cycle(), 1);
        assert!(format!("{}", log).contains("STORE"));
        assert!(format!("{}", log).contains("memory access not modelled"));
    }

    #[test]
    fn test_unsupported_entry() {
        let word = enc::encode_r(enc::OPCODE_OP, Gpr::A0, 0b001, Gpr::A1, Gpr::A2, 0b010_0000);
        let log = record(word, &RegisterFile::new(), 3);
        assert_eq!(
            log,
            InstLog::Unsupported {
                cycle: 1,
                pc: 3,
                instruction: word,
                opcode: Opcode::Op,
                func3: 0b001,
                func7: 0b010_0000,
            }
        );
        assert!(format!("{}", log).contains("unsupported func3=0b001 func7=0b0100000"));

        let word = enc::encode_b(0b011, Gpr::ZERO, Gpr::ZERO, 8);
        let log = record(word, &RegisterFile::new(), 0);
        assert!(matches!(log, InstLog::Unsupported { opcode: Opcode::Branch, .. }));
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Verbose > LogLevel::Instructions);
        assert!(LogLevel::Errors > LogLevel::None);
        assert_eq!(LogLevel::default(), LogLevel::None);
    }
}
