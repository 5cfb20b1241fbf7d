//! Fetch/decode/execute loop.

use alloc::{format, string::String, vec::Vec};

use rv32i_encoder::Gpr;
use tracing::{debug, trace};

use crate::{
    decoder::decode,
    error::EmulatorError,
    executor::execute,
    logging::{InstLog, LogLevel},
    memory::MemoryPort,
    opcode::RET,
    registers::{MachineRegisters, RegisterFile, RegisterId},
};

/// Entries kept in the rolling instruction log.
const LOG_CAPACITY: usize = 100;

/// When a fetched `ret` stops the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HaltPolicy {
    /// Stop on `ret` only when it lands on word address 0.
    #[default]
    ReturnToZero,
    /// Stop on any `ret`.
    OnReturn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Normal step completed, continue execution
    Continue,
    /// Halt sentinel retired, the core is now stopped
    Halted,
}

/// RV32I core: register file, program counter and instruction counter.
///
/// Instruction memory is borrowed per call, so the same program can be run
/// by several cores.
#[derive(Debug, Clone)]
pub struct Rv32iCore {
    regs: RegisterFile,
    machine: MachineRegisters,
    pc: u16,
    state: RunState,
    instruction_count: u64,
    max_instructions: Option<u64>,
    halt_policy: HaltPolicy,
    log_level: LogLevel,
    log_buffer: Vec<InstLog>,
}

impl Default for Rv32iCore {
    fn default() -> Self {
        Self::new()
    }
}

impl Rv32iCore {
    /// A running core at word address 0 with all registers cleared.
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            machine: MachineRegisters::default(),
            pc: 0,
            state: RunState::Running,
            instruction_count: 0,
            max_instructions: None,
            halt_policy: HaltPolicy::default(),
            log_level: LogLevel::None,
            log_buffer: Vec::new(),
        }
    }

    /// Stop with an error after `limit` instructions instead of looping forever.
    pub fn with_max_instructions(mut self, limit: u64) -> Self {
        self.max_instructions = Some(limit);
        self
    }

    pub fn with_halt_policy(mut self, policy: HaltPolicy) -> Self {
        self.halt_policy = policy;
        self
    }

    /// Set the logging level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Restart at `start_pc`: state `Running`, counter and log cleared.
    ///
    /// Register contents are kept so the host can preload arguments.
    pub fn reset(&mut self, start_pc: u16) {
        self.pc = start_pc;
        self.state = RunState::Running;
        self.instruction_count = 0;
        self.log_buffer.clear();
    }

    /// Execute a single instruction.
    pub fn step<M: MemoryPort + ?Sized>(
        &mut self,
        memory: &M,
    ) -> Result<StepResult, EmulatorError> {
        if self.state == RunState::Stopped {
            return Err(EmulatorError::NotRunning {
                pc: self.pc,
                regs: self.regs.snapshot(),
            });
        }

        if let Some(limit) = self.max_instructions {
            if self.instruction_count >= limit {
                debug!(limit, pc = self.pc, "instruction limit reached");
                return Err(EmulatorError::InstructionLimitExceeded {
                    limit,
                    executed: self.instruction_count,
                    pc: self.pc,
                    regs: self.regs.snapshot(),
                });
            }
        }

        let pc = self.pc;
        let raw = memory.read_word(pc);
        let inst = decode(raw);
        let before = (
            self.regs.read(inst.rs1),
            self.regs.read(inst.rs2),
            self.regs.read(inst.rd),
        );

        let exec = execute(&inst, &self.regs, pc);
        if let Some((rd, value)) = exec.write_back {
            self.regs.write(rd, value);
        }
        self.pc = exec.next_pc;
        self.instruction_count += 1;

        trace!(
            pc,
            raw,
            opcode = %inst.opcode,
            result = exec.result,
            next_pc = exec.next_pc,
            "retired"
        );
        let level = if exec.unsupported {
            LogLevel::Errors
        } else {
            LogLevel::Instructions
        };
        if self.log_level >= level {
            let log = InstLog::record(self.instruction_count, pc, &inst, &exec, before);
            self.log_instruction(log);
        }

        let halted = raw == RET
            && match self.halt_policy {
                HaltPolicy::ReturnToZero => exec.next_pc == 0,
                HaltPolicy::OnReturn => true,
            };
        if halted {
            self.state = RunState::Stopped;
            debug!(pc, instructions = self.instruction_count, "halted on return");
            Ok(StepResult::Halted)
        } else {
            Ok(StepResult::Continue)
        }
    }

    /// Run from `start_pc` until the halt sentinel, returning the number of
    /// instructions retired (the sentinel included).
    pub fn run<M: MemoryPort + ?Sized>(
        &mut self,
        start_pc: u16,
        memory: &M,
    ) -> Result<u64, EmulatorError> {
        self.reset(start_pc);
        while self.step(memory)? == StepResult::Continue {}
        Ok(self.instruction_count)
    }

    /// Read a host-visible register. General-purpose registers read as their
    /// two's-complement bits; `pc` reads as a word address.
    pub fn read_register(&self, id: RegisterId) -> u32 {
        match id {
            RegisterId::Gpr(reg) => self.regs.read(reg) as u32,
            RegisterId::Pc => self.pc as u32,
            RegisterId::Mstatus => self.machine.mstatus,
            RegisterId::Mepc => self.machine.mepc,
            RegisterId::Mcause => self.machine.mcause,
            RegisterId::Mtvec => self.machine.mtvec,
        }
    }

    /// Write a host-visible register. Writes to `x0` are dropped and `pc` is
    /// truncated to 16 bits.
    pub fn write_register(&mut self, id: RegisterId, value: u32) {
        match id {
            RegisterId::Gpr(reg) => self.regs.write(reg, value as i32),
            RegisterId::Pc => self.pc = value as u16,
            RegisterId::Mstatus => self.machine.mstatus = value,
            RegisterId::Mepc => self.machine.mepc = value,
            RegisterId::Mcause => self.machine.mcause = value,
            RegisterId::Mtvec => self.machine.mtvec = value,
        }
    }

    /// Get the value of a register.
    pub fn get_register(&self, reg: Gpr) -> i32 {
        self.regs.read(reg)
    }

    /// Set the value of a register.
    ///
    /// Note: Writing to x0 (ZERO) is a no-op.
    pub fn set_register(&mut self, reg: Gpr, value: i32) {
        self.regs.write(reg, value);
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn machine_registers(&self) -> &MachineRegisters {
        &self.machine
    }

    pub fn machine_registers_mut(&mut self) -> &mut MachineRegisters {
        &mut self.machine
    }

    /// Current program counter (word address).
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn halt_policy(&self) -> HaltPolicy {
        self.halt_policy
    }

    /// Get the number of instructions executed so far.
    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Get captured log entries.
    pub fn get_logs(&self) -> &[InstLog] {
        &self.log_buffer
    }

    /// Format all captured logs as a string.
    pub fn format_logs(&self) -> String {
        let mut result = String::new();
        for log in &self.log_buffer {
            result.push_str(&format!("{}\n", log));
        }
        result
    }

    /// Clear captured log messages.
    pub fn clear_logs(&mut self) {
        self.log_buffer.clear();
    }

    /// Dump the current core state as a human-readable string.
    pub fn dump_state(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!(
            "PC: 0x{:04x} (byte 0x{:05x})\n",
            self.pc,
            (self.pc as u32) << 2
        ));
        result.push_str(&format!("State: {:?}\n", self.state));
        result.push_str(&format!(
            "Instructions executed: {}\n",
            self.instruction_count
        ));
        result.push_str("\nRegisters:\n");
        result.push_str("  zero (x0) = 0x00000000 (0)\n");
        for (reg, value) in self.regs.non_zero() {
            result.push_str(&format!(
                "  {} (x{}) = 0x{:08x} ({})\n",
                reg,
                reg.num(),
                value as u32,
                value
            ));
        }

        if self.machine != MachineRegisters::default() {
            let m = &self.machine;
            result.push_str(&format!(
                "\nMachine registers:\n  mstatus = 0x{:08x}\n  mepc = 0x{:08x}\n  mcause = 0x{:08x}\n  mtvec = 0x{:08x}\n",
                m.mstatus, m.mepc, m.mcause, m.mtvec
            ));
        }

        result
    }

    /// Instruction words around the pc plus the most recent log entries.
    ///
    /// # Arguments
    ///
    /// * `memory` - Memory the core is running from
    /// * `log_count` - Number of recent logs to show
    pub fn format_debug_info<M: MemoryPort + ?Sized>(
        &self,
        memory: &M,
        log_count: usize,
    ) -> String {
        let mut result = String::new();

        result.push_str("Memory around pc:\n");
        let start = self.pc.saturating_sub(5);
        let end = self.pc.saturating_add(5);
        for addr in start..=end {
            let marker = if addr == self.pc { ">>> " } else { "    " };
            result.push_str(&format!(
                "{}0x{:04x}: 0x{:08x}\n",
                marker,
                addr,
                memory.read_word(addr)
            ));
        }

        if !self.log_buffer.is_empty() {
            result.push_str("\nLast execution logs:\n");
            let start = self.log_buffer.len().saturating_sub(log_count);
            for log in &self.log_buffer[start..] {
                result.push_str(&format!("{}\n", log));
            }
        }

        if self.log_level == LogLevel::Verbose {
            result.push('\n');
            result.push_str(&self.dump_state());
        }

        result
    }

    /// Append to the rolling log buffer.
    fn log_instruction(&mut self, log: InstLog) {
        if self.log_buffer.len() >= LOG_CAPACITY {
            self.log_buffer.remove(0);
        }
        self.log_buffer.push(log);
    }
}

/// Run a fresh core from `start_pc` until the halt sentinel.
///
/// There is no instruction limit: a program that never returns to 0 never
/// finishes. Use [`Rv32iCore::with_max_instructions`] to bound it.
pub fn run<M: MemoryPort + ?Sized>(start_pc: u16, memory: &M) -> Result<u64, EmulatorError> {
    Rv32iCore::new().run(start_pc, memory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::NOP;
    use alloc::vec;
    use rv32i_encoder as enc;

    #[test]
    fn test_ret_first_halts_after_one() {
        let program = vec![RET];
        assert_eq!(run(0, &program), Ok(1));
    }

    #[test]
    fn test_counts_every_instruction() {
        let program = vec![NOP, NOP, enc::addi(Gpr::A0, Gpr::ZERO, 3), RET];
        let mut core = Rv32iCore::new();
        assert_eq!(core.run(0, &program), Ok(4));
        assert_eq!(core.get_register(Gpr::A0), 3);
        assert_eq!(core.state(), RunState::Stopped);
        assert_eq!(core.pc(), 0);
    }

    #[test]
    fn test_step_after_halt_is_an_error() {
        let program = vec![RET];
        let mut core = Rv32iCore::new();
        assert_eq!(core.step(&program), Ok(StepResult::Halted));
        assert!(matches!(
            core.step(&program),
            Err(EmulatorError::NotRunning { pc: 0, .. })
        ));
    }

    #[test]
    fn test_ret_to_caller_continues_under_default_policy() {
        // 0: call 2
        // 2: ret back to 1, not a halt by default
        // 1: jump to 3, clear ra, ret to 0
        let program = vec![
            enc::jal(Gpr::RA, 8),
            enc::jal(Gpr::ZERO, 8),
            RET,
            enc::addi(Gpr::RA, Gpr::ZERO, 0),
            RET,
        ];
        let mut core = Rv32iCore::new();
        assert_eq!(core.run(0, &program), Ok(5));

        let mut core = Rv32iCore::new().with_halt_policy(HaltPolicy::OnReturn);
        assert_eq!(core.run(0, &program), Ok(2));
        assert_eq!(core.pc(), 1);
    }

    #[test]
    fn test_instruction_limit() {
        let program = vec![enc::jal(Gpr::ZERO, 0)];
        let mut core = Rv32iCore::new().with_max_instructions(10);
        match core.run(0, &program) {
            Err(EmulatorError::InstructionLimitExceeded {
                limit, executed, ..
            }) => {
                assert_eq!(limit, 10);
                assert_eq!(executed, 10);
            }
            other => panic!("expected limit error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_resets_counter() {
        let program = vec![NOP, RET];
        let mut core = Rv32iCore::new();
        assert_eq!(core.run(0, &program), Ok(2));
        assert_eq!(core.run(1, &program), Ok(1));
    }

    #[test]
    fn test_host_register_access() {
        let mut core = Rv32iCore::new();
        core.write_register(RegisterId::Gpr(Gpr::ZERO), 5);
        core.write_register(RegisterId::Gpr(Gpr::A0), 0xffff_ffff);
        core.write_register(RegisterId::Pc, 0x1_0002);
        core.write_register(RegisterId::Mtvec, 0x100);
        assert_eq!(core.read_register(RegisterId::Gpr(Gpr::ZERO)), 0);
        assert_eq!(core.get_register(Gpr::A0), -1);
        assert_eq!(core.read_register(RegisterId::Pc), 2);
        assert_eq!(core.machine_registers().mtvec, 0x100);
        assert_eq!(core.read_register(RegisterId::Mcause), 0);
    }

    #[test]
    fn test_logs_are_bounded() {
        let mut program = vec![NOP; 150];
        program.push(RET);
        let mut core = Rv32iCore::new().with_log_level(LogLevel::Instructions);
        assert_eq!(core.run(0, &program), Ok(151));
        let logs = core.get_logs();
        assert_eq!(logs.len(), LOG_CAPACITY);
        assert_eq!(logs[0].cycle(), 52);
        assert_eq!(logs[LOG_CAPACITY - 1].pc(), 150);
        assert_eq!(core.format_logs().lines().filter(|l| l.starts_with('[')).count(), 100);
    }

    #[test]
    fn test_error_level_records_only_unsupported() {
        let unsupported =
            enc::encode_r(enc::OPCODE_OP, Gpr::A0, 0b001, Gpr::A1, Gpr::A2, 0b010_0000);
        let program = vec![NOP, unsupported, NOP, RET];
        let mut core = Rv32iCore::new().with_log_level(LogLevel::Errors);
        assert_eq!(core.run(0, &program), Ok(4));
        let logs = core.get_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pc(), 1);
        assert!(matches!(logs[0], InstLog::Unsupported { .. }));

        let mut core = Rv32iCore::new();
        assert_eq!(core.run(0, &program), Ok(4));
        assert!(core.get_logs().is_empty());
    }

    #[test]
    fn test_no_logs_by_default() {
        let mut core = Rv32iCore::new();
        core.run(0, &vec![NOP, RET]).unwrap();
        assert!(core.get_logs().is_empty());
    }

    #[test]
    fn test_dump_state() {
        let mut core = Rv32iCore::new();
        core.run(0, &vec![enc::addi(Gpr::A0, Gpr::ZERO, -1), RET]).unwrap();
        let dump = core.dump_state();
        assert!(dump.contains("PC: 0x0000 (byte 0x00000)"));
        assert!(dump.contains("Instructions executed: 2"));
        assert!(dump.contains("a0 (x10) = 0xffffffff (-1)"));
        assert!(!dump.contains("Machine registers"));
    }

    #[test]
    fn test_debug_info_marks_pc() {
        let program = vec![NOP, NOP, RET];
        let mut core = Rv32iCore::new().with_log_level(LogLevel::Verbose);
        core.step(&program).unwrap();
        let info = core.format_debug_info(&program, 10);
        assert!(info.contains(">>> 0x0001: 0x00000013"));
        assert!(info.contains("Last execution logs:"));
        assert!(info.contains("Registers:"));
    }
}
