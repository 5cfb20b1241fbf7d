//! Helper functions for testing RV32I programs.
//!
//! Programs are assembled with `rv32i-encoder`, loaded at word address 0 and
//! run until they `ret` to address 0. Failures panic with the core state and
//! the recent execution log.

use alloc::{format, string::String, vec::Vec};

use rv32i_encoder::{assemble_words, AsmError, Gpr};

use crate::{cpu::Rv32iCore, error::EmulatorError, logging::LogLevel};

/// Instruction budget for helper runs, so a broken program fails instead of
/// spinning forever.
const HELPER_INSTRUCTION_LIMIT: u64 = 100_000;

/// Assemble `asm` and create a logging core for it.
pub fn debug_rv32i_asm(asm: &str) -> Result<(Rv32iCore, Vec<u32>), AsmError> {
    let words = assemble_words(asm)?;
    Ok((debug_rv32i_core(), words))
}

/// A core with instruction logging and the helper instruction limit.
pub fn debug_rv32i_core() -> Rv32iCore {
    Rv32iCore::new()
        .with_log_level(LogLevel::Instructions)
        .with_max_instructions(HELPER_INSTRUCTION_LIMIT)
}

fn format_error(core: &Rv32iCore, error: &EmulatorError, words: &[u32]) -> String {
    let mut result = String::new();
    result.push_str("=== RV32I Execution Error ===\n\n");
    result.push_str(&format!("Error: {}\n\n", error));
    result.push_str(&core.format_debug_info(words, 10));
    result.push('\n');
    result.push_str(&core.dump_state());
    result
}

/// Run `asm` to completion, panicking with diagnostics on any failure.
fn run_or_panic(asm: &str) -> (Rv32iCore, u64) {
    let (mut core, words) = match debug_rv32i_asm(asm) {
        Ok(loaded) => loaded,
        Err(e) => panic!("Failed to assemble code: {}\n\nCode:\n{}", e, asm),
    };
    match core.run(0, &words) {
        Ok(count) => (core, count),
        Err(e) => panic!("{}\nCode:\n{}", format_error(&core, &e, &words), asm),
    }
}

/// Expect code to run to the halt sentinel, returning the stopped core.
pub fn expect_ok(asm: &str) -> Rv32iCore {
    run_or_panic(asm).0
}

/// Expect code to run successfully and leave `expected` in `reg`.
pub fn expect_register(asm: &str, reg: Gpr, expected: i32) {
    expect_registers(asm, &[(reg, expected)]);
}

/// Expect code to run successfully and leave every listed register set.
pub fn expect_registers(asm: &str, expected: &[(Gpr, i32)]) {
    let core = expect_ok(asm);
    for (reg, value) in expected {
        let actual = core.get_register(*reg);
        if actual != *value {
            panic!(
                "Register {} mismatch: expected {}, got {}\n\n{}\nCode:\n{}",
                reg,
                value,
                actual,
                core.dump_state(),
                asm
            );
        }
    }
}

/// Expect code to halt after exactly `expected` instructions.
pub fn expect_instruction_count(asm: &str, expected: u64) {
    let (core, count) = run_or_panic(asm);
    if count != expected {
        panic!(
            "Instruction count mismatch: expected {}, got {}\n\n{}\nCode:\n{}",
            expected,
            count,
            core.format_logs(),
            asm
        );
    }
}
