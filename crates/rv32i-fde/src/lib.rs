//! RV32I fetch/decode/execute core.
//!
//! The core walks a word-addressed instruction memory, decodes each 32-bit
//! word into its fields and immediate, computes the result and next program
//! counter, and writes the result back into a 32-entry register file with
//! `x0` hardwired to zero. Execution stops on the `ret` sentinel.
//!
//! Loads and stores are decoded but never touch memory, and there is no trap
//! architecture: unsupported encodings quietly produce a zero result.

#![no_std]

extern crate alloc;

mod cpu;
mod decoder;
mod error;
mod executor;
mod format;
mod helpers;
mod image;
mod immediate;
mod logging;
mod memory;
mod opcode;
mod registers;

pub use cpu::{run, HaltPolicy, Rv32iCore, RunState, StepResult};
pub use decoder::{decode, DecodedInstruction};
pub use error::EmulatorError;
pub use executor::{execute, Execution};
pub use format::{classify, InstructionFormat};
pub use helpers::{
    debug_rv32i_asm, debug_rv32i_core, expect_instruction_count, expect_ok, expect_register,
    expect_registers,
};
pub use image::parse_hex_image;
pub use immediate::{build_immediate, sign_extend, ImmediateFields};
pub use logging::{InstLog, LogLevel};
pub use memory::{InstructionMemory, MemoryPort, WORD_COUNT};
pub use opcode::{Opcode, NOP, RET};
pub use registers::{MachineRegisters, RegisterFile, RegisterId};
pub use rv32i_encoder::Gpr;
