//! RV32I instruction encoder.
//!
//! This crate builds 32-bit RV32I instruction words, either from typed
//! constructors (`addi(Gpr::A0, Gpr::ZERO, 5)`) or from assembly text. It is
//! the input side of the `rv32i-fde` core: tests and the command-line runner
//! use it to produce programs.

#![no_std]

extern crate alloc;

mod asm;
mod encode;
mod error;
mod inst;
mod regs;

pub use asm::{assemble_code, assemble_instruction, assemble_words};
pub use encode::*;
pub use error::AsmError;
pub use inst::Inst;
pub use regs::Gpr;
