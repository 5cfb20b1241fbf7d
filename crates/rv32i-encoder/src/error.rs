//! Assembler errors.

use alloc::string::String;

/// Errors produced while assembling RV32I source text.
///
/// `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsmError {
    #[error("line {line}: syntax error near `{text}`")]
    Syntax { line: usize, text: String },

    #[error("line {line}: unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: invalid operands for `{mnemonic}`, expected {expected}")]
    InvalidOperands {
        line: usize,
        mnemonic: String,
        expected: &'static str,
    },

    #[error("line {line}: immediate {value} out of range [{min}, {max}] for `{mnemonic}`")]
    ImmediateOutOfRange {
        line: usize,
        mnemonic: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("line {line}: offset {value} for `{mnemonic}` is not a multiple of 2")]
    MisalignedOffset {
        line: usize,
        mnemonic: String,
        value: i64,
    },
}

impl AsmError {
    /// Source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            AsmError::Syntax { line, .. }
            | AsmError::UnknownMnemonic { line, .. }
            | AsmError::InvalidOperands { line, .. }
            | AsmError::ImmediateOutOfRange { line, .. }
            | AsmError::MisalignedOffset { line, .. } => *line,
        }
    }
}
