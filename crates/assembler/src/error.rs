//! Error types for the EVM assembler.

use std::fmt;

use thiserror::Error;

/// Position of a diagnostic in the assembly source.
///
/// Displays as `source:row:col`, with 1-based row and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    pub source: String,
    pub row: usize,
    pub col: usize,
}

impl SourcePos {
    pub fn new(source: impl Into<String>, row: usize, col: usize) -> Self {
        Self {
            source: source.into(),
            row,
            col,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.row, self.col)
    }
}

/// Errors produced while assembling text into a program.
///
/// Tokenization errors (`UnknownOpcode` through `UnexpectedSymbol`) stop at
/// the first malformed line. Resolution errors (`UndefinedLabel`,
/// `DuplicateLabel`) are reported at the offending statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The first word of a statement is neither a mnemonic nor a label.
    #[error("{pos} unknown opcode '{token}'")]
    UnknownOpcode { pos: SourcePos, token: String },

    /// An instruction is missing its operand.
    #[error("{pos} {opcode} expects {expected} operand")]
    MissingOperand {
        pos: SourcePos,
        opcode: &'static str,
        expected: &'static str,
    },

    /// A numeric operand could not be parsed or does not fit in 64 bits.
    #[error("{pos} invalid number '{token}'")]
    InvalidNumber { pos: SourcePos, token: String },

    /// A label name contains characters that are not allowed.
    #[error("{pos} invalid label name '{token}'")]
    InvalidLabel { pos: SourcePos, token: String },

    /// A label definition consisting of only `:`.
    #[error("{pos} empty label name")]
    EmptyLabel { pos: SourcePos },

    /// Something other than a comment follows a complete statement.
    #[error("{pos} unexpected symbol '{token}'")]
    UnexpectedSymbol { pos: SourcePos, token: String },

    /// A jump or call refers to a label that is never defined.
    #[error("{pos} undefined label '{name}'")]
    UndefinedLabel { pos: SourcePos, name: String },

    /// A label is defined more than once.
    #[error("{pos} label '{name}' already defined at {first}")]
    DuplicateLabel {
        pos: SourcePos,
        name: String,
        first: SourcePos,
    },
}

impl AsmError {
    /// Where in the source the error was detected.
    pub fn pos(&self) -> &SourcePos {
        match self {
            AsmError::UnknownOpcode { pos, .. }
            | AsmError::MissingOperand { pos, .. }
            | AsmError::InvalidNumber { pos, .. }
            | AsmError::InvalidLabel { pos, .. }
            | AsmError::EmptyLabel { pos }
            | AsmError::UnexpectedSymbol { pos, .. }
            | AsmError::UndefinedLabel { pos, .. }
            | AsmError::DuplicateLabel { pos, .. } => pos,
        }
    }
}
