//! Decode errors for EVM instruction streams.

use thiserror::Error;

/// Errors that occur while decoding words of an instruction stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The word does not name any opcode.
    #[error("invalid opcode: {0:#x}")]
    InvalidOpcode(u64),

    /// Decoding started past the last word.
    #[error("unexpected end of instruction stream")]
    UnexpectedEnd,

    /// An opcode that takes an immediate operand is the last word of the stream.
    #[error("missing immediate operand for {0}")]
    MissingOperand(&'static str),
}
