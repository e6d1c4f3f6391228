//! EVM common types and instruction encoding.
//!
//! This crate provides the data structures shared by the assembler and the
//! virtual machine:
//!
//! - [`Opcode`]: the 24 opcodes of the instruction set
//! - [`Instruction`]: an opcode with its optional immediate operand
//! - [`Program`]: the word stream produced by the assembler
//! - [`DecodeError`]: errors from decoding words
//!
//! # Dependencies
//!
//! This crate uses `thiserror` and has no other dependencies.

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::Program;
