//! Runtime faults for the EVM.
//!
//! Every fault is fatal: execution stops at the faulting instruction and no
//! partial result is reported. Each variant carries the address (`at`) of
//! the instruction that faulted.

use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Pop on an empty operand stack.
    #[error("stack underflow at instruction {at}")]
    StackUnderflow { at: u64 },

    /// `ret` with an empty call stack.
    #[error("call stack underflow at instruction {at}")]
    CallStackUnderflow { at: u64 },

    /// `dup` offset reaches below the bottom of the stack.
    #[error("dup offset {offset} out of range (depth {depth}) at instruction {at}")]
    StackOutOfRange { at: u64, offset: u64, depth: usize },

    /// Operand stack exceeded its configured depth.
    #[error("stack overflow (limit {limit}) at instruction {at}")]
    StackOverflow { at: u64, limit: usize },

    /// Call stack exceeded its configured depth.
    #[error("call stack overflow (limit {limit}) at instruction {at}")]
    CallStackOverflow { at: u64, limit: usize },

    /// Memory access outside the data memory.
    #[error(
        "memory access of {width} byte(s) at {addr:#x} out of bounds (capacity {capacity}) at instruction {at}"
    )]
    MemoryOutOfBounds {
        at: u64,
        addr: u64,
        width: u64,
        capacity: usize,
    },

    /// Instruction fetch past the end of the program.
    #[error("unexpected end of program at instruction {at}")]
    UnexpectedEndOfProgram { at: u64 },

    /// The fetched word is not an opcode.
    #[error("invalid opcode {word:#x} at instruction {at}")]
    InvalidOpcode { at: u64, word: u64 },

    /// Writing program output failed.
    #[error("output failed at instruction {at}: {reason}")]
    OutputFailed { at: u64, reason: String },
}
