//! EVM virtual machine: executes assembled instruction streams.
//!
//! The VM is a stack-based machine with:
//! - An operand stack of 64-bit words
//! - A separate call stack holding return addresses
//! - A fixed-size, byte-addressable data memory
//!
//! Every fault is fatal and reported as a [`RuntimeError`].
//!
//! # Usage
//!
//! ```
//! use evm_common::{Instruction, Opcode, Program};
//! use evm_vm::run_with_output;
//!
//! let program = Program::from_instructions(&[
//!     Instruction::with_operand(Opcode::Push, 3),
//!     Instruction::with_operand(Opcode::Push, 4),
//!     Instruction::new(Opcode::Add),
//!     Instruction::new(Opcode::Printu),
//!     Instruction::new(Opcode::Halt),
//! ]);
//!
//! let mut out = Vec::new();
//! run_with_output(program, &mut out).unwrap();
//! assert_eq!(out, b"7");
//! ```

pub mod error;
pub mod execute;
pub mod machine;
pub mod memory;
pub mod stack;

pub use error::RuntimeError;
pub use execute::Step;
pub use machine::{VmConfig, VM};
pub use memory::Memory;

use std::io::Write;

use evm_common::Program;

/// Execute a program with the default configuration, writing to stdout.
///
/// # Errors
///
/// Returns [`RuntimeError`] on the first fault (stack underflow, memory
/// access out of bounds, invalid opcode, ...).
pub fn run(program: Program) -> Result<(), RuntimeError> {
    VM::new(program).run()
}

/// Execute a program with the default configuration, writing to `out`.
pub fn run_with_output<W: Write>(program: Program, out: W) -> Result<(), RuntimeError> {
    VM::with_config(program, VmConfig::default(), out).run()
}
