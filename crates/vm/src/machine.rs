//! VM state management: instruction pointer, stacks, memory, output sink.

use std::io::{self, Stdout, Write};

use crate::error::RuntimeError;
use crate::memory::Memory;
use crate::stack::Stack;
use evm_common::Program;

/// Default data memory size: 64 KiB.
pub const DEFAULT_MEMORY_CAPACITY: usize = 64 * 1024;

/// Default maximum depth of each stack, in words.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 64 * 1024;

/// Runtime configuration for a [`VM`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Size of the data memory in bytes.
    pub memory_capacity: usize,
    /// Maximum depth of the operand stack and of the call stack.
    pub max_stack_depth: usize,
    /// Write one trace line per executed instruction to stderr.
    pub trace: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            trace: false,
        }
    }
}

/// The EVM virtual machine.
///
/// Owns the program, both stacks, the data memory and the sink that
/// `printu` and `puts` write to.
pub struct VM<W: Write> {
    /// The program being executed. Never modified.
    pub(crate) program: Program,
    /// Address of the next word to fetch.
    pub(crate) ip: u64,
    /// Address of the instruction currently executing (for error reporting).
    pub(crate) at: u64,
    /// Operand stack.
    pub(crate) stack: Stack,
    /// Return addresses pushed by `call`.
    pub(crate) call_stack: Stack,
    /// Data memory.
    pub(crate) memory: Memory,
    /// Program output.
    pub(crate) out: W,
    pub(crate) config: VmConfig,
    pub(crate) halted: bool,
}

impl VM<Stdout> {
    /// Create a VM with the default configuration that writes to stdout.
    pub fn new(program: Program) -> Self {
        Self::with_config(program, VmConfig::default(), io::stdout())
    }
}

impl<W: Write> VM<W> {
    /// Create a VM with an explicit configuration and output sink.
    pub fn with_config(program: Program, config: VmConfig, out: W) -> Self {
        Self {
            program,
            ip: 0,
            at: 0,
            stack: Stack::new(config.max_stack_depth),
            call_stack: Stack::new(config.max_stack_depth),
            memory: Memory::new(config.memory_capacity),
            out,
            config,
            halted: false,
        }
    }

    pub fn ip(&self) -> u64 {
        self.ip
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The operand stack, bottom to top.
    pub fn stack(&self) -> &[u64] {
        self.stack.as_slice()
    }

    /// The call stack, bottom to top.
    pub fn call_stack(&self) -> &[u64] {
        self.call_stack.as_slice()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Consume the VM and return its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Fetch the word at ip and advance.
    pub(crate) fn fetch(&mut self) -> Result<u64, RuntimeError> {
        let at = self.ip;
        let word = usize::try_from(at)
            .ok()
            .and_then(|idx| self.program.words().get(idx))
            .copied()
            .ok_or(RuntimeError::UnexpectedEndOfProgram { at })?;
        self.ip += 1;
        Ok(word)
    }

    pub(crate) fn push(&mut self, value: u64) -> Result<(), RuntimeError> {
        if self.stack.push(value).is_none() {
            return Err(RuntimeError::StackOverflow {
                at: self.at,
                limit: self.stack.max_depth(),
            });
        }
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<u64, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { at: self.at })
    }

    pub(crate) fn peek(&self, offset: u64) -> Result<u64, RuntimeError> {
        match self.stack.peek(offset) {
            Some(value) => Ok(value),
            None => Err(RuntimeError::StackOutOfRange {
                at: self.at,
                offset,
                depth: self.stack.len(),
            }),
        }
    }

    pub(crate) fn push_return(&mut self, addr: u64) -> Result<(), RuntimeError> {
        if self.call_stack.push(addr).is_none() {
            return Err(RuntimeError::CallStackOverflow {
                at: self.at,
                limit: self.call_stack.max_depth(),
            });
        }
        Ok(())
    }

    pub(crate) fn pop_return(&mut self) -> Result<u64, RuntimeError> {
        self.call_stack
            .pop()
            .ok_or(RuntimeError::CallStackUnderflow { at: self.at })
    }

    pub(crate) fn out_of_bounds(&self, addr: u64, width: u64) -> RuntimeError {
        RuntimeError::MemoryOutOfBounds {
            at: self.at,
            addr,
            width,
            capacity: self.memory.capacity(),
        }
    }

    pub(crate) fn output_failed(&self, err: io::Error) -> RuntimeError {
        RuntimeError::OutputFailed {
            at: self.at,
            reason: err.to_string(),
        }
    }
}
