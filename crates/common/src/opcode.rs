//! Opcode definitions for the EVM instruction set.
//!
//! Each opcode occupies one 64-bit word in the instruction stream. `push`
//! and `dup` are followed by one immediate word; every other opcode takes
//! its operands from the operand stack.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// The `#[repr(u64)]` attribute gives each variant a stable word value.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Stack
    /// Push the immediate word that follows.
    Push = 0,
    /// Push a copy of the value `n` slots below the top (immediate `n`).
    Dup = 1,
    /// Exchange the two topmost values.
    Swap = 2,

    // Arithmetic (unsigned, wrapping)
    /// Pop a, pop b, push b + a.
    Add = 3,
    /// Pop a, pop b, push b - a.
    Sub = 4,
    /// Pop a, pop b, push b * a.
    Multu = 5,

    // Comparison: pop a, pop b, push 1 if (a CMP b) else 0
    Gt = 6,
    Lt = 7,
    Eq = 8,
    Ge = 9,
    Le = 10,

    // Memory
    /// Pop address, push the byte stored there.
    Read8 = 11,
    /// Pop address, push the little-endian word stored there.
    Read64 = 12,
    /// Pop address, pop value, store the low byte of value.
    Write8 = 13,
    /// Pop address, pop value, store value as a little-endian word.
    Write64 = 14,

    // Output
    /// Pop a value and print it in decimal.
    Printu = 15,
    /// Pop pointer, pop size, write that many bytes of memory.
    Puts = 16,

    // Control flow
    /// Pop address, save the return address on the call stack, jump.
    Call = 17,
    /// Pop the call stack into the instruction pointer.
    Ret = 18,
    /// Pop address and jump to it.
    Jp = 19,
    /// Pop condition, pop address, jump if the condition is non-zero.
    Jpc = 20,
    /// Pop offset and add it to the instruction pointer.
    Jr = 21,
    /// Pop condition, pop offset, add the offset if the condition is non-zero.
    Jrc = 22,
    /// Stop execution.
    Halt = 23,
}

/// All opcodes, in encoding order.
pub const ALL_OPCODES: [Opcode; 24] = [
    Opcode::Push,
    Opcode::Dup,
    Opcode::Swap,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Multu,
    Opcode::Gt,
    Opcode::Lt,
    Opcode::Eq,
    Opcode::Ge,
    Opcode::Le,
    Opcode::Read8,
    Opcode::Read64,
    Opcode::Write8,
    Opcode::Write64,
    Opcode::Printu,
    Opcode::Puts,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Jp,
    Opcode::Jpc,
    Opcode::Jr,
    Opcode::Jrc,
    Opcode::Halt,
];

// Encoding is dense: the last opcode's word must close the table.
const _: () = assert!(ALL_OPCODES.len() == Opcode::Halt as usize + 1);

impl TryFrom<u64> for Opcode {
    type Error = DecodeError;

    fn try_from(word: u64) -> Result<Self, Self::Error> {
        usize::try_from(word)
            .ok()
            .and_then(|idx| ALL_OPCODES.get(idx))
            .copied()
            .ok_or(DecodeError::InvalidOpcode(word))
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "push",
            Opcode::Dup => "dup",
            Opcode::Swap => "swap",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Multu => "multu",
            Opcode::Gt => "gt",
            Opcode::Lt => "lt",
            Opcode::Eq => "eq",
            Opcode::Ge => "ge",
            Opcode::Le => "le",
            Opcode::Read8 => "read8",
            Opcode::Read64 => "read64",
            Opcode::Write8 => "write8",
            Opcode::Write64 => "write64",
            Opcode::Printu => "printu",
            Opcode::Puts => "puts",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::Jp => "jp",
            Opcode::Jpc => "jpc",
            Opcode::Jr => "jr",
            Opcode::Jrc => "jrc",
            Opcode::Halt => "halt",
        }
    }

    /// Looks up an opcode by its assembly mnemonic. Case-sensitive.
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        ALL_OPCODES.iter().find(|op| op.mnemonic() == name).copied()
    }

    /// True if the opcode word is followed by an immediate operand word.
    pub fn has_immediate(&self) -> bool {
        matches!(self, Opcode::Push | Opcode::Dup)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
