//! Decoded view of a single instruction.
//!
//! In the word stream an instruction is either one word (the opcode) or two
//! words (the opcode followed by its immediate operand):
//! ```text
//! [push][imm]  [dup][n]  [add]  [jp]  ...
//! ```

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// One instruction with its optional immediate operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Immediate operand. `Some` exactly when `opcode.has_immediate()`.
    pub operand: Option<u64>,
}

impl Instruction {
    /// An instruction without an immediate operand.
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }

    /// An instruction with an immediate operand (`push`, `dup`).
    pub fn with_operand(opcode: Opcode, operand: u64) -> Self {
        Self {
            opcode,
            operand: Some(operand),
        }
    }

    /// Number of words this instruction occupies in the stream.
    pub fn width(&self) -> usize {
        1 + usize::from(self.operand.is_some())
    }

    /// Append the encoded words to `out`.
    pub fn encode_into(&self, out: &mut Vec<u64>) {
        out.push(self.opcode as u64);
        if let Some(operand) = self.operand {
            out.push(operand);
        }
    }

    /// Decode the instruction starting at `words[0]`.
    pub fn decode(words: &[u64]) -> Result<Self, DecodeError> {
        let word = words.first().copied().ok_or(DecodeError::UnexpectedEnd)?;
        let opcode = Opcode::try_from(word)?;
        if opcode.has_immediate() {
            let operand = words
                .get(1)
                .copied()
                .ok_or(DecodeError::MissingOperand(opcode.mnemonic()))?;
            Ok(Self::with_operand(opcode, operand))
        } else {
            Ok(Self::new(opcode))
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operand {
            Some(operand) => write!(f, "{} {}", self.opcode, operand),
            None => write!(f, "{}", self.opcode),
        }
    }
}
