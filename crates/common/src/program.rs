//! Program representation: the instruction stream.
//!
//! A program is an ordered sequence of 64-bit words, opcodes interleaved
//! with their immediate operands. There is no on-disk format; programs are
//! built by the assembler and handed straight to the VM.

use crate::error::DecodeError;
use crate::instruction::Instruction;
use crate::opcode::Opcode;

/// An EVM program: a sequence of words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    words: Vec<u64>,
}

impl Program {
    /// Create a program from raw words.
    pub fn new(words: Vec<u64>) -> Self {
        Self { words }
    }

    /// Build a program from decoded instructions.
    pub fn from_instructions(instructions: &[Instruction]) -> Self {
        let mut words = Vec::with_capacity(instructions.len() * 2);
        for instr in instructions {
            instr.encode_into(&mut words);
        }
        Self { words }
    }

    /// The raw word stream.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Number of words in the program.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the program has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Append an opcode word.
    pub fn push_opcode(&mut self, opcode: Opcode) {
        self.words.push(opcode as u64);
    }

    /// Append a raw word (an immediate operand or a placeholder).
    pub fn push_word(&mut self, word: u64) {
        self.words.push(word);
    }

    /// Overwrite the word at `pos`. Returns false if `pos` is out of range.
    pub fn patch(&mut self, pos: usize, word: u64) -> bool {
        match self.words.get_mut(pos) {
            Some(slot) => {
                *slot = word;
                true
            }
            None => false,
        }
    }

    /// Decode the stream sequentially, starting at address 0.
    ///
    /// Yields `(address, instruction)` pairs. An undecodable word yields an
    /// error and decoding resumes at the following word.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            words: &self.words,
            pos: 0,
        }
    }

    /// Little-endian byte view of the stream, eight bytes per word.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.words.len() * 8);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

/// Iterator returned by [`Program::instructions`].
pub struct Instructions<'a> {
    words: &'a [u64],
    pos: usize,
}

impl Iterator for Instructions<'_> {
    type Item = (usize, Result<Instruction, DecodeError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.words.len() {
            return None;
        }
        let addr = self.pos;
        let decoded = Instruction::decode(&self.words[addr..]);
        self.pos += match &decoded {
            Ok(instr) => instr.width(),
            Err(_) => 1,
        };
        Some((addr, decoded))
    }
}
