//! Disassembler: instruction stream → address-annotated listing.
//!
//! One line per decoded instruction. Jumps appear in their lowered form
//! (`push <addr>` followed by `jp`), so the listing is for reading, not
//! for feeding back into the assembler.

use evm_common::Program;

/// Render a program as a listing.
///
/// Words that do not decode are shown as `.word` and decoding resumes at
/// the next word.
pub fn disassemble(program: &Program) -> String {
    let words = program.words();
    let mut lines = Vec::new();

    for (addr, decoded) in program.instructions() {
        let line = match decoded {
            Ok(instr) => format!("{addr:04}  {instr}"),
            Err(_) => format!("{addr:04}  .word 0x{:016x}", words[addr]),
        };
        lines.push(line);
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use evm_common::{Instruction, Opcode};

    #[test]
    fn empty_program_is_empty_listing() {
        assert_eq!(disassemble(&Program::default()), "");
    }

    #[test]
    fn addresses_count_words() {
        let program = Program::from_instructions(&[
            Instruction::with_operand(Opcode::Push, 3),
            Instruction::with_operand(Opcode::Dup, 0),
            Instruction::new(Opcode::Printu),
            Instruction::new(Opcode::Halt),
        ]);
        assert_eq!(
            disassemble(&program),
            "0000  push 3\n0002  dup 0\n0004  printu\n0005  halt\n"
        );
    }

    #[test]
    fn invalid_word_is_shown_raw() {
        let program = Program::new(vec![0xff, Opcode::Halt as u64]);
        assert_eq!(
            disassemble(&program),
            "0000  .word 0x00000000000000ff\n0001  halt\n"
        );
    }

    #[test]
    fn truncated_push_is_shown_raw() {
        let program = Program::new(vec![Opcode::Push as u64]);
        assert_eq!(disassemble(&program), "0000  .word 0x0000000000000000\n");
    }
}
